//! Speculative preload scanner.
//!
//! [§ 13.2.1 Speculative HTML parsing](https://html.spec.whatwg.org/multipage/parsing.html#speculative-html-parsing)
//!
//! While the tree builder is blocked on an external script, the markup
//! queued behind it is run through this much simpler tokenizer. It builds no
//! tokens and no tree; it only tracks enough state (content model, comment
//! escapes, tag and attribute names) to spot `<script src>`, `<img src>`,
//! `<link rel=stylesheet href>` and CSS `@import` rules, so their fetches
//! can start early.
//!
//! Input arrives in arbitrary chunks. Whenever a decision needs characters
//! that have not arrived yet, the scanner stops and resumes from the same
//! place on the next [`PreloadScanner::write`].

use strum_macros::Display;

use crate::config::ParserConfig;
use crate::loader::ResourceKind;
use crate::tokenizer::named_character_references::lookup_entity;

/// Longest entity name tried inside attribute values.
const MAX_ENTITY_NAME: usize = 8;

/// Size of the ring buffer used to recognise `<!--` and `-->`.
const LAST_CHARACTERS: usize = 8;

/// Tokenizer states. A subset of
/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
/// without doctype handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PreloadState {
    /// Character data.
    Data,
    /// After a `&` in character data.
    EntityData,
    /// After `<`.
    TagOpen,
    /// After `</`.
    CloseTagOpen,
    /// Reading a tag name.
    TagName,
    /// Between attributes.
    BeforeAttributeName,
    /// Reading an attribute name.
    AttributeName,
    /// After an attribute name.
    AfterAttributeName,
    /// After `=`.
    BeforeAttributeValue,
    /// Inside `"..."`.
    AttributeValueDoubleQuoted,
    /// Inside `'...'`.
    AttributeValueSingleQuoted,
    /// Inside an unquoted value.
    AttributeValueUnquoted,
    /// After a `&` in an attribute value.
    EntityInAttributeValue,
    /// `<?...>` and other junk up to the next `>`.
    BogusComment,
    /// After `<!`.
    MarkupDeclarationOpen,
    /// After `<!--`.
    CommentStart,
    /// After `<!---`.
    CommentStartDash,
    /// Comment text.
    Comment,
    /// After a `-` in a comment.
    CommentEndDash,
    /// After `--` in a comment.
    CommentEnd,
}

/// How character data after the last start tag is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
enum ContentModel {
    /// Ordinary markup.
    Pcdata,
    /// `<title>`, `<textarea>`: entities but no tags.
    Rcdata,
    /// `<script>`, `<style>` and friends: raw text.
    Cdata,
    /// `<plaintext>`: everything until the end of input.
    Plaintext,
}

/// Where the `@import` recogniser is inside a `<style>` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CssState {
    Initial,
    MaybeComment,
    Comment,
    MaybeCommentEnd,
    RuleStart,
    Rule,
    AfterRule,
    RuleValue,
    AfterRuleValue,
}

/// A resource found ahead of the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadRequest {
    /// URL, resolved against the configured base.
    pub url: String,
    /// What the resource is for.
    pub kind: ResourceKind,
}

/// Outcome of reading a character reference in an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityResult {
    /// More input is needed. Nothing was consumed.
    Incomplete,
    /// `ch` is `None` when the `&` is literal; `len` characters after the
    /// `&` belong to the reference.
    Decoded { ch: Option<char>, len: usize },
}

/// The scanner. One instance lives for one blocking script.
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct PreloadScanner {
    source: Vec<char>,
    pos: usize,

    state: PreloadState,
    state_before_entity: PreloadState,
    content_model: ContentModel,
    escape: bool,
    last_characters: [char; LAST_CHARACTERS],
    last_character_index: usize,

    close_tag: bool,
    tag_name: String,
    attribute_name: String,
    attribute_value: String,
    last_start_tag: String,

    url_to_load: String,
    link_is_stylesheet: bool,

    css_state: CssState,
    css_rule: String,
    css_rule_value: String,

    scripting_enabled: bool,
    base_url: Option<String>,
    found: Vec<PreloadRequest>,
}

impl PreloadScanner {
    /// A scanner in its initial state.
    #[must_use]
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            source: Vec::new(),
            pos: 0,
            state: PreloadState::Data,
            state_before_entity: PreloadState::Data,
            content_model: ContentModel::Pcdata,
            escape: false,
            last_characters: ['\0'; LAST_CHARACTERS],
            last_character_index: 0,
            close_tag: false,
            tag_name: String::new(),
            attribute_name: String::new(),
            attribute_value: String::new(),
            last_start_tag: String::new(),
            url_to_load: String::new(),
            link_is_stylesheet: false,
            css_state: CssState::Initial,
            css_rule: String::new(),
            css_rule_value: String::new(),
            scripting_enabled: config.scripting_enabled,
            base_url: config.base_url.clone(),
            found: Vec::new(),
        }
    }

    /// Back to the initial state, dropping buffered input.
    pub fn reset(&mut self) {
        let config = ParserConfig {
            scripting_enabled: self.scripting_enabled,
            base_url: self.base_url.take(),
            ..ParserConfig::default()
        };
        *self = Self::new(&config);
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> PreloadState {
        self.state
    }

    /// Scan a chunk and return the resources discovered in it, in document
    /// order.
    pub fn write(&mut self, chunk: &str) -> Vec<PreloadRequest> {
        let _ = self.source.drain(..self.pos);
        self.pos = 0;
        self.source.extend(chunk.chars());
        self.tokenize();
        std::mem::take(&mut self.found)
    }

    fn remaining(&self) -> usize {
        self.source.len() - self.pos
    }

    // =========================================================================
    // State machine
    // =========================================================================

    fn tokenize(&mut self) {
        while let Some(&cc) = self.source.get(self.pos) {
            let mut advance = true;
            match self.state {
                PreloadState::Data => {
                    self.remember_character(cc);
                    let raw = matches!(self.content_model, ContentModel::Rcdata | ContentModel::Cdata);
                    match cc {
                        '&' if matches!(
                            self.content_model,
                            ContentModel::Pcdata | ContentModel::Rcdata
                        ) =>
                        {
                            self.state = PreloadState::EntityData;
                        }
                        '<' if self.content_model == ContentModel::Pcdata
                            || (raw && !self.escape) =>
                        {
                            self.state = PreloadState::TagOpen;
                        }
                        _ => {
                            if cc == '-' && raw && !self.escape && self.last_characters_match("<!--") {
                                self.escape = true;
                            } else if cc == '>' && raw && self.escape && self.last_characters_match("-->") {
                                self.escape = false;
                            }
                            self.emit_character(cc);
                        }
                    }
                }
                PreloadState::EntityData => {
                    // Entities in text carry no URLs.
                    self.state = PreloadState::Data;
                    advance = false;
                }
                PreloadState::TagOpen => match self.content_model {
                    ContentModel::Rcdata | ContentModel::Cdata => {
                        if cc == '/' {
                            self.state = PreloadState::CloseTagOpen;
                        } else {
                            self.state = PreloadState::Data;
                            advance = false;
                        }
                    }
                    ContentModel::Pcdata => match cc {
                        '!' => self.state = PreloadState::MarkupDeclarationOpen,
                        '/' => self.state = PreloadState::CloseTagOpen,
                        c if c.is_ascii_alphabetic() => self.start_tag_name(c, false),
                        '>' => self.state = PreloadState::Data,
                        '?' => self.state = PreloadState::BogusComment,
                        _ => {
                            self.state = PreloadState::Data;
                            advance = false;
                        }
                    },
                    ContentModel::Plaintext => {}
                },
                PreloadState::CloseTagOpen => {
                    if matches!(self.content_model, ContentModel::Rcdata | ContentModel::Cdata) {
                        // Only the end tag of the raw text element counts.
                        if self.last_start_tag.is_empty() {
                            self.state = PreloadState::Data;
                            continue;
                        }
                        let needed = self.last_start_tag.chars().count() + 1;
                        if self.remaining() < needed {
                            return;
                        }
                        let candidate = &self.source[self.pos..self.pos + needed];
                        let name_matches = candidate
                            .iter()
                            .zip(self.last_start_tag.chars())
                            .all(|(c, expected)| c.to_ascii_lowercase() == expected);
                        let after = candidate[needed - 1];
                        if !name_matches || !(is_whitespace(after) || after == '>' || after == '/') {
                            self.state = PreloadState::Data;
                            continue;
                        }
                    }
                    match cc {
                        c if c.is_ascii_alphabetic() => self.start_tag_name(c, true),
                        '>' => self.state = PreloadState::Data,
                        _ => self.state = PreloadState::BogusComment,
                    }
                }
                PreloadState::TagName => match cc {
                    c if is_whitespace(c) => self.state = PreloadState::BeforeAttributeName,
                    '>' => {
                        self.emit_tag();
                        self.state = PreloadState::Data;
                    }
                    '/' => self.state = PreloadState::BeforeAttributeName,
                    c => self.tag_name.push(c.to_ascii_lowercase()),
                },
                PreloadState::BeforeAttributeName => match cc {
                    c if is_whitespace(c) => {}
                    '/' => {}
                    '>' => {
                        self.emit_tag();
                        self.state = PreloadState::Data;
                    }
                    c => self.start_attribute_name(c),
                },
                PreloadState::AttributeName => match cc {
                    c if is_whitespace(c) => self.state = PreloadState::AfterAttributeName,
                    '=' => self.state = PreloadState::BeforeAttributeValue,
                    '>' => {
                        self.emit_tag();
                        self.state = PreloadState::Data;
                    }
                    '/' => self.state = PreloadState::BeforeAttributeName,
                    c => self.attribute_name.push(c.to_ascii_lowercase()),
                },
                PreloadState::AfterAttributeName => match cc {
                    c if is_whitespace(c) => {}
                    '=' => self.state = PreloadState::BeforeAttributeValue,
                    '>' => {
                        self.emit_tag();
                        self.state = PreloadState::Data;
                    }
                    '/' => self.state = PreloadState::BeforeAttributeName,
                    c => self.start_attribute_name(c),
                },
                PreloadState::BeforeAttributeValue => match cc {
                    c if is_whitespace(c) => {}
                    '"' => self.state = PreloadState::AttributeValueDoubleQuoted,
                    '\'' => self.state = PreloadState::AttributeValueSingleQuoted,
                    '&' => {
                        self.state = PreloadState::AttributeValueUnquoted;
                        advance = false;
                    }
                    '>' => {
                        self.emit_tag();
                        self.state = PreloadState::Data;
                    }
                    c => {
                        self.attribute_value.push(c);
                        self.state = PreloadState::AttributeValueUnquoted;
                    }
                },
                PreloadState::AttributeValueDoubleQuoted
                | PreloadState::AttributeValueSingleQuoted => {
                    let quote = if self.state == PreloadState::AttributeValueDoubleQuoted {
                        '"'
                    } else {
                        '\''
                    };
                    match cc {
                        c if c == quote => {
                            self.process_attribute();
                            self.state = PreloadState::BeforeAttributeName;
                        }
                        '&' => self.enter_attribute_entity(),
                        c => self.attribute_value.push(c),
                    }
                }
                PreloadState::AttributeValueUnquoted => match cc {
                    c if is_whitespace(c) => {
                        self.process_attribute();
                        self.state = PreloadState::BeforeAttributeName;
                    }
                    '&' => self.enter_attribute_entity(),
                    '>' => {
                        self.process_attribute();
                        self.emit_tag();
                        self.state = PreloadState::Data;
                    }
                    c => self.attribute_value.push(c),
                },
                PreloadState::EntityInAttributeValue => {
                    match consume_entity(&self.source[self.pos..]) {
                        EntityResult::Incomplete => return,
                        EntityResult::Decoded { ch, len } => {
                            self.attribute_value.push(ch.unwrap_or('&'));
                            self.pos += len;
                        }
                    }
                    self.state = self.state_before_entity;
                    continue;
                }
                PreloadState::BogusComment => {
                    if cc == '>' {
                        self.state = PreloadState::Data;
                    }
                }
                PreloadState::MarkupDeclarationOpen => {
                    if cc == '-' {
                        if self.remaining() < 2 {
                            return;
                        }
                        self.pos += 1;
                        if self.source[self.pos] == '-' {
                            self.state = PreloadState::CommentStart;
                        } else {
                            self.state = PreloadState::BogusComment;
                            advance = false;
                        }
                    } else {
                        self.state = PreloadState::BogusComment;
                        advance = false;
                    }
                }
                PreloadState::CommentStart | PreloadState::CommentStartDash => match cc {
                    '-' if self.state == PreloadState::CommentStart => {
                        self.state = PreloadState::CommentStartDash;
                    }
                    '-' => self.state = PreloadState::CommentEnd,
                    '>' => self.state = PreloadState::Data,
                    _ => self.state = PreloadState::Comment,
                },
                PreloadState::Comment => {
                    if cc == '-' {
                        self.state = PreloadState::CommentEndDash;
                    }
                }
                PreloadState::CommentEndDash => {
                    self.state = if cc == '-' {
                        PreloadState::CommentEnd
                    } else {
                        PreloadState::Comment
                    };
                }
                PreloadState::CommentEnd => match cc {
                    '>' => self.state = PreloadState::Data,
                    '-' => {}
                    _ => self.state = PreloadState::Comment,
                },
            }
            if advance {
                self.pos += 1;
            }
        }
    }

    fn start_tag_name(&mut self, c: char, close: bool) {
        self.tag_name.clear();
        self.tag_name.push(c.to_ascii_lowercase());
        self.close_tag = close;
        self.state = PreloadState::TagName;
    }

    fn start_attribute_name(&mut self, c: char) {
        self.attribute_name.clear();
        self.attribute_value.clear();
        self.attribute_name.push(c.to_ascii_lowercase());
        self.state = PreloadState::AttributeName;
    }

    const fn enter_attribute_entity(&mut self) {
        self.state_before_entity = self.state;
        self.state = PreloadState::EntityInAttributeValue;
    }

    // =========================================================================
    // Escape tracking
    // =========================================================================

    fn remember_character(&mut self, c: char) {
        self.last_character_index = (self.last_character_index + 1) % LAST_CHARACTERS;
        self.last_characters[self.last_character_index] = c;
    }

    fn clear_last_characters(&mut self) {
        self.last_characters = ['\0'; LAST_CHARACTERS];
    }

    /// Whether the most recently remembered characters end with `chars`.
    fn last_characters_match(&self, chars: &str) -> bool {
        let mut pos = self.last_character_index;
        for expected in chars.chars().rev() {
            if self.last_characters[pos] != expected {
                return false;
            }
            pos = (pos + LAST_CHARACTERS - 1) % LAST_CHARACTERS;
        }
        true
    }

    // =========================================================================
    // Tags and attributes
    // =========================================================================

    /// Record the URL an attribute names, if the current tag loads one.
    fn process_attribute(&mut self) {
        match self.tag_name.as_str() {
            "script" | "img" | "image" => {
                if self.attribute_name == "src" && self.url_to_load.is_empty() {
                    self.url_to_load = wren_common::url::parse_url(&self.attribute_value);
                }
            }
            "link" => {
                if self.attribute_name == "href" && self.url_to_load.is_empty() {
                    self.url_to_load = wren_common::url::parse_url(&self.attribute_value);
                } else if self.attribute_name == "rel" {
                    let rel = self.attribute_value.to_lowercase();
                    self.link_is_stylesheet = rel.contains("stylesheet")
                        && !rel.contains("alternate")
                        && !rel.contains("icon");
                }
            }
            _ => {}
        }
    }

    /// A tag is complete: switch the content model and request what it
    /// references.
    fn emit_tag(&mut self) {
        if self.close_tag {
            self.content_model = ContentModel::Pcdata;
            self.css_state = CssState::Initial;
            self.clear_last_characters();
            self.url_to_load.clear();
            self.link_is_stylesheet = false;
            return;
        }

        self.last_start_tag.clone_from(&self.tag_name);
        self.content_model = match self.tag_name.as_str() {
            "textarea" | "title" => ContentModel::Rcdata,
            "style" | "xmp" | "script" | "iframe" | "noembed" | "noframes" => ContentModel::Cdata,
            "noscript" if self.scripting_enabled => ContentModel::Cdata,
            "plaintext" => ContentModel::Plaintext,
            _ => ContentModel::Pcdata,
        };

        if !self.url_to_load.is_empty() {
            let kind = match self.tag_name.as_str() {
                "script" => Some(ResourceKind::Script),
                "img" | "image" => Some(ResourceKind::Image),
                "link" if self.link_is_stylesheet => Some(ResourceKind::Stylesheet),
                _ => None,
            };
            if let Some(kind) = kind {
                let url = std::mem::take(&mut self.url_to_load);
                self.request(&url, kind);
            }
        }
        self.url_to_load.clear();
        self.link_is_stylesheet = false;
    }

    fn request(&mut self, url: &str, kind: ResourceKind) {
        let url = wren_common::url::resolve_url(url, self.base_url.as_deref());
        log::debug!(target: "wren::preload", "preloading {kind} {url}");
        self.found.push(PreloadRequest { url, kind });
    }

    // =========================================================================
    // CSS @import
    // =========================================================================

    fn emit_character(&mut self, c: char) {
        if self.content_model == ContentModel::Cdata && self.last_start_tag == "style" {
            self.tokenize_css(c);
        }
    }

    /// Only `@import` rules are of interest; everything else is skipped.
    fn tokenize_css(&mut self, c: char) {
        self.css_state = match self.css_state {
            CssState::Initial => match c {
                '@' => CssState::RuleStart,
                '/' => CssState::MaybeComment,
                _ => CssState::Initial,
            },
            CssState::MaybeComment if c == '*' => CssState::Comment,
            CssState::MaybeComment => CssState::Initial,
            CssState::Comment if c == '*' => CssState::MaybeCommentEnd,
            CssState::Comment => CssState::Comment,
            CssState::MaybeCommentEnd => match c {
                '/' => CssState::Initial,
                '*' => CssState::MaybeCommentEnd,
                _ => CssState::Comment,
            },
            CssState::RuleStart if c.is_ascii_alphabetic() => {
                self.css_rule.clear();
                self.css_rule_value.clear();
                self.css_rule.push(c);
                CssState::Rule
            }
            CssState::RuleStart => CssState::Initial,
            CssState::Rule => match c {
                c if is_whitespace(c) => CssState::AfterRule,
                ';' => CssState::Initial,
                c => {
                    self.css_rule.push(c);
                    CssState::Rule
                }
            },
            CssState::AfterRule => match c {
                c if is_whitespace(c) => CssState::AfterRule,
                ';' => CssState::Initial,
                c => {
                    self.css_rule_value.push(c);
                    CssState::RuleValue
                }
            },
            CssState::RuleValue => match c {
                c if is_whitespace(c) => CssState::AfterRuleValue,
                ';' => {
                    self.emit_css_rule();
                    CssState::Initial
                }
                c => {
                    self.css_rule_value.push(c);
                    CssState::RuleValue
                }
            },
            CssState::AfterRuleValue => match c {
                c if is_whitespace(c) => CssState::AfterRuleValue,
                ';' => {
                    self.emit_css_rule();
                    CssState::Initial
                }
                // A media list follows; those imports are not preloaded.
                _ => CssState::Initial,
            },
        };
    }

    fn emit_css_rule(&mut self) {
        if self.css_rule.eq_ignore_ascii_case("import") && !self.css_rule_value.is_empty() {
            let url = wren_common::url::parse_url(&self.css_rule_value);
            if !url.is_empty() {
                self.request(&url, ResourceKind::Stylesheet);
            }
        }
        self.css_rule.clear();
        self.css_rule_value.clear();
    }
}

const fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\r' | '\t')
}

/// Values that are not Unicode scalars become U+FFFD.
fn legal_entity(value: u32) -> char {
    char::from_u32(value)
        .filter(|&c| c != '\0')
        .unwrap_or('\u{FFFD}')
}

/// Read a character reference in an attribute value. `input` starts right
/// after the `&`.
///
/// Numeric references end at the first non-digit, with or without `;`.
/// Named references are looked up case-sensitively, at most
/// [`MAX_ENTITY_NAME`] characters long.
fn consume_entity(input: &[char]) -> EntityResult {
    let not_entity = EntityResult::Decoded { ch: None, len: 0 };
    let Some(&first) = input.first() else {
        return EntityResult::Incomplete;
    };

    if first == '#' {
        let (radix, digits_start) = match input.get(1) {
            None => return EntityResult::Incomplete,
            Some('x' | 'X') => (16, 2),
            Some(c) if c.is_ascii_digit() => (10, 1),
            Some(_) => return not_entity,
        };
        let mut value: u32 = 0;
        let mut len = digits_start;
        loop {
            let Some(&c) = input.get(len) else {
                return EntityResult::Incomplete;
            };
            match c.to_digit(radix) {
                Some(digit) => {
                    value = value.saturating_mul(radix).saturating_add(digit);
                    len += 1;
                }
                // "&#x" without a hex digit.
                None if len == digits_start => return not_entity,
                None => {
                    if c == ';' {
                        len += 1;
                    }
                    return EntityResult::Decoded {
                        ch: Some(legal_entity(value)),
                        len,
                    };
                }
            }
        }
    }

    if !first.is_ascii_alphabetic() {
        return not_entity;
    }
    let mut name = String::new();
    for (i, &c) in input.iter().enumerate() {
        if c == ';' || !c.is_ascii_alphanumeric() {
            return match lookup_entity(&name) {
                Some(ch) => EntityResult::Decoded {
                    ch: Some(ch),
                    len: if c == ';' { i + 1 } else { i },
                },
                None => not_entity,
            };
        }
        if name.len() == MAX_ENTITY_NAME {
            return not_entity;
        }
        name.push(c);
    }
    EntityResult::Incomplete
}
