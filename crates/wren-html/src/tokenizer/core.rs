use std::collections::VecDeque;

use strum_macros::Display;
use wren_dom::dtd::{TagId, TagInterner};

use super::character_reference::{EntityMatch, match_entity};
use super::token::{DoctypeToken, TagBuilder, Token};

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The tokenizer state machine. States that have a WHATWG counterpart link
/// to it; the doctype, raw text, processing instruction and server include
/// states follow legacy browser behaviour instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    Data,
    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    TagOpen,
    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    CloseTagOpen,
    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    TagName,
    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    BeforeAttributeName,
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    AttributeName,
    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    AfterAttributeName,
    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    BeforeAttributeValue,
    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    AttributeValueDoubleQuoted,
    /// [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    AttributeValueSingleQuoted,
    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    AttributeValueUnquoted,
    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    SelfClosingStartTag,
    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    /// in character data.
    CharacterReference,
    /// A character reference inside an attribute value; returns to the
    /// value state it came from.
    EntityInAttributeValue,
    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    ///
    /// Everything up to the next `>` is dropped.
    BogusComment,
    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    MarkupDeclarationOpen,
    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    CommentStart,
    /// [§ 13.2.5.44 Comment start dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state)
    CommentStartDash,
    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    Comment,
    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    CommentEndDash,
    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    CommentEnd,
    /// Whitespace before the doctype name.
    BeforeDoctypeName,
    /// Inside the doctype name.
    DoctypeName,
    /// After the name, waiting for `PUBLIC`, `SYSTEM`, `[` or `>`.
    AfterDoctypeName,
    /// After `PUBLIC`, waiting for the opening quote.
    BeforeDoctypePublicId,
    /// Inside the quoted public identifier.
    DoctypePublicId,
    /// After the public identifier.
    AfterDoctypePublicId,
    /// After `SYSTEM`, waiting for the opening quote.
    BeforeDoctypeSystemId,
    /// Inside the quoted system identifier.
    DoctypeSystemId,
    /// After the system identifier.
    AfterDoctypeSystemId,
    /// Between `[` and `]`.
    DoctypeInternalSubset,
    /// After `]`, waiting for `>`.
    AfterDoctypeInternalSubset,
    /// Unrecognised doctype syntax; skipped up to `>`.
    BogusDoctype,
    /// An SGML `-- ... --` comment inside a doctype.
    DoctypeComment,
    /// Content of `script`, `style`, `textarea`, `title`, `xmp`, `iframe`,
    /// `noembed` or `noframes`: only the matching end tag is recognised.
    RawText,
    /// After a raw text end tag name, skipping to the closing `>`.
    RawTextEndTag,
    /// [§ 13.2.5.5 PLAINTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state)
    PlainText,
    /// `<? ... >`, dropped.
    ProcessingInstruction,
    /// `<% ... %>`, dropped.
    ServerInclude,
    /// All input has been tokenized.
    Eof,
}

/// A saved input position that the end-of-input fallbacks rewind to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct InputMark {
    pub(super) pos: usize,
    pub(super) line: usize,
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "Implementations must act as if they used the following state machine to tokenize HTML."
///
/// The tokenizer is incremental: input arrives through [`HTMLTokenizer::feed`]
/// and tokens are pulled with [`HTMLTokenizer::next_token`]. When the buffered
/// input ends in the middle of a construct the machine simply waits; nothing
/// is decided until either more input or [`HTMLTokenizer::finish`] arrives.
#[allow(clippy::struct_excessive_bools)]
pub struct HTMLTokenizer {
    pub(super) state: TokenizerState,
    pub(super) return_state: Option<TokenizerState>,
    pub(super) input: String,
    pub(super) current_pos: usize,
    pub(super) current_input_character: Option<char>,
    // When true, the next step will not consume a new character.
    // "Reconsume in the X state" sets this flag.
    pub(super) reconsume: bool,
    // Set by a handler that needs more lookahead than is buffered.
    pub(super) stalled: bool,
    pub(super) at_eof: bool,

    /// Tokens completed but not yet handed out.
    pub(super) ready: VecDeque<Token>,
    /// Output of [`HTMLTokenizer::run`].
    pub(super) token_stream: Vec<Token>,

    /// Pending character data, flushed before the next token.
    pub(super) text: String,
    pub(super) current_tag: Option<TagBuilder>,
    pub(super) current_doctype: DoctypeToken,
    pub(super) doctype_quote: char,
    pub(super) comment: String,

    /// Raw text region state.
    pub(super) raw: String,
    pub(super) raw_tag: TagId,
    pub(super) raw_name: String,
    pub(super) raw_escaped: bool,
    pub(super) raw_quote: Option<char>,

    /// Processing instruction / server include scanning.
    pub(super) pi_quote: Option<char>,
    pub(super) prev_char: char,

    pub(super) tag_start: InputMark,
    pub(super) mark: Option<InputMark>,

    pub(super) interner: TagInterner,
    pub(super) discard_lf: bool,
    pub(super) skip_lf: bool,
    pub(super) broken_comments: bool,
    pub(super) broken_server: bool,
    pub(super) report_warnings: bool,

    pub(super) line: usize,
    pub(super) script_line: usize,
    pub(super) chars_consumed: usize,
}

impl HTMLTokenizer {
    /// Create a tokenizer with `input` already buffered.
    ///
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization):
    /// "The initial state is the data state."
    ///
    /// More input may follow through [`Self::feed`]; call [`Self::finish`]
    /// (or [`Self::run`]) once the document is complete.
    #[must_use]
    pub fn new(input: String) -> Self {
        let mut tokenizer = Self {
            state: TokenizerState::Data,
            return_state: None,
            input: String::new(),
            current_pos: 0,
            current_input_character: None,
            reconsume: false,
            stalled: false,
            at_eof: false,
            ready: VecDeque::new(),
            token_stream: Vec::new(),
            text: String::new(),
            current_tag: None,
            current_doctype: DoctypeToken::default(),
            doctype_quote: '"',
            comment: String::new(),
            raw: String::new(),
            raw_tag: TagId::NONE,
            raw_name: String::new(),
            raw_escaped: false,
            raw_quote: None,
            pi_quote: None,
            prev_char: ' ',
            tag_start: InputMark::default(),
            mark: None,
            interner: TagInterner::new(),
            discard_lf: false,
            skip_lf: false,
            broken_comments: false,
            broken_server: false,
            report_warnings: true,
            line: 1,
            script_line: 1,
            chars_consumed: 0,
        };
        tokenizer.feed(&input);
        tokenizer
    }

    /// Append a chunk of the document. CR and CRLF become LF, also when the
    /// pair is split across two chunks.
    pub fn feed(&mut self, chunk: &str) {
        if self.at_eof {
            log::debug!("input fed after end of document ignored");
            return;
        }
        self.compact();
        let normalized = self.normalize_newlines(chunk);
        self.input.push_str(&normalized);
    }

    /// Insert markup at the current position, ahead of all buffered input.
    ///
    /// This is how `document.write` output re-enters the stream: it is read
    /// right after the token that triggered the script.
    pub fn insert(&mut self, markup: &str) {
        let mut at = self.current_pos;
        if self.reconsume
            && let Some(c) = self.current_input_character
        {
            // The pending character goes back into the input after the markup.
            at -= c.len_utf8();
            self.reconsume = false;
            if c == '\n' {
                self.line -= 1;
            }
        }
        self.current_pos = at;
        self.input
            .insert_str(at, &markup.replace("\r\n", "\n").replace('\r', "\n"));
    }

    /// No more input will arrive. Pending constructs are resolved with the
    /// end-of-input rules on the following calls to [`Self::next_token`].
    pub const fn finish(&mut self) {
        self.at_eof = true;
    }

    /// The next complete token, or `None` when the buffered input is
    /// exhausted (before [`Self::finish`]) or the document is done.
    pub fn next_token(&mut self) -> Option<Token> {
        while self.ready.is_empty() {
            if !self.step() {
                break;
            }
        }
        self.ready.pop_front()
    }

    /// Tokenize the whole buffered input as a complete document.
    ///
    /// The tokens are collected for [`Self::into_tokens`].
    pub fn run(&mut self) {
        self.finish();
        while let Some(token) = self.next_token() {
            self.token_stream.push(token);
        }
    }

    /// Consume the tokenizer and return the token stream.
    /// Call this after [`Self::run`].
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.token_stream
    }

    /// Whether the end of the document has been tokenized and every token
    /// handed out.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == TokenizerState::Eof && self.ready.is_empty()
    }

    /// Whether the machine is in character data with nothing half-read.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == TokenizerState::Data && self.text.is_empty() && !self.reconsume
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> TokenizerState {
        self.state
    }

    /// Buffered input that has not been read yet.
    #[must_use]
    pub fn pending_input(&self) -> &str {
        let mut at = self.current_pos;
        if self.reconsume
            && let Some(c) = self.current_input_character
        {
            at -= c.len_utf8();
        }
        self.input.get(at..).unwrap_or_default()
    }

    /// Total number of characters read so far, including re-reads after a
    /// rewind. The incremental driver uses it as its work budget.
    #[must_use]
    pub const fn chars_consumed(&self) -> usize {
        self.chars_consumed
    }

    /// Current line (1-based).
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Line on which the content of the most recent `<script>` starts.
    #[must_use]
    pub const fn script_line(&self) -> usize {
        self.script_line
    }

    /// Names for the custom tag ids handed out so far.
    #[must_use]
    pub const fn interner(&self) -> &TagInterner {
        &self.interner
    }

    /// Enable or disable forwarding of suspicious markup to `warn_once`.
    pub const fn set_report_warnings(&mut self, report: bool) {
        self.report_warnings = report;
    }

    /// Run one step of the state machine. Returns false when no progress
    /// can be made until more input arrives, or when tokenizing is over.
    fn step(&mut self) -> bool {
        if self.state == TokenizerState::Eof {
            return false;
        }
        self.stalled = false;

        // These states inspect the input directly instead of consuming a
        // character first.
        if matches!(
            self.state,
            TokenizerState::CharacterReference
                | TokenizerState::EntityInAttributeValue
                | TokenizerState::MarkupDeclarationOpen
        ) {
            self.dispatch();
            return !self.stalled;
        }

        let reconsumed = self.reconsume;
        if self.reconsume {
            self.reconsume = false;
        } else {
            match self.consume() {
                Some(c) => self.current_input_character = Some(c),
                None if self.at_eof => self.current_input_character = None,
                None => return false,
            }
        }

        self.dispatch();

        if self.stalled {
            if reconsumed {
                self.reconsume = true;
            } else {
                self.unconsume();
            }
            return false;
        }
        true
    }

    fn dispatch(&mut self) {
        match self.state {
            TokenizerState::Data => self.handle_data_state(),
            TokenizerState::TagOpen => self.handle_tag_open_state(),
            TokenizerState::CloseTagOpen => self.handle_close_tag_open_state(),
            TokenizerState::TagName => self.handle_tag_name_state(),
            TokenizerState::BeforeAttributeName => self.handle_before_attribute_name_state(),
            TokenizerState::AttributeName => self.handle_attribute_name_state(),
            TokenizerState::AfterAttributeName => self.handle_after_attribute_name_state(),
            TokenizerState::BeforeAttributeValue => self.handle_before_attribute_value_state(),
            TokenizerState::AttributeValueDoubleQuoted => {
                self.handle_attribute_value_quoted_state('"');
            }
            TokenizerState::AttributeValueSingleQuoted => {
                self.handle_attribute_value_quoted_state('\'');
            }
            TokenizerState::AttributeValueUnquoted => self.handle_attribute_value_unquoted_state(),
            TokenizerState::SelfClosingStartTag => self.handle_self_closing_start_tag_state(),
            TokenizerState::CharacterReference => self.handle_character_reference_state(false),
            TokenizerState::EntityInAttributeValue => self.handle_character_reference_state(true),
            TokenizerState::BogusComment => self.handle_bogus_comment_state(),
            TokenizerState::MarkupDeclarationOpen => self.handle_markup_declaration_open_state(),
            TokenizerState::CommentStart => self.handle_comment_start_state(),
            TokenizerState::CommentStartDash => self.handle_comment_start_dash_state(),
            TokenizerState::Comment => self.handle_comment_state(),
            TokenizerState::CommentEndDash => self.handle_comment_end_dash_state(),
            TokenizerState::CommentEnd => self.handle_comment_end_state(),
            TokenizerState::BeforeDoctypeName => self.handle_before_doctype_name_state(),
            TokenizerState::DoctypeName => self.handle_doctype_name_state(),
            TokenizerState::AfterDoctypeName => self.handle_after_doctype_name_state(),
            TokenizerState::BeforeDoctypePublicId => {
                self.handle_before_doctype_identifier_state(TokenizerState::DoctypePublicId);
            }
            TokenizerState::DoctypePublicId => {
                self.handle_doctype_identifier_state(TokenizerState::AfterDoctypePublicId);
            }
            TokenizerState::AfterDoctypePublicId => {
                self.handle_after_doctype_public_id_state();
            }
            TokenizerState::BeforeDoctypeSystemId => {
                self.handle_before_doctype_identifier_state(TokenizerState::DoctypeSystemId);
            }
            TokenizerState::DoctypeSystemId => {
                self.handle_doctype_identifier_state(TokenizerState::AfterDoctypeSystemId);
            }
            TokenizerState::AfterDoctypeSystemId => self.handle_after_doctype_system_id_state(),
            TokenizerState::DoctypeInternalSubset => self.handle_doctype_internal_subset_state(),
            TokenizerState::AfterDoctypeInternalSubset => {
                self.handle_after_doctype_internal_subset_state();
            }
            TokenizerState::BogusDoctype => self.handle_bogus_doctype_state(),
            TokenizerState::DoctypeComment => self.handle_doctype_comment_state(),
            TokenizerState::RawText => self.handle_raw_text_state(),
            TokenizerState::RawTextEndTag => self.handle_raw_text_end_tag_state(),
            TokenizerState::PlainText => self.handle_plain_text_state(),
            TokenizerState::ProcessingInstruction => self.handle_processing_instruction_state(),
            TokenizerState::ServerInclude => self.handle_server_include_state(),
            TokenizerState::Eof => {}
        }
    }

    // =========================================================================
    // Character data
    // =========================================================================

    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    fn handle_data_state(&mut self) {
        let discard_lf = std::mem::take(&mut self.discard_lf);
        match self.current_input_character {
            // "U+0026 AMPERSAND (&) - Set the return state to the data state.
            // Switch to the character reference state."
            Some('&') => {
                self.return_state = Some(TokenizerState::Data);
                self.switch_to(TokenizerState::CharacterReference);
            }
            // "U+003C LESS-THAN SIGN (<) - Switch to the tag open state."
            Some('<') => {
                self.tag_start = InputMark {
                    pos: self.current_pos - 1,
                    line: self.line,
                };
                self.switch_to(TokenizerState::TagOpen);
            }
            // A line break right after <pre> or <listing> is not content.
            Some('\n') if discard_lf => {}
            Some(c) => self.text.push(c),
            // "EOF - Emit an end-of-file token."
            None => {
                self.flush_text();
                self.switch_to(TokenizerState::Eof);
            }
        }
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    ///
    /// Entered right after the `&`. Decides with as much lookahead as the
    /// entity rules need, or waits for more input.
    fn handle_character_reference_state(&mut self, in_attribute: bool) {
        let decided = match_entity(self.pending_input(), in_attribute, self.at_eof);
        let ch = match decided {
            EntityMatch::Incomplete => {
                self.stall();
                return;
            }
            EntityMatch::NotAnEntity => '&',
            EntityMatch::Decoded { ch, len } => {
                self.advance(len);
                ch
            }
        };

        let return_state = self.return_state.take().unwrap_or(TokenizerState::Data);
        if in_attribute {
            if let Some(tag) = self.current_tag.as_mut() {
                tag.push_attr_value(ch);
            }
        } else {
            self.text.push(ch);
        }
        self.switch_to(return_state);
    }

    /// [§ 13.2.5.5 PLAINTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state)
    ///
    /// "Emit the current input character as a character token."
    fn handle_plain_text_state(&mut self) {
        match self.current_input_character {
            Some(c) => self.text.push(c),
            None => self.reconsume_in(TokenizerState::Data),
        }
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    fn handle_tag_open_state(&mut self) {
        match self.current_input_character {
            // "ASCII alpha - Create a new start tag token, set its tag name to the
            // empty string. Reconsume in the tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_tag = Some(TagBuilder::start());
                self.reconsume_in(TokenizerState::TagName);
            }
            // "U+002F SOLIDUS (/) - Switch to the end tag open state."
            Some('/') => self.switch_to(TokenizerState::CloseTagOpen),
            // "U+0021 EXCLAMATION MARK (!) - Switch to the markup declaration open state."
            Some('!') => self.switch_to(TokenizerState::MarkupDeclarationOpen),
            Some('?') => {
                self.pi_quote = None;
                self.prev_char = ' ';
                self.switch_to(TokenizerState::ProcessingInstruction);
            }
            Some('%') if !self.broken_server => {
                self.mark = Some(self.tag_start);
                self.prev_char = ' ';
                self.switch_to(TokenizerState::ServerInclude);
            }
            // "Anything else - Emit a U+003C LESS-THAN SIGN character token.
            // Reconsume in the data state."
            _ => {
                self.text.push('<');
                self.reconsume_in(TokenizerState::Data);
            }
        }
    }

    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    fn handle_close_tag_open_state(&mut self) {
        match self.current_input_character {
            // "ASCII alpha - Create a new end tag token, set its tag name to the
            // empty string. Reconsume in the tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_tag = Some(TagBuilder::end());
                self.reconsume_in(TokenizerState::TagName);
            }
            // "Anything else - This is an invalid-first-character-of-tag-name parse
            // error. Create a comment token ... Reconsume in the bogus comment state."
            Some(_) => {
                log::trace!("bogus end tag dropped at line {}", self.line);
                self.reconsume_in(TokenizerState::BogusComment);
            }
            None => {
                self.text.push_str("</");
                self.reconsume_in(TokenizerState::Data);
            }
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    fn handle_tag_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => self.emit_current_tag(),
            Some(c) => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.push_name(c);
                }
            }
            None => self.drop_unterminated_tag(),
        }
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    fn handle_before_attribute_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            // Stray quotes between attributes are dropped.
            Some('"' | '\'' | '`') => {}
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => self.emit_current_tag(),
            Some('<') => self.emit_tag_before_less_than(),
            Some(_) => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.begin_attribute();
                }
                self.reconsume_in(TokenizerState::AttributeName);
            }
            None => self.drop_unterminated_tag(),
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    fn handle_attribute_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::AfterAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some('>') => self.emit_current_tag(),
            Some('<') => self.emit_tag_before_less_than(),
            Some(c) => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.push_attr_name(c);
                }
            }
            None => self.drop_unterminated_tag(),
        }
    }

    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    fn handle_after_attribute_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some('>') => self.emit_current_tag(),
            Some('<') => self.emit_tag_before_less_than(),
            Some('"' | '\'' | '`') => {}
            Some(_) => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.begin_attribute();
                }
                self.reconsume_in(TokenizerState::AttributeName);
            }
            None => self.drop_unterminated_tag(),
        }
    }

    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    fn handle_before_attribute_value_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('"') => self.switch_to(TokenizerState::AttributeValueDoubleQuoted),
            Some('\'') => self.switch_to(TokenizerState::AttributeValueSingleQuoted),
            // "U+003E GREATER-THAN SIGN (>) - This is a missing-attribute-value parse
            // error. Switch to the data state. Emit the current tag token."
            Some('>') => self.emit_current_tag(),
            Some('<') => self.emit_tag_before_less_than(),
            Some(_) => self.reconsume_in(TokenizerState::AttributeValueUnquoted),
            None => self.drop_unterminated_tag(),
        }
    }

    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    /// and the single-quoted twin.
    ///
    /// A `>` inside the quotes is part of the value.
    fn handle_attribute_value_quoted_state(&mut self, quote: char) {
        match self.current_input_character {
            Some(c) if c == quote => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.trim_attr_value_newlines();
                }
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('&') => {
                self.return_state = Some(self.state);
                self.switch_to(TokenizerState::EntityInAttributeValue);
            }
            Some(c) => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.push_attr_value(c);
                }
            }
            None => self.drop_unterminated_tag(),
        }
    }

    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    fn handle_attribute_value_unquoted_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('"' | '\'' | '`') => self.switch_to(TokenizerState::BeforeAttributeName),
            Some('&') => {
                self.return_state = Some(TokenizerState::AttributeValueUnquoted);
                self.switch_to(TokenizerState::EntityInAttributeValue);
            }
            Some('>') => self.emit_current_tag(),
            Some('<') => self.emit_tag_before_less_than(),
            Some(c) => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.push_attr_value(c);
                }
            }
            None => self.drop_unterminated_tag(),
        }
    }

    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    fn handle_self_closing_start_tag_state(&mut self) {
        match self.current_input_character {
            // "U+003E GREATER-THAN SIGN (>) - Set the self-closing flag of the current
            // tag token. Switch to the data state. Emit the current tag token."
            Some('>') => {
                if let Some(tag) = self.current_tag.as_mut() {
                    tag.set_self_closing();
                }
                self.emit_current_tag();
            }
            // "Anything else - This is an unexpected-solidus-in-tag parse error.
            // Reconsume in the before attribute name state."
            Some(_) => self.reconsume_in(TokenizerState::BeforeAttributeName),
            None => self.drop_unterminated_tag(),
        }
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    fn handle_bogus_comment_state(&mut self) {
        match self.current_input_character {
            Some('>') => self.switch_to(TokenizerState::Data),
            Some(_) => {}
            None => self.reconsume_in(TokenizerState::Data),
        }
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    fn handle_markup_declaration_open_state(&mut self) {
        // "If the next two characters are both U+002D HYPHEN-MINUS characters (-),
        // consume those two characters, create a comment token whose data is the
        // empty string, and switch to the comment start state."
        if self.next_few_characters_are("--") {
            self.advance(2);
            self.comment.clear();
            self.mark = Some(InputMark {
                pos: self.current_pos,
                line: self.line,
            });
            self.switch_to(TokenizerState::CommentStart);
            return;
        }
        // "Otherwise, if the next seven characters are an ASCII case-insensitive
        // match for the word "DOCTYPE", consume those characters and switch to
        // the DOCTYPE state."
        if self.next_few_characters_are_case_insensitive("doctype") {
            self.advance(7);
            self.current_doctype = DoctypeToken::default();
            self.switch_to(TokenizerState::BeforeDoctypeName);
            return;
        }
        if !self.at_eof && (self.input_is_prefix_of("--") || self.input_is_prefix_of("doctype")) {
            self.stall();
            return;
        }
        // "Otherwise, this is an incorrectly-opened-comment parse error."
        log::trace!("unknown markup declaration dropped at line {}", self.line);
        self.switch_to(TokenizerState::BogusComment);
    }

    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    ///
    /// `<!-->` does not close the comment, except in broken-comment mode.
    fn handle_comment_start_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentStartDash),
            Some('>') if self.broken_comments => self.emit_comment(),
            Some(_) => self.reconsume_in(TokenizerState::Comment),
            None => self.unterminated_comment(),
        }
    }

    /// [§ 13.2.5.44 Comment start dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state)
    fn handle_comment_start_dash_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentEnd),
            Some('>') if self.broken_comments => {
                self.comment.push('-');
                self.emit_comment();
            }
            Some(_) => {
                self.comment.push('-');
                self.reconsume_in(TokenizerState::Comment);
            }
            None => self.unterminated_comment(),
        }
    }

    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    fn handle_comment_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentEndDash),
            Some('>') if self.broken_comments => self.emit_comment(),
            Some(c) => self.comment.push(c),
            None => self.unterminated_comment(),
        }
    }

    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    fn handle_comment_end_dash_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentEnd),
            Some('>') if self.broken_comments => {
                self.comment.push('-');
                self.emit_comment();
            }
            Some(_) => {
                self.comment.push('-');
                self.reconsume_in(TokenizerState::Comment);
            }
            None => self.unterminated_comment(),
        }
    }

    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    fn handle_comment_end_state(&mut self) {
        match self.current_input_character {
            // "U+003E GREATER-THAN SIGN (>) - Switch to the data state. Emit the
            // current comment token."
            Some('>') => self.emit_comment(),
            // "U+002D HYPHEN-MINUS (-) - Append a U+002D HYPHEN-MINUS character (-)
            // to the comment token's data."
            Some('-') => self.comment.push('-'),
            // "Anything else - Append two U+002D HYPHEN-MINUS characters (-) to the
            // comment token's data. Reconsume in the comment state."
            Some(_) => {
                self.comment.push_str("--");
                self.reconsume_in(TokenizerState::Comment);
            }
            None => self.unterminated_comment(),
        }
    }

    /// End of input inside a comment. The first time, the comment is re-read
    /// in broken-comment mode where any `>` closes it; if that also fails the
    /// rest of the document becomes the comment.
    fn unterminated_comment(&mut self) {
        match self.mark {
            Some(mark) if !self.broken_comments => {
                self.warn("unterminated comment; re-reading with '>' as terminator");
                self.broken_comments = true;
                self.comment.clear();
                self.rewind(mark);
                self.switch_to(TokenizerState::CommentStart);
            }
            _ => {
                self.warn("unterminated comment at end of input");
                self.emit_comment();
                self.reconsume_in(TokenizerState::Data);
            }
        }
    }

    // =========================================================================
    // Doctype
    // =========================================================================

    fn handle_before_doctype_name_state(&mut self) {
        let current = self.current_input_character;
        match current {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('-') if self.doctype_comment_start() => {}
            Some('>') => self.malformed_doctype(),
            Some(_) => self.reconsume_in(TokenizerState::DoctypeName),
            None => self.unterminated_doctype(),
        }
    }

    fn handle_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::AfterDoctypeName);
            }
            Some('>') => self.emit_doctype(),
            Some('[') => self.switch_to(TokenizerState::DoctypeInternalSubset),
            Some(c) => self.current_doctype.name.push(c.to_ascii_lowercase()),
            None => self.unterminated_doctype(),
        }
    }

    fn handle_after_doctype_name_state(&mut self) {
        let current = self.current_input_character;
        match current {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('-') if self.doctype_comment_start() => {}
            Some('>') => self.emit_doctype(),
            Some('[') => self.switch_to(TokenizerState::DoctypeInternalSubset),
            Some(c @ ('p' | 'P' | 's' | 'S')) => {
                let (rest, next) = if c.eq_ignore_ascii_case(&'p') {
                    ("ublic", TokenizerState::BeforeDoctypePublicId)
                } else {
                    ("ystem", TokenizerState::BeforeDoctypeSystemId)
                };
                if self.next_few_characters_are_case_insensitive(rest) {
                    self.advance(rest.len());
                    self.switch_to(next);
                } else if !self.at_eof && self.input_is_prefix_of(rest) {
                    self.stall();
                } else {
                    self.switch_to(TokenizerState::BogusDoctype);
                }
            }
            Some(_) => self.switch_to(TokenizerState::BogusDoctype),
            None => self.unterminated_doctype(),
        }
    }

    fn handle_before_doctype_identifier_state(&mut self, identifier: TokenizerState) {
        let current = self.current_input_character;
        match current {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('-') if self.doctype_comment_start() => {}
            Some(quote @ ('"' | '\'')) => {
                self.doctype_quote = quote;
                self.switch_to(identifier);
            }
            Some('>') => self.malformed_doctype(),
            Some(_) => self.switch_to(TokenizerState::BogusDoctype),
            None => self.unterminated_doctype(),
        }
    }

    fn handle_doctype_identifier_state(&mut self, after: TokenizerState) {
        match self.current_input_character {
            Some(c) if c == self.doctype_quote => self.switch_to(after),
            Some('>') => self.malformed_doctype(),
            Some(c) => {
                if after == TokenizerState::AfterDoctypePublicId {
                    self.current_doctype.public_id.push(c);
                } else {
                    self.current_doctype.system_id.push(c);
                }
            }
            None => self.unterminated_doctype(),
        }
    }

    fn handle_after_doctype_public_id_state(&mut self) {
        let current = self.current_input_character;
        match current {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('-') if self.doctype_comment_start() => {}
            Some(quote @ ('"' | '\'')) => {
                self.doctype_quote = quote;
                self.switch_to(TokenizerState::DoctypeSystemId);
            }
            Some('>') => self.emit_doctype(),
            Some('[') => self.switch_to(TokenizerState::DoctypeInternalSubset),
            Some(_) => self.switch_to(TokenizerState::BogusDoctype),
            None => self.unterminated_doctype(),
        }
    }

    fn handle_after_doctype_system_id_state(&mut self) {
        let current = self.current_input_character;
        match current {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('-') if self.doctype_comment_start() => {}
            Some('>') => self.emit_doctype(),
            Some('[') => self.switch_to(TokenizerState::DoctypeInternalSubset),
            Some(_) => self.switch_to(TokenizerState::BogusDoctype),
            None => self.unterminated_doctype(),
        }
    }

    fn handle_doctype_internal_subset_state(&mut self) {
        match self.current_input_character {
            Some(']') => self.switch_to(TokenizerState::AfterDoctypeInternalSubset),
            Some(c) => self.current_doctype.internal_subset.push(c),
            None => self.unterminated_doctype(),
        }
    }

    fn handle_after_doctype_internal_subset_state(&mut self) {
        let current = self.current_input_character;
        match current {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('-') if self.doctype_comment_start() => {}
            Some('>') => self.emit_doctype(),
            Some(_) => self.switch_to(TokenizerState::BogusDoctype),
            None => self.unterminated_doctype(),
        }
    }

    /// [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state)
    fn handle_bogus_doctype_state(&mut self) {
        match self.current_input_character {
            // "U+003E GREATER-THAN SIGN (>) - Switch to the data state. Emit the DOCTYPE token."
            Some('>') => self.emit_doctype(),
            Some(_) => {}
            None => self.unterminated_doctype(),
        }
    }

    fn handle_doctype_comment_state(&mut self) {
        match self.current_input_character {
            Some('-') => match self.peek_codepoint(0) {
                Some('-') => {
                    self.advance(1);
                    let back = self
                        .return_state
                        .take()
                        .unwrap_or(TokenizerState::AfterDoctypeName);
                    self.switch_to(back);
                }
                None if !self.at_eof => self.stall(),
                _ => {}
            },
            Some(_) => {}
            None => self.unterminated_doctype(),
        }
    }

    /// A `-` in a doctype state: if another `-` follows, an SGML comment
    /// starts. Returns false when the `-` is ordinary content.
    fn doctype_comment_start(&mut self) -> bool {
        match self.peek_codepoint(0) {
            Some('-') => {
                self.advance(1);
                self.return_state = Some(self.state);
                self.switch_to(TokenizerState::DoctypeComment);
                true
            }
            None if !self.at_eof => {
                self.stall();
                true
            }
            _ => false,
        }
    }

    fn malformed_doctype(&mut self) {
        self.warn("malformed doctype ignored");
        self.current_doctype = DoctypeToken::default();
        self.switch_to(TokenizerState::Data);
    }

    fn unterminated_doctype(&mut self) {
        self.warn("unterminated doctype at end of input");
        self.current_doctype = DoctypeToken::default();
        self.reconsume_in(TokenizerState::Data);
    }

    fn emit_doctype(&mut self) {
        let mut doctype = std::mem::take(&mut self.current_doctype);
        doctype.public_id = simplify_whitespace(&doctype.public_id);
        doctype.system_id = simplify_whitespace(&doctype.system_id);
        self.switch_to(TokenizerState::Data);
        self.emit(Token::Doctype(doctype));
    }

    // =========================================================================
    // Raw text
    // =========================================================================

    /// Content of a raw text element. Only `</name` followed by whitespace,
    /// `/` or `>` ends the region, and not while a `<!--` opened inside the
    /// region is still waiting for its `-->`.
    fn handle_raw_text_state(&mut self) {
        let discard_lf = std::mem::take(&mut self.discard_lf);
        match self.current_input_character {
            Some('\n') if discard_lf => {}
            Some(c) if !self.raw_escaped && (c == '>' || c == '/' || c <= ' ') => {
                if self.raw_ends_with_end_tag() {
                    let cut = self.raw.len() - self.raw_name.len() - 2;
                    self.raw.truncate(cut);
                    self.flush_raw_text();
                    self.mark = None;
                    if c == '>' {
                        self.emit_raw_end_tag();
                    } else {
                        self.raw_quote = None;
                        self.switch_to(TokenizerState::RawTextEndTag);
                    }
                } else {
                    self.raw.push(c);
                }
            }
            Some(c) => {
                self.raw.push(c);
                if c == '-'
                    && !self.raw_escaped
                    && !self.broken_comments
                    && self.raw_tag != TagId::XMP
                    && self.raw.ends_with("<!--")
                {
                    self.raw_escaped = true;
                } else if c == '>' && self.raw_escaped && self.raw.ends_with("-->") {
                    self.raw_escaped = false;
                }
            }
            None => self.unterminated_raw_text(),
        }
    }

    /// After `</name` and a delimiter: skip attributes up to the next `>`
    /// that is not inside quotes. A line break forgets an open quote.
    fn handle_raw_text_end_tag_state(&mut self) {
        match self.current_input_character {
            Some('>') if self.raw_quote.is_none() => self.emit_raw_end_tag(),
            Some('\n') => self.raw_quote = None,
            Some(q @ ('"' | '\'')) => match self.raw_quote {
                None => self.raw_quote = Some(q),
                Some(open) if open == q => self.raw_quote = None,
                Some(_) => {}
            },
            Some(_) => {}
            None => {
                self.emit_raw_end_tag();
                self.reconsume_in(TokenizerState::Data);
            }
        }
    }

    /// End of input inside a raw text region.
    ///
    /// - an unterminated `<title>` is re-read as ordinary markup;
    /// - a region held open by `<!--` is re-scanned with comment escapes off;
    /// - anything else keeps its content and gets a synthesized end tag.
    fn unterminated_raw_text(&mut self) {
        match self.mark {
            Some(mark) if self.raw_tag == TagId::TITLE => {
                self.warn("unterminated <title>; content re-read as markup");
                self.raw.clear();
                self.mark = None;
                self.rewind(mark);
                self.switch_to(TokenizerState::Data);
            }
            Some(mark) if self.raw_escaped && !self.broken_comments => {
                self.warn("unterminated comment in raw text; re-reading without comment escapes");
                self.broken_comments = true;
                self.raw.clear();
                self.raw_escaped = false;
                self.rewind(mark);
            }
            _ => {
                log::debug!("end tag synthesized for <{}> at end of input", self.raw_name);
                self.flush_raw_text();
                self.mark = None;
                self.emit_raw_end_tag();
                self.reconsume_in(TokenizerState::Data);
            }
        }
    }

    // =========================================================================
    // Processing instructions and server includes
    // =========================================================================

    /// `<? ... ?>`, or the legacy `<? ... >`. A `>` inside quotes does not
    /// end it.
    fn handle_processing_instruction_state(&mut self) {
        match self.current_input_character {
            Some('>') if self.pi_quote.is_none() || self.prev_char == '?' => {
                self.discard_lf = true;
                self.switch_to(TokenizerState::Data);
            }
            Some(c) => {
                match (c, self.pi_quote) {
                    ('"' | '\'', None) => self.pi_quote = Some(c),
                    (q, Some(open)) if q == open => self.pi_quote = None,
                    _ => {}
                }
                self.prev_char = c;
            }
            None => self.reconsume_in(TokenizerState::Data),
        }
    }

    /// `<% ... %>`. Unterminated blocks are re-read as text.
    fn handle_server_include_state(&mut self) {
        match self.current_input_character {
            Some('>') if self.prev_char == '%' => {
                self.mark = None;
                self.switch_to(TokenizerState::Data);
            }
            Some(c) => self.prev_char = c,
            None => match self.mark.take() {
                Some(mark) if !self.broken_server => {
                    self.warn("unterminated <% block re-read as text");
                    self.broken_server = true;
                    self.rewind(mark);
                    self.switch_to(TokenizerState::Data);
                }
                _ => self.reconsume_in(TokenizerState::Data),
            },
        }
    }
}

/// Collapse runs of whitespace to one space and trim both ends.
fn simplify_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
