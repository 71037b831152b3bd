use std::fmt;

use wren_common::warning::warn_once;
use wren_dom::dtd::{ForbiddenTags, TagId, tag_priority};
use wren_dom::{Attribute, AttributesMap, DoctypeData, DomTree, NodeId, ParseMode};

use super::doctype::select_parse_mode;
use crate::config::ParserConfig;
use crate::tokenizer::{DoctypeToken, Token};

/// Text shown by the form an `<isindex>` expands into, unless the tag
/// carries its own `prompt`.
const ISINDEX_PROMPT: &str = "This is a searchable index. Enter search keywords: ";

/// A recoverable problem met while building the tree.
///
/// The parser never fails; every issue has already been repaired by the
/// time it is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// What was wrong and how it was handled.
    pub message: String,
    /// Number of tokens processed when the issue was met (1-based).
    pub token_index: usize,
    /// Content was dropped (`true`) rather than only moved or repaired.
    pub is_error: bool,
}

/// An entry of the open element stack.
///
/// `node` is where insertion continues once this entry is popped: the
/// insertion point that was current when the element was pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackElem {
    /// Tag of the pushed element.
    pub tag: TagId,
    /// Priority of the tag when it was pushed.
    pub level: u16,
    /// Insertion point restored by popping this entry.
    pub node: NodeId,
    /// The inline flag in effect before the push.
    pub was_inline: bool,
    /// The element was foster-parented out of a table.
    pub in_stray_table_content: bool,
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_error { "error" } else { "warning" };
        write!(f, "{kind} at token {}: {}", self.token_index, self.message)
    }
}

/// A `<script>` element whose end tag has been seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedScript {
    /// The script element in the tree.
    pub element: NodeId,
    /// Its `src` attribute, if any.
    pub src: Option<String>,
    /// The inline source text.
    pub source: String,
}

/// Tree construction with legacy error recovery.
///
/// There are no insertion modes. Content-model checks and tag priorities
/// decide where each node goes.
///
/// Tokens are inserted into the current node; when the content model
/// rejects a node the parser repairs the structure (implied elements,
/// closing optional tags, moving content out of tables, re-opening
/// formatting elements) and tries again. Nothing is ever fatal.
#[derive(Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct HTMLParser {
    /// The document being built. `NodeId::ROOT` is the Document node.
    pub(super) tree: DomTree,

    /// Open elements, innermost last.
    pub(super) stack: Vec<StackElem>,

    /// Where the next node is inserted.
    pub(super) current: NodeId,

    /// Tags that currently may not be opened.
    pub(super) forbidden: ForbiddenTags,

    /// Drop every token until this end tag.
    pub(super) discard_until: Option<TagId>,

    pub(super) in_body: bool,
    pub(super) in_select: bool,
    pub(super) inline: bool,
    pub(super) have_frameset: bool,
    pub(super) have_body: bool,
    pub(super) have_title: bool,
    pub(super) have_content: bool,

    /// Open elements that were foster-parented out of a table.
    pub(super) stray_table_content_depth: usize,

    /// The `<head>` element, kept after it is closed so misplaced head
    /// content can still be moved into it.
    pub(super) head: Option<NodeId>,
    /// The open `<form>`.
    pub(super) form: Option<NodeId>,
    /// The open `<map>`.
    pub(super) map: Option<NodeId>,
    /// An `<isindex>` form waiting for the body to start.
    pub(super) isindex: Option<NodeId>,
    /// The last start tag was a duplicate `<html>`/`<body>` whose attributes
    /// were merged into the existing element.
    pub(super) merged_duplicate: bool,

    scripting_enabled: bool,
    report_warnings: bool,

    completed_script: Option<CompletedScript>,
    issues: Vec<ParseIssue>,
    token_index: usize,
    finished: bool,
}

impl HTMLParser {
    /// Create a parser with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&ParserConfig::default())
    }

    /// Create a parser honouring `scripting_enabled` and `report_warnings`
    /// from `config`.
    #[must_use]
    pub fn with_config(config: &ParserConfig) -> Self {
        Self {
            tree: DomTree::new(),
            stack: Vec::new(),
            current: NodeId::ROOT,
            forbidden: ForbiddenTags::new(),
            discard_until: None,
            in_body: false,
            in_select: false,
            inline: false,
            have_frameset: false,
            have_body: false,
            have_title: false,
            have_content: false,
            stray_table_content_depth: 0,
            head: None,
            form: None,
            map: None,
            merged_duplicate: false,
            isindex: None,
            scripting_enabled: config.scripting_enabled,
            report_warnings: config.report_warnings,
            completed_script: None,
            issues: Vec::new(),
            token_index: 0,
            finished: false,
        }
    }

    /// Parse a complete token stream and return the document.
    #[must_use]
    pub fn run(self, tokens: impl IntoIterator<Item = Token>) -> DomTree {
        self.run_with_issues(tokens).0
    }

    /// Parse a complete token stream and return the document together with
    /// the issues met along the way.
    #[must_use]
    pub fn run_with_issues(
        mut self,
        tokens: impl IntoIterator<Item = Token>,
    ) -> (DomTree, Vec<ParseIssue>) {
        for token in tokens {
            self.process_token(token);
        }
        self.finish();
        let issues = std::mem::take(&mut self.issues);
        (self.tree, issues)
    }

    /// Feed one token to the tree builder.
    pub fn process_token(&mut self, token: Token) {
        if self.finished {
            return;
        }
        self.token_index += 1;
        match token {
            Token::Doctype(doctype) => self.process_doctype(&doctype),
            other => self.parse_token(other),
        }
    }

    /// End of input: every open element is closed and the document is
    /// finished.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        if self.isindex.take().is_some() {
            self.parse_warning("<isindex> never got a body to live in");
        }
        while !self.stack.is_empty() {
            self.pop_one_block();
        }
        let _ = self.tree.set_parse_mode(ParseMode::Compat);
        self.tree.close(NodeId::ROOT);
        self.finished = true;
        log::debug!(target: "wren::parser", "parse finished after {} tokens", self.token_index);
    }

    /// Stop parsing without unwinding: open elements stay open and the
    /// document is closed as it is.
    pub fn abort(&mut self) {
        if self.finished {
            return;
        }
        self.tree.close(NodeId::ROOT);
        self.finished = true;
        log::debug!(target: "wren::parser", "parse aborted after {} tokens", self.token_index);
    }

    /// Whether [`HTMLParser::finish`] or [`HTMLParser::abort`] was called.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// The document built so far.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Take the document out of the parser.
    #[must_use]
    pub fn into_tree(self) -> DomTree {
        self.tree
    }

    /// Issues recorded so far.
    #[must_use]
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Drain the recorded issues.
    pub fn take_issues(&mut self) -> Vec<ParseIssue> {
        std::mem::take(&mut self.issues)
    }

    /// The script whose end tag was just processed, if any. Each script is
    /// reported once.
    pub const fn take_completed_script(&mut self) -> Option<CompletedScript> {
        self.completed_script.take()
    }

    /// The node new content is inserted into.
    #[must_use]
    pub const fn current_node(&self) -> NodeId {
        self.current
    }

    /// Tags of the open elements, outermost first.
    #[must_use]
    pub fn open_elements(&self) -> Vec<TagId> {
        self.stack.iter().map(|elem| elem.tag).collect()
    }

    /// Whether body content has started.
    #[must_use]
    pub const fn in_body(&self) -> bool {
        self.in_body
    }

    /// Whether a `<select>` is open.
    #[must_use]
    pub const fn in_select(&self) -> bool {
        self.in_select
    }

    /// Whether the current insertion point is inline content.
    #[must_use]
    pub const fn in_inline_context(&self) -> bool {
        self.inline
    }

    /// Whether the document turned out to be a frameset document.
    #[must_use]
    pub const fn have_frameset(&self) -> bool {
        self.have_frameset
    }

    /// Open elements that were moved out of a table.
    #[must_use]
    pub const fn stray_table_content_depth(&self) -> usize {
        self.stray_table_content_depth
    }

    /// Whether tokens are being dropped until a specific end tag.
    #[must_use]
    pub const fn is_skipping(&self) -> bool {
        self.discard_until.is_some()
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Content was moved or repaired.
    pub(super) fn parse_warning(&mut self, message: &str) {
        self.record_issue(message, false);
    }

    /// Content was dropped.
    pub(super) fn parse_error(&mut self, message: &str) {
        self.record_issue(message, true);
    }

    fn record_issue(&mut self, message: &str, is_error: bool) {
        log::debug!(target: "wren::parser", "token {}: {message}", self.token_index);
        if self.report_warnings {
            warn_once("HTML Parser", message);
        }
        self.issues.push(ParseIssue {
            message: message.to_string(),
            token_index: self.token_index,
            is_error,
        });
    }

    // =========================================================================
    // Node helpers
    // =========================================================================

    /// Tag of the current node ([`TagId::NONE`] for the document).
    pub(super) fn current_tag(&self) -> TagId {
        self.tree.tag(self.current)
    }

    /// Create an element the markup did not spell out.
    pub(super) fn create_implied(&mut self, tag: TagId) -> NodeId {
        self.create_implied_with(tag, Vec::new())
    }

    pub(super) fn create_implied_with(&mut self, tag: TagId, attrs: AttributesMap) -> NodeId {
        let name = tag.known_name().unwrap_or("span");
        log::trace!(target: "wren::parser", "implying <{name}>");
        self.tree.create_element(tag, name, attrs)
    }

    /// Inline as far as recovery is concerned: character data and the text
    /// level formatting elements.
    pub(super) fn is_inline_node(&self, node: NodeId) -> bool {
        if self.tree.as_element(node).is_none() {
            return node != NodeId::ROOT && self.tree.doctype() != Some(node);
        }
        matches!(
            self.tree.tag(node).normalized(),
            TagId::A
                | TagId::FONT
                | TagId::TT
                | TagId::U
                | TagId::B
                | TagId::I
                | TagId::S
                | TagId::STRIKE
                | TagId::BIG
                | TagId::SMALL
                | TagId::EM
                | TagId::STRONG
                | TagId::DFN
                | TagId::CODE
                | TagId::SAMP
                | TagId::KBD
                | TagId::VAR
                | TagId::CITE
                | TagId::ABBR
                | TagId::ACRONYM
                | TagId::SUB
                | TagId::SUP
                | TagId::SPAN
                | TagId::NOBR
                | TagId::WBR
        )
    }

    /// A text node with nothing but whitespace.
    pub(super) fn is_whitespace_text(&self, node: NodeId) -> bool {
        self.tree.as_text(node).is_some_and(is_whitespace_only)
    }

    // =========================================================================
    // Token dispatch
    // =========================================================================

    /// Doctypes only count before any other content, and only once.
    fn process_doctype(&mut self, doctype: &DoctypeToken) {
        if self.current != NodeId::ROOT || self.tree.doctype().is_some() {
            self.parse_warning("doctype after content ignored");
            return;
        }
        if !self.tree.children(NodeId::ROOT).is_empty() && self.tree.document_element().is_some()
        {
            self.parse_warning("doctype after the document element ignored");
            return;
        }

        let node = self.tree.create_doctype(DoctypeData {
            name: doctype.name.clone(),
            public_id: doctype.public_id.clone(),
            system_id: doctype.system_id.clone(),
        });
        if self.tree.add_child(NodeId::ROOT, node).is_none() {
            return;
        }
        self.tree.close(node);

        let mode = select_parse_mode(doctype);
        if !doctype.name.eq_ignore_ascii_case("html") {
            warn_once("HTML Parser", "malformed doctype, using compatibility mode");
        }
        let _ = self.tree.set_parse_mode(mode);
    }

    /// Route a token: end tags close, everything else becomes a node.
    pub(super) fn parse_token(&mut self, token: Token) {
        if let Some(until) = self.discard_until {
            if token.is_end_tag(until) {
                self.discard_until = None;
            }
            // The end tag of the element whose content was skipped still
            // closes it.
            let closes_current = token.is_end_tag(self.current_tag());
            if self.discard_until.is_some() || !closes_current {
                return;
            }
        }

        let token = match token {
            Token::EndTag { tag: TagId::BR, name } if !self.tree.in_strict_mode() => {
                self.parse_warning("</br> treated as <br>");
                Token::StartTag {
                    tag: TagId::BR,
                    name,
                    attributes: Vec::new(),
                    self_closing: false,
                }
            }
            other => other,
        };

        match token {
            Token::EndTag { tag, .. } => self.process_close_tag(tag),
            Token::StartTag {
                tag,
                name,
                attributes,
                self_closing,
            } => {
                self.default_to_compat();
                self.process_start_tag(tag, &name, attributes, self_closing);
            }
            Token::Text(data) => {
                if is_whitespace_only(&data) {
                    let node = self.tree.create_text(&data);
                    let _ = self.insert_token_node(TagId::TEXT, node, false);
                    return;
                }
                self.default_to_compat();
                if self.in_body
                    && !matches!(
                        self.current_tag(),
                        TagId::STYLE | TagId::TITLE | TagId::SCRIPT
                    )
                {
                    self.have_content = true;
                }
                let node = self.tree.create_text(&data);
                if !self.insert_token_node(TagId::TEXT, node, false) {
                    self.parse_error("text with no place in the tree dropped");
                }
            }
            Token::Comment(data) => {
                let node = self.tree.create_comment(&data);
                if !self.insert_token_node(TagId::COMMENT, node, false) {
                    self.parse_error("comment with no place in the tree dropped");
                }
            }
            Token::Doctype(doctype) => self.process_doctype(&doctype),
        }
    }

    /// Without a doctype, the first real content fixes the mode.
    fn default_to_compat(&mut self) {
        if self.tree.parse_mode().is_none() && self.tree.set_parse_mode(ParseMode::Compat) {
            log::debug!(target: "wren::parser", "no doctype, compatibility mode");
        }
    }

    fn process_start_tag(
        &mut self,
        tag: TagId,
        name: &str,
        attributes: Vec<Attribute>,
        self_closing: bool,
    ) {
        self.merged_duplicate = false;
        let mut flat = self_closing;
        let Some(node) = self.create_element_for_tag(tag, name, attributes, &mut flat) else {
            return;
        };

        // Pop until no open element forbids the new tag.
        while !self.stack.is_empty() && self.forbidden.is_forbidden(tag) {
            log::trace!(target: "wren::parser", "<{name}> is forbidden here, popping");
            self.pop_one_block();
        }

        if matches!(tag, TagId::SELECT | TagId::OPTION) {
            flat = false;
        }
        if tag_priority(tag) == 0 {
            flat = true;
        }

        if self.insert_token_node(tag, node, flat) {
            match tag {
                TagId::SCRIPT if flat => self.complete_script(node),
                TagId::BODY | TagId::FRAMESET => self.flush_isindex(),
                _ => {}
            }
        } else if !self.merged_duplicate {
            self.parse_error(&format!("<{name}> has no valid place in the tree, dropped"));
        }
    }

    /// Insert a node built from a token; forget the pointers to it if it
    /// could not be placed.
    fn insert_token_node(&mut self, tag: TagId, node: NodeId, flat: bool) -> bool {
        if self.insert_node(node, flat) {
            return true;
        }
        if self.map == Some(node) {
            self.map = None;
        }
        if self.form == Some(node) {
            self.form = None;
        }
        if self.head == Some(node) {
            self.head = None;
        }
        log::trace!(target: "wren::parser", "insertion of {tag} failed");
        false
    }

    /// Build the node for a start tag, running the tag's bookkeeping first.
    /// Returns `None` when the tag produces no node.
    fn create_element_for_tag(
        &mut self,
        tag: TagId,
        name: &str,
        attributes: Vec<Attribute>,
        flat: &mut bool,
    ) -> Option<NodeId> {
        match tag {
            TagId::HEAD => {
                if self.head.is_some()
                    || !(self.current == NodeId::ROOT || self.current_tag() == TagId::HTML)
                {
                    self.parse_warning("misplaced <head> ignored");
                    return None;
                }
                let head = self.tree.create_element(tag, name, attributes);
                self.head = Some(head);
                return Some(head);
            }
            TagId::BODY => {
                if self.have_frameset {
                    self.parse_warning("<body> in a frameset document ignored");
                    return None;
                }
                self.pop_block(TagId::HEAD);
                self.have_body = true;
                self.start_body();
            }
            TagId::TITLE => {
                // Only one non-empty title.
                if self.have_title {
                    self.discard_until = Some(TagId::TITLE);
                    self.parse_warning("second <title> skipped");
                    return None;
                }
            }
            TagId::FRAMESET => {
                self.pop_block(TagId::HEAD);
                if self.in_body && !self.have_frameset && !self.have_content && !self.have_body {
                    self.pop_block(TagId::BODY);
                    if let Some(body) = self.tree.body()
                        && self
                            .tree
                            .merge_attributes(body, &[Attribute::new("style", "display: none")])
                    {
                        self.tree.request_style_recalc();
                    }
                    self.in_body = false;
                }
                if (self.have_body || self.have_content || self.have_frameset)
                    && self.current_tag() == TagId::HTML
                {
                    self.parse_warning("<frameset> after body content ignored");
                    return None;
                }
                self.have_frameset = true;
                self.start_body();
            }
            TagId::FORM => {
                // Forms do not nest.
                if self.form.is_some() {
                    self.parse_warning("nested <form> ignored");
                    return None;
                }
                let form = self.tree.create_element(tag, name, attributes);
                self.form = Some(form);
                return Some(form);
            }
            TagId::ISINDEX => {
                let prompt = attributes
                    .iter()
                    .find(|a| a.name == "prompt")
                    .map_or(ISINDEX_PROMPT, |a| a.value.as_str())
                    .to_string();
                let node = self.build_isindex(&prompt);
                if !self.in_body {
                    self.isindex = Some(node);
                    return None;
                }
                *flat = true;
                return Some(node);
            }
            TagId::OPTION => self.pop_optional_block(TagId::OPTION),
            TagId::SELECT => self.in_select = true,
            TagId::DD => {
                self.pop_optional_block(TagId::DT);
                self.pop_optional_block(TagId::DD);
            }
            TagId::DT => {
                self.pop_optional_block(TagId::DD);
                self.pop_optional_block(TagId::DT);
            }
            TagId::LI => self.pop_optional_block(TagId::LI),
            TagId::A => self.pop_block(TagId::A),
            TagId::MAP => {
                let map = self.tree.create_element(tag, name, attributes);
                self.map = Some(map);
                return Some(map);
            }
            TagId::TR => self.pop_block(TagId::TR),
            TagId::TD | TagId::TH => {
                self.pop_block(TagId::TH);
                self.pop_block(TagId::TD);
            }
            TagId::TBODY | TagId::THEAD | TagId::TFOOT => {
                self.pop_block(TagId::THEAD);
                self.pop_block(TagId::TBODY);
                self.pop_block(TagId::TFOOT);
            }
            TagId::NOBR | TagId::WBR => self.pop_optional_block(tag),
            TagId::NOEMBED | TagId::NOFRAMES | TagId::NOSCRIPT => {
                if *flat {
                    return None;
                }
                let node = self.tree.create_element(tag, name, attributes);
                if tag != TagId::NOSCRIPT || self.scripting_enabled {
                    self.discard_until = Some(tag);
                }
                return Some(node);
            }
            TagId::NOLAYER => return None,
            _ => {}
        }
        Some(self.tree.create_element(tag, name, attributes))
    }

    /// `<isindex>` becomes a small search form:
    /// `<form><hr>prompt<input name=isindex><hr></form>`. Inside an open
    /// form a `<div>` is used instead.
    fn build_isindex(&mut self, prompt: &str) -> NodeId {
        let container = if self.form.is_some() {
            self.create_implied(TagId::DIV)
        } else {
            self.create_implied(TagId::FORM)
        };
        let hr = self.create_implied(TagId::HR);
        self.tree.append_child(container, hr);
        let text = self.tree.create_text(prompt);
        self.tree.append_child(container, text);
        let input = self.create_implied_with(TagId::INPUT, vec![Attribute::new("name", "isindex")]);
        self.tree.append_child(container, input);
        let hr = self.create_implied(TagId::HR);
        self.tree.append_child(container, hr);
        container
    }

    /// Body content starts; a held `<isindex>` is placed once the body
    /// element exists.
    pub(super) const fn start_body(&mut self) {
        self.in_body = true;
    }

    /// Place the `<isindex>` form that arrived before the body.
    pub(super) fn flush_isindex(&mut self) {
        if !self.in_body {
            return;
        }
        if let Some(isindex) = self.isindex.take()
            && !self.insert_node(isindex, true)
        {
            self.parse_error("<isindex> has no valid place in the tree, dropped");
        }
    }

    // =========================================================================
    // End tags
    // =========================================================================

    /// Close the element named by an end tag, if it is open and in scope.
    pub(super) fn process_close_tag(&mut self, tag: TagId) {
        match tag {
            // Pages close these too early; they stay open until the end.
            TagId::HTML | TagId::BODY => return,
            TagId::FORM => {
                self.form = None;
                if !self.is_element_in_scope(TagId::FORM) {
                    self.parse_warning("</form> without an open form ignored");
                    return;
                }
            }
            TagId::MAP => self.map = None,
            TagId::SELECT => self.in_select = false,
            TagId::TITLE => {
                if self.tree.first_child(self.current).is_some() {
                    self.have_title = true;
                }
            }
            TagId::SCRIPT => {
                if self.current_tag() == TagId::SCRIPT {
                    self.complete_script(self.current);
                }
            }
            TagId::P => {
                if !self.is_element_in_scope(TagId::P) {
                    // As if <p> had been seen.
                    self.parse_warning("</p> without an open paragraph");
                    self.parse_token(Token::StartTag {
                        tag: TagId::P,
                        name: "p".to_string(),
                        attributes: Vec::new(),
                        self_closing: false,
                    });
                    self.pop_block(TagId::P);
                    return;
                }
            }
            TagId::ADDRESS
            | TagId::BLOCKQUOTE
            | TagId::CENTER
            | TagId::DIR
            | TagId::DIV
            | TagId::DL
            | TagId::FIELDSET
            | TagId::LISTING
            | TagId::MENU
            | TagId::OL
            | TagId::PRE
            | TagId::UL
            | TagId::DD
            | TagId::DT
            | TagId::LI
            | TagId::APPLET
            | TagId::BUTTON
            | TagId::MARQUEE
            | TagId::OBJECT
            | TagId::HEAD => {
                if !self.is_element_in_scope(tag) {
                    log::trace!(target: "wren::parser", "</{tag}> out of scope, ignored");
                    return;
                }
            }
            heading if heading.is_heading() => {
                if !self.is_heading_in_scope() {
                    log::trace!(target: "wren::parser", "</{tag}> out of scope, ignored");
                    return;
                }
            }
            _ => {}
        }

        self.generate_implied_end_tags(tag);
        self.pop_block(tag);
    }

    fn complete_script(&mut self, element: NodeId) {
        let src = self
            .tree
            .as_element(element)
            .and_then(|data| data.get_attribute("src"))
            .map(str::to_string);
        let source = self.tree.text_content(element);
        self.completed_script = Some(CompletedScript {
            element,
            src,
            source,
        });
    }
}

impl Default for HTMLParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Only spaces, tabs, line breaks and form feeds.
pub(super) fn is_whitespace_only(text: &str) -> bool {
    text.chars()
        .all(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C'))
}
