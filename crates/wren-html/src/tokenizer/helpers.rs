//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("Switch to", "Reconsume in")
//! - Input handling: consuming, lookahead, stalling and rewinding
//! - Token emission, including the mode switches triggered by start tags
//! - Raw text helpers for the end tag match and content flushing

use std::mem;

use wren_common::warning::warn_once;
use wren_dom::dtd::TagId;

use super::character_reference::decode_entities;
use super::core::{HTMLTokenizer, InputMark, TokenizerState};
use super::token::Token;

// =============================================================================
// State Transition Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Switch to the X state"
    ///
    /// Transitions to a new state. The next character will be consumed on the
    /// next step.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Reconsume in the X state"
    ///
    /// Transitions to a new state without consuming the current character.
    /// The same character will be processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }

    /// Not enough lookahead is buffered to decide. The step that called this
    /// is undone and retried once more input (or the end of input) arrives.
    pub(super) const fn stall(&mut self) {
        self.stalled = true;
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Consume the next input character"
    ///
    /// Returns the character at the current position and advances the position.
    /// Returns None if the buffered input is exhausted.
    pub(super) fn consume(&mut self) -> Option<char> {
        let c = self.input.get(self.current_pos..)?.chars().next()?;
        self.current_pos += c.len_utf8();
        self.chars_consumed += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Put the current input character back.
    pub(super) fn unconsume(&mut self) {
        if let Some(c) = self.current_input_character {
            self.current_pos -= c.len_utf8();
            self.chars_consumed = self.chars_consumed.saturating_sub(1);
            if c == '\n' {
                self.line -= 1;
            }
        }
    }

    /// Consume `len` bytes of lookahead that a handler has already matched.
    pub(super) fn advance(&mut self, len: usize) {
        let end = (self.current_pos + len).min(self.input.len());
        if let Some(skipped) = self.input.get(self.current_pos..end) {
            for c in skipped.chars() {
                self.chars_consumed += 1;
                if c == '\n' {
                    self.line += 1;
                }
            }
        }
        self.current_pos = end;
    }

    /// Go back to a saved position.
    pub(super) const fn rewind(&mut self, mark: InputMark) {
        self.current_pos = mark.pos;
        self.line = mark.line;
        self.reconsume = false;
    }

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// Peek at a codepoint at the given offset from the current position without
    /// consuming it.
    #[must_use]
    pub fn peek_codepoint(&self, offset: usize) -> Option<char> {
        self.pending_input().chars().nth(offset)
    }

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "If the next few characters are..."
    #[must_use]
    pub fn next_few_characters_are(&self, target: &str) -> bool {
        self.pending_input().starts_with(target)
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// "ASCII case-insensitive match for the word 'DOCTYPE'"
    #[must_use]
    pub fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        self.pending_input()
            .get(..target.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(target))
    }

    /// Whether all remaining input is a (case-insensitive) proper prefix of
    /// `target`, so that more input could still complete the match.
    pub(super) fn input_is_prefix_of(&self, target: &str) -> bool {
        let rest = self.pending_input();
        rest.len() < target.len()
            && target
                .get(..rest.len())
                .is_some_and(|t| t.eq_ignore_ascii_case(rest))
    }

    /// Whitespace as far as tag syntax is concerned.
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C')
    }

    /// Drop consumed input so the buffer does not grow with the document.
    /// Only safe while no fallback may rewind into it.
    pub(super) fn compact(&mut self) {
        if self.mark.is_none()
            && self.state == TokenizerState::Data
            && !self.reconsume
            && self.current_pos > 0
        {
            self.input.replace_range(..self.current_pos, "");
            self.current_pos = 0;
        }
    }

    /// CR and CRLF to LF. A CR at the end of one chunk swallows an LF at the
    /// start of the next.
    pub(super) fn normalize_newlines(&mut self, chunk: &str) -> String {
        let mut out = String::with_capacity(chunk.len());
        for c in chunk.chars() {
            let after_cr = mem::take(&mut self.skip_lf);
            match c {
                '\r' => {
                    out.push('\n');
                    self.skip_lf = true;
                }
                '\n' if after_cr => {}
                c => out.push(c),
            }
        }
        out
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl HTMLTokenizer {
    /// Queue a token. Pending character data goes first.
    pub(super) fn emit(&mut self, token: Token) {
        self.flush_text();
        self.ready.push_back(token);
    }

    /// Queue pending character data as one text token.
    pub(super) fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = mem::take(&mut self.text);
            self.ready.push_back(Token::Text(text));
        }
    }

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Emit the current tag token."
    ///
    /// Start tags also pick the mode for the content that follows:
    /// - `pre`/`listing` drop a leading line break
    /// - `plaintext` turns the rest of the input into text
    /// - raw text elements only look for their own end tag
    pub(super) fn emit_current_tag(&mut self) {
        self.switch_to(TokenizerState::Data);
        let Some(builder) = self.current_tag.take() else {
            return;
        };
        let token = builder.into_token(&mut self.interner);

        if let Token::StartTag {
            tag,
            name,
            self_closing,
            ..
        } = &token
        {
            match *tag {
                TagId::PRE | TagId::LISTING => self.discard_lf = true,
                TagId::PLAINTEXT => self.switch_to(TokenizerState::PlainText),
                raw if is_raw_text_element(raw) && !*self_closing => {
                    // A reconsumed '<' still belongs to the content.
                    let pos = if self.reconsume {
                        self.current_pos - 1
                    } else {
                        self.current_pos
                    };
                    self.mark = Some(InputMark {
                        pos,
                        line: self.line,
                    });
                    self.raw_tag = raw;
                    self.raw_name.clone_from(name);
                    self.raw.clear();
                    self.raw_escaped = false;
                    self.discard_lf = raw == TagId::TEXTAREA;
                    if raw == TagId::SCRIPT {
                        self.script_line = self.line;
                    }
                    self.switch_to(TokenizerState::RawText);
                }
                _ => {}
            }
        }
        self.emit(token);
    }

    /// A `<` inside a tag ends the tag; the `<` starts the next one.
    pub(super) fn emit_tag_before_less_than(&mut self) {
        log::trace!("tag closed by '<' at line {}", self.line);
        self.reconsume = true;
        self.emit_current_tag();
    }

    /// End of input inside a tag: the tag is dropped.
    pub(super) fn drop_unterminated_tag(&mut self) {
        if let Some(tag) = self.current_tag.take() {
            log::debug!("unterminated tag dropped at end of input: {tag:?}");
        }
        self.reconsume_in(TokenizerState::Data);
    }

    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    ///
    /// "Switch to the data state. Emit the current comment token."
    pub(super) fn emit_comment(&mut self) {
        self.mark = None;
        let data = mem::take(&mut self.comment);
        self.switch_to(TokenizerState::Data);
        self.emit(Token::Comment(data));
    }

    /// Report suspicious markup through the warning channel.
    pub(super) fn warn(&self, message: &str) {
        log::debug!("line {}: {message}", self.line);
        if self.report_warnings {
            warn_once("HTML Tokenizer", message);
        }
    }
}

// =============================================================================
// Raw Text Helpers
// =============================================================================

impl HTMLTokenizer {
    /// Whether the raw buffer ends with `</` and the name of the element
    /// that opened the region, in any case.
    pub(super) fn raw_ends_with_end_tag(&self) -> bool {
        let needed = self.raw_name.len() + 2;
        let len = self.raw.len();
        if len < needed || !self.raw.is_char_boundary(len - needed) {
            return false;
        }
        let tail = &self.raw[len - needed..];
        tail.starts_with("</") && tail[2..].eq_ignore_ascii_case(&self.raw_name)
    }

    /// Emit the raw region's content. `textarea` and `title` content has its
    /// entities decoded.
    pub(super) fn flush_raw_text(&mut self) {
        let content = mem::take(&mut self.raw);
        let content = if matches!(self.raw_tag, TagId::TEXTAREA | TagId::TITLE) {
            decode_entities(&content)
        } else {
            content
        };
        if !content.is_empty() {
            self.emit(Token::Text(content));
        }
    }

    /// Close the raw region with its end tag.
    pub(super) fn emit_raw_end_tag(&mut self) {
        self.switch_to(TokenizerState::Data);
        self.raw_escaped = false;
        let token = Token::EndTag {
            tag: self.raw_tag,
            name: self.raw_name.clone(),
        };
        self.emit(token);
    }
}

/// Elements whose content is not parsed as markup.
#[must_use]
pub const fn is_raw_text_element(tag: TagId) -> bool {
    matches!(
        tag,
        TagId::SCRIPT
            | TagId::STYLE
            | TagId::TEXTAREA
            | TagId::TITLE
            | TagId::XMP
            | TagId::IFRAME
            | TagId::NOEMBED
            | TagId::NOFRAMES
    )
}
