//! HTML tokenizer module.
//!
//! Implements [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//! with the legacy rules browsers apply to raw text, comments, doctypes and
//! character references.

/// Character reference matching.
pub mod character_reference;
/// Helper methods for tokenizer state transitions.
pub mod helpers;
/// Named character reference lookup table.
pub mod named_character_references;
/// Token types produced by the tokenizer.
pub mod token;
/// HTML tokenizer state machine implementation.
pub mod core;

pub use self::core::{HTMLTokenizer, TokenizerState};
pub use token::{DoctypeToken, Token};
