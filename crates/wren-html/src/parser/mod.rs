//! Tree construction.
//!
//! Implements [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//! the way legacy engines did it: a single content-model driven insertion
//! routine with error recovery instead of insertion modes.

/// Parser state, token dispatch and end tags.
mod core;
/// Compatibility mode selection from the doctype.
pub mod doctype;
/// Node insertion and error recovery.
mod insertion;
/// Tree dumps for debugging and tests.
mod print;
/// The stack of open elements and residual style handling.
mod stack;

pub use self::core::{CompletedScript, HTMLParser, ParseIssue, StackElem};
pub use doctype::select_parse_mode;
pub use print::{print_tree, subtree_to_string, tree_to_string};
