//! Error-tolerant HTML ingestion for Wren.
//!
//! # Scope
//!
//! This crate implements:
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Incremental input with `document.write` insertion
//!   - Raw text elements, comments with legacy recovery, doctypes
//!   - Legacy character reference probing
//!
//! - **Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - Content-model driven insertion with implied elements
//!   - Priority based closing and residual style repair
//!   - Content moved out of malformed tables
//!   - Doctype based parse mode selection
//!
//! - **Preload Scanner** ([WHATWG § 13.2.1](https://html.spec.whatwg.org/multipage/parsing.html#speculative-html-parsing))
//!
//! - **Incremental Driver**: [`DocumentParser`] yields after a bounded
//!   amount of work and suspends on external scripts.
//!
//! # Example
//!
//! ```
//! let doc = wren_html::parse_document("<ul><li>a<li>b</ul>");
//! let body = doc.body().unwrap();
//! assert_eq!(doc.text_content(body), "ab");
//! ```

/// Parser configuration.
pub mod config;
/// Incremental document parser.
pub mod driver;
/// Resource loader boundary.
pub mod loader;
/// HTML parser and tree construction.
pub mod parser;
/// Speculative preload scanner.
pub mod preload;
/// Serializable document snapshots.
pub mod snapshot;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use config::ParserConfig;
pub use driver::{
    DocumentParser, DocumentWriter, NoScripts, Progress, ScriptRunner, SuspendReason,
    parse_document, parse_document_with, run_to_completion,
};
pub use loader::{RecordingLoader, ResourceHandle, ResourceKind, ResourceLoader, ResourceRequest};
pub use parser::{HTMLParser, ParseIssue, print_tree, select_parse_mode, tree_to_string};
pub use preload::{PreloadRequest, PreloadScanner};
pub use snapshot::NodeSnapshot;
pub use tokenizer::{HTMLTokenizer, Token};
