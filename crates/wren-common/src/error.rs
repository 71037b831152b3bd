//! Error type for host-facing setup code.
//!
//! Parsing itself never fails: malformed markup is repaired and reported as
//! parse issues. The only fallible operations are the ones that touch the
//! outside world, like reading a configuration file.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while preparing a parse (not while parsing).
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration or input file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file was not valid JSON for the expected shape.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;
