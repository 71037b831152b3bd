//! Parser configuration.
//!
//! Every field has a default, so a configuration file only needs to name the
//! settings it changes:
//!
//! ```json
//! { "chunk_size": 1024, "base_url": "https://example.com/" }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use wren_common::{Error, Result};

/// Settings shared by the tokenizer, the tree builder and the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Whether scripts run. When enabled, `<noscript>` content is skipped.
    pub scripting_enabled: bool,

    /// Characters one `feed` or `resume` call tokenizes before it yields.
    /// Zero disables yielding.
    pub chunk_size: usize,

    /// Delay the host should wait before resuming after a yield, in
    /// milliseconds.
    pub yield_delay_ms: u64,

    /// Shorter delay suggested after the first yield.
    pub fast_yield_delay_ms: u64,

    /// Run the preload scanner over input queued behind a pending script.
    pub preload_scanning: bool,

    /// Forward parse issues to the terminal warning channel.
    pub report_warnings: bool,

    /// Base for resolving script and preload URLs.
    pub base_url: Option<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            scripting_enabled: true,
            chunk_size: 4096,
            yield_delay_ms: 450,
            fast_yield_delay_ms: 180,
            preload_scanning: true,
            report_warnings: true,
            base_url: None,
        }
    }
}

impl ParserConfig {
    /// Parse a JSON configuration.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the text is not a valid configuration object.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a JSON configuration file.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the file cannot be read, [`Error::Config`] if it is
    /// not a valid configuration object.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Resolve a URL found in the document against [`Self::base_url`].
    #[must_use]
    pub fn resolve(&self, href: &str) -> String {
        wren_common::url::resolve_url(href, self.base_url.as_deref())
    }
}
