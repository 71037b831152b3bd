//! Engine warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the tokenizer, the tree builder and the preload scanner to report
//! markup that had to be repaired or ignored.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about suspicious or unsupported markup (prints once per unique message)
///
/// Every call is also forwarded to the `log` facade at `warn` level, so hosts
/// that install a logger see the message even after deduplication kicks in.
///
/// # Example
/// ```ignore
/// warn_once("HTML", "malformed doctype ignored");
/// ```
pub fn warn_once(component: &str, message: &str) {
    log::warn!(target: "wren", "[{component}] {message}");

    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        eprintln!("{}", format!("[Wren {component}] ⚠ {message}").yellow());
    }
}

/// Whether `warn_once` has already printed this exact message.
#[must_use]
pub fn was_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.contains(&key))
}

/// Clear all recorded warnings (call when loading a new document)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
