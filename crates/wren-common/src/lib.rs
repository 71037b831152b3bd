//! Common utilities for the Wren HTML engine.
//!
//! This crate provides shared infrastructure used by all engine components:
//! - **Warning System** - de-duplicated, colored terminal output for suspicious markup
//! - **URL helpers** - cleaning attribute values and resolving them against a base
//! - **Errors** - the error type for host-facing setup (configuration loading)

pub mod error;
pub mod url;
pub mod warning;

pub use error::{Error, Result};
