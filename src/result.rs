//! Result type used at the application boundary.
//!
//! Library modules return [`crate::error::Result`] with the typed
//! [`crate::error::BumpverError`]. The binary and the command layer wrap
//! those into `color-eyre` reports so a failed run prints the error chain
//! with context before exiting with status 1.
//!
//! ```rust,ignore
//! use color_eyre::eyre::Context;
//! use crate::result::Result;
//!
//! fn load_manifest(path: &Path) -> Result<String> {
//!     let content = std::fs::read_to_string(path)
//!         .wrap_err("failed to read packaging manifest")?;
//!     Ok(content)
//! }
//! ```

use color_eyre::eyre::Result as EyreResult;

/// Standard result type for command-level code.
pub type Result<T> = EyreResult<T>;
