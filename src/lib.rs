//! Version bumping for autotools packages shipped as RPMs.
//!
//! A bump increments the package version in `configure.ac` and writes a new
//! `%changelog` block built from the commits since the previous release tag.
//! On stabilization branches every commit must reference Bugzilla bugs that
//! are ready to ship.
pub mod analyzer;
pub mod bugzilla;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod preflight;
pub mod repo;
pub mod result;
pub mod updater;
pub mod version;

pub use cli::Args;
pub use error::{BumpverError, Result};

#[cfg(test)]
pub mod test_helpers;
