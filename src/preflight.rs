//! Checks that run before anything is written.
pub mod jenkins;
pub mod zanata;
