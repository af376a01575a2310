//! In-memory rewrites of the files a bump touches.
pub mod changelog;
pub mod configure;
