//! Bug tracker access: the [`traits::BugTracker`] seam, a Bugzilla XML-RPC
//! client and the per-run cache the classifier queries through.
pub mod cache;
pub mod client;
pub mod traits;
pub mod types;
pub mod xmlrpc;
