//! Custom error types for bumpver.

use thiserror::Error;

/// Main error type for bumpver operations.
#[derive(Error, Debug)]
pub enum BumpverError {
    // Cli args errors
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    // Source tree errors
    #[error("Cannot find {0}")]
    MissingSourceFile(String),

    #[error("Unable to find line \"{anchor}\" in {file}")]
    MissingAnchor { file: String, anchor: String },

    #[error("Invalid version format: {0}")]
    InvalidVersion(String),

    // Pre-flight errors
    #[error(
        "zanata project-version does not match current branch: found {found:?}, expected \"{expected}\""
    )]
    ZanataMismatch {
        found: Option<String>,
        expected: String,
    },

    // Validation errors
    #[error("{0} commit(s) failed bug validation")]
    InvalidCommits(usize),

    // Bug tracker errors
    #[error("Bug tracker authentication failed: {0}")]
    AuthenticationError(String),

    #[error("XML-RPC fault {code}: {message}")]
    Fault { code: i64, message: String },

    #[error("Malformed XML-RPC response: {0}")]
    XmlRpcError(String),

    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Git operation failed: {0}")]
    GitError(#[from] git2::Error),

    #[error("XML parse error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64DecodeError(#[from] base64::DecodeError),

    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias using BumpverError
pub type Result<T> = std::result::Result<T, BumpverError>;

impl BumpverError {
    /// Create an invalid args error
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArgs(msg.into())
    }

    /// Create a missing anchor error
    pub fn missing_anchor(
        file: impl Into<String>,
        anchor: impl Into<String>,
    ) -> Self {
        Self::MissingAnchor {
            file: file.into(),
            anchor: anchor.into(),
        }
    }

    /// Create a malformed response error
    pub fn xmlrpc(msg: impl Into<String>) -> Self {
        Self::XmlRpcError(msg.into())
    }
}
