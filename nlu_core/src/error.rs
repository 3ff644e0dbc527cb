//! Error types for the NLU core

use thiserror::Error;

/// Result type alias for NLU operations.
pub type Result<T> = std::result::Result<T, NluError>;

/// Errors that can occur while loading rules or accepting input.
///
/// A low-confidence classification is not an error: it is reported as an
/// `unclear` query descriptor.
#[derive(Error, Debug)]
pub enum NluError {
    /// Input text was missing or not a string.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The rule table is structurally invalid.
    #[error("invalid rule table: {0}")]
    InvalidRuleTable(String),

    /// A rule pattern failed to compile.
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
