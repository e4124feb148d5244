//! Error types / 错误类型
//!
//! One enum for the whole library. Store and query failures carry the
//! underlying message; pitch layout failures stay local to one record.

use thiserror::Error;

/// Main error type / 主错误类型
#[derive(Debug, Error)]
pub enum LexiconError {
    /// Snapshot fetch or store construction failed, or the store is not ready yet
    #[error("Lexicon store unavailable: {0}")]
    StoreUnavailable(String),

    /// Store-internal failure while running a search
    #[error("Query execution failed: {0}")]
    QueryExecution(String),

    #[error("Invalid pitch pattern {pattern:?} for reading {reading:?}: {reason}")]
    InvalidPitchPattern {
        pattern: String,
        reading: String,
        reason: String,
    },

    /// A row came back without a required column / 缺少必填字段
    #[error("Row {row_id:?} is missing required field `{field}`")]
    MissingField {
        field: &'static str,
        row_id: Option<i64>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LexiconError {
    /// Whether this error only concerns a single record (the rest of the list is fine)
    pub fn is_record_local(&self) -> bool {
        matches!(self, Self::InvalidPitchPattern { .. } | Self::MissingField { .. })
    }
}

pub type Result<T> = std::result::Result<T, LexiconError>;
