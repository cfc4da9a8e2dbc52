//! Error types for Svar.

use thiserror::Error;

/// Library-level error type for Svar operations.
#[derive(Error, Debug)]
pub enum SvarError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Search index error: {0}")]
    Search(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Completion request failed: {0}")]
    Completion(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SvarError {
    /// Whether this error came from talking to an external service and may
    /// succeed on retry. Configuration and integrity errors never do.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SvarError::Http(_)
                | SvarError::Search(_)
                | SvarError::Embedding(_)
                | SvarError::Completion(_)
                | SvarError::OpenAI(_)
        )
    }
}

/// Result type alias for Svar operations.
pub type Result<T> = std::result::Result<T, SvarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(SvarError::OpenAI("timeout".into()).is_transient());
        assert!(SvarError::Search("connection refused".into()).is_transient());
        assert!(!SvarError::Config("unknown model".into()).is_transient());
        assert!(!SvarError::Integrity("missing conversation".into()).is_transient());
    }
}
