//! Pre-flight checks before paid operations.
//!
//! Validates that required configuration is present before starting
//! operations that would otherwise fail midway through a model call.

use crate::error::{Result, SvarError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Answering a question requires an API key for embeddings and completions.
    Answer,
    /// Reading analytics requires only the local database.
    Analytics,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Answer => {
            check_api_key()?;
        }
        Operation::Analytics => {
            // No external requirements
        }
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(SvarError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(SvarError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_analytics_no_requirements() {
        // Analytics should always pass pre-flight (no external requirements)
        assert!(check(Operation::Analytics).is_ok());
    }
}
