//! Configuration settings for Svar.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub index: IndexSettings,
    pub embedding: EmbeddingSettings,
    pub llm: LlmSettings,
    pub costs: CostSettings,
    pub store: StoreSettings,
    pub prompts: PromptSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.svar".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Search index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Index provider (elastic, memory).
    pub provider: String,
    /// Base URL of the search index.
    pub url: String,
    /// Name of the index holding transcript segments.
    pub index_name: String,
    /// Default number of snippets to retrieve per question.
    pub limit: usize,
    /// Candidate pool size for approximate nearest-neighbor retrieval.
    /// Kept large relative to `limit` to preserve recall.
    pub num_candidates: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            provider: "elastic".to_string(),
            url: "http://localhost:9200".to_string(),
            index_name: "video-transcripts".to_string(),
            limit: 5,
            num_candidates: 10_000,
        }
    }
}

/// Embedding generation settings.
///
/// `dimensions` must match the vector space the index was built with,
/// or nearest-neighbor retrieval silently degrades into noise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai).
    pub provider: String,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 384,
        }
    }
}

/// Language model settings for generation and evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Model used to generate answers.
    pub model: String,
    /// Model used to score answer relevance. Defaults to the same model.
    pub evaluation_model: String,
    /// Cap on generated output length.
    pub max_tokens: u32,
    /// Sampling temperature. Part of the reproducibility contract:
    /// changing it changes what the evaluator sees.
    pub temperature: f32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            evaluation_model: "gpt-4o-mini".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

/// Per-1000-token USD rate for a model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ModelRate {
    pub prompt_per_1k: f64,
    pub completion_per_1k: f64,
}

/// Cost accounting settings: a rate table keyed by model id.
///
/// Rates are configuration data, not logic. An unknown model id is a
/// configuration error at estimation time, never a silent zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CostSettings {
    pub rates: HashMap<String, ModelRate>,
}

impl Default for CostSettings {
    fn default() -> Self {
        let mut rates = HashMap::new();
        rates.insert(
            "gpt-4o-mini".to_string(),
            ModelRate {
                prompt_per_1k: 0.00015,
                completion_per_1k: 0.0006,
            },
        );
        rates.insert(
            "gpt-4o".to_string(),
            ModelRate {
                prompt_per_1k: 0.005,
                completion_per_1k: 0.015,
            },
        );
        Self { rates }
    }
}

/// Conversation store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Store provider (sqlite).
    pub provider: String,
    /// Path to the SQLite database.
    pub sqlite_path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            sqlite_path: "~/.svar/conversations.db".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory with custom prompt TOML files.
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SvarError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("svar")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.store.sqlite_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.index.limit, 5);
        assert_eq!(settings.index.num_candidates, 10_000);
        assert_eq!(settings.embedding.dimensions, 384);
        assert_eq!(settings.llm.max_tokens, 1024);
        assert!(settings.costs.rates.contains_key("gpt-4o-mini"));
    }

    #[test]
    fn test_roundtrip_toml() {
        let settings = Settings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.index.index_name, settings.index.index_name);
        assert_eq!(
            parsed.costs.rates.get("gpt-4o"),
            settings.costs.rates.get("gpt-4o")
        );
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [llm]
            model = "gpt-4o"
            "#,
        )
        .unwrap();
        assert_eq!(settings.llm.model, "gpt-4o");
        assert_eq!(settings.llm.max_tokens, 1024);
        assert_eq!(settings.embedding.dimensions, 384);
    }
}
