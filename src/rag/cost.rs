//! Token-usage cost accounting.
//!
//! Rates are configuration data loaded from the settings rate table, not
//! hardcoded logic.

use super::UsageStats;
use crate::config::{CostSettings, ModelRate};
use crate::error::{Result, SvarError};
use std::collections::HashMap;

/// Per-model USD rate table.
#[derive(Debug, Clone)]
pub struct CostTable {
    rates: HashMap<String, ModelRate>,
}

impl CostTable {
    /// Build a cost table from config.
    pub fn new(settings: &CostSettings) -> Self {
        Self {
            rates: settings.rates.clone(),
        }
    }

    /// Estimate the USD cost of one call.
    ///
    /// Linear in both token counts. An unknown model id is a configuration
    /// error, never a silent zero: unpriced calls would corrupt the
    /// accounting downstream.
    pub fn estimate_cost_usd(&self, usage: &UsageStats, model_id: &str) -> Result<f64> {
        let rate = self.rates.get(model_id).ok_or_else(|| {
            SvarError::Config(format!("No cost rate configured for model: {}", model_id))
        })?;

        Ok((usage.prompt_tokens as f64 * rate.prompt_per_1k
            + usage.completion_tokens as f64 * rate.completion_per_1k)
            / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CostTable {
        let mut rates = HashMap::new();
        rates.insert(
            "gpt-4o".to_string(),
            ModelRate {
                prompt_per_1k: 0.005,
                completion_per_1k: 0.015,
            },
        );
        CostTable { rates }
    }

    #[test]
    fn test_linear_estimate() {
        let cost = table()
            .estimate_cost_usd(&UsageStats::new(1000, 1000), "gpt-4o")
            .unwrap();
        assert!((cost - 0.020).abs() < 1e-12);
    }

    #[test]
    fn test_zero_usage_is_free() {
        let cost = table().estimate_cost_usd(&UsageStats::zero(), "gpt-4o").unwrap();
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn test_monotonic_in_both_counts() {
        let t = table();
        let base = t.estimate_cost_usd(&UsageStats::new(100, 100), "gpt-4o").unwrap();
        let more_prompt = t.estimate_cost_usd(&UsageStats::new(200, 100), "gpt-4o").unwrap();
        let more_completion = t.estimate_cost_usd(&UsageStats::new(100, 200), "gpt-4o").unwrap();

        assert!(more_prompt > base);
        assert!(more_completion > base);
    }

    #[test]
    fn test_unknown_model_is_config_error() {
        let err = table()
            .estimate_cost_usd(&UsageStats::new(10, 10), "gpt-99")
            .unwrap_err();
        assert!(matches!(err, SvarError::Config(_)));
    }
}
