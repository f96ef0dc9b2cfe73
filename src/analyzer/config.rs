use serde::{Deserialize, Serialize};

use crate::analyzer::entity::DEFAULT_STOPWORDS;
use crate::utils::math::EigenConfig;

/// Analyzer settings.
///
/// Every field has a default, so a partial JSON document such as
/// `{"eigen": {"max_sweeps": 100}}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Lowercase-compared words never reported as entities.
    /// Replaces the default list when given.
    pub stopwords: Vec<String>,
    pub eigen: EigenConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            stopwords: DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect(),
            eigen: EigenConfig::default(),
        }
    }
}
