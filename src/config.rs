use crate::model::weight::DEFAULT_PRECISION;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings for one replay. Every field has a default, so a config file only
/// needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReplayConfig {
    pub data_format: String,
    /// Decimal places transfer weights are truncated to before matching.
    pub weight_precision: u32,
    pub overlap_threshold: f64,
    pub checksum_tolerance: f64,
    /// Length of the prior-candidate vectors. Defaults to the number of
    /// candidates declared in the report.
    pub candidate_capacity: Option<usize>,
    /// Print progress while replaying.
    pub progress: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        ReplayConfig {
            data_format: "is_stv".to_string(),
            weight_precision: DEFAULT_PRECISION,
            overlap_threshold: 0.0,
            checksum_tolerance: 1e-6,
            candidate_capacity: None,
            progress: true,
        }
    }
}

impl ReplayConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
