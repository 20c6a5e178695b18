use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::interpretation::trend::DEFAULT_SIGNIFICANCE_THRESHOLD_PERCENT;
use crate::interpretation::LabError;

/// Application-level constants
pub const APP_NAME: &str = "LabInsight";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const CONFIG_FILE: &str = "config.json";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "labinsight_lib=debug,labinsight=debug,warn"
    } else {
        "labinsight_lib=info,labinsight=info,warn"
    }
}

/// Get the application data directory (~/.labinsight/).
/// `None` when the home directory cannot be determined.
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".labinsight"))
}

/// Get the default engine config path
pub fn default_config_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Tunables for the interpretation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Consecutive-pair percent change that counts as significant.
    pub significance_threshold_percent: f64,
    /// Load catalogs from here instead of the bundled copies.
    pub catalog_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            significance_threshold_percent: DEFAULT_SIGNIFICANCE_THRESHOLD_PERCENT,
            catalog_dir: None,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, LabError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| LabError::ConfigLoad(path.display().to_string(), e.to_string()))?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| LabError::ConfigLoad(path.display().to_string(), e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`EngineConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, LabError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "No engine config found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), LabError> {
        let t = self.significance_threshold_percent;
        if !t.is_finite() || t <= 0.0 {
            return Err(LabError::InvalidThreshold(t));
        }
        Ok(())
    }
}
