//! POS configuration loaded from YAML.
//!
//! Every key is optional; anything missing falls back to [`PosConfig::default`].

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use shared::SpendingLimits;
use std::fs;
use std::path::Path;
use tracing::info;

/// Environment variable naming the config file to load
pub const CONFIG_PATH_ENV: &str = "TUCKSHOP_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosConfig {
    pub currency_symbol: String,
    pub receipt_prefix: String,
    /// Limits given to newly registered students
    pub default_weekly_limits: SpendingLimits,
    pub max_recharge_amount: Decimal,
}

impl Default for PosConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "R".to_string(),
            receipt_prefix: "RCP".to_string(),
            default_weekly_limits: SpendingLimits::new(dec!(150), dec!(200), dec!(100)),
            max_recharge_amount: dec!(10000),
        }
    }
}

impl PosConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: PosConfig = serde_yaml::from_str(yaml).context("Invalid POS config")?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml_str(&yaml)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded POS config from {}", path.display());
        Ok(config)
    }

    /// Load from `TUCKSHOP_CONFIG` if set, otherwise use defaults
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::load(Path::new(path.trim())),
            _ => {
                info!("{} not set, using default POS config", CONFIG_PATH_ENV);
                Ok(Self::default())
            }
        }
    }
}
