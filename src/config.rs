use crate::error::{PredictionError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Runtime knobs of a prediction engine, in token base units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub stake_amount: u128,
    pub multiplier: u128,
    pub max_predictions_per_event: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stake_amount: 100 * 10u128.pow(18), // 100 tokens at 18 decimals
            multiplier: 10,
            max_predictions_per_event: 10,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.stake_amount == 0 {
            return Err(PredictionError::InvalidAmount { field: "stake amount" });
        }
        if self.multiplier == 0 {
            return Err(PredictionError::InvalidAmount { field: "multiplier" });
        }
        if self.max_predictions_per_event == 0 {
            return Err(PredictionError::InvalidAmount {
                field: "max predictions per event",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Whole tokens staked per prediction.
    pub stake_tokens: u64,
    pub multiplier: u64,
    pub max_predictions: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            stake_tokens: 100,
            multiplier: 10,
            max_predictions: 10,
        }
    }
}

/// Deployment settings: serde defaults, then `config/sport-prediction.*`,
/// then `SPORT_PREDICTION_*` environment variables (nested keys use `__`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub owner: String,
    pub admin: String,
    pub token_symbol: String,
    pub token_decimals: u32,
    pub owner_supply_tokens: u64,
    pub treasury_funding_tokens: u64,
    pub log_level: String,
    pub engine: EngineSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            owner: "0xdeployer".to_string(),
            admin: "0xdeployer".to_string(),
            token_symbol: "PRED".to_string(),
            token_decimals: 18,
            owner_supply_tokens: 1_000_000,
            treasury_funding_tokens: 10_000,
            log_level: "info".to_string(),
            engine: EngineSettings::default(),
        }
    }
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name("config/sport-prediction").required(false))
            .add_source(
                ::config::Environment::with_prefix("SPORT_PREDICTION")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read sport prediction settings")?
            .try_deserialize::<Settings>()
            .context("Failed to parse sport prediction settings")?;

        Ok(settings)
    }

    /// `tokens * 10^decimals` without overflow.
    pub fn base_units(&self, tokens: u64) -> anyhow::Result<u128> {
        10u128
            .checked_pow(self.token_decimals)
            .and_then(|scale| u128::from(tokens).checked_mul(scale))
            .with_context(|| format!("{} tokens overflow at {} decimals", tokens, self.token_decimals))
    }

    pub fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let config = EngineConfig {
            stake_amount: self.base_units(self.engine.stake_tokens)?,
            multiplier: u128::from(self.engine.multiplier),
            max_predictions_per_event: self.engine.max_predictions,
        };
        config.validate().context("Invalid engine settings")?;
        Ok(config)
    }
}
