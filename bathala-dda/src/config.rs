//! Tunable engine configuration and the embedded experiment presets.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::adjustment::DifficultyTable;
use crate::constants::{DEFAULT_CALIBRATION_COMBATS, SCORE_MAX, SCORE_MIN};
use crate::tier::{DifficultyTier, TierScalingTable, TierThresholds};

const DEFAULT_PRESET_DATA: &str = include_str!("../data/dda_default.json");
const AGGRESSIVE_PRESET_DATA: &str = include_str!("../data/dda_aggressive.json");
const CONSERVATIVE_PRESET_DATA: &str = include_str!("../data/dda_conservative.json");

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error)]
pub enum DdaConfigError {
    #[error(
        "tier thresholds must increase strictly (learning {learning_min:.2}, thriving {thriving_min:.2}, mastering {mastering_min:.2})"
    )]
    ThresholdOrder {
        learning_min: f64,
        thriving_min: f64,
        mastering_min: f64,
    },
    #[error("{field} must be within {min:.2}..={max:.2} (got {value:.2})")]
    ThresholdRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{tier} {field} scaling must be finite and non-negative (got {value:.2})")]
    NegativeScale {
        tier: DifficultyTier,
        field: &'static str,
        value: f64,
    },
    #[error("{table} multiplier for {tier} must be finite and positive (got {value:.2})")]
    NonPositiveMultiplier {
        table: &'static str,
        tier: DifficultyTier,
        value: f64,
    },
    #[error("rest node bias for {tier} must be within 0..=1 (got {value:.2})")]
    BiasRange { tier: DifficultyTier, value: f64 },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Named configurations for A/B experiments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DdaPreset {
    #[default]
    Default,
    /// No calibration window and less help for struggling players.
    Aggressive,
    /// Longer calibration window and gentler scaling.
    Conservative,
}

impl DdaPreset {
    pub const ALL: [Self; 3] = [Self::Default, Self::Aggressive, Self::Conservative];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Aggressive => "aggressive",
            Self::Conservative => "conservative",
        }
    }

    const fn data(self) -> &'static str {
        match self {
            Self::Default => DEFAULT_PRESET_DATA,
            Self::Aggressive => AGGRESSIVE_PRESET_DATA,
            Self::Conservative => CONSERVATIVE_PRESET_DATA,
        }
    }
}

impl fmt::Display for DdaPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DdaPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown preset '{s}'"))
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DdaConfig {
    /// Combats before tier changes unlock; `0` disables calibration.
    #[serde(default = "DdaConfig::default_calibration_combats")]
    pub calibration_combats: u32,
    #[serde(default)]
    pub thresholds: TierThresholds,
    #[serde(default)]
    pub scaling: TierScalingTable,
    #[serde(default)]
    pub difficulty: DifficultyTable,
}

impl DdaConfig {
    const fn default_calibration_combats() -> u32 {
        DEFAULT_CALIBRATION_COMBATS
    }

    /// Parse a JSON configuration. Missing sections take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(data: &str) -> Result<Self, DdaConfigError> {
        Ok(serde_json::from_str(data)?)
    }

    /// Load an embedded preset, falling back to compiled defaults.
    #[must_use]
    pub fn preset(preset: DdaPreset) -> Self {
        Self::from_json(preset.data()).unwrap_or_else(|err| {
            log::warn!("embedded {preset} preset failed to parse ({err}); using compiled defaults");
            Self::compiled_default()
        })
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::preset(DdaPreset::Default)
    }

    fn compiled_default() -> Self {
        Self {
            calibration_combats: Self::default_calibration_combats(),
            thresholds: TierThresholds::default(),
            scaling: TierScalingTable::default(),
            difficulty: DifficultyTable::default(),
        }
    }

    /// Check the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), DdaConfigError> {
        self.validate_thresholds()?;
        self.validate_scaling()?;
        self.validate_difficulty()
    }

    fn validate_thresholds(&self) -> Result<(), DdaConfigError> {
        let TierThresholds {
            learning_min,
            thriving_min,
            mastering_min,
        } = self.thresholds;
        for (field, value) in [
            ("learning_min", learning_min),
            ("thriving_min", thriving_min),
            ("mastering_min", mastering_min),
        ] {
            if !(value.is_finite() && value > SCORE_MIN && value <= SCORE_MAX) {
                return Err(DdaConfigError::ThresholdRange {
                    field,
                    min: SCORE_MIN,
                    max: SCORE_MAX,
                    value,
                });
            }
        }
        if !(learning_min < thriving_min && thriving_min < mastering_min) {
            return Err(DdaConfigError::ThresholdOrder {
                learning_min,
                thriving_min,
                mastering_min,
            });
        }
        Ok(())
    }

    fn validate_scaling(&self) -> Result<(), DdaConfigError> {
        for (tier, scale) in self.scaling.entries() {
            for (field, value) in [("bonus", scale.bonus), ("penalty", scale.penalty)] {
                if !(value.is_finite() && value >= 0.0) {
                    return Err(DdaConfigError::NegativeScale { tier, field, value });
                }
            }
        }
        Ok(())
    }

    fn validate_difficulty(&self) -> Result<(), DdaConfigError> {
        for (table, values) in self.difficulty.multiplier_tables() {
            for (tier, value) in DifficultyTier::ALL.into_iter().zip(values.values()) {
                if !(value.is_finite() && value > 0.0) {
                    return Err(DdaConfigError::NonPositiveMultiplier { table, tier, value });
                }
            }
        }
        let bias = self.difficulty.rest_node_bias.values();
        for (tier, value) in DifficultyTier::ALL.into_iter().zip(bias) {
            if !(0.0..=1.0).contains(&value) {
                return Err(DdaConfigError::BiasRange { tier, value });
            }
        }
        Ok(())
    }
}

impl Default for DdaConfig {
    fn default() -> Self {
        Self::load_from_static()
    }
}
