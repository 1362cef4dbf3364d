//! Calibration gate: pins the reported tier while the engine is still
//! learning the player.
use serde::{Deserialize, Serialize};

use crate::breakdown::BreakdownLine;
use crate::tier::DifficultyTier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationPhase {
    Calibrating,
    Active,
}

/// Two-state gate keyed on the number of completed combats.
///
/// The score keeps moving during calibration; only the tier label is held at
/// [`DifficultyTier::Learning`]. When the last calibration combat finishes the
/// player's true position is already known, so unlocking never jumps the
/// score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationGate {
    combats_required: u32,
}

impl CalibrationGate {
    #[must_use]
    pub const fn new(combats_required: u32) -> Self {
        Self { combats_required }
    }

    #[must_use]
    pub const fn combats_required(&self) -> u32 {
        self.combats_required
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.combats_required > 0
    }

    #[must_use]
    pub const fn phase(&self, combats_completed: u32) -> CalibrationPhase {
        if combats_completed < self.combats_required {
            CalibrationPhase::Calibrating
        } else {
            CalibrationPhase::Active
        }
    }

    #[must_use]
    pub const fn is_calibrating(&self, combats_completed: u32) -> bool {
        matches!(self.phase(combats_completed), CalibrationPhase::Calibrating)
    }

    /// Tier to report for a combat processed in `phase`.
    #[must_use]
    pub const fn gate(&self, phase: CalibrationPhase, classified: DifficultyTier) -> DifficultyTier {
        match phase {
            CalibrationPhase::Calibrating => DifficultyTier::Learning,
            CalibrationPhase::Active => classified,
        }
    }

    /// Notice shown while the combat numbered `combat_number` is processed
    /// inside the calibration window.
    #[must_use]
    pub fn progress_notice(&self, combat_number: u32) -> BreakdownLine {
        BreakdownLine::calibration(
            "Calibration Phase",
            format!(
                "Combat {combat_number}/{} - score tracked but tier locked to learning",
                self.combats_required
            ),
        )
    }

    #[must_use]
    pub fn completion_notice(&self) -> BreakdownLine {
        BreakdownLine::calibration(
            "Calibration Complete",
            "Difficulty adjustment is now fully active; tier changes enabled",
        )
    }
}

impl Default for CalibrationGate {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_CALIBRATION_COMBATS)
    }
}
