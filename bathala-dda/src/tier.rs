//! Difficulty tiers, the score classifier, and per-tier scaling tables.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    EXPECTED_DAMAGE, EXPECTED_TURNS, LEARNING_MIN_SCORE, MASTERING_MIN_SCORE, SCORE_MAX,
    SCORE_MIN, THRIVING_MIN_SCORE,
};
use crate::numbers::{clamp_finite, u32_to_f64};

/// Ordered difficulty bands, lowest challenge first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Struggling,
    #[default]
    Learning,
    Thriving,
    Mastering,
}

impl DifficultyTier {
    pub const ALL: [Self; 4] = [
        Self::Struggling,
        Self::Learning,
        Self::Thriving,
        Self::Mastering,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Struggling => 0,
            Self::Learning => 1,
            Self::Thriving => 2,
            Self::Mastering => 3,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Struggling => "struggling",
            Self::Learning => "learning",
            Self::Thriving => "thriving",
            Self::Mastering => "mastering",
        }
    }

    /// Turns a player in this tier is expected to need per combat.
    #[must_use]
    pub const fn expected_turns(self) -> u32 {
        EXPECTED_TURNS[self.index()]
    }

    /// Total damage a player in this tier is expected to deal per combat.
    #[must_use]
    pub const fn expected_damage(self) -> f64 {
        EXPECTED_DAMAGE[self.index()]
    }

    #[must_use]
    pub fn expected_damage_per_turn(self) -> f64 {
        self.expected_damage() / u32_to_f64(self.expected_turns())
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower score edges for the three upper tiers.
///
/// Bins are half-open: a score equal to an edge belongs to the higher tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    #[serde(default = "TierThresholds::default_learning_min")]
    pub learning_min: f64,
    #[serde(default = "TierThresholds::default_thriving_min")]
    pub thriving_min: f64,
    #[serde(default = "TierThresholds::default_mastering_min")]
    pub mastering_min: f64,
}

impl TierThresholds {
    const fn default_learning_min() -> f64 {
        LEARNING_MIN_SCORE
    }

    const fn default_thriving_min() -> f64 {
        THRIVING_MIN_SCORE
    }

    const fn default_mastering_min() -> f64 {
        MASTERING_MIN_SCORE
    }

    /// Map a score to its tier. The score is clamped first.
    #[must_use]
    pub fn classify(&self, score: f64) -> DifficultyTier {
        let score = clamp_finite(score, SCORE_MIN, SCORE_MAX);
        if score >= self.mastering_min {
            DifficultyTier::Mastering
        } else if score >= self.thriving_min {
            DifficultyTier::Thriving
        } else if score >= self.learning_min {
            DifficultyTier::Learning
        } else {
            DifficultyTier::Struggling
        }
    }
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            learning_min: Self::default_learning_min(),
            thriving_min: Self::default_thriving_min(),
            mastering_min: Self::default_mastering_min(),
        }
    }
}

/// Multipliers applied to factor contributions before summing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierScaling {
    pub bonus: f64,
    pub penalty: f64,
}

impl TierScaling {
    #[must_use]
    pub const fn new(bonus: f64, penalty: f64) -> Self {
        Self { bonus, penalty }
    }

    /// Scale a signed contribution: bonuses by `bonus`, penalties by `penalty`.
    #[must_use]
    pub fn apply(&self, contribution: f64) -> f64 {
        if contribution > 0.0 {
            contribution * self.bonus
        } else if contribution < 0.0 {
            contribution * self.penalty
        } else {
            0.0
        }
    }
}

/// Scaling for every tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierScalingTable {
    #[serde(default = "TierScalingTable::default_struggling")]
    pub struggling: TierScaling,
    #[serde(default = "TierScalingTable::default_learning")]
    pub learning: TierScaling,
    #[serde(default = "TierScalingTable::default_thriving")]
    pub thriving: TierScaling,
    #[serde(default = "TierScalingTable::default_mastering")]
    pub mastering: TierScaling,
}

impl TierScalingTable {
    const fn default_struggling() -> TierScaling {
        TierScaling::new(1.5, 0.5)
    }

    const fn default_learning() -> TierScaling {
        TierScaling::new(1.0, 1.0)
    }

    const fn default_thriving() -> TierScaling {
        TierScaling::new(0.8, 1.2)
    }

    const fn default_mastering() -> TierScaling {
        TierScaling::new(0.5, 1.5)
    }

    #[must_use]
    pub const fn for_tier(&self, tier: DifficultyTier) -> TierScaling {
        match tier {
            DifficultyTier::Struggling => self.struggling,
            DifficultyTier::Learning => self.learning,
            DifficultyTier::Thriving => self.thriving,
            DifficultyTier::Mastering => self.mastering,
        }
    }

    pub(crate) fn entries(&self) -> [(DifficultyTier, TierScaling); 4] {
        DifficultyTier::ALL.map(|tier| (tier, self.for_tier(tier)))
    }
}

impl Default for TierScalingTable {
    fn default() -> Self {
        Self {
            struggling: Self::default_struggling(),
            learning: Self::default_learning(),
            thriving: Self::default_thriving(),
            mastering: Self::default_mastering(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_ordered_by_challenge() {
        assert!(DifficultyTier::Struggling < DifficultyTier::Learning);
        assert!(DifficultyTier::Thriving < DifficultyTier::Mastering);
        assert_eq!(DifficultyTier::default(), DifficultyTier::Learning);
    }

    #[test]
    fn boundaries_belong_to_higher_tier() {
        let thresholds = TierThresholds::default();
        assert_eq!(thresholds.classify(0.0), DifficultyTier::Struggling);
        assert_eq!(thresholds.classify(1.49), DifficultyTier::Struggling);
        assert_eq!(thresholds.classify(1.5), DifficultyTier::Learning);
        assert_eq!(thresholds.classify(2.74), DifficultyTier::Learning);
        assert_eq!(thresholds.classify(2.75), DifficultyTier::Thriving);
        assert_eq!(thresholds.classify(3.99), DifficultyTier::Thriving);
        assert_eq!(thresholds.classify(4.0), DifficultyTier::Mastering);
        assert_eq!(thresholds.classify(5.0), DifficultyTier::Mastering);
    }

    #[test]
    fn classify_clamps_garbage_scores() {
        let thresholds = TierThresholds::default();
        assert_eq!(thresholds.classify(f64::NAN), DifficultyTier::Struggling);
        assert_eq!(thresholds.classify(-3.0), DifficultyTier::Struggling);
        assert_eq!(thresholds.classify(9.0), DifficultyTier::Mastering);
    }

    #[test]
    fn baselines_follow_tier_table() {
        assert_eq!(DifficultyTier::Struggling.expected_turns(), 12);
        assert_eq!(DifficultyTier::Mastering.expected_turns(), 6);
        assert!((DifficultyTier::Learning.expected_damage_per_turn() - 8.0).abs() < f64::EPSILON);
        assert!((DifficultyTier::Mastering.expected_damage_per_turn() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn scaling_splits_bonus_and_penalty() {
        let table = TierScalingTable::default();
        let struggling = table.for_tier(DifficultyTier::Struggling);
        assert!((struggling.apply(0.2) - 0.3).abs() < 1e-12);
        assert!((struggling.apply(-0.4) + 0.2).abs() < 1e-12);
        assert!(struggling.apply(0.0).abs() < f64::EPSILON);
        let mastering = table.for_tier(DifficultyTier::Mastering);
        assert!((mastering.apply(-0.2) + 0.3).abs() < 1e-12);
    }
}
