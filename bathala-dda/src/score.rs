//! Performance score engine: scales factor contributions, applies them to the
//! running score, and records the itemized breakdown.
use log::debug;
use serde::{Deserialize, Serialize};

use crate::breakdown::{AdjustmentBreakdown, BreakdownLine};
use crate::constants::{LOG_TARGET_SCORE, SCORE_MAX, SCORE_MIN};
use crate::factors::{FactorContribution, evaluate_factors};
use crate::numbers::clamp_finite;
use crate::sample::CombatSample;
use crate::state::PerformanceScore;
use crate::tier::{DifficultyTier, TierScalingTable};

/// Factor contribution after tier scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledContribution {
    pub factor: FactorContribution,
    pub scaled: f64,
}

/// Result of applying one combat sample to a score snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub previous_score: f64,
    pub new_score: f64,
    /// Sum of scaled contributions, before clamping.
    pub adjustment: f64,
    /// Tier whose baselines and scaling were used.
    pub scoring_tier: DifficultyTier,
    pub contributions: Vec<ScaledContribution>,
    pub breakdown: AdjustmentBreakdown,
}

impl ScoreUpdate {
    /// Change actually applied to the score after clamping.
    #[must_use]
    pub fn applied_delta(&self) -> f64 {
        self.new_score - self.previous_score
    }
}

/// Pure update rule. Holds only the scaling table; the same inputs always
/// produce the same output.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreEngine {
    scaling: TierScalingTable,
}

impl ScoreEngine {
    #[must_use]
    pub const fn new(scaling: TierScalingTable) -> Self {
        Self { scaling }
    }

    #[must_use]
    pub const fn scaling(&self) -> &TierScalingTable {
        &self.scaling
    }

    /// Score `sample` against `previous`, using `previous.tier` for both the
    /// factor baselines and the scaling row.
    #[must_use]
    pub fn update(&self, sample: &CombatSample, previous: &PerformanceScore) -> ScoreUpdate {
        let tier = previous.tier;
        let scale = self.scaling.for_tier(tier);
        let previous_score = clamp_finite(previous.current_score, SCORE_MIN, SCORE_MAX);

        let mut breakdown = AdjustmentBreakdown::new();
        let mut contributions = Vec::new();
        let mut adjustment = 0.0;

        for factor in evaluate_factors(sample, tier) {
            let scaled = scale.apply(factor.value);
            if scaled == 0.0 {
                continue;
            }
            adjustment += scaled;
            breakdown.push(BreakdownLine::factor(
                factor.kind.label(),
                factor.justification.clone(),
                scaled,
            ));
            contributions.push(ScaledContribution { factor, scaled });
        }

        let new_score = clamp_finite(previous_score + adjustment, SCORE_MIN, SCORE_MAX);
        breakdown.push(BreakdownLine::total(previous_score, new_score, adjustment));

        debug!(
            target: LOG_TARGET_SCORE,
            "scored combat against {tier}: {previous_score:.3} {adjustment:+.3} -> {new_score:.3} ({} factors)",
            contributions.len()
        );

        ScoreUpdate {
            previous_score,
            new_score,
            adjustment,
            scoring_tier: tier,
            contributions,
            breakdown,
        }
    }
}
