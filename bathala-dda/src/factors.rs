//! Factor library: pure rules turning a combat sample into signed score
//! contributions.
//!
//! Every rule is a fixed lookup. The tier passed in must be the tier that was
//! in effect when the combat started; the turn and damage baselines depend on
//! it, and the tier about to be computed from this very sample must never
//! leak back into its own scoring.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{
    DAMAGE_HIGH_BONUS, DAMAGE_HIGH_RATIO, DAMAGE_LOW_PENALTY, DAMAGE_LOW_RATIO,
    HEALTH_CRITICAL_PENALTY, HEALTH_EXCELLENT_BONUS, HEALTH_EXCELLENT_PCT, HEALTH_GOOD_BONUS,
    HEALTH_GOOD_PCT, HEALTH_MODERATE_PCT, HEALTH_POOR_PCT, HEALTH_POOR_PENALTY,
    PERFECT_CLEAR_BONUS, THRIFT_BONUS, THRIFT_MAX_USAGE, TURN_FAST_BONUS, TURN_FAST_RATIO,
    TURN_SLOW_PENALTY, TURN_SLOW_RATIO,
};
use crate::numbers::u32_to_f64;
use crate::sample::CombatSample;
use crate::tier::DifficultyTier;

/// The six scoring rules, in breakdown order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    HealthRetention,
    PerfectClear,
    HandQuality,
    TurnEfficiency,
    DamageEfficiency,
    ResourceThrift,
}

impl FactorKind {
    pub const ALL: [Self; 6] = [
        Self::HealthRetention,
        Self::PerfectClear,
        Self::HandQuality,
        Self::TurnEfficiency,
        Self::DamageEfficiency,
        Self::ResourceThrift,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::HealthRetention => "Health Retention",
            Self::PerfectClear => "Perfect Clear",
            Self::HandQuality => "Hand Quality",
            Self::TurnEfficiency => "Turn Efficiency",
            Self::DamageEfficiency => "Damage Efficiency",
            Self::ResourceThrift => "Resource Thrift",
        }
    }
}

/// Unscaled output of one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorContribution {
    pub kind: FactorKind,
    pub value: f64,
    pub justification: String,
}

pub type FactorSet = SmallVec<[FactorContribution; 6]>;

#[must_use]
pub fn health_retention(sample: &CombatSample) -> f64 {
    let health = sample.health_pct();
    if health >= HEALTH_EXCELLENT_PCT {
        HEALTH_EXCELLENT_BONUS
    } else if health >= HEALTH_GOOD_PCT {
        HEALTH_GOOD_BONUS
    } else if health >= HEALTH_MODERATE_PCT {
        0.0
    } else if health >= HEALTH_POOR_PCT {
        HEALTH_POOR_PENALTY
    } else {
        HEALTH_CRITICAL_PENALTY
    }
}

/// Flat bonus for finishing at full health; stacks with retention.
#[must_use]
pub fn perfect_clear(sample: &CombatSample) -> f64 {
    if sample.is_perfect_clear() {
        PERFECT_CLEAR_BONUS
    } else {
        0.0
    }
}

#[must_use]
pub fn hand_quality(sample: &CombatSample) -> f64 {
    sample.best_hand.quality().score()
}

#[must_use]
pub fn turn_efficiency(sample: &CombatSample, tier: DifficultyTier) -> f64 {
    let expected = u32_to_f64(tier.expected_turns());
    let turns = u32_to_f64(sample.turns());
    if turns <= expected * TURN_FAST_RATIO {
        TURN_FAST_BONUS
    } else if turns >= expected * TURN_SLOW_RATIO {
        TURN_SLOW_PENALTY
    } else {
        0.0
    }
}

/// Over-performance pays more than under-performance costs.
#[must_use]
pub fn damage_efficiency(sample: &CombatSample, tier: DifficultyTier) -> f64 {
    let expected_dpt = tier.expected_damage_per_turn();
    let dpt = sample.damage_per_turn();
    if dpt >= expected_dpt * DAMAGE_HIGH_RATIO {
        DAMAGE_HIGH_BONUS
    } else if dpt <= expected_dpt * DAMAGE_LOW_RATIO {
        DAMAGE_LOW_PENALTY
    } else {
        0.0
    }
}

/// Bonus for discard restraint. Heavy discard use is not penalized.
#[must_use]
pub fn resource_thrift(sample: &CombatSample) -> f64 {
    if sample.discard_usage() <= THRIFT_MAX_USAGE {
        THRIFT_BONUS
    } else {
        0.0
    }
}

/// Evaluate one rule and describe the input it looked at.
#[must_use]
pub fn evaluate(kind: FactorKind, sample: &CombatSample, tier: DifficultyTier) -> FactorContribution {
    let (value, justification) = match kind {
        FactorKind::HealthRetention => (
            health_retention(sample),
            format!("{:.1}% HP remaining", sample.health_pct()),
        ),
        FactorKind::PerfectClear => (
            perfect_clear(sample),
            String::from("Finished the fight at full health"),
        ),
        FactorKind::HandQuality => (
            hand_quality(sample),
            format!("Best hand: {}", sample.best_hand.display_name()),
        ),
        FactorKind::TurnEfficiency => (
            turn_efficiency(sample, tier),
            format!(
                "{} turns (expected {} for {tier})",
                sample.turns(),
                tier.expected_turns()
            ),
        ),
        FactorKind::DamageEfficiency => (
            damage_efficiency(sample, tier),
            format!(
                "{:.1} damage per turn (expected {:.1} for {tier})",
                sample.damage_per_turn(),
                tier.expected_damage_per_turn()
            ),
        ),
        FactorKind::ResourceThrift => (
            resource_thrift(sample),
            format!(
                "Used {}/{} discard charges",
                sample.discards_used,
                sample.max_discards_available.max(1)
            ),
        ),
    };
    FactorContribution {
        kind,
        value,
        justification,
    }
}

/// Evaluate all six rules against the tier in effect at combat start.
#[must_use]
pub fn evaluate_factors(sample: &CombatSample, tier: DifficultyTier) -> FactorSet {
    FactorKind::ALL
        .into_iter()
        .map(|kind| evaluate(kind, sample, tier))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::HandType;

    fn value_of(set: &FactorSet, kind: FactorKind) -> f64 {
        set.iter().find(|c| c.kind == kind).map_or(0.0, |c| c.value)
    }

    #[test]
    fn justifications_match_the_band_applied() {
        let sample = CombatSample::new(89.6, 10, 80.0, HandType::HighCard);
        let health = evaluate(FactorKind::HealthRetention, &sample, DifficultyTier::Learning);
        assert_eq!(health.justification, "89.6% HP remaining");
        assert!((health.value - 0.15).abs() < 1e-12);

        let full = CombatSample::new(100.0, 10, 80.0, HandType::HighCard).with_damage_received(12.0);
        let clear = evaluate(FactorKind::PerfectClear, &full, DifficultyTier::Learning);
        assert!(clear.value > 0.0);
        assert_eq!(clear.justification, "Finished the fight at full health");
    }

    #[test]
    fn health_bands_follow_table() {
        let cases = [
            (100.0, 0.35),
            (90.0, 0.35),
            (89.9, 0.15),
            (70.0, 0.15),
            (69.0, 0.0),
            (50.0, 0.0),
            (49.0, -0.20),
            (30.0, -0.20),
            (29.9, -0.40),
            (0.0, -0.40),
            (250.0, 0.35),
            (-10.0, -0.40),
        ];
        for (health, expected) in cases {
            let sample = CombatSample::new(health, 10, 80.0, HandType::HighCard);
            assert!(
                (health_retention(&sample) - expected).abs() < 1e-12,
                "health {health}"
            );
        }
    }

    #[test]
    fn perfect_clear_requires_full_health() {
        let full = CombatSample::new(100.0, 10, 80.0, HandType::HighCard);
        let nearly = CombatSample::new(99.9, 10, 80.0, HandType::HighCard);
        assert!((perfect_clear(&full) - 0.25).abs() < 1e-12);
        assert!(perfect_clear(&nearly).abs() < f64::EPSILON);
    }

    #[test]
    fn turn_efficiency_uses_tier_baseline() {
        let sample = CombatSample::new(60.0, 8, 80.0, HandType::HighCard);
        // Learning expects 10: 8 <= 8.0 is fast.
        assert!((turn_efficiency(&sample, DifficultyTier::Learning) - 0.2).abs() < 1e-12);
        // Mastering expects 6: 8 >= 7.2 is slow.
        assert!((turn_efficiency(&sample, DifficultyTier::Mastering) + 0.2).abs() < 1e-12);
        // Thriving expects 8: neutral.
        assert!(turn_efficiency(&sample, DifficultyTier::Thriving).abs() < f64::EPSILON);
    }

    #[test]
    fn damage_efficiency_is_asymmetric() {
        let strong = CombatSample::new(60.0, 10, 110.0, HandType::HighCard);
        let weak = CombatSample::new(60.0, 10, 50.0, HandType::HighCard);
        let par = CombatSample::new(60.0, 10, 80.0, HandType::HighCard);
        assert!((damage_efficiency(&strong, DifficultyTier::Learning) - 0.20).abs() < 1e-12);
        assert!((damage_efficiency(&weak, DifficultyTier::Learning) + 0.15).abs() < 1e-12);
        assert!(damage_efficiency(&par, DifficultyTier::Learning).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_turns_do_not_divide_by_zero() {
        let sample = CombatSample::new(60.0, 0, 30.0, HandType::HighCard);
        let value = damage_efficiency(&sample, DifficultyTier::Learning);
        assert!((value - 0.20).abs() < 1e-12);
    }

    #[test]
    fn thrift_rewards_restraint_only() {
        let thrifty = CombatSample::new(60.0, 10, 80.0, HandType::HighCard).with_discards(0, 3);
        let heavy = CombatSample::new(60.0, 10, 80.0, HandType::HighCard).with_discards(3, 3);
        let none_available =
            CombatSample::new(60.0, 10, 80.0, HandType::HighCard).with_discards(0, 0);
        assert!((resource_thrift(&thrifty) - 0.15).abs() < 1e-12);
        assert!(resource_thrift(&heavy).abs() < f64::EPSILON);
        assert!((resource_thrift(&none_available) - 0.15).abs() < 1e-12);
    }

    #[test]
    fn evaluate_factors_reports_all_rules_in_order() {
        let sample = CombatSample::new(100.0, 5, 150.0, HandType::StraightFlush).with_discards(0, 3);
        let set = evaluate_factors(&sample, DifficultyTier::Learning);
        let kinds: Vec<FactorKind> = set.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, FactorKind::ALL.to_vec());
        assert!(!set.spilled());
        assert!((value_of(&set, FactorKind::HandQuality) - 0.25).abs() < 1e-12);
        let total: f64 = set.iter().map(|c| c.value).sum();
        assert!((total - 1.40).abs() < 1e-9);
    }
}
