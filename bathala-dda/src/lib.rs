//! Bathala Dynamic Difficulty Adjustment
//!
//! Platform-agnostic difficulty engine for a roguelike card-combat game. After
//! every combat the player's results are folded into a bounded performance
//! score, the score is classified into a difficulty tier, and the tier drives
//! the multipliers used to build the next encounter. Every change carries an
//! itemized breakdown so tuning decisions can be audited.
//!
//! This crate holds no rendering, persistence or global state. A
//! [`DdaStore`] is created per run and owned by the caller.

pub mod adjustment;
pub mod breakdown;
pub mod calibration;
pub mod config;
pub mod constants;
pub mod events;
pub mod factors;
pub mod hand;
pub mod numbers;
pub mod sample;
pub mod score;
pub mod state;
pub mod tier;

// Re-export commonly used types
pub use adjustment::{
    DifficultyAdjustment, DifficultyTable, TierValues, calibration_narrative, compute_adjustment,
    narrative_for,
};
pub use breakdown::{AdjustmentBreakdown, BreakdownLine};
pub use calibration::{CalibrationGate, CalibrationPhase};
pub use config::{DdaConfig, DdaConfigError, DdaPreset};
pub use constants::{DEFAULT_CALIBRATION_COMBATS, SCORE_BASELINE, SCORE_MAX, SCORE_MIN};
pub use events::{DdaEvent, DdaEventKind, EventLog};
pub use factors::{FactorContribution, FactorKind, FactorSet, evaluate, evaluate_factors};
pub use hand::{HandQuality, HandType};
pub use sample::{CombatSample, EnemyInfo, EnemyKind};
pub use score::{ScaledContribution, ScoreEngine, ScoreUpdate};
pub use state::{CombatOutcome, DdaError, DdaStore, PerformanceScore};
pub use tier::{DifficultyTier, TierScaling, TierScalingTable, TierThresholds};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_round_trips_through_json() {
        let mut store = DdaStore::default();
        store
            .process_combat_results(&CombatSample::new(95.0, 7, 90.0, HandType::Flush))
            .unwrap();
        let json = serde_json::to_string(&store.snapshot()).unwrap();
        let restored: PerformanceScore = serde_json::from_str(&json).unwrap();

        let mut other = DdaStore::default();
        other.restore_snapshot(restored);
        let (a, b) = (other.snapshot(), store.snapshot());
        assert!((a.current_score - b.current_score).abs() < 1e-9);
        assert_eq!(a.tier, b.tier);
        assert_eq!(a.combats_completed, b.combats_completed);
        assert_eq!(a.is_calibrating, b.is_calibrating);
    }

    #[test]
    fn outcome_breakdown_renders_total_last() {
        let mut store = DdaStore::default();
        let outcome = store
            .process_combat_results(&CombatSample::new(20.0, 20, 30.0, HandType::Pair))
            .unwrap();
        let rendered = outcome.breakdown().to_string();
        assert!(rendered.contains("Total Adjustment"));
        assert!(rendered.contains("Calibration Phase"));
        assert!(outcome.breakdown().lines.last().is_some_and(|line| line.is_total));
    }

    #[test]
    fn health_is_a_percentage() {
        let mut store = DdaStore::default();
        let sample = CombatSample::new(90.0, 4, 120.0, HandType::Flush)
            .with_combat_id("act1-node4")
            .with_discards(1, 3);
        let outcome = store.process_combat_results(&sample).unwrap();
        let health = outcome
            .update
            .contributions
            .iter()
            .find(|c| c.factor.kind == FactorKind::HealthRetention)
            .map(|c| c.scaled);
        assert!(health.is_some_and(|value| value > 0.0), "{health:?}");
        assert!(outcome.snapshot.current_score > SCORE_BASELINE);
    }
}
