use bathala_dda::{
    CombatSample, DdaConfig, DdaPreset, DdaStore, DifficultyTier, FactorKind, HandType,
    PerformanceScore,
};

const EPSILON: f64 = 1e-9;

fn flawless_fast_clear() -> CombatSample {
    CombatSample::new(100.0, 5, 150.0, HandType::StraightFlush).with_discards(0, 3)
}

fn grinding_near_death() -> CombatSample {
    CombatSample::new(10.0, 20, 40.0, HandType::HighCard).with_discards(3, 3)
}

fn neutral() -> CombatSample {
    CombatSample::new(60.0, 10, 80.0, HandType::HighCard).with_discards(2, 3)
}

fn scaled(outcome: &bathala_dda::CombatOutcome, kind: FactorKind) -> f64 {
    outcome
        .update
        .contributions
        .iter()
        .find(|c| c.factor.kind == kind)
        .map_or(0.0, |c| c.scaled)
}

#[test]
fn flawless_fast_clear_rewards_every_factor() {
    let mut store = DdaStore::default();
    let outcome = store.process_combat_results(&flawless_fast_clear()).unwrap();

    let expected = [
        (FactorKind::HealthRetention, 0.35),
        (FactorKind::PerfectClear, 0.25),
        (FactorKind::HandQuality, 0.25),
        (FactorKind::TurnEfficiency, 0.20),
        (FactorKind::DamageEfficiency, 0.20),
        (FactorKind::ResourceThrift, 0.15),
    ];
    for (kind, value) in expected {
        assert!(
            (scaled(&outcome, kind) - value).abs() < EPSILON,
            "{} contributed {}",
            kind.label(),
            scaled(&outcome, kind)
        );
    }
    assert!((outcome.update.adjustment - 1.40).abs() < EPSILON);
    assert!((outcome.snapshot.current_score - 3.90).abs() < EPSILON);
    assert_eq!(outcome.update.scoring_tier, DifficultyTier::Learning);

    let total = outcome.breakdown().total().unwrap();
    assert_eq!(total.label, "Total Adjustment");
    assert_eq!(total.justification, "2.50 → 3.90");
}

#[test]
fn flawless_clear_is_capped_at_max_score() {
    let mut store = DdaStore::default();
    store.restore_snapshot(PerformanceScore {
        current_score: 4.5,
        ..PerformanceScore::default()
    });
    let outcome = store.process_combat_results(&flawless_fast_clear()).unwrap();
    assert!((outcome.snapshot.current_score - 5.0).abs() < EPSILON);
    assert!((outcome.update.adjustment - 1.40).abs() < EPSILON);
}

#[test]
fn grinding_near_death_win_costs_three_penalties() {
    let mut store = DdaStore::default();
    let outcome = store.process_combat_results(&grinding_near_death()).unwrap();

    assert!((scaled(&outcome, FactorKind::HealthRetention) + 0.40).abs() < EPSILON);
    assert!((scaled(&outcome, FactorKind::TurnEfficiency) + 0.20).abs() < EPSILON);
    assert!((scaled(&outcome, FactorKind::DamageEfficiency) + 0.15).abs() < EPSILON);
    assert_eq!(outcome.update.contributions.len(), 3);
    assert!((outcome.update.adjustment + 0.75).abs() < EPSILON);
    assert!((outcome.snapshot.current_score - 1.75).abs() < EPSILON);
    assert!(outcome.breakdown().find("Perfect Clear").is_none());
}

#[test]
fn tier_unlocks_after_calibration() {
    let mut store = DdaStore::default();
    store.restore_snapshot(PerformanceScore {
        current_score: 4.2,
        previous_score: 4.2,
        tier: DifficultyTier::Learning,
        is_calibrating: false,
        combats_completed: 3,
    });

    let outcome = store.process_combat_results(&neutral()).unwrap();
    assert!((outcome.snapshot.current_score - 4.2).abs() < EPSILON);
    assert_eq!(outcome.snapshot.tier, DifficultyTier::Mastering);
    assert!(outcome.tier_changed);
    assert!(!outcome.breakdown().has_calibration_notice());

    let adjustment = store.current_difficulty_adjustment();
    assert!((adjustment.enemy_health_multiplier - 1.30).abs() < EPSILON);
    assert!((adjustment.reward_multiplier - 1.30).abs() < EPSILON);
    assert!(adjustment.narrative_context.contains("mastery"));
}

#[test]
fn extreme_samples_cannot_move_tier_during_calibration() {
    let mut store = DdaStore::default();
    for _ in 0..3 {
        let outcome = store.process_combat_results(&grinding_near_death()).unwrap();
        assert_eq!(outcome.snapshot.tier, DifficultyTier::Learning);
    }
    assert!((store.snapshot().current_score - 0.25).abs() < EPSILON);
    assert!(!store.snapshot().is_calibrating);

    let fourth = store.process_combat_results(&grinding_near_death()).unwrap();
    assert_eq!(fourth.snapshot.tier, DifficultyTier::Struggling);
    let adjustment = store.current_difficulty_adjustment();
    assert!((adjustment.enemy_damage_multiplier - 0.80).abs() < EPSILON);
}

#[test]
fn struggling_players_recover_faster() {
    let mut store = DdaStore::new(DdaConfig::preset(DdaPreset::Default));
    store.restore_snapshot(PerformanceScore {
        current_score: 1.0,
        previous_score: 1.0,
        tier: DifficultyTier::Struggling,
        is_calibrating: false,
        combats_completed: 5,
    });
    let outcome = store.process_combat_results(&flawless_fast_clear()).unwrap();
    assert_eq!(outcome.update.scoring_tier, DifficultyTier::Struggling);
    assert!(outcome.update.adjustment > 1.40);
}

#[test]
fn aggressive_preset_skips_calibration() {
    let mut store = DdaStore::new(DdaConfig::preset(DdaPreset::Aggressive));
    assert!(!store.snapshot().is_calibrating);
    let outcome = store.process_combat_results(&grinding_near_death()).unwrap();
    assert!(!outcome.breakdown().has_calibration_notice());
    assert_eq!(outcome.snapshot.tier, DifficultyTier::Learning);
    let second = store.process_combat_results(&grinding_near_death()).unwrap();
    assert_eq!(second.snapshot.tier, DifficultyTier::Struggling);
}

#[test]
fn conservative_preset_holds_learning_for_five_combats() {
    let mut store = DdaStore::new(DdaConfig::preset(DdaPreset::Conservative));
    for number in 1..=5 {
        let outcome = store.process_combat_results(&flawless_fast_clear()).unwrap();
        assert_eq!(outcome.snapshot.tier, DifficultyTier::Learning);
        assert_eq!(outcome.calibration_completed, number == 5);
    }
    let sixth = store.process_combat_results(&flawless_fast_clear()).unwrap();
    assert_eq!(sixth.snapshot.tier, DifficultyTier::Mastering);
}
