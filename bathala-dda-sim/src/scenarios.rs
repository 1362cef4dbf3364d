use anyhow::{Result, ensure};
use bathala_dda::{DdaEventKind, DdaPreset, DifficultyTier};

use crate::logic::generator::PlayerProfile;
use crate::logic::simulation::{SessionPlan, SessionSummary};

/// A named session replayed by the simulator.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub preset: DdaPreset,
    /// Seeded stream whose length follows `--combats`.
    pub stream: bool,
    pub plan: SessionPlan,
}

impl Scenario {
    const fn scripted(
        key: &'static str,
        name: &'static str,
        description: &'static str,
        plan: SessionPlan,
    ) -> Self {
        Self {
            key,
            name,
            description,
            preset: DdaPreset::Default,
            stream: false,
            plan,
        }
    }
}

pub fn catalog() -> Vec<Scenario> {
    vec![
        Scenario::scripted(
            "flawless-streak",
            "Flawless Streak",
            "Perfect fast clears climb to mastering once calibration ends",
            SessionPlan::new()
                .then(PlayerProfile::Flawless, 12)
                .with_expectation(flawless_streak_expectation),
        ),
        Scenario::scripted(
            "near-death-grind",
            "Near-Death Grind",
            "Slow wins at low health sink the score into struggling",
            SessionPlan::new()
                .then(PlayerProfile::NearDeath, 12)
                .with_expectation(near_death_expectation),
        ),
        Scenario::scripted(
            "calibration-lock",
            "Calibration Lock",
            "Extreme early results cannot move the tier before calibration completes",
            SessionPlan::new()
                .then(PlayerProfile::Flawless, 3)
                .then(PlayerProfile::NearDeath, 3)
                .with_expectation(calibration_lock_expectation),
        ),
        Scenario::scripted(
            "tier-recovery",
            "Tier Recovery",
            "A struggling player who turns things around climbs back out",
            SessionPlan::new()
                .then(PlayerProfile::NearDeath, 6)
                .then(PlayerProfile::Flawless, 10)
                .with_expectation(tier_recovery_expectation),
        ),
        Scenario::scripted(
            "mixed-run",
            "Mixed Run",
            "Four play styles in sequence; history and event log stay bounded",
            SessionPlan::new()
                .then(PlayerProfile::Steady, 4)
                .then(PlayerProfile::Skilled, 6)
                .then(PlayerProfile::Struggling, 6)
                .then(PlayerProfile::Flawless, 4)
                .with_expectation(mixed_run_expectation),
        ),
        Scenario {
            stream: true,
            ..Scenario::scripted(
                "random-walk",
                "Random Walk",
                "Seeded stream of erratic combats checked step by step",
                SessionPlan::new()
                    .then(PlayerProfile::Erratic, 60)
                    .with_expectation(random_walk_expectation),
            )
        },
        Scenario::scripted(
            "duplicate-guard",
            "Duplicate Guard",
            "Every combat is reported twice; only the first report counts",
            SessionPlan::new()
                .then_resubmitted(PlayerProfile::Steady, 8)
                .with_expectation(duplicate_guard_expectation),
        ),
        Scenario::scripted(
            "paused-engine",
            "Paused Engine",
            "Combats reported while the engine is disabled are ignored",
            SessionPlan::new()
                .then(PlayerProfile::Steady, 3)
                .then_paused(PlayerProfile::Flawless, 4)
                .then(PlayerProfile::Steady, 3)
                .with_expectation(paused_engine_expectation),
        ),
        Scenario {
            preset: DdaPreset::Aggressive,
            ..Scenario::scripted(
                "aggressive-opening",
                "Aggressive Opening",
                "Without calibration the tier reacts from the first combat",
                SessionPlan::new()
                    .then(PlayerProfile::NearDeath, 2)
                    .then(PlayerProfile::Steady, 4)
                    .with_expectation(aggressive_opening_expectation),
            )
        },
    ]
}

pub fn find_scenario(key: &str) -> Option<Scenario> {
    let key = key.trim();
    catalog()
        .into_iter()
        .find(|scenario| scenario.key.eq_ignore_ascii_case(key) || scenario.name == key)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog()
        .into_iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

pub fn scenario_keys() -> Vec<&'static str> {
    catalog().into_iter().map(|scenario| scenario.key).collect()
}

fn count_events(summary: &SessionSummary, kind: DdaEventKind) -> usize {
    summary
        .events
        .iter()
        .filter(|event| event.kind == kind)
        .count()
}

fn flawless_streak_expectation(summary: &SessionSummary) -> Result<()> {
    let first = summary.steps.first().map(|step| &step.outcome.update);
    ensure!(
        first.is_some_and(|update| update.contributions.len() == 6 && update.adjustment > 0.0),
        "first flawless clear should score on all six factors"
    );
    ensure!(
        summary.final_snapshot.tier == DifficultyTier::Mastering,
        "flawless streak ended in {}",
        summary.final_snapshot.tier
    );
    Ok(())
}

fn near_death_expectation(summary: &SessionSummary) -> Result<()> {
    ensure!(
        summary.final_snapshot.tier == DifficultyTier::Struggling,
        "near-death grind ended in {}",
        summary.final_snapshot.tier
    );
    ensure!(
        summary.final_snapshot.current_score < summary.config.thresholds.learning_min,
        "score {:.2} never dropped below learning",
        summary.final_snapshot.current_score
    );
    let adjustment = summary.final_adjustment();
    ensure!(
        adjustment.is_some_and(|adj| {
            adj.enemy_health_multiplier
                <= summary.config.difficulty.enemy_health.get(DifficultyTier::Learning)
        }),
        "struggling players should face weaker enemies"
    );
    ensure!(
        count_events(summary, DdaEventKind::TierChange) >= 1,
        "no tier change recorded"
    );
    Ok(())
}

fn calibration_lock_expectation(summary: &SessionSummary) -> Result<()> {
    let required = summary.config.calibration_combats;
    if required == 0 {
        return Ok(());
    }
    ensure!(
        count_events(summary, DdaEventKind::CalibrationComplete) == 1,
        "calibration should complete exactly once"
    );
    if required == 3 {
        let third = &summary.steps[2];
        ensure!(
            third.outcome.classified_tier == DifficultyTier::Mastering
                && third.outcome.snapshot.tier == DifficultyTier::Learning,
            "gate should hold a mastering classification at learning (got {} / {})",
            third.outcome.classified_tier,
            third.outcome.snapshot.tier
        );
        ensure!(
            summary.steps[3].outcome.snapshot.tier == DifficultyTier::Mastering,
            "tier should unlock on the combat after calibration"
        );
    }
    Ok(())
}

fn tier_recovery_expectation(summary: &SessionSummary) -> Result<()> {
    ensure!(
        summary
            .steps
            .iter()
            .any(|step| step.outcome.snapshot.tier == DifficultyTier::Struggling),
        "player never reached struggling"
    );
    ensure!(
        summary.final_snapshot.tier >= DifficultyTier::Thriving,
        "recovery ended in {}",
        summary.final_snapshot.tier
    );
    Ok(())
}

fn mixed_run_expectation(summary: &SessionSummary) -> Result<()> {
    ensure!(summary.steps.len() == 20, "expected 20 combats");
    ensure!(
        summary.history_len == 10,
        "history should hold the last 10 samples, holds {}",
        summary.history_len
    );
    ensure!(
        count_events(summary, DdaEventKind::ScoreUpdate) == summary.steps.len(),
        "every processed combat should log one score update"
    );
    Ok(())
}

fn random_walk_expectation(summary: &SessionSummary) -> Result<()> {
    ensure!(
        summary.events.len() <= 100,
        "event log grew to {}",
        summary.events.len()
    );
    let sequences_increase = summary
        .events
        .windows(2)
        .all(|pair| pair[0].sequence < pair[1].sequence);
    ensure!(sequences_increase, "event sequence numbers must increase");
    Ok(())
}

fn duplicate_guard_expectation(summary: &SessionSummary) -> Result<()> {
    ensure!(
        summary.duplicates_rejected == summary.steps.len(),
        "{} duplicates rejected for {} combats",
        summary.duplicates_rejected,
        summary.steps.len()
    );
    ensure!(
        summary.final_snapshot.combats_completed == 8,
        "counter advanced on duplicates ({})",
        summary.final_snapshot.combats_completed
    );
    ensure!(
        count_events(summary, DdaEventKind::DuplicateRejected) == 8,
        "duplicate rejections should be logged"
    );
    Ok(())
}

fn paused_engine_expectation(summary: &SessionSummary) -> Result<()> {
    ensure!(
        summary.skipped_while_disabled == 4,
        "expected 4 skipped combats, saw {}",
        summary.skipped_while_disabled
    );
    ensure!(
        summary.final_snapshot.combats_completed == 6,
        "paused combats should not count"
    );
    ensure!(
        count_events(summary, DdaEventKind::Toggle) == 2,
        "engine should toggle off and back on"
    );
    Ok(())
}

fn aggressive_opening_expectation(summary: &SessionSummary) -> Result<()> {
    if summary.config.calibration_combats > 0 {
        return Ok(());
    }
    ensure!(
        summary.steps[1].outcome.snapshot.tier == DifficultyTier::Struggling,
        "two near-death wins should reach struggling without calibration (got {})",
        summary.steps[1].outcome.snapshot.tier
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let keys = scenario_keys();
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn lookup_accepts_key_or_name() {
        assert!(find_scenario("calibration-lock").is_some());
        assert!(find_scenario("Calibration Lock").is_some());
        assert!(find_scenario("missing").is_none());
    }

    #[test]
    fn only_random_walk_is_a_stream() {
        let streams: Vec<_> = catalog()
            .into_iter()
            .filter(|scenario| scenario.stream)
            .map(|scenario| scenario.key)
            .collect();
        assert_eq!(streams, vec!["random-walk"]);
    }
}
