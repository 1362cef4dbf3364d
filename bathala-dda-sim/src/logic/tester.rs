use anyhow::{Result, ensure};
use bathala_dda::numbers::clamp_finite;
use bathala_dda::{
    DdaConfig, DdaEventKind, DifficultyTier, SCORE_MAX, SCORE_MIN, narrative_for,
};
use colored::Colorize;
use log::info;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::logic::simulation::{CombatStep, SessionPlan, SessionSummary, run_session};
use crate::scenarios::Scenario;

const TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_key: String,
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    /// Final score of the last iteration.
    pub final_score: f64,
    pub final_tier: DifficultyTier,
    pub combats: usize,
    pub trace_digest: String,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

/// Runs catalog scenarios against the engine and checks every step.
#[derive(Debug, Clone, Default)]
pub struct SessionTester {
    config_override: Option<DdaConfig>,
    combats: Option<u32>,
    verbose: bool,
}

impl SessionTester {
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self {
            config_override: None,
            combats: None,
            verbose,
        }
    }

    /// Use `config` for every scenario instead of the scenario's preset.
    #[must_use]
    pub const fn with_config(mut self, config: Option<DdaConfig>) -> Self {
        self.config_override = config;
        self
    }

    /// Length of seeded stream scenarios.
    #[must_use]
    pub const fn with_combats(mut self, combats: Option<u32>) -> Self {
        self.combats = combats;
        self
    }

    #[must_use]
    pub fn config_for(&self, scenario: &Scenario) -> DdaConfig {
        self.config_override
            .unwrap_or_else(|| DdaConfig::preset(scenario.preset))
    }

    #[must_use]
    pub fn plan_for(&self, scenario: &Scenario) -> SessionPlan {
        match self.combats {
            Some(combats) if scenario.stream => scenario.plan.clone().resized(combats),
            _ => scenario.plan.clone(),
        }
    }

    pub fn run_scenario(
        &self,
        scenario: &Scenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|&seed| {
                if self.verbose {
                    println!(
                        "🧪 Testing scenario: {} (seed: {seed})",
                        scenario.name.bright_white()
                    );
                }
                self.run_single_scenario(scenario, seed, iterations.max(1))
            })
            .collect()
    }

    fn run_single_scenario(
        &self,
        scenario: &Scenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let config = self.config_for(scenario);
        let plan = self.plan_for(scenario);

        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();
        let mut last_summary: Option<SessionSummary> = None;

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let summary = run_session(config, &plan, iteration_seed);

            if self.verbose && i == 0 {
                print_trail(&summary);
            }

            match evaluate_session(&config, &plan, &summary) {
                Ok(()) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    performance_data.push(duration);
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) combats:{} score:{:.2} tier:{}",
                            i + 1,
                            iterations,
                            summary.steps.len(),
                            summary.final_snapshot.current_score,
                            summary.final_snapshot.tier
                        );
                    }
                }
                Err(err) => {
                    let message = format!(
                        "Iteration {} (seed {}, combats {}, score {:.3}, tier {}): {err:#}",
                        i + 1,
                        iteration_seed,
                        summary.steps.len(),
                        summary.final_snapshot.current_score,
                        summary.final_snapshot.tier
                    );
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            iterations,
                            message.clone().red()
                        );
                    }
                    failures.push(message);
                }
            }
            last_summary = Some(summary);
        }

        let avg_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };
        let (final_score, final_tier, combats, trace_digest) = last_summary.map_or_else(
            || (SCORE_MIN, DifficultyTier::Learning, 0, String::new()),
            |summary| {
                (
                    summary.final_snapshot.current_score,
                    summary.final_snapshot.tier,
                    summary.steps.len(),
                    summary.digest_hex(),
                )
            },
        );
        info!(
            "{} seed {seed}: {successes}/{iterations} iterations passed",
            scenario.key
        );

        ScenarioResult {
            scenario_key: scenario.key.to_string(),
            scenario_name: scenario.name.to_string(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            final_score,
            final_tier,
            combats,
            trace_digest,
            average_duration: avg_duration,
            performance_data,
        }
    }
}

/// Engine invariants, replay determinism, then scenario expectations.
pub fn evaluate_session(
    config: &DdaConfig,
    plan: &SessionPlan,
    summary: &SessionSummary,
) -> Result<()> {
    check_invariants(summary)?;
    let submitted = summary.steps.len() + summary.skipped_while_disabled;
    ensure!(
        u32::try_from(submitted).ok() == Some(plan.total_combats()),
        "{submitted} combats accounted for, plan has {}",
        plan.total_combats()
    );
    let replay = run_session(*config, plan, summary.seed);
    ensure!(
        replay.digest == summary.digest,
        "replay digest {} differs from {}",
        replay.digest_hex(),
        summary.digest_hex()
    );
    for expectation in &plan.expectations {
        expectation.evaluate(summary)?;
    }
    Ok(())
}

/// Step-by-step checks that hold for every configuration.
pub fn check_invariants(summary: &SessionSummary) -> Result<()> {
    for step in &summary.steps {
        check_step(&summary.config, step)?;
    }
    let completions = summary
        .events
        .iter()
        .filter(|event| event.kind == DdaEventKind::CalibrationComplete)
        .count();
    ensure!(
        completions <= 1,
        "calibration completed {completions} times"
    );
    ensure!(
        summary.history_len == summary.steps.len().min(10),
        "history holds {} samples",
        summary.history_len
    );
    Ok(())
}

fn check_step(config: &DdaConfig, step: &CombatStep) -> Result<()> {
    let number = step.number;
    let snapshot = &step.outcome.snapshot;
    let update = &step.outcome.update;
    let required = config.calibration_combats;

    ensure!(
        number == step.before.combats_completed + 1,
        "combat {number}: counter jumped from {}",
        step.before.combats_completed
    );
    ensure!(
        (SCORE_MIN..=SCORE_MAX).contains(&snapshot.current_score),
        "combat {number}: score {} out of bounds",
        snapshot.current_score
    );
    ensure!(
        update.scoring_tier == step.before.tier,
        "combat {number}: scored against {} instead of pre-update tier {}",
        update.scoring_tier,
        step.before.tier
    );

    let expected = clamp_finite(
        step.before.current_score + update.adjustment,
        SCORE_MIN,
        SCORE_MAX,
    );
    ensure!(
        (snapshot.current_score - expected).abs() < TOLERANCE,
        "combat {number}: score {} does not match {expected}",
        snapshot.current_score
    );

    let factor_sum: f64 = step.outcome.breakdown().factors().map(|line| line.magnitude).sum();
    ensure!(
        (factor_sum - update.adjustment).abs() < TOLERANCE,
        "combat {number}: breakdown sums to {factor_sum}, adjustment is {}",
        update.adjustment
    );
    ensure!(
        step.outcome
            .breakdown()
            .lines
            .last()
            .is_some_and(|line| line.is_total),
        "combat {number}: breakdown does not end with the total"
    );

    let in_window = number <= required;
    ensure!(
        step.outcome.breakdown().has_calibration_notice() == in_window,
        "combat {number}: calibration notice mismatch (window {required})"
    );
    ensure!(
        snapshot.is_calibrating == (number < required),
        "combat {number}: is_calibrating {} with window {required}",
        snapshot.is_calibrating
    );
    ensure!(
        step.outcome.calibration_completed == (required > 0 && number == required),
        "combat {number}: calibration completion flag misplaced"
    );
    if in_window {
        ensure!(
            snapshot.tier == DifficultyTier::Learning,
            "combat {number}: tier {} reported during calibration",
            snapshot.tier
        );
    } else {
        let classified = config.thresholds.classify(snapshot.current_score);
        ensure!(
            snapshot.tier == classified,
            "combat {number}: tier {} but score {:.3} classifies as {classified}",
            snapshot.tier,
            snapshot.current_score
        );
    }

    let adjustment = &step.adjustment;
    ensure!(
        adjustment.tier == snapshot.tier,
        "combat {number}: adjustment for {} but snapshot is {}",
        adjustment.tier,
        snapshot.tier
    );
    ensure!(
        (adjustment.enemy_health_multiplier - config.difficulty.enemy_health.get(snapshot.tier))
            .abs()
            < TOLERANCE,
        "combat {number}: enemy multiplier {} does not match tier table",
        adjustment.enemy_health_multiplier
    );
    if !snapshot.is_calibrating {
        ensure!(
            adjustment.narrative_context == narrative_for(snapshot.tier),
            "combat {number}: narrative does not match {}",
            snapshot.tier
        );
    }
    Ok(())
}

fn print_trail(summary: &SessionSummary) {
    for step in &summary.steps {
        println!(
            "   {} {} ({}) {} {:.2} → {:.2}",
            "▸".cyan(),
            format!("Combat {}", step.number).bold(),
            step.profile,
            step.outcome.snapshot.tier.to_string().yellow(),
            step.before.current_score,
            step.outcome.snapshot.current_score
        );
        println!(
            "       {:.1}% HP, {} turns, {:.0} dmg, best {}, discards {}/{}",
            step.sample.health_pct(),
            step.sample.turns(),
            step.sample.damage(),
            step.sample.best_hand.display_name(),
            step.sample.discards_used,
            step.sample.max_discards_available
        );
        for line in step.outcome.breakdown().to_string().lines() {
            println!("       {line}");
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_micros().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = u128::deserialize(deserializer)?;
        Ok(Duration::from_micros(u64::try_from(micros).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let micros: Vec<u128> = durations.iter().map(Duration::as_micros).collect();
        micros.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = Vec::<u128>::deserialize(deserializer)?;
        Ok(micros
            .into_iter()
            .map(|m| Duration::from_micros(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::generator::PlayerProfile;
    use crate::scenarios::catalog;

    #[test]
    fn every_catalog_scenario_passes_with_defaults() {
        let tester = SessionTester::new(false);
        for scenario in catalog() {
            let results = tester.run_scenario(&scenario, &[1337, 42], 2);
            for result in results {
                assert!(
                    result.passed,
                    "{} failed: {:?}",
                    result.scenario_key,
                    result.failures
                );
            }
        }
    }

    #[test]
    fn invariants_hold_for_every_preset() {
        for preset in bathala_dda::DdaPreset::ALL {
            let config = DdaConfig::preset(preset);
            let plan = SessionPlan::new().then(PlayerProfile::Erratic, 40);
            let summary = run_session(config, &plan, 8);
            check_invariants(&summary).unwrap();
        }
    }

    #[test]
    fn tampered_summary_is_caught() {
        let plan = SessionPlan::new().then(PlayerProfile::Flawless, 5);
        let mut summary = run_session(DdaConfig::default(), &plan, 3);
        summary.steps[1].outcome.snapshot.tier = DifficultyTier::Mastering;
        assert!(check_invariants(&summary).is_err());
    }

    #[test]
    fn failing_expectation_is_reported() {
        let scenario = Scenario {
            key: "impossible",
            name: "Impossible",
            description: "always fails",
            preset: bathala_dda::DdaPreset::Default,
            stream: false,
            plan: SessionPlan::new()
                .then(PlayerProfile::Steady, 2)
                .with_expectation(|_: &SessionSummary| -> Result<()> {
                    anyhow::bail!("nope")
                }),
        };
        let results = SessionTester::new(false).run_scenario(&scenario, &[5], 3);
        assert_eq!(results.len(), 1);
        assert!(!results[0].passed);
        assert_eq!(results[0].successful_iterations, 0);
        assert_eq!(results[0].failures.len(), 3);
        assert!(results[0].failures[0].contains("nope"));
    }

    #[test]
    fn dropped_combats_are_caught() {
        let plan = SessionPlan::new()
            .then(PlayerProfile::Steady, 3)
            .then_paused(PlayerProfile::Steady, 2);
        let config = DdaConfig::default();
        let mut summary = run_session(config, &plan, 11);
        evaluate_session(&config, &plan, &summary).unwrap();

        summary.skipped_while_disabled = 0;
        let err = evaluate_session(&config, &plan, &summary).unwrap_err();
        assert!(err.to_string().contains("plan has 5"));
    }

    #[test]
    fn combats_override_resizes_streams_only() {
        let tester = SessionTester::new(false).with_combats(Some(7));
        let stream = crate::scenarios::find_scenario("random-walk").unwrap();
        assert_eq!(tester.plan_for(&stream).total_combats(), 7);
        let scripted = crate::scenarios::find_scenario("flawless-streak").unwrap();
        assert_eq!(
            tester.plan_for(&scripted).total_combats(),
            scripted.plan.total_combats()
        );
    }
}
