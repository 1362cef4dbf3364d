//! Run-scoped difficulty state: the performance score snapshot and the store
//! that owns it.
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use thiserror::Error;

use crate::adjustment::{DifficultyAdjustment, calibration_narrative, compute_adjustment, narrative_for};
use crate::breakdown::AdjustmentBreakdown;
use crate::calibration::{CalibrationGate, CalibrationPhase};
use crate::config::DdaConfig;
use crate::constants::{
    COMBAT_HISTORY_LIMIT, EVENT_LOG_LIMIT, LOG_TARGET_STORE, SCORE_BASELINE, SCORE_MAX, SCORE_MIN,
};
use crate::events::{DdaEvent, DdaEventKind, EventLog};
use crate::numbers::clamp_finite;
use crate::sample::CombatSample;
use crate::score::{ScoreEngine, ScoreUpdate};
use crate::tier::DifficultyTier;

/// Player performance snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceScore {
    /// Running score, always within `[0, 5]`.
    pub current_score: f64,
    /// Score before the most recent update.
    #[serde(default = "default_score")]
    pub previous_score: f64,
    pub tier: DifficultyTier,
    pub is_calibrating: bool,
    pub combats_completed: u32,
}

const fn default_score() -> f64 {
    SCORE_BASELINE
}

impl PerformanceScore {
    /// Fresh snapshot for a run governed by `gate`.
    #[must_use]
    pub const fn initial(gate: &CalibrationGate) -> Self {
        Self {
            current_score: SCORE_BASELINE,
            previous_score: SCORE_BASELINE,
            tier: DifficultyTier::Learning,
            is_calibrating: gate.is_calibrating(0),
            combats_completed: 0,
        }
    }
}

impl Default for PerformanceScore {
    fn default() -> Self {
        Self::initial(&CalibrationGate::default())
    }
}

/// Errors raised by [`DdaStore::process_combat_results`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DdaError {
    #[error("difficulty adjustment is disabled; combat results were not applied")]
    Disabled,
    #[error("combat '{combat_id}' was already processed this run")]
    DuplicateCombat { combat_id: String },
    #[error("combat counter is exhausted at {combats_completed}")]
    CounterExhausted { combats_completed: u32 },
}

/// Everything produced by one processed combat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatOutcome {
    pub snapshot: PerformanceScore,
    pub update: ScoreUpdate,
    /// Tier the classifier computed, before the calibration gate.
    pub classified_tier: DifficultyTier,
    pub tier_changed: bool,
    pub calibration_completed: bool,
}

impl CombatOutcome {
    #[must_use]
    pub const fn breakdown(&self) -> &AdjustmentBreakdown {
        &self.update.breakdown
    }
}

/// Owns the performance score for one game run.
///
/// Constructed by whatever orchestrates the run and passed to the systems that
/// need it; there is no process-wide instance. Updates take `&mut self`, so a
/// store has exactly one writer at a time.
#[derive(Debug, Clone)]
pub struct DdaStore {
    config: DdaConfig,
    engine: ScoreEngine,
    gate: CalibrationGate,
    score: PerformanceScore,
    enabled: bool,
    history: VecDeque<CombatSample>,
    seen_combat_ids: HashSet<String>,
    events: EventLog,
}

impl DdaStore {
    #[must_use]
    pub fn new(config: DdaConfig) -> Self {
        let gate = CalibrationGate::new(config.calibration_combats);
        Self {
            config,
            engine: ScoreEngine::new(config.scaling),
            gate,
            score: PerformanceScore::initial(&gate),
            enabled: true,
            history: VecDeque::with_capacity(COMBAT_HISTORY_LIMIT),
            seen_combat_ids: HashSet::new(),
            events: EventLog::with_capacity(EVENT_LOG_LIMIT),
        }
    }

    /// Copy of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> PerformanceScore {
        self.score.clone()
    }

    #[must_use]
    pub const fn config(&self) -> &DdaConfig {
        &self.config
    }

    #[must_use]
    pub const fn calibration_gate(&self) -> &CalibrationGate {
        &self.gate
    }

    /// Apply one finished combat.
    ///
    /// Runs the score engine against the tier in effect before this combat,
    /// classifies the new score, and lets the calibration gate decide which
    /// tier is reported.
    ///
    /// # Errors
    ///
    /// Returns [`DdaError::Disabled`] while the engine is switched off and
    /// [`DdaError::DuplicateCombat`] when the sample's combat id was already
    /// processed this run. [`DdaError::CounterExhausted`] is returned once the
    /// combat counter can no longer advance. State is untouched in every case.
    pub fn process_combat_results(
        &mut self,
        sample: &CombatSample,
    ) -> Result<CombatOutcome, DdaError> {
        if !self.enabled {
            warn!(target: LOG_TARGET_STORE, "ignoring combat results while disabled");
            return Err(DdaError::Disabled);
        }
        if let Some(combat_id) = sample.combat_id.as_deref()
            && self.seen_combat_ids.contains(combat_id)
        {
            warn!(target: LOG_TARGET_STORE, "rejecting duplicate combat '{combat_id}'");
            self.events.record(
                DdaEventKind::DuplicateRejected,
                self.score.current_score,
                self.score.tier,
                combat_id,
            );
            return Err(DdaError::DuplicateCombat {
                combat_id: combat_id.to_string(),
            });
        }

        let Some(combats_completed) = self.score.combats_completed.checked_add(1) else {
            warn!(target: LOG_TARGET_STORE, "combat counter exhausted; update rejected");
            return Err(DdaError::CounterExhausted {
                combats_completed: self.score.combats_completed,
            });
        };

        let previous = self.score.clone();
        let phase = self.gate.phase(previous.combats_completed);
        let mut update = self.engine.update(sample, &previous);

        let classified_tier = self.config.thresholds.classify(update.new_score);
        let tier = self.gate.gate(phase, classified_tier);
        let is_calibrating = self.gate.is_calibrating(combats_completed);
        let calibration_completed = phase == CalibrationPhase::Calibrating && !is_calibrating;

        self.annotate_calibration(&mut update.breakdown, phase, combats_completed, calibration_completed);

        self.score = PerformanceScore {
            current_score: update.new_score,
            previous_score: update.previous_score,
            tier,
            is_calibrating,
            combats_completed,
        };
        let tier_changed = tier != previous.tier;

        self.record_outcome(&update, &previous, classified_tier, tier_changed, calibration_completed);
        self.remember(sample);

        Ok(CombatOutcome {
            snapshot: self.score.clone(),
            update,
            classified_tier,
            tier_changed,
            calibration_completed,
        })
    }

    fn annotate_calibration(
        &self,
        breakdown: &mut AdjustmentBreakdown,
        phase: CalibrationPhase,
        combat_number: u32,
        completed: bool,
    ) {
        if phase == CalibrationPhase::Calibrating {
            breakdown.lines.insert(0, self.gate.progress_notice(combat_number));
        }
        if completed {
            let before_total = breakdown.lines.len().saturating_sub(1);
            breakdown
                .lines
                .insert(before_total, self.gate.completion_notice());
        }
    }

    fn record_outcome(
        &mut self,
        update: &ScoreUpdate,
        previous: &PerformanceScore,
        classified_tier: DifficultyTier,
        tier_changed: bool,
        calibration_completed: bool,
    ) {
        let score = self.score.current_score;
        let tier = self.score.tier;
        debug!(
            target: LOG_TARGET_STORE,
            "combat {} processed: score {:.3} -> {:.3}, tier {} (classified {classified_tier}), calibrating {}",
            self.score.combats_completed,
            update.previous_score,
            score,
            tier,
            self.score.is_calibrating
        );
        self.events.record(
            DdaEventKind::ScoreUpdate,
            score,
            tier,
            format!(
                "combat {}: {:+.3} ({} factors)",
                self.score.combats_completed,
                update.adjustment,
                update.contributions.len()
            ),
        );
        if calibration_completed {
            info!(
                target: LOG_TARGET_STORE,
                "calibration complete after {} combats; classifier reads {classified_tier}",
                self.gate.combats_required()
            );
            self.events.record(
                DdaEventKind::CalibrationComplete,
                score,
                tier,
                format!(
                    "calibration complete after {} combats; classifier reads {classified_tier}",
                    self.gate.combats_required()
                ),
            );
        }
        if tier_changed {
            info!(target: LOG_TARGET_STORE, "tier changed {} -> {tier}", previous.tier);
            self.events.record(
                DdaEventKind::TierChange,
                score,
                tier,
                format!("{} -> {tier}", previous.tier),
            );
        }
    }

    fn remember(&mut self, sample: &CombatSample) {
        if self.history.len() == COMBAT_HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(sample.clone());
        if let Some(combat_id) = &sample.combat_id {
            self.seen_combat_ids.insert(combat_id.clone());
        }
    }

    /// Multipliers for the next encounter, derived from the current tier.
    #[must_use]
    pub fn current_difficulty_adjustment(&self) -> DifficultyAdjustment {
        let tier = self.score.tier;
        let narrative = if self.score.is_calibrating {
            calibration_narrative(self.score.combats_completed, self.gate.combats_required())
        } else {
            narrative_for(tier).to_string()
        };
        compute_adjustment(&self.config.difficulty, tier, narrative)
    }

    /// Restore defaults for a new run.
    pub fn reset(&mut self) {
        self.clear_run();
        self.events.record(
            DdaEventKind::SessionReset,
            self.score.current_score,
            self.score.tier,
            "session reset",
        );
        debug!(target: LOG_TARGET_STORE, "store reset");
    }

    /// Swap configuration and restore defaults.
    pub fn reset_with_config(&mut self, config: DdaConfig) {
        self.config = config;
        self.engine = ScoreEngine::new(config.scaling);
        self.gate = CalibrationGate::new(config.calibration_combats);
        self.clear_run();
        self.events.record(
            DdaEventKind::ConfigReset,
            self.score.current_score,
            self.score.tier,
            format!("calibration combats {}", config.calibration_combats),
        );
        debug!(target: LOG_TARGET_STORE, "store reset with new configuration");
    }

    fn clear_run(&mut self) {
        self.score = PerformanceScore::initial(&self.gate);
        self.history.clear();
        self.seen_combat_ids.clear();
        self.events.clear();
    }

    /// Replace the snapshot, e.g. after loading a save.
    ///
    /// Scores are re-clamped and the calibration flag is recomputed from the
    /// combat counter under the current configuration. A snapshot that is
    /// still calibrating reports `Learning` whatever tier it carried.
    pub fn restore_snapshot(&mut self, snapshot: PerformanceScore) {
        let is_calibrating = self.gate.is_calibrating(snapshot.combats_completed);
        self.score = PerformanceScore {
            current_score: clamp_finite(snapshot.current_score, SCORE_MIN, SCORE_MAX),
            previous_score: clamp_finite(snapshot.previous_score, SCORE_MIN, SCORE_MAX),
            tier: if is_calibrating {
                DifficultyTier::Learning
            } else {
                snapshot.tier
            },
            is_calibrating,
            combats_completed: snapshot.combats_completed,
        };
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.events.record(
            DdaEventKind::Toggle,
            self.score.current_score,
            self.score.tier,
            if enabled { "enabled" } else { "disabled" },
        );
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Most recent events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &DdaEvent> {
        self.events.iter()
    }

    #[must_use]
    pub const fn event_log(&self) -> &EventLog {
        &self.events
    }

    /// Last processed samples, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &CombatSample> {
        self.history.iter()
    }
}

impl Default for DdaStore {
    fn default() -> Self {
        Self::new(DdaConfig::default())
    }
}
