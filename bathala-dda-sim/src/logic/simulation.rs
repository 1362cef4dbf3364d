use anyhow::Result;
use bathala_dda::{
    CombatOutcome, CombatSample, DdaConfig, DdaError, DdaEvent, DdaStore, DifficultyAdjustment,
    PerformanceScore,
};
use log::debug;
use std::hash::Hasher;
use std::sync::Arc;
use twox_hash::XxHash64;

use crate::logic::generator::{CombatGenerator, PlayerProfile};

/// One stretch of a session played with a single profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanSegment {
    pub profile: PlayerProfile,
    pub combats: u32,
    /// Engine switched off while this segment is played.
    pub paused: bool,
    /// Every sample is submitted a second time to exercise the duplicate guard.
    pub resubmit: bool,
}

impl PlanSegment {
    #[must_use]
    pub const fn new(profile: PlayerProfile, combats: u32) -> Self {
        Self {
            profile,
            combats,
            paused: false,
            resubmit: false,
        }
    }
}

/// Assertion hook run after a session completes.
type SessionExpectationFn = Arc<dyn Fn(&SessionSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SessionExpectation(SessionExpectationFn);

impl std::fmt::Debug for SessionExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionExpectation").finish()
    }
}

impl SessionExpectation {
    pub fn evaluate(&self, summary: &SessionSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SessionExpectation
where
    F: Fn(&SessionSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Scripted sequence of combats for one run.
#[derive(Debug, Clone, Default)]
pub struct SessionPlan {
    pub segments: Vec<PlanSegment>,
    pub expectations: Vec<SessionExpectation>,
}

impl SessionPlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn then(mut self, profile: PlayerProfile, combats: u32) -> Self {
        self.segments.push(PlanSegment::new(profile, combats));
        self
    }

    #[must_use]
    pub fn then_paused(mut self, profile: PlayerProfile, combats: u32) -> Self {
        self.segments.push(PlanSegment {
            paused: true,
            ..PlanSegment::new(profile, combats)
        });
        self
    }

    #[must_use]
    pub fn then_resubmitted(mut self, profile: PlayerProfile, combats: u32) -> Self {
        self.segments.push(PlanSegment {
            resubmit: true,
            ..PlanSegment::new(profile, combats)
        });
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SessionExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }

    #[must_use]
    pub fn total_combats(&self) -> u32 {
        self.segments.iter().map(|segment| segment.combats).sum()
    }

    /// Stretch or cut the plan to exactly `combats` combats. Growth extends
    /// the last segment.
    #[must_use]
    pub fn resized(mut self, combats: u32) -> Self {
        let mut remaining = combats;
        self.segments.retain_mut(|segment| {
            if remaining == 0 {
                return false;
            }
            segment.combats = segment.combats.min(remaining);
            remaining -= segment.combats;
            true
        });
        if remaining > 0
            && let Some(last) = self.segments.last_mut()
        {
            last.combats += remaining;
        }
        self
    }
}

/// One processed combat.
#[derive(Debug, Clone)]
pub struct CombatStep {
    pub number: u32,
    pub profile: PlayerProfile,
    pub sample: CombatSample,
    /// Snapshot before this combat was applied.
    pub before: PerformanceScore,
    pub outcome: CombatOutcome,
    /// Multipliers handed to the next encounter.
    pub adjustment: DifficultyAdjustment,
}

/// Complete record of a replayed session.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub seed: u64,
    pub config: DdaConfig,
    pub steps: Vec<CombatStep>,
    pub final_snapshot: PerformanceScore,
    pub events: Vec<DdaEvent>,
    pub history_len: usize,
    pub duplicates_rejected: usize,
    pub skipped_while_disabled: usize,
    pub digest: u64,
}

impl SessionSummary {
    #[must_use]
    pub fn digest_hex(&self) -> String {
        format!("{:016x}", self.digest)
    }

    #[must_use]
    pub fn final_adjustment(&self) -> Option<&DifficultyAdjustment> {
        self.steps.last().map(|step| &step.adjustment)
    }
}

/// Replay `plan` through a fresh store.
#[must_use]
pub fn run_session(config: DdaConfig, plan: &SessionPlan, seed: u64) -> SessionSummary {
    let mut store = DdaStore::new(config);
    let mut generator = CombatGenerator::new(seed);
    let mut hasher = XxHash64::with_seed(seed);
    let mut steps = Vec::new();
    let mut duplicates_rejected = 0;
    let mut skipped_while_disabled = 0;

    for segment in &plan.segments {
        if store.is_enabled() == segment.paused {
            store.set_enabled(!segment.paused);
        }
        for _ in 0..segment.combats {
            let (profile, sample) = generator.next_sample(segment.profile);
            let before = store.snapshot();
            match store.process_combat_results(&sample) {
                Ok(outcome) => {
                    let adjustment = store.current_difficulty_adjustment();
                    hash_step(&mut hasher, &outcome);
                    debug!(
                        "seed {seed} combat {} ({profile}): {:.3} -> {:.3} [{}]",
                        outcome.snapshot.combats_completed,
                        before.current_score,
                        outcome.snapshot.current_score,
                        outcome.snapshot.tier
                    );
                    steps.push(CombatStep {
                        number: outcome.snapshot.combats_completed,
                        profile,
                        sample: sample.clone(),
                        before,
                        outcome,
                        adjustment,
                    });
                }
                Err(DdaError::Disabled) => skipped_while_disabled += 1,
                Err(DdaError::DuplicateCombat { .. }) => duplicates_rejected += 1,
                Err(err @ DdaError::CounterExhausted { .. }) => {
                    debug!("seed {seed}: {err}");
                    break;
                }
            }
            if segment.resubmit
                && matches!(
                    store.process_combat_results(&sample),
                    Err(DdaError::DuplicateCombat { .. })
                )
            {
                duplicates_rejected += 1;
            }
        }
    }
    if !store.is_enabled() {
        store.set_enabled(true);
    }

    SessionSummary {
        seed,
        config,
        steps,
        final_snapshot: store.snapshot(),
        events: store.events().cloned().collect(),
        history_len: store.history().count(),
        duplicates_rejected,
        skipped_while_disabled,
        digest: hasher.finish(),
    }
}

fn hash_step(hasher: &mut XxHash64, outcome: &CombatOutcome) {
    hasher.write(&outcome.snapshot.current_score.to_bits().to_le_bytes());
    hasher.write(outcome.snapshot.tier.as_str().as_bytes());
    for line in &outcome.breakdown().lines {
        hasher.write(line.label.as_bytes());
        hasher.write(line.justification.as_bytes());
        hasher.write(&line.magnitude.to_bits().to_le_bytes());
    }
}
