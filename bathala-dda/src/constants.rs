//! Centralized balance and tuning constants for the difficulty engine.
//!
//! These values define the deterministic rule table behind the performance
//! score. Keeping them together means scoring can only be adjusted via code
//! changes reviewed in version control; tier-level tables that designers tune
//! live in [`crate::config`] instead.

// Score bounds -------------------------------------------------------------
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 5.0;
pub const SCORE_BASELINE: f64 = 2.5;

// Calibration --------------------------------------------------------------
pub const DEFAULT_CALIBRATION_COMBATS: u32 = 3;

// Store retention ----------------------------------------------------------
pub(crate) const COMBAT_HISTORY_LIMIT: usize = 10;
pub(crate) const EVENT_LOG_LIMIT: usize = 100;

// Health retention ---------------------------------------------------------
pub(crate) const HEALTH_MAX_PCT: f64 = 100.0;
pub(crate) const HEALTH_EXCELLENT_PCT: f64 = 90.0;
pub(crate) const HEALTH_GOOD_PCT: f64 = 70.0;
pub(crate) const HEALTH_MODERATE_PCT: f64 = 50.0;
pub(crate) const HEALTH_POOR_PCT: f64 = 30.0;
pub(crate) const HEALTH_EXCELLENT_BONUS: f64 = 0.35;
pub(crate) const HEALTH_GOOD_BONUS: f64 = 0.15;
pub(crate) const HEALTH_POOR_PENALTY: f64 = -0.20;
pub(crate) const HEALTH_CRITICAL_PENALTY: f64 = -0.40;
pub(crate) const PERFECT_CLEAR_BONUS: f64 = 0.25;

// Hand quality -------------------------------------------------------------
pub(crate) const HAND_MADE_BONUS: f64 = 0.10;
pub(crate) const HAND_PREMIUM_BONUS: f64 = 0.25;

// Turn efficiency ----------------------------------------------------------
pub(crate) const TURN_FAST_RATIO: f64 = 0.8;
pub(crate) const TURN_SLOW_RATIO: f64 = 1.2;
pub(crate) const TURN_FAST_BONUS: f64 = 0.20;
pub(crate) const TURN_SLOW_PENALTY: f64 = -0.20;

// Damage efficiency --------------------------------------------------------
pub(crate) const DAMAGE_HIGH_RATIO: f64 = 1.3;
pub(crate) const DAMAGE_LOW_RATIO: f64 = 0.7;
pub(crate) const DAMAGE_HIGH_BONUS: f64 = 0.20;
pub(crate) const DAMAGE_LOW_PENALTY: f64 = -0.15;

// Resource thrift ----------------------------------------------------------
pub(crate) const THRIFT_MAX_USAGE: f64 = 0.30;
pub(crate) const THRIFT_BONUS: f64 = 0.15;

// Tier baselines (struggling, learning, thriving, mastering) ---------------
pub(crate) const EXPECTED_TURNS: [u32; 4] = [12, 10, 8, 6];
pub(crate) const EXPECTED_DAMAGE: [f64; 4] = [60.0, 80.0, 100.0, 120.0];

// Classifier defaults ------------------------------------------------------
pub(crate) const LEARNING_MIN_SCORE: f64 = 1.5;
pub(crate) const THRIVING_MIN_SCORE: f64 = 2.75;
pub(crate) const MASTERING_MIN_SCORE: f64 = 4.0;

// Logging targets ----------------------------------------------------------
pub(crate) const LOG_TARGET_SCORE: &str = "bathala_dda::score";
pub(crate) const LOG_TARGET_STORE: &str = "bathala_dda::store";
