//! Finished-combat measurements consumed by the scoring engine.
use serde::{Deserialize, Serialize};

use crate::constants::HEALTH_MAX_PCT;
use crate::hand::HandType;
use crate::numbers::{clamp_finite, non_negative, ratio};

/// Enemy classification carried as telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    #[default]
    Common,
    Elite,
    Boss,
}

/// Opaque enemy metadata. Never read by the scoring math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EnemyInfo {
    #[serde(default)]
    pub kind: EnemyKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub start_health: u32,
}

/// Measurement of a single victorious combat.
///
/// Raw fields are kept as reported; the accessor methods apply the fail-soft
/// sanitizing rules so scoring never divides by zero or looks up an
/// out-of-range percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatSample {
    #[serde(default)]
    pub combat_id: Option<String>,
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
    pub health_percentage: f64,
    pub turn_count: u32,
    #[serde(default)]
    pub damage_dealt: f64,
    #[serde(default)]
    pub damage_received: f64,
    #[serde(default)]
    pub discards_used: u32,
    #[serde(default = "default_max_discards")]
    pub max_discards_available: u32,
    #[serde(default)]
    pub best_hand: HandType,
    #[serde(default)]
    pub hands_played: Vec<HandType>,
    #[serde(default)]
    pub enemy: Option<EnemyInfo>,
}

const fn default_max_discards() -> u32 {
    3
}

impl CombatSample {
    #[must_use]
    pub fn new(health_percentage: f64, turn_count: u32, damage_dealt: f64, best_hand: HandType) -> Self {
        Self {
            combat_id: None,
            timestamp_ms: None,
            health_percentage,
            turn_count,
            damage_dealt,
            damage_received: 0.0,
            discards_used: 0,
            max_discards_available: default_max_discards(),
            best_hand,
            hands_played: Vec::new(),
            enemy: None,
        }
    }

    #[must_use]
    pub fn with_combat_id(mut self, combat_id: impl Into<String>) -> Self {
        self.combat_id = Some(combat_id.into());
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }

    #[must_use]
    pub fn with_discards(mut self, used: u32, available: u32) -> Self {
        self.discards_used = used;
        self.max_discards_available = available;
        self
    }

    #[must_use]
    pub fn with_damage_received(mut self, damage_received: f64) -> Self {
        self.damage_received = damage_received;
        self
    }

    #[must_use]
    pub fn with_hands_played(mut self, hands: Vec<HandType>) -> Self {
        self.hands_played = hands;
        self
    }

    #[must_use]
    pub fn with_enemy(mut self, enemy: EnemyInfo) -> Self {
        self.enemy = Some(enemy);
        self
    }

    /// Remaining health clamped into `[0, 100]`.
    #[must_use]
    pub fn health_pct(&self) -> f64 {
        clamp_finite(self.health_percentage, 0.0, HEALTH_MAX_PCT)
    }

    /// Turn count with a floor of one.
    #[must_use]
    pub const fn turns(&self) -> u32 {
        if self.turn_count == 0 { 1 } else { self.turn_count }
    }

    #[must_use]
    pub fn damage(&self) -> f64 {
        non_negative(self.damage_dealt)
    }

    /// Damage dealt per turn.
    #[must_use]
    pub fn damage_per_turn(&self) -> f64 {
        self.damage() / crate::numbers::u32_to_f64(self.turns())
    }

    /// Share of available discards spent, `0.0..`.
    #[must_use]
    pub fn discard_usage(&self) -> f64 {
        ratio(self.discards_used, self.max_discards_available)
    }

    /// A flawless clear ends at exactly full health.
    #[must_use]
    pub fn is_perfect_clear(&self) -> bool {
        self.health_pct() >= HEALTH_MAX_PCT
    }
}
