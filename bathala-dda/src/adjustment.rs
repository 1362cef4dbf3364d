//! Tier-derived multipliers consumed by enemy generation and reward code.
use serde::{Deserialize, Serialize};

use crate::tier::DifficultyTier;

/// One value per tier, ordered struggling → mastering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierValues {
    pub struggling: f64,
    pub learning: f64,
    pub thriving: f64,
    pub mastering: f64,
}

impl TierValues {
    #[must_use]
    pub const fn new(struggling: f64, learning: f64, thriving: f64, mastering: f64) -> Self {
        Self {
            struggling,
            learning,
            thriving,
            mastering,
        }
    }

    #[must_use]
    pub const fn get(&self, tier: DifficultyTier) -> f64 {
        match tier {
            DifficultyTier::Struggling => self.struggling,
            DifficultyTier::Learning => self.learning,
            DifficultyTier::Thriving => self.thriving,
            DifficultyTier::Mastering => self.mastering,
        }
    }

    pub(crate) fn values(&self) -> [f64; 4] {
        [self.struggling, self.learning, self.thriving, self.mastering]
    }
}

const DEFAULT_ENEMY_SCALE: TierValues = TierValues::new(0.80, 1.00, 1.15, 1.30);
const DEFAULT_SHOP_PRICE: TierValues = TierValues::new(0.8, 1.0, 1.1, 1.2);
const DEFAULT_REST_NODE_BIAS: TierValues = TierValues::new(0.30, 0.20, 0.15, 0.10);

/// Lookup tables behind [`DifficultyAdjustment`].
///
/// Enemy health, enemy damage and reward scaling are separate named tables
/// that share one default, so they can be tuned apart later without changing
/// the adjustment interface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyTable {
    #[serde(default = "DifficultyTable::default_enemy_scale")]
    pub enemy_health: TierValues,
    #[serde(default = "DifficultyTable::default_enemy_scale")]
    pub enemy_damage: TierValues,
    #[serde(default = "DifficultyTable::default_enemy_scale")]
    pub reward: TierValues,
    #[serde(default = "DifficultyTable::default_shop_price")]
    pub shop_price: TierValues,
    #[serde(default = "DifficultyTable::default_rest_node_bias")]
    pub rest_node_bias: TierValues,
}

impl DifficultyTable {
    const fn default_enemy_scale() -> TierValues {
        DEFAULT_ENEMY_SCALE
    }

    const fn default_shop_price() -> TierValues {
        DEFAULT_SHOP_PRICE
    }

    const fn default_rest_node_bias() -> TierValues {
        DEFAULT_REST_NODE_BIAS
    }

    #[must_use]
    pub const fn enemy_scale_multiplier(&self, tier: DifficultyTier) -> f64 {
        self.enemy_health.get(tier)
    }

    #[must_use]
    pub const fn reward_multiplier(&self, tier: DifficultyTier) -> f64 {
        self.reward.get(tier)
    }

    pub(crate) fn multiplier_tables(&self) -> [(&'static str, TierValues); 4] {
        [
            ("enemy_health", self.enemy_health),
            ("enemy_damage", self.enemy_damage),
            ("reward", self.reward),
            ("shop_price", self.shop_price),
        ]
    }
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            enemy_health: DEFAULT_ENEMY_SCALE,
            enemy_damage: DEFAULT_ENEMY_SCALE,
            reward: DEFAULT_ENEMY_SCALE,
            shop_price: DEFAULT_SHOP_PRICE,
            rest_node_bias: DEFAULT_REST_NODE_BIAS,
        }
    }
}

/// Multipliers to apply to the next encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyAdjustment {
    pub tier: DifficultyTier,
    pub enemy_health_multiplier: f64,
    pub enemy_damage_multiplier: f64,
    pub reward_multiplier: f64,
    pub shop_price_multiplier: f64,
    pub rest_node_bias: f64,
    pub narrative_context: String,
}

/// Flavor line shown alongside a tier.
#[must_use]
pub const fn narrative_for(tier: DifficultyTier) -> &'static str {
    match tier {
        DifficultyTier::Struggling => "The spirits sense your struggle and offer gentle guidance...",
        DifficultyTier::Learning => "You walk the balanced path, learning the ways of combat...",
        DifficultyTier::Thriving => "Your growing power attracts stronger challenges...",
        DifficultyTier::Mastering => {
            "The ancient forces recognize your mastery and send their greatest trials..."
        }
    }
}

/// Narrative shown while calibration holds the tier.
#[must_use]
pub fn calibration_narrative(combats_completed: u32, combats_required: u32) -> String {
    format!(
        "Observing your technique... ({combats_completed}/{combats_required} calibration combats)"
    )
}

/// Stateless tier → multiplier lookup.
#[must_use]
pub fn compute_adjustment(
    table: &DifficultyTable,
    tier: DifficultyTier,
    narrative_context: String,
) -> DifficultyAdjustment {
    DifficultyAdjustment {
        tier,
        enemy_health_multiplier: table.enemy_health.get(tier),
        enemy_damage_multiplier: table.enemy_damage.get(tier),
        reward_multiplier: table.reward.get(tier),
        shop_price_multiplier: table.shop_price.get(tier),
        rest_node_bias: table.rest_node_bias.get(tier),
        narrative_context,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_enemy_scale_matches_tier_table() {
        let table = DifficultyTable::default();
        let expected = [0.80, 1.00, 1.15, 1.30];
        for (tier, value) in DifficultyTier::ALL.into_iter().zip(expected) {
            assert!((table.enemy_scale_multiplier(tier) - value).abs() < f64::EPSILON);
            assert!((table.reward_multiplier(tier) - value).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn reward_table_can_diverge_from_enemy_scale() {
        let table = DifficultyTable {
            reward: TierValues::new(1.2, 1.0, 0.9, 0.8),
            ..DifficultyTable::default()
        };
        let adjustment = compute_adjustment(
            &table,
            DifficultyTier::Mastering,
            narrative_for(DifficultyTier::Mastering).to_string(),
        );
        assert!((adjustment.enemy_health_multiplier - 1.30).abs() < f64::EPSILON);
        assert!((adjustment.reward_multiplier - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn adjustment_carries_economy_and_map_bias() {
        let adjustment = compute_adjustment(
            &DifficultyTable::default(),
            DifficultyTier::Struggling,
            String::new(),
        );
        assert!((adjustment.shop_price_multiplier - 0.8).abs() < f64::EPSILON);
        assert!((adjustment.rest_node_bias - 0.30).abs() < f64::EPSILON);
        assert!((adjustment.enemy_damage_multiplier - 0.80).abs() < f64::EPSILON);
    }

    #[test]
    fn calibration_narrative_reports_progress() {
        assert_eq!(
            calibration_narrative(1, 3),
            "Observing your technique... (1/3 calibration combats)"
        );
    }
}
