use bathala_dda::{CombatSample, EnemyInfo, EnemyKind, HandType};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

const ENEMY_NAMES: [&str; 6] = [
    "Tikbalang",
    "Sigbin",
    "Manananggal",
    "Aswang",
    "Bungisngis",
    "Kapre",
];
const COMBAT_SPACING_MS: u64 = 90_000;

/// Archetype of player behavior used to synthesize combat results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerProfile {
    Flawless,
    Skilled,
    Steady,
    Struggling,
    NearDeath,
    /// Picks one of the other profiles at random for every combat.
    Erratic,
}

struct ProfileRanges {
    health: RangeInclusive<f64>,
    turns: RangeInclusive<u32>,
    damage: RangeInclusive<f64>,
    /// Index range into [`HandType::ALL`].
    hands: RangeInclusive<usize>,
    discards: RangeInclusive<u32>,
}

impl PlayerProfile {
    pub const ALL: [Self; 6] = [
        Self::Flawless,
        Self::Skilled,
        Self::Steady,
        Self::Struggling,
        Self::NearDeath,
        Self::Erratic,
    ];

    const CONCRETE: [Self; 5] = [
        Self::Flawless,
        Self::Skilled,
        Self::Steady,
        Self::Struggling,
        Self::NearDeath,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flawless => "flawless",
            Self::Skilled => "skilled",
            Self::Steady => "steady",
            Self::Struggling => "struggling",
            Self::NearDeath => "near-death",
            Self::Erratic => "erratic",
        }
    }

    fn ranges(self) -> ProfileRanges {
        match self {
            Self::Flawless => ProfileRanges {
                health: 100.0..=100.0,
                turns: 3..=6,
                damage: 100.0..=180.0,
                hands: 4..=10,
                discards: 0..=0,
            },
            Self::Skilled => ProfileRanges {
                health: 75.0..=100.0,
                turns: 5..=9,
                damage: 80.0..=140.0,
                hands: 2..=7,
                discards: 0..=2,
            },
            Self::Steady | Self::Erratic => ProfileRanges {
                health: 50.0..=80.0,
                turns: 8..=12,
                damage: 60.0..=100.0,
                hands: 0..=4,
                discards: 1..=3,
            },
            Self::Struggling => ProfileRanges {
                health: 20.0..=55.0,
                turns: 11..=18,
                damage: 40.0..=80.0,
                hands: 0..=2,
                discards: 2..=3,
            },
            Self::NearDeath => ProfileRanges {
                health: 1.0..=15.0,
                turns: 16..=24,
                damage: 20.0..=50.0,
                hands: 0..=1,
                discards: 3..=3,
            },
        }
    }
}

impl fmt::Display for PlayerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|profile| profile.as_str() == normalized)
            .ok_or_else(|| format!("unknown player profile '{s}'"))
    }
}

/// Deterministic stream of combat samples for one session.
#[derive(Debug, Clone)]
pub struct CombatGenerator {
    rng: ChaCha20Rng,
    seed: u64,
    next_combat: u64,
}

impl CombatGenerator {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed,
            next_combat: 0,
        }
    }

    /// Produce the next sample for `profile`. Returns the concrete profile
    /// used, which differs from the input only for [`PlayerProfile::Erratic`].
    pub fn next_sample(&mut self, profile: PlayerProfile) -> (PlayerProfile, CombatSample) {
        let concrete = if profile == PlayerProfile::Erratic {
            PlayerProfile::CONCRETE[self.rng.gen_range(0..PlayerProfile::CONCRETE.len())]
        } else {
            profile
        };
        let ranges = concrete.ranges();

        let health = self.rng.gen_range(ranges.health.clone());
        let turns = self.rng.gen_range(ranges.turns.clone());
        let damage = self.rng.gen_range(ranges.damage.clone());
        let best_index = self.rng.gen_range(ranges.hands.clone());
        let best_hand = HandType::ALL[best_index];
        let discards = self.rng.gen_range(ranges.discards.clone());
        let hands_played = (0..turns.min(5))
            .map(|_| HandType::ALL[self.rng.gen_range(0..=best_index)])
            .collect();

        self.next_combat += 1;
        let combat = self.next_combat;
        let enemy = self.next_enemy(combat);
        let sample = CombatSample::new(health, turns, damage, best_hand)
            .with_discards(discards, 3)
            .with_combat_id(format!("s{}-c{combat}", self.seed))
            .with_timestamp(combat * COMBAT_SPACING_MS)
            .with_damage_received((100.0 - health).max(0.0))
            .with_hands_played(hands_played)
            .with_enemy(enemy);
        (concrete, sample)
    }

    fn next_enemy(&mut self, combat: u64) -> EnemyInfo {
        let kind = match combat % 8 {
            0 => EnemyKind::Boss,
            4 => EnemyKind::Elite,
            _ => EnemyKind::Common,
        };
        let name = ENEMY_NAMES[self.rng.gen_range(0..ENEMY_NAMES.len())];
        let start_health = match kind {
            EnemyKind::Common => self.rng.gen_range(40..=80),
            EnemyKind::Elite => self.rng.gen_range(90..=140),
            EnemyKind::Boss => self.rng.gen_range(200..=300),
        };
        EnemyInfo {
            kind,
            name: name.to_string(),
            start_health,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = CombatGenerator::new(7);
        let mut b = CombatGenerator::new(7);
        for _ in 0..20 {
            assert_eq!(
                a.next_sample(PlayerProfile::Erratic),
                b.next_sample(PlayerProfile::Erratic)
            );
        }
    }

    #[test]
    fn profiles_stay_inside_their_ranges() {
        let mut generator = CombatGenerator::new(11);
        for _ in 0..50 {
            let (_, sample) = generator.next_sample(PlayerProfile::NearDeath);
            assert!(sample.health_percentage <= 15.0);
            assert!(sample.turn_count >= 16);
            assert_eq!(sample.discards_used, 3);

            let (_, sample) = generator.next_sample(PlayerProfile::Flawless);
            assert!(sample.is_perfect_clear());
            assert!(sample.turn_count <= 6);
        }
    }

    #[test]
    fn erratic_resolves_to_a_concrete_profile() {
        let mut generator = CombatGenerator::new(3);
        for _ in 0..30 {
            let (profile, _) = generator.next_sample(PlayerProfile::Erratic);
            assert_ne!(profile, PlayerProfile::Erratic);
        }
    }

    #[test]
    fn combat_ids_are_unique_per_session() {
        let mut generator = CombatGenerator::new(5);
        let ids: std::collections::HashSet<_> = (0..25)
            .filter_map(|_| generator.next_sample(PlayerProfile::Steady).1.combat_id)
            .collect();
        assert_eq!(ids.len(), 25);
    }

    #[test]
    fn profile_names_parse() {
        assert_eq!("near_death".parse::<PlayerProfile>(), Ok(PlayerProfile::NearDeath));
        assert_eq!("Flawless".parse::<PlayerProfile>(), Ok(PlayerProfile::Flawless));
        assert!("godlike".parse::<PlayerProfile>().is_err());
    }
}
