//! Poker-style hand ranks reported by the combat loop.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{HAND_MADE_BONUS, HAND_PREMIUM_BONUS};

/// Best hand a player achieved during a combat.
///
/// Unknown names deserialize to [`HandType::Unrecognized`], which scores the
/// same as a high card. A malformed sample never aborts scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HandType {
    #[default]
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    FiveOfAKind,
    RoyalFlush,
    #[serde(other)]
    Unrecognized,
}

/// Coarse quality bands used by the hand factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandQuality {
    /// High card or an unknown hand.
    Low,
    /// Pair through three of a kind.
    Made,
    /// Straight or better.
    Premium,
}

impl HandType {
    pub const ALL: [Self; 11] = [
        Self::HighCard,
        Self::Pair,
        Self::TwoPair,
        Self::ThreeOfAKind,
        Self::Straight,
        Self::Flush,
        Self::FullHouse,
        Self::FourOfAKind,
        Self::StraightFlush,
        Self::FiveOfAKind,
        Self::RoyalFlush,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HighCard => "high_card",
            Self::Pair => "pair",
            Self::TwoPair => "two_pair",
            Self::ThreeOfAKind => "three_of_a_kind",
            Self::Straight => "straight",
            Self::Flush => "flush",
            Self::FullHouse => "full_house",
            Self::FourOfAKind => "four_of_a_kind",
            Self::StraightFlush => "straight_flush",
            Self::FiveOfAKind => "five_of_a_kind",
            Self::RoyalFlush => "royal_flush",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Human readable name, e.g. `Straight Flush`.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::HighCard => "High Card",
            Self::Pair => "Pair",
            Self::TwoPair => "Two Pair",
            Self::ThreeOfAKind => "Three of a Kind",
            Self::Straight => "Straight",
            Self::Flush => "Flush",
            Self::FullHouse => "Full House",
            Self::FourOfAKind => "Four of a Kind",
            Self::StraightFlush => "Straight Flush",
            Self::FiveOfAKind => "Five of a Kind",
            Self::RoyalFlush => "Royal Flush",
            Self::Unrecognized => "Unrecognized Hand",
        }
    }

    #[must_use]
    pub const fn quality(self) -> HandQuality {
        match self {
            Self::HighCard | Self::Unrecognized => HandQuality::Low,
            Self::Pair | Self::TwoPair | Self::ThreeOfAKind => HandQuality::Made,
            Self::Straight
            | Self::Flush
            | Self::FullHouse
            | Self::FourOfAKind
            | Self::StraightFlush
            | Self::FiveOfAKind
            | Self::RoyalFlush => HandQuality::Premium,
        }
    }

    /// Parse a hand name, falling back to [`HandType::Unrecognized`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or(Self::Unrecognized)
    }
}

impl HandQuality {
    /// Unscaled score contribution for this band.
    #[must_use]
    pub const fn score(self) -> f64 {
        match self {
            Self::Low => 0.0,
            Self::Made => HAND_MADE_BONUS,
            Self::Premium => HAND_PREMIUM_BONUS,
        }
    }
}

impl fmt::Display for HandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|hand| hand.as_str() == normalized)
            .ok_or(())
    }
}
