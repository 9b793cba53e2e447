//! Bonus tiles awarded when the max tile first reaches a milestone.
//!
//! Bonus values are odd, so they can never collide with a regular power-of-two
//! tile. They slide with the rest of the line but never merge.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusKind {
    Star,
    Clover,
    Gem,
}

impl BonusKind {
    pub const ALL: [BonusKind; 3] = [BonusKind::Star, BonusKind::Clover, BonusKind::Gem];

    /// The value written into the grid cell.
    pub fn value(self) -> u32 {
        match self {
            BonusKind::Star => 3,
            BonusKind::Clover => 5,
            BonusKind::Gem => 7,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BonusKind::Star => "★",
            BonusKind::Clover => "♣",
            BonusKind::Gem => "◆",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BonusKind::Star => "Star: a lucky blocker that never merges",
            BonusKind::Clover => "Clover: a keepsake tile that never merges",
            BonusKind::Gem => "Gem: a shiny tile that never merges",
        }
    }

    pub fn from_value(value: u32) -> Option<BonusKind> {
        BonusKind::ALL.into_iter().find(|kind| kind.value() == value)
    }

    pub fn is_bonus_value(value: u32) -> bool {
        BonusKind::from_value(value).is_some()
    }

    /// Pick a kind uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> BonusKind {
        BonusKind::ALL[rng.gen_range(0..BonusKind::ALL.len())]
    }
}
