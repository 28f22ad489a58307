use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::types::PairColor;

pub const DICE_COUNT: usize = 4;
pub const PAIRINGS_PER_ROLL: usize = 3;

/// Canonical split of four dice into two groups of two. The position in this
/// table is the pairing index used by the game service for
/// `available_pairings`.
const DICE_GROUPINGS: [([usize; 2], [usize; 2]); PAIRINGS_PER_ROLL] = [
    ([0, 1], [2, 3]),
    ([0, 2], [1, 3]),
    ([0, 3], [1, 2]),
];

/// Two sums produced by one way of splitting the dice. Serialized as a
/// two-element array, matching the game service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pairing(pub u8, pub u8);

impl Pairing {
    pub const fn new(first: u8, second: u8) -> Self {
        Self(first, second)
    }

    pub fn first(&self) -> u8 {
        self.0
    }

    pub fn second(&self) -> u8 {
        self.1
    }

    pub fn sum(&self, slot: PairColor) -> u8 {
        match slot {
            PairColor::Pair1 => self.0,
            PairColor::Pair2 => self.1,
        }
    }

    pub fn is_double(&self) -> bool {
        self.0 == self.1
    }

    pub fn contains(&self, sum: u8) -> bool {
        self.0 == sum || self.1 == sum
    }

    /// Slot holding `sum`. For a double the first slot wins.
    pub fn slot_of(&self, sum: u8) -> Option<PairColor> {
        if self.0 == sum {
            Some(PairColor::Pair1)
        } else if self.1 == sum {
            Some(PairColor::Pair2)
        } else {
            None
        }
    }

    /// Unordered comparison: `(3, 7)` matches `(7, 3)`.
    pub fn same_sums(&self, other: &Pairing) -> bool {
        (self.0 == other.0 && self.1 == other.1) || (self.0 == other.1 && self.1 == other.0)
    }

    /// Index of the first entry in `pairings` with the same sums. This is the
    /// only place pairings from differently ordered lists are matched.
    pub fn find_in(&self, pairings: &[Pairing]) -> Option<usize> {
        pairings.iter().position(|candidate| self.same_sums(candidate))
    }
}

impl fmt::Display for Pairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}", self.0, self.1)
    }
}

/// Dice indices feeding each sum of a pairing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiceGroups {
    pub group1: SmallVec<[usize; 2]>,
    pub group2: SmallVec<[usize; 2]>,
}

impl DiceGroups {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.group1.is_empty() && self.group2.is_empty()
    }

    pub fn color_of(&self, die: usize) -> Option<PairColor> {
        if self.group1.contains(&die) {
            Some(PairColor::Pair1)
        } else if self.group2.contains(&die) {
            Some(PairColor::Pair2)
        } else {
            None
        }
    }

    /// Drops the dice of every group except `color`.
    pub fn keep_only(mut self, color: PairColor) -> Self {
        match color {
            PairColor::Pair1 => self.group2.clear(),
            PairColor::Pair2 => self.group1.clear(),
        }
        self
    }
}

/// Maps an index into `available_pairings` to the dice forming each sum.
/// Out of range yields two empty groups.
pub fn dice_groups_for_pairing(available_index: usize) -> DiceGroups {
    match DICE_GROUPINGS.get(available_index) {
        Some((group1, group2)) => DiceGroups {
            group1: SmallVec::from_slice(group1),
            group2: SmallVec::from_slice(group2),
        },
        None => DiceGroups::empty(),
    }
}

/// Sums of the three canonical groupings, in pairing-index order.
pub fn pairings_from_dice(dice: &[u8; DICE_COUNT]) -> [Pairing; PAIRINGS_PER_ROLL] {
    DICE_GROUPINGS.map(|([a, b], [c, d])| {
        Pairing(
            dice[a].saturating_add(dice[b]),
            dice[c].saturating_add(dice[d]),
        )
    })
}
