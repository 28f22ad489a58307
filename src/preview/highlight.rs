use std::collections::BTreeMap;

use crate::game::{DiceGroups, GameSnapshot, Pairing, dice_groups_for_pairing};
use crate::types::PairColor;

/// Where the active pairing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveSource {
    /// Pointer over an entry of `available_pairings`.
    Hover { available_index: usize },
    /// A choose-one selection, indexing `valid_pairings`.
    PendingChoice { valid_index: usize },
}

/// The pairing driving highlights and previews, with its position in both
/// pairing lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePairing {
    pub pairing: Pairing,
    pub source: ActiveSource,
    pub available_index: Option<usize>,
    pub valid_index: Option<usize>,
}

/// Picks the active pairing. A pending choice is authoritative over hover;
/// hover is ignored entirely while the snapshot is locked. Nothing is active
/// without dice on the table.
pub fn resolve_active(
    snapshot: &GameSnapshot,
    hovered_pairing: Option<usize>,
    pending_choice: Option<usize>,
) -> Option<ActivePairing> {
    if !snapshot.has_dice() {
        return None;
    }

    if let Some(valid_index) = pending_choice {
        let reported = *snapshot.valid_pairings.get(valid_index)?;
        let available_index = snapshot.available_index_of(&reported);
        // slot order follows the dice grouping, so group1 always makes the first sum
        let pairing = available_index
            .and_then(|index| snapshot.available_pairings.get(index).copied())
            .unwrap_or(reported);
        return Some(ActivePairing {
            pairing,
            source: ActiveSource::PendingChoice { valid_index },
            available_index,
            valid_index: Some(valid_index),
        });
    }

    if snapshot.is_locked() {
        return None;
    }

    let available_index = hovered_pairing?;
    let pairing = *snapshot.available_pairings.get(available_index)?;
    Some(ActivePairing {
        pairing,
        source: ActiveSource::Hover { available_index },
        available_index: Some(available_index),
        valid_index: snapshot.valid_index_of(&pairing),
    })
}

/// Color(s) a sum badge is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SumHighlight {
    Single(PairColor),
    /// Both sums of the pairing share this value.
    Both,
}

impl SumHighlight {
    pub fn colors(&self) -> &'static [PairColor] {
        match self {
            SumHighlight::Single(PairColor::Pair1) => &[PairColor::Pair1],
            SumHighlight::Single(PairColor::Pair2) => &[PairColor::Pair2],
            SumHighlight::Both => &PairColor::ALL,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlight {
    pub dice: DiceGroups,
    pub sums: BTreeMap<u8, SumHighlight>,
}

impl Highlight {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.dice.is_empty() && self.sums.is_empty()
    }

    pub fn die_color(&self, die: usize) -> Option<PairColor> {
        self.dice.color_of(die)
    }

    pub fn sum(&self, value: u8) -> Option<SumHighlight> {
        self.sums.get(&value).copied()
    }
}

pub fn resolve_highlight(active: Option<&ActivePairing>) -> Highlight {
    let Some(active) = active else {
        return Highlight::none();
    };

    let dice = active
        .available_index
        .map(dice_groups_for_pairing)
        .unwrap_or_default();

    let pairing = active.pairing;
    let mut sums = BTreeMap::new();
    if pairing.is_double() {
        sums.insert(pairing.first(), SumHighlight::Both);
    } else {
        sums.insert(pairing.first(), SumHighlight::Single(PairColor::Pair1));
        sums.insert(pairing.second(), SumHighlight::Single(PairColor::Pair2));
    }

    Highlight { dice, sums }
}
