use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game::pairing::{DICE_COUNT, Pairing, pairings_from_dice};
use crate::types::{PairColor, Player};

pub const MAX_RUNNERS: usize = 3;
pub const COLUMNS_TO_WIN: usize = 3;

/// Track length of every column on the standard board.
pub const STANDARD_COLUMN_LENGTHS: [(u8, u8); 11] = [
    (2, 3),
    (3, 5),
    (4, 7),
    (5, 9),
    (6, 11),
    (7, 13),
    (8, 11),
    (9, 9),
    (10, 7),
    (11, 5),
    (12, 3),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingPlayability {
    pub sum1_playable: bool,
    pub sum2_playable: bool,
    pub both_can_apply: bool,
    /// Both sums are playable on their own but only one can be applied.
    pub needs_choice: bool,
}

impl PairingPlayability {
    pub const NONE: PairingPlayability = PairingPlayability {
        sum1_playable: false,
        sum2_playable: false,
        both_can_apply: false,
        needs_choice: false,
    };

    pub fn any_playable(&self) -> bool {
        self.sum1_playable || self.sum2_playable
    }

    pub fn slot_playable(&self, slot: PairColor) -> bool {
        match slot {
            PairColor::Pair1 => self.sum1_playable,
            PairColor::Pair2 => self.sum2_playable,
        }
    }

    /// Flags reported for `reported` rearranged to the slot order of `shown`,
    /// which holds the same sums possibly listed the other way round.
    pub fn oriented(self, reported: &Pairing, shown: &Pairing) -> Self {
        if reported.first() == shown.first() {
            return self;
        }
        Self {
            sum1_playable: self.sum2_playable,
            sum2_playable: self.sum1_playable,
            ..self
        }
    }
}

/// Full game state as returned by every game-service call. Missing fields
/// fall back to empty values so a partial payload renders as "nothing to
/// show" instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSnapshot {
    pub current_dice: Option<Vec<u8>>,
    pub available_pairings: Vec<Pairing>,
    pub valid_pairings: Vec<Pairing>,
    pub pairing_playability: Vec<PairingPlayability>,
    pub column_lengths: BTreeMap<u8, u8>,
    pub player1_permanent: BTreeMap<u8, u8>,
    pub player2_permanent: BTreeMap<u8, u8>,
    pub temp_progress: BTreeMap<u8, u8>,
    pub active_runners: Vec<u8>,
    pub player1_completed: Vec<u8>,
    pub player2_completed: Vec<u8>,
    pub current_player: Player,
    pub is_bust: bool,
    pub game_over: bool,
    pub winner: Option<Player>,
    pub last_chosen_pairing_index: Option<usize>,
}

impl GameSnapshot {
    /// Dice of the current roll, only when all four are present.
    pub fn dice(&self) -> Option<[u8; DICE_COUNT]> {
        let dice = self.current_dice.as_deref()?;
        <[u8; DICE_COUNT]>::try_from(dice).ok()
    }

    pub fn has_dice(&self) -> bool {
        self.current_dice.is_some()
    }

    /// Whether `available_pairings` lists the sums of the current dice in
    /// grouping order. Dice highlights index the fixed groupings, so a
    /// mismatch means they would point at the wrong dice. Vacuously true
    /// without a full roll.
    pub fn pairings_match_dice(&self) -> bool {
        let Some(dice) = self.dice() else {
            return true;
        };
        let expected = pairings_from_dice(&dice);
        self.available_pairings.len() == expected.len()
            && self
                .available_pairings
                .iter()
                .zip(&expected)
                .all(|(listed, computed)| listed.same_sums(computed))
    }

    pub fn has_valid_moves(&self) -> bool {
        !self.valid_pairings.is_empty()
    }

    /// A move was just applied in this roll-choose exchange; every pairing
    /// stays locked until the next roll.
    pub fn is_locked(&self) -> bool {
        self.last_chosen_pairing_index.is_some()
    }

    pub fn valid_index_of(&self, pairing: &Pairing) -> Option<usize> {
        pairing.find_in(&self.valid_pairings)
    }

    pub fn available_index_of(&self, pairing: &Pairing) -> Option<usize> {
        pairing.find_in(&self.available_pairings)
    }

    pub fn playability_at(&self, valid_index: usize) -> PairingPlayability {
        self.pairing_playability
            .get(valid_index)
            .copied()
            .unwrap_or(PairingPlayability::NONE)
    }

    /// Playability of `pairing` matched by value, with the sum flags in
    /// `pairing`'s own slot order.
    pub fn playability_of(&self, pairing: &Pairing) -> PairingPlayability {
        let Some(index) = self.valid_index_of(pairing) else {
            return PairingPlayability::NONE;
        };
        self.playability_at(index)
            .oriented(&self.valid_pairings[index], pairing)
    }

    pub fn columns(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.column_lengths.iter().map(|(col, len)| (*col, *len))
    }

    pub fn column_length(&self, column: u8) -> Option<u8> {
        self.column_lengths.get(&column).copied()
    }

    pub fn permanent(&self, player: Player, column: u8) -> u8 {
        let progress = match player {
            Player::One => &self.player1_permanent,
            Player::Two => &self.player2_permanent,
        };
        progress.get(&column).copied().unwrap_or(0)
    }

    pub fn temp(&self, column: u8) -> u8 {
        self.temp_progress.get(&column).copied().unwrap_or(0)
    }

    pub fn has_temp_progress(&self) -> bool {
        !self.temp_progress.is_empty()
    }

    /// Top position of the acting player in `column`, counting this turn's
    /// uncommitted progress.
    pub fn top_position(&self, column: u8) -> u8 {
        self.permanent(self.current_player, column)
            .saturating_add(self.temp(column))
    }

    pub fn completed(&self, player: Player) -> &[u8] {
        match player {
            Player::One => &self.player1_completed,
            Player::Two => &self.player2_completed,
        }
    }

    pub fn completed_by(&self, column: u8) -> Option<Player> {
        Player::ALL
            .into_iter()
            .find(|player| self.completed(*player).contains(&column))
    }

    pub fn is_completed(&self, column: u8) -> bool {
        self.completed_by(column).is_some()
    }

    pub fn is_active(&self, column: u8) -> bool {
        self.active_runners.contains(&column)
    }

    pub fn runners_exhausted(&self) -> bool {
        self.active_runners.len() >= MAX_RUNNERS
    }
}
