use strum::Display;

use crate::game::{GameSnapshot, Pairing, PairingPlayability};
use crate::preview::Interaction;
use crate::preview::selection::SelectionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DisabledReason {
    #[strum(serialize = "Both completed")]
    BothCompleted,
    #[strum(serialize = "No room (3 runners)")]
    NoRoom,
    #[strum(serialize = "Cannot play")]
    CannotPlay,
}

/// One entry of `available_pairings` as the pairing selector shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingOption {
    pub available_index: usize,
    pub pairing: Pairing,
    /// Position in `valid_pairings`, matched by value.
    pub valid_index: Option<usize>,
    /// Flags in this option's slot order; all false for invalid pairings.
    pub playability: PairingPlayability,
    pub locked: bool,
    pub was_chosen: bool,
    pub selected: bool,
    pub hovered: bool,
    pub disabled_reason: Option<DisabledReason>,
}

impl PairingOption {
    pub fn is_valid(&self) -> bool {
        self.valid_index.is_some()
    }

    pub fn needs_choice(&self) -> bool {
        self.is_valid() && self.playability.needs_choice
    }

    /// A whole-pairing click would confirm this option.
    pub fn is_clickable(&self) -> bool {
        self.is_valid() && !self.locked && !self.needs_choice()
    }

    /// Individual sums are the click targets.
    pub fn sums_clickable(&self) -> bool {
        self.needs_choice() && !self.locked
    }
}

fn disabled_reason(
    snapshot: &GameSnapshot,
    pairing: &Pairing,
    valid: bool,
    playability: &PairingPlayability,
) -> Option<DisabledReason> {
    if valid || playability.any_playable() {
        return None;
    }
    if snapshot.is_completed(pairing.first()) && snapshot.is_completed(pairing.second()) {
        Some(DisabledReason::BothCompleted)
    } else if snapshot.runners_exhausted() {
        Some(DisabledReason::NoRoom)
    } else {
        Some(DisabledReason::CannotPlay)
    }
}

pub fn pairing_options(
    snapshot: &GameSnapshot,
    interaction: &Interaction,
    selection: &SelectionState,
) -> Vec<PairingOption> {
    let locked = snapshot.is_locked();
    let selected = selection.selected_index();

    snapshot
        .available_pairings
        .iter()
        .enumerate()
        .map(|(available_index, pairing)| {
            let valid_index = snapshot.valid_index_of(pairing);
            let playability = snapshot.playability_of(pairing);

            PairingOption {
                available_index,
                pairing: *pairing,
                valid_index,
                playability,
                locked,
                was_chosen: valid_index.is_some()
                    && snapshot.last_chosen_pairing_index == valid_index,
                selected: valid_index.is_some() && selected == valid_index,
                hovered: interaction.hovered_pairing == Some(available_index),
                disabled_reason: disabled_reason(
                    snapshot,
                    pairing,
                    valid_index.is_some(),
                    &playability,
                ),
            }
        })
        .collect()
}
