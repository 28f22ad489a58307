use smallvec::SmallVec;

use crate::game::{GameSnapshot, PairingPlayability};
use crate::preview::highlight::{ActivePairing, ActiveSource};
use crate::types::{MarkerColor, PairColor};

/// Provisional marker showing where a sum would land if confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewMarker {
    pub column: u8,
    pub color: MarkerColor,
    /// Steps above the acting player's current top position.
    pub offset: u8,
    pub is_valid: bool,
    /// Translucent markers (`false`) mean "pick one".
    pub is_solid: bool,
}

impl PreviewMarker {
    pub fn position(&self, snapshot: &GameSnapshot) -> u8 {
        snapshot.top_position(self.column).saturating_add(self.offset)
    }
}

pub type PreviewMarkers = SmallVec<[PreviewMarker; 2]>;

/// Playability of the active pairing in its own slot order. A hovered pairing
/// absent from `valid_pairings` plays nothing.
pub fn playability_for(snapshot: &GameSnapshot, active: &ActivePairing) -> PairingPlayability {
    match active.source {
        ActiveSource::PendingChoice { valid_index } => {
            match snapshot.valid_pairings.get(valid_index) {
                Some(reported) => snapshot
                    .playability_at(valid_index)
                    .oriented(reported, &active.pairing),
                None => PairingPlayability::NONE,
            }
        }
        ActiveSource::Hover { .. } => snapshot.playability_of(&active.pairing),
    }
}

/// Slot of the hovered sum when sum hover applies: only on a choose-one
/// pairing and only for one of its own sums.
pub fn hovered_slot(
    active: &ActivePairing,
    playability: &PairingPlayability,
    hovered_sum: Option<u8>,
) -> Option<PairColor> {
    if !playability.needs_choice {
        return None;
    }
    active.pairing.slot_of(hovered_sum?)
}

pub fn generate_previews(
    snapshot: &GameSnapshot,
    active: &ActivePairing,
    hovered_sum: Option<u8>,
) -> PreviewMarkers {
    let pairing = active.pairing;
    let playability = playability_for(snapshot, active);
    let double = pairing.is_double();

    let marker = |slot: PairColor, color: MarkerColor, is_valid: bool, is_solid: bool| {
        let offset = if double && slot == PairColor::Pair2 { 2 } else { 1 };
        PreviewMarker {
            column: pairing.sum(slot),
            color,
            offset,
            is_valid,
            is_solid,
        }
    };

    let mut markers = PreviewMarkers::new();

    if let Some(hovered) = hovered_slot(active, &playability, hovered_sum) {
        // the hovered sum is kept, the other one is forfeited
        for slot in PairColor::ALL {
            if slot == hovered {
                markers.push(marker(slot, slot.into(), true, true));
            } else {
                markers.push(marker(slot, MarkerColor::Invalid, false, true));
            }
        }
        return markers;
    }

    let is_solid = !playability.needs_choice;
    for slot in PairColor::ALL {
        markers.push(marker(
            slot,
            slot.into(),
            playability.slot_playable(slot),
            is_solid,
        ));
    }
    markers
}
