//! Move preview engine: everything the player sees before committing a move
//! is derived here from the latest snapshot and the current pointer state.
//! Nothing is cached between calls.

pub mod highlight;
pub mod markers;
pub mod options;
pub mod selection;

use crate::game::GameSnapshot;

pub use highlight::{ActivePairing, ActiveSource, Highlight, SumHighlight};
pub use markers::{PreviewMarker, PreviewMarkers};
pub use options::{DisabledReason, PairingOption};
pub use selection::SelectionState;

/// Transient pointer state. Pairing hover indexes `available_pairings`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interaction {
    pub hovered_pairing: Option<usize>,
    pub hovered_sum: Option<u8>,
}

impl Interaction {
    /// Hovering a pairing resets sum hover. Refused while the snapshot is
    /// locked.
    pub fn hover_pairing(&mut self, snapshot: &GameSnapshot, index: Option<usize>) {
        if index.is_some() && snapshot.is_locked() {
            return;
        }
        if self.hovered_pairing != index {
            self.hovered_sum = None;
        }
        self.hovered_pairing = index;
    }

    pub fn hover_sum(&mut self, sum: Option<u8>) {
        self.hovered_sum = sum;
    }

    pub fn clear(&mut self) {
        *self = Interaction::default();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePreview {
    pub active: Option<ActivePairing>,
    pub highlight: Highlight,
    pub markers: PreviewMarkers,
    pub options: Vec<PairingOption>,
}

impl MovePreview {
    pub fn derive(
        snapshot: &GameSnapshot,
        interaction: &Interaction,
        selection: &SelectionState,
    ) -> Self {
        let active = highlight::resolve_active(
            snapshot,
            interaction.hovered_pairing,
            selection.pending_choice(),
        );
        let mut highlight = highlight::resolve_highlight(active.as_ref());
        let mut preview_markers = PreviewMarkers::new();

        if let Some(active) = &active {
            let playability = markers::playability_for(snapshot, active);
            if let Some(kept) =
                markers::hovered_slot(active, &playability, interaction.hovered_sum)
            {
                highlight.dice = highlight.dice.keep_only(kept);
            }
            preview_markers = markers::generate_previews(snapshot, active, interaction.hovered_sum);
        }

        Self {
            active,
            highlight,
            markers: preview_markers,
            options: options::pairing_options(snapshot, interaction, selection),
        }
    }

    pub fn markers_in(&self, column: u8) -> impl Iterator<Item = &PreviewMarker> + '_ {
        self.markers
            .iter()
            .filter(move |marker| marker.column == column)
    }
}
