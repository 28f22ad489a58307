use smallvec::SmallVec;

use crate::game::GameSnapshot;
use crate::preview::PreviewMarker;
use crate::types::{MarkerColor, Player};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellMarker {
    /// Committed top position of a player.
    Permanent(Player),
    /// Current player's runner for this turn.
    Runner(Player),
    Preview {
        color: MarkerColor,
        is_valid: bool,
        is_solid: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    pub position: u8,
    pub markers: SmallVec<[CellMarker; 4]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub column: u8,
    pub length: u8,
    pub completed_by: Option<Player>,
    pub active: bool,
    /// Part of the pairing currently selected for confirmation.
    pub highlighted: bool,
    /// Bottom to top, positions `1..=length`.
    pub cells: Vec<CellView>,
}

impl ColumnView {
    pub fn cell(&self, position: u8) -> Option<&CellView> {
        position
            .checked_sub(1)
            .and_then(|index| self.cells.get(index as usize))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardView {
    pub columns: Vec<ColumnView>,
}

impl BoardView {
    /// Lays out every column with player tops, the acting player's runner and
    /// preview markers. Markers past the top of a column are clipped.
    pub fn project(
        snapshot: &GameSnapshot,
        markers: &[PreviewMarker],
        selected_pairing: Option<usize>,
    ) -> Self {
        let selected = selected_pairing.and_then(|index| snapshot.valid_pairings.get(index));
        let acting = snapshot.current_player;

        let columns = snapshot
            .columns()
            .map(|(column, length)| {
                let p1_top = snapshot.permanent(Player::One, column);
                let p2_top = snapshot.permanent(Player::Two, column);
                let temp = snapshot.temp(column);
                let runner_top = snapshot.top_position(column);

                let cells = (1..=length)
                    .map(|position| {
                        let mut cell_markers = SmallVec::new();
                        if p1_top > 0 && position == p1_top {
                            cell_markers.push(CellMarker::Permanent(Player::One));
                        }
                        if p2_top > 0 && position == p2_top {
                            cell_markers.push(CellMarker::Permanent(Player::Two));
                        }
                        if temp > 0 && position == runner_top {
                            cell_markers.push(CellMarker::Runner(acting));
                        }
                        for marker in markers.iter().filter(|marker| {
                            marker.column == column && marker.position(snapshot) == position
                        }) {
                            cell_markers.push(CellMarker::Preview {
                                color: marker.color,
                                is_valid: marker.is_valid,
                                is_solid: marker.is_solid,
                            });
                        }
                        CellView {
                            position,
                            markers: cell_markers,
                        }
                    })
                    .collect();

                ColumnView {
                    column,
                    length,
                    completed_by: snapshot.completed_by(column),
                    active: snapshot.is_active(column),
                    highlighted: selected.is_some_and(|pairing| pairing.contains(column)),
                    cells,
                }
            })
            .collect();

        Self { columns }
    }

    pub fn column(&self, column: u8) -> Option<&ColumnView> {
        self.columns.iter().find(|view| view.column == column)
    }

    pub fn tallest(&self) -> u8 {
        self.columns.iter().map(|view| view.length).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSummary {
    pub player: Player,
    pub completed: Vec<u8>,
    /// Committed steps on columns not yet completed.
    pub total_steps: u32,
    pub is_active: bool,
}

impl PlayerSummary {
    pub fn for_player(snapshot: &GameSnapshot, player: Player) -> Self {
        let completed = snapshot.completed(player).to_vec();
        let total_steps = snapshot
            .columns()
            .filter(|(column, _)| !completed.contains(column))
            .map(|(column, _)| snapshot.permanent(player, column) as u32)
            .sum();

        Self {
            player,
            completed,
            total_steps,
            is_active: snapshot.current_player == player,
        }
    }
}

/// Turn-level buttons available to the acting player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnControls {
    pub can_roll: bool,
    pub can_stop: bool,
    pub can_continue: bool,
}

impl TurnControls {
    pub fn for_snapshot(snapshot: &GameSnapshot, busy: bool) -> Self {
        let idle = !busy && !snapshot.game_over;
        Self {
            can_roll: idle && !snapshot.has_dice(),
            can_stop: idle
                && snapshot.has_temp_progress()
                && !snapshot.has_dice()
                && !snapshot.is_bust,
            can_continue: !busy && snapshot.is_bust,
        }
    }
}
