use tracing::trace;

use crate::api::ChooseRequest;
use crate::game::GameSnapshot;

/// Selection and lock state of the local player. Indices refer to
/// `valid_pairings`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionState {
    #[default]
    Idle,
    /// A choose-one pairing was picked and waits for a specific sum.
    ChoicePending { pairing: usize },
    /// A confirmation is in flight; every interaction is refused until the
    /// service answers.
    Confirming {
        pairing: usize,
        chosen: Option<u8>,
    },
}

impl SelectionState {
    pub fn selected_index(&self) -> Option<usize> {
        match self {
            SelectionState::Idle => None,
            SelectionState::ChoicePending { pairing } => Some(*pairing),
            SelectionState::Confirming { pairing, .. } => Some(*pairing),
        }
    }

    pub fn pending_choice(&self) -> Option<usize> {
        match self {
            SelectionState::ChoicePending { pairing } => Some(*pairing),
            _ => None,
        }
    }

    pub fn is_confirming(&self) -> bool {
        matches!(self, SelectionState::Confirming { .. })
    }

    /// Whether pairing or sum interactions can be taken at all for `snapshot`.
    pub fn accepts_input(&self, snapshot: &GameSnapshot) -> bool {
        !self.is_confirming()
            && !snapshot.is_locked()
            && !snapshot.is_bust
            && snapshot.has_valid_moves()
    }

    /// Whole-pairing click. Auto-confirms pairings without a choice; a
    /// choose-one pairing only enters `ChoicePending`.
    pub fn select_pairing(
        &mut self,
        snapshot: &GameSnapshot,
        valid_index: usize,
    ) -> Option<ChooseRequest> {
        if !self.accepts_input(snapshot) || valid_index >= snapshot.valid_pairings.len() {
            trace!(valid_index, state = ?self, "pairing selection ignored");
            return None;
        }
        if self.pending_choice().is_some() {
            trace!(valid_index, "pairing body click ignored while a choice is pending");
            return None;
        }

        if snapshot.playability_at(valid_index).needs_choice {
            *self = SelectionState::ChoicePending {
                pairing: valid_index,
            };
            return None;
        }

        *self = SelectionState::Confirming {
            pairing: valid_index,
            chosen: None,
        };
        Some(ChooseRequest {
            pairing_index: valid_index,
            chosen_number: None,
        })
    }

    /// Specific-sum click on a choose-one pairing. Confirms from
    /// `ChoicePending` and, like a direct click on a sum badge, from `Idle`.
    pub fn select_sum(
        &mut self,
        snapshot: &GameSnapshot,
        valid_index: usize,
        sum: u8,
    ) -> Option<ChooseRequest> {
        if !self.accepts_input(snapshot) {
            trace!(valid_index, sum, state = ?self, "sum selection ignored");
            return None;
        }
        let pairing = snapshot.valid_pairings.get(valid_index)?;
        if !pairing.contains(sum) || !snapshot.playability_at(valid_index).needs_choice {
            trace!(valid_index, sum, "sum is not a choice of this pairing");
            return None;
        }

        *self = SelectionState::Confirming {
            pairing: valid_index,
            chosen: Some(sum),
        };
        Some(ChooseRequest {
            pairing_index: valid_index,
            chosen_number: Some(sum),
        })
    }

    pub fn cancel_choice(&mut self) -> bool {
        if self.pending_choice().is_some() {
            *self = SelectionState::Idle;
            return true;
        }
        false
    }

    /// The service answered the confirmation (or a new snapshot replaced the
    /// old one).
    pub fn settle(&mut self) {
        *self = SelectionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::snapshot::fixtures::{choose_one, playable, rolled};

    fn snapshot() -> GameSnapshot {
        rolled(
            [2, 3, 4, 5],
            &[(5, 9), (6, 8), (7, 7)],
            &[((6, 8), playable(true, true)), ((7, 7), choose_one())],
        )
    }

    #[test]
    fn plain_pairing_auto_confirms() {
        let mut state = SelectionState::Idle;
        let request = state.select_pairing(&snapshot(), 0);
        assert_eq!(
            request,
            Some(ChooseRequest {
                pairing_index: 0,
                chosen_number: None
            })
        );
        assert_eq!(
            state,
            SelectionState::Confirming {
                pairing: 0,
                chosen: None
            }
        );
    }

    #[test]
    fn choose_one_pairing_never_confirms_on_body_click() {
        let snapshot = snapshot();
        let mut state = SelectionState::Idle;

        assert_eq!(state.select_pairing(&snapshot, 1), None);
        assert_eq!(state, SelectionState::ChoicePending { pairing: 1 });

        // a second body click, on any pairing, stays a no-op
        assert_eq!(state.select_pairing(&snapshot, 1), None);
        assert_eq!(state.select_pairing(&snapshot, 0), None);
        assert_eq!(state.pending_choice(), Some(1));
    }

    #[test]
    fn sum_click_confirms_with_the_chosen_sum() {
        let snapshot = snapshot();
        let mut state = SelectionState::ChoicePending { pairing: 1 };

        let request = state.select_sum(&snapshot, 1, 7);
        assert_eq!(
            request,
            Some(ChooseRequest {
                pairing_index: 1,
                chosen_number: Some(7)
            })
        );
        assert!(state.is_confirming());
    }

    #[test]
    fn sum_click_requires_a_choose_one_pairing_and_a_member_sum() {
        let snapshot = snapshot();
        let mut state = SelectionState::Idle;

        assert_eq!(state.select_sum(&snapshot, 0, 6), None);
        assert_eq!(state.select_sum(&snapshot, 1, 8), None);
        assert_eq!(state.select_sum(&snapshot, 5, 7), None);
        assert_eq!(state, SelectionState::Idle);
    }

    #[test]
    fn confirming_refuses_every_interaction() {
        let snapshot = snapshot();
        let mut state = SelectionState::Confirming {
            pairing: 0,
            chosen: None,
        };

        assert_eq!(state.select_pairing(&snapshot, 0), None);
        assert_eq!(state.select_sum(&snapshot, 1, 7), None);
        assert!(!state.cancel_choice());

        state.settle();
        assert_eq!(state, SelectionState::Idle);
    }

    #[test]
    fn locked_or_bust_snapshot_refuses_selection() {
        let mut locked = snapshot();
        locked.last_chosen_pairing_index = Some(0);
        let mut state = SelectionState::Idle;
        assert_eq!(state.select_pairing(&locked, 0), None);
        assert_eq!(state.select_sum(&locked, 1, 7), None);

        let mut bust = snapshot();
        bust.is_bust = true;
        assert_eq!(state.select_pairing(&bust, 0), None);
        assert_eq!(state, SelectionState::Idle);
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let mut state = SelectionState::Idle;
        assert_eq!(state.select_pairing(&snapshot(), 2), None);
        assert_eq!(state, SelectionState::Idle);
    }

    #[test]
    fn cancel_returns_pending_choice_to_idle() {
        let mut state = SelectionState::ChoicePending { pairing: 1 };
        assert!(state.cancel_choice());
        assert_eq!(state, SelectionState::Idle);
        assert!(!state.cancel_choice());
    }
}
