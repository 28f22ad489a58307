//! Client session: owns the latest snapshot and the local selection state,
//! turns player intents into tagged service requests, and applies their
//! completions. Requests from an older game are recognized by their tag and
//! dropped.

use rand::Rng;
use strum::Display;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::{ChooseRequest, ClientError, GameId, GameService, NewGame};
use crate::board::{BoardView, TurnControls};
use crate::game::pairing::DICE_COUNT;
use crate::game::{GameSnapshot, Pairing};
use crate::preview::highlight::resolve_active;
use crate::preview::{Interaction, MovePreview, SelectionState};
use crate::types::PairColor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CommandKind {
    #[strum(serialize = "new game")]
    NewGame,
    #[strum(serialize = "roll")]
    Roll,
    #[strum(serialize = "choose")]
    Choose,
    #[strum(serialize = "stop")]
    Stop,
    #[strum(serialize = "continue")]
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    NewGame,
    Roll,
    Choose(ChooseRequest),
    Stop,
    ContinueAfterBust,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::NewGame => CommandKind::NewGame,
            Command::Roll => CommandKind::Roll,
            Command::Choose(_) => CommandKind::Choose,
            Command::Stop => CommandKind::Stop,
            Command::ContinueAfterBust => CommandKind::Continue,
        }
    }
}

/// Identifies one request. `epoch` changes with every new game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTag {
    pub epoch: u64,
    pub seq: u64,
}

#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub tag: RequestTag,
    pub game_id: Option<GameId>,
    pub command: Command,
}

impl PendingRequest {
    /// Runs the request against `service`. Blocking; the terminal client
    /// calls this from a worker thread.
    pub fn execute(&self, service: &dyn GameService) -> Completion {
        let result = match (self.command, &self.game_id) {
            (Command::NewGame, _) => service.create_game().map(Reply::NewGame),
            (_, None) => Err(ClientError::NoGame),
            (Command::Roll, Some(id)) => service.roll_dice(id).map(Reply::State),
            (Command::Choose(request), Some(id)) => {
                service.choose_pairing(id, request).map(Reply::State)
            }
            (Command::Stop, Some(id)) => service.stop_turn(id).map(Reply::State),
            (Command::ContinueAfterBust, Some(id)) => {
                service.continue_after_bust(id).map(Reply::State)
            }
        };
        Completion {
            tag: self.tag,
            result,
        }
    }
}

#[derive(Debug)]
pub enum Reply {
    NewGame(NewGame),
    State(GameSnapshot),
}

#[derive(Debug)]
pub struct Completion {
    pub tag: RequestTag,
    pub result: Result<Reply, ClientError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    Failed,
    /// Answer to a request that is no longer current; nothing changed.
    Stale,
}

/// Four sorted random dice shown before the first roll of a game.
pub fn placeholder_dice(rng: &mut impl Rng) -> Vec<u8> {
    let mut dice: Vec<u8> = (0..DICE_COUNT).map(|_| rng.gen_range(1..=6)).collect();
    dice.sort_unstable();
    dice
}

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    epoch: u64,
    next_seq: u64,
    in_flight: Option<(RequestTag, CommandKind)>,
    game_id: Option<GameId>,
    snapshot: Option<GameSnapshot>,
    interaction: Interaction,
    selection: SelectionState,
    last_dice: Option<Vec<u8>>,
    notice: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            epoch: 0,
            next_seq: 0,
            in_flight: None,
            game_id: None,
            snapshot: None,
            interaction: Interaction::default(),
            selection: SelectionState::Idle,
            last_dice: None,
            notice: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn game_id(&self) -> Option<&GameId> {
        self.game_id.as_ref()
    }

    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<CommandKind> {
        self.in_flight.map(|(_, kind)| kind)
    }

    /// Dice to draw: the current roll, else the last one seen.
    pub fn display_dice(&self) -> Option<&[u8]> {
        self.snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.current_dice.as_deref())
            .or(self.last_dice.as_deref())
    }

    pub fn preview(&self) -> Option<MovePreview> {
        self.snapshot
            .as_ref()
            .map(|snapshot| MovePreview::derive(snapshot, &self.interaction, &self.selection))
    }

    pub fn board(&self, preview: Option<&MovePreview>) -> Option<BoardView> {
        let snapshot = self.snapshot.as_ref()?;
        let markers = preview.map(|preview| preview.markers.as_slice()).unwrap_or(&[]);
        Some(BoardView::project(
            snapshot,
            markers,
            self.selection.selected_index(),
        ))
    }

    pub fn controls(&self) -> TurnControls {
        match &self.snapshot {
            Some(snapshot) => {
                TurnControls::for_snapshot(snapshot, self.is_busy() || self.selection.is_confirming())
            }
            None => TurnControls::default(),
        }
    }

    fn issue(&mut self, command: Command) -> PendingRequest {
        let tag = RequestTag {
            epoch: self.epoch,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.in_flight = Some((tag, command.kind()));
        info!(
            session = %self.id,
            epoch = tag.epoch,
            seq = tag.seq,
            command = %command.kind(),
            "request issued"
        );
        PendingRequest {
            tag,
            game_id: self.game_id.clone(),
            command,
        }
    }

    /// Discards the current game, including any answer still in flight.
    pub fn new_game(&mut self) -> PendingRequest {
        self.epoch += 1;
        self.game_id = None;
        self.snapshot = None;
        self.last_dice = None;
        self.interaction.clear();
        self.selection.settle();
        self.issue(Command::NewGame)
    }

    pub fn roll(&mut self) -> Option<PendingRequest> {
        if !self.controls().can_roll {
            return None;
        }
        self.selection.settle();
        self.interaction.hovered_sum = None;
        Some(self.issue(Command::Roll))
    }

    pub fn stop(&mut self) -> Option<PendingRequest> {
        if !self.controls().can_stop {
            return None;
        }
        self.selection.settle();
        Some(self.issue(Command::Stop))
    }

    pub fn continue_after_bust(&mut self) -> Option<PendingRequest> {
        if !self.controls().can_continue {
            return None;
        }
        Some(self.issue(Command::ContinueAfterBust))
    }

    pub fn select_pairing(&mut self, valid_index: usize) -> Option<PendingRequest> {
        if self.is_busy() {
            return None;
        }
        let snapshot = self.snapshot.as_ref()?;
        let request = self.selection.select_pairing(snapshot, valid_index)?;
        Some(self.issue(Command::Choose(request)))
    }

    pub fn select_sum(&mut self, valid_index: usize, sum: u8) -> Option<PendingRequest> {
        if self.is_busy() {
            return None;
        }
        let snapshot = self.snapshot.as_ref()?;
        let request = self.selection.select_sum(snapshot, valid_index, sum)?;
        Some(self.issue(Command::Choose(request)))
    }

    /// Enter on the focused pairing: confirms the hovered sum of a choose-one
    /// pairing, otherwise clicks the hovered pairing itself.
    pub fn activate(&mut self) -> Option<PendingRequest> {
        let hovered_sum = self.interaction.hovered_sum;
        if let (Some(pending), Some(sum)) = (self.selection.pending_choice(), hovered_sum) {
            return self.select_sum(pending, sum);
        }

        let snapshot = self.snapshot.as_ref()?;
        let hovered = snapshot
            .available_pairings
            .get(self.interaction.hovered_pairing?)?;
        let valid_index = snapshot.valid_index_of(hovered)?;

        match hovered_sum {
            Some(sum) if snapshot.playability_at(valid_index).needs_choice => {
                self.select_sum(valid_index, sum)
            }
            _ => self.select_pairing(valid_index),
        }
    }

    pub fn hover_pairing(&mut self, index: Option<usize>) {
        if let Some(snapshot) = &self.snapshot {
            self.interaction.hover_pairing(snapshot, index);
        }
    }

    /// Pairing a sum cursor applies to: the pending choice, else the hovered
    /// pairing. Sums come in the slot order shown on screen.
    pub fn focused_pairing(&self) -> Option<(Pairing, usize)> {
        let snapshot = self.snapshot.as_ref()?;
        let active = resolve_active(
            snapshot,
            self.interaction.hovered_pairing,
            self.selection.pending_choice(),
        )?;
        Some((active.pairing, active.valid_index?))
    }

    /// Moves the sum cursor onto `slot` of the focused choose-one pairing.
    pub fn hover_sum_slot(&mut self, slot: PairColor) {
        let Some((pairing, valid_index)) = self.focused_pairing() else {
            return;
        };
        let needs_choice = self
            .snapshot
            .as_ref()
            .is_some_and(|snapshot| snapshot.playability_at(valid_index).needs_choice);
        if needs_choice {
            self.interaction.hover_sum(Some(pairing.sum(slot)));
        }
    }

    /// Escape: leaves a pending choice, otherwise clears hover.
    pub fn cancel(&mut self) {
        if !self.selection.cancel_choice() {
            self.interaction.clear();
        }
        self.interaction.hovered_sum = None;
    }

    pub fn apply(&mut self, completion: Completion) -> Applied {
        let Some((current, kind)) = self.in_flight else {
            debug!(tag = ?completion.tag, "dropping response with nothing in flight");
            return Applied::Stale;
        };
        if current != completion.tag {
            debug!(
                tag = ?completion.tag,
                current = ?current,
                "dropping stale response"
            );
            return Applied::Stale;
        }
        self.in_flight = None;

        match completion.result {
            Ok(Reply::NewGame(NewGame { game_id, state })) => {
                info!(session = %self.id, game = %game_id, "game created");
                self.game_id = Some(game_id);
                self.install(state);
                Applied::Updated
            }
            Ok(Reply::State(state)) => {
                self.install(state);
                Applied::Updated
            }
            Err(error) => {
                warn!(session = %self.id, command = %kind, %error, "request failed");
                self.notice = Some(format!("{kind} failed: {error}"));
                self.selection.settle();
                Applied::Failed
            }
        }
    }

    fn install(&mut self, snapshot: GameSnapshot) {
        if let Some(dice) = &snapshot.current_dice {
            self.last_dice = Some(dice.clone());
        } else if self.last_dice.is_none() {
            self.last_dice = Some(placeholder_dice(&mut rand::thread_rng()));
        }
        if snapshot.is_locked() {
            self.interaction.hovered_pairing = None;
        }
        if !snapshot.pairings_match_dice() {
            warn!(
                dice = ?snapshot.current_dice,
                available = ?snapshot.available_pairings,
                "available pairings do not follow the dice groupings"
            );
        }
        debug!(
            player = %snapshot.current_player,
            dice = ?snapshot.current_dice,
            valid = snapshot.valid_pairings.len(),
            bust = snapshot.is_bust,
            "snapshot installed"
        );
        self.interaction.hovered_sum = None;
        self.selection.settle();
        self.notice = None;
        self.snapshot = Some(snapshot);
    }
}
