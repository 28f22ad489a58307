#![warn(clippy::all)]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod board;
pub mod cli;
pub mod config;
pub mod game;
pub mod logging;
pub mod preview;
pub mod session;
pub mod types;

pub use api::{ClientError, GameId, GameService, HttpGameService};
pub use board::{BoardView, PlayerSummary, TurnControls};
pub use config::{ClientConfig, ConfigError};
pub use game::{GameSnapshot, Pairing, PairingPlayability};
pub use preview::{Interaction, MovePreview, SelectionState};
pub use session::Session;
pub use types::{MarkerColor, PairColor, Player};
