//! Contract of the game-rules service. Every call returns a full replacement
//! [`GameSnapshot`]; the client keeps no other durable state.

pub mod http;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::GameSnapshot;

pub use http::HttpGameService;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{operation} failed with status {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("invalid {operation} response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("no game in progress")]
    NoGame,
}

/// Identifier assigned by the service. Accepts either a JSON string or a
/// number since it only ever ends up in a URL path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawGameId", into = "String")]
pub struct GameId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawGameId {
    Text(String),
    Number(u64),
}

impl From<RawGameId> for GameId {
    fn from(raw: RawGameId) -> Self {
        match raw {
            RawGameId::Text(text) => GameId(text),
            RawGameId::Number(number) => GameId(number.to_string()),
        }
    }
}

impl From<GameId> for String {
    fn from(id: GameId) -> String {
        id.0
    }
}

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewGame {
    pub game_id: GameId,
    pub state: GameSnapshot,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StateResponse {
    pub state: GameSnapshot,
}

/// Body of the confirmation call. `pairing_index` indexes `valid_pairings`;
/// `chosen_number` is set only for choose-one pairings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChooseRequest {
    pub pairing_index: usize,
    pub chosen_number: Option<u8>,
}

pub trait GameService {
    fn create_game(&self) -> Result<NewGame, ClientError>;
    fn roll_dice(&self, game_id: &GameId) -> Result<GameSnapshot, ClientError>;
    fn choose_pairing(
        &self,
        game_id: &GameId,
        request: ChooseRequest,
    ) -> Result<GameSnapshot, ClientError>;
    fn stop_turn(&self, game_id: &GameId) -> Result<GameSnapshot, ClientError>;
    fn continue_after_bust(&self, game_id: &GameId) -> Result<GameSnapshot, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_id_accepts_numbers_and_strings() {
        let numeric: NewGame =
            serde_json::from_str(r#"{"game_id": 42, "state": {}}"#).expect("numeric id");
        assert_eq!(numeric.game_id.as_str(), "42");

        let text: NewGame =
            serde_json::from_str(r#"{"game_id": "a1b2", "state": {}}"#).expect("string id");
        assert_eq!(text.game_id, GameId::new("a1b2"));
    }

    #[test]
    fn choose_request_serializes_null_choice() {
        let body = serde_json::to_value(ChooseRequest {
            pairing_index: 1,
            chosen_number: None,
        })
        .expect("serializable");
        assert_eq!(body, serde_json::json!({"pairing_index": 1, "chosen_number": null}));

        let body = serde_json::to_value(ChooseRequest {
            pairing_index: 0,
            chosen_number: Some(7),
        })
        .expect("serializable");
        assert_eq!(body["chosen_number"], 7);
    }
}
