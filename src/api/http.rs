use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::{ChooseRequest, ClientError, GameId, GameService, NewGame, StateResponse};
use crate::config::ClientConfig;
use crate::game::GameSnapshot;

/// Blocking JSON client for the game-rules service.
#[derive(Debug, Clone)]
pub struct HttpGameService {
    client: Client,
    base_url: String,
}

impl HttpGameService {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn game_url(&self, game_id: &GameId, action: &str) -> String {
        format!("{}/games/{}/{}", self.base_url, game_id, action)
    }

    fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        debug!(operation, status = status.as_u16(), bytes = body.len(), "service responded");

        if !status.is_success() {
            return Err(ClientError::Status {
                operation,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| ClientError::Decode { operation, source })
    }

    fn post_state(&self, operation: &'static str, url: String) -> Result<GameSnapshot, ClientError> {
        let response: StateResponse = self.send(operation, self.client.post(url))?;
        Ok(response.state)
    }
}

impl GameService for HttpGameService {
    fn create_game(&self) -> Result<NewGame, ClientError> {
        let url = format!("{}/games", self.base_url);
        self.send("create game", self.client.post(url))
    }

    fn roll_dice(&self, game_id: &GameId) -> Result<GameSnapshot, ClientError> {
        self.post_state("roll", self.game_url(game_id, "roll"))
    }

    fn choose_pairing(
        &self,
        game_id: &GameId,
        request: ChooseRequest,
    ) -> Result<GameSnapshot, ClientError> {
        let builder = self
            .client
            .post(self.game_url(game_id, "choose"))
            .json(&request);
        let response: StateResponse = self.send("choose", builder)?;
        Ok(response.state)
    }

    fn stop_turn(&self, game_id: &GameId) -> Result<GameSnapshot, ClientError> {
        self.post_state("stop", self.game_url(game_id, "stop"))
    }

    fn continue_after_bust(&self, game_id: &GameId) -> Result<GameSnapshot, ClientError> {
        self.post_state("continue", self.game_url(game_id, "continue"))
    }
}
