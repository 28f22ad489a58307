use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Player {
    #[default]
    #[strum(serialize = "Player 1")]
    One,
    #[strum(serialize = "Player 2")]
    Two,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::One, Player::Two];

    pub fn number(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("player number must be 1 or 2, got {0}")]
pub struct InvalidPlayer(pub u8);

impl TryFrom<u8> for Player {
    type Error = InvalidPlayer;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Player::One),
            2 => Ok(Player::Two),
            other => Err(InvalidPlayer(other)),
        }
    }
}

impl From<Player> for u8 {
    fn from(player: Player) -> u8 {
        player.number()
    }
}

/// Visual group of a pairing: `Pair1` always carries the pairing's first sum,
/// `Pair2` its second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum PairColor {
    #[strum(serialize = "pair1")]
    Pair1,
    #[strum(serialize = "pair2")]
    Pair2,
}

impl PairColor {
    pub const ALL: [PairColor; 2] = [PairColor::Pair1, PairColor::Pair2];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum MarkerColor {
    #[strum(serialize = "pair1")]
    Pair1,
    #[strum(serialize = "pair2")]
    Pair2,
    /// Greyed marker for a sum that would be forfeited.
    Invalid,
}

impl From<PairColor> for MarkerColor {
    fn from(color: PairColor) -> Self {
        match color {
            PairColor::Pair1 => MarkerColor::Pair1,
            PairColor::Pair2 => MarkerColor::Pair2,
        }
    }
}
