pub mod pairing;
pub mod snapshot;

pub use pairing::{DiceGroups, Pairing, dice_groups_for_pairing, pairings_from_dice};
pub use snapshot::{GameSnapshot, PairingPlayability};
