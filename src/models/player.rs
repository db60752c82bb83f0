//! Player data structure.

use serde::{Deserialize, Serialize};

/// Unique identifier for a player (used in matches and lookups).
pub type PlayerId = u64;

/// Ranking given to players registered without one.
pub const DEFAULT_RANKING: i32 = 1000;

/// A registered player. Full profile management lives outside the bracket engine;
/// matches carry a copy of this record.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub ranking: i32,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, ranking: i32) -> Self {
        Self {
            id,
            name: name.into(),
            ranking,
        }
    }
}
