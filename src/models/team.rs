//! Team and Player data structures.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in matches, standings and lookups).
pub type TeamId = Uuid;

/// Unique identifier for a player.
pub type PlayerId = Uuid;

/// A player on a team roster.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Shirt number.
    pub number: u32,
    pub position: String,
}

impl Player {
    pub fn new(name: impl Into<String>, number: u32, position: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            number,
            position: position.into(),
        }
    }
}

/// A team in the tournament. Belongs to exactly one group.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Group label, e.g. "A".."D".
    pub group_id: String,
    /// Roster in shirt-list order.
    #[serde(default)]
    pub players: Vec<Player>,
}

impl Team {
    /// Create a new team with an empty roster.
    pub fn new(name: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            group_id: group_id.into(),
            players: Vec::new(),
        }
    }

    /// Name/id reference used in match slots.
    pub fn team_ref(&self) -> TeamRef {
        TeamRef {
            id: self.id,
            name: self.name.clone(),
        }
    }

    pub fn has_player(&self, player_id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }
}

/// A team as referenced from a match: id plus display name.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: TeamId,
    pub name: String,
}
