//! Tournament, Group, and Participation.

use crate::models::player::PlayerId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Unique identifier for a tournament.
pub type TournamentId = u64;

/// Unique identifier for a group within a tournament.
pub type GroupId = u64;

/// Unique identifier for a participation (one player's entry into a tournament).
pub type ParticipationId = u64;

/// Lifecycle of a tournament. Transitions are driven by the organiser, not the bracket engine.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentStatus {
    #[default]
    Ready,
    Recruiting,
    InProgress,
    MainReady,
    Completed,
}

/// A tournament. Owns its groups, participations and matches (by id, in the store).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub title: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub status: TournamentStatus,
}

/// A round-robin group. A tournament without groups plays a single bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    /// Back-reference only; the tournament owns the group.
    pub tournament_id: TournamentId,
    /// e.g. "A조".
    pub name: String,
}

/// A registration of a player in a tournament, optionally placed in a group.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participation {
    pub id: ParticipationId,
    pub tournament_id: TournamentId,
    pub group_id: Option<GroupId>,
    /// Missing when the registration was never linked to a player profile;
    /// such entries cannot be paired.
    pub player_id: Option<PlayerId>,
    /// Display priority within the group. Not used for pairing order.
    pub seed_number: Option<u32>,
    /// Free-text registration state (e.g. "신청완료").
    pub status: String,
}
