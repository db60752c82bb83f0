//! Record store for tournaments, groups, participations, players and matches.
//!
//! The bracket engine only talks to storage through [`MatchStore`]. Creating
//! tournaments, players and registrations is the organiser's business and is
//! not part of the trait; [`MemoryStore`] offers inherent methods for that.

mod memory;

pub use memory::MemoryStore;

use crate::models::{
    Group, GroupId, Match, MatchId, MatchStatus, NewMatch, Participation, Player, PlayerId,
    Tournament, TournamentId, TournamentStatus,
};
use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage could not be reached or is in a broken state.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A write violated a store constraint (unknown row, duplicate match number).
    #[error("store constraint violated: {0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Result of an atomic "start this match on this table" request.
#[derive(Clone, Debug, PartialEq)]
pub enum TableClaim {
    /// The match is now in progress on the table.
    Started(Match),
    /// Another match is already in progress on the table.
    Occupied(Match),
    /// The match was not scheduled when the claim was evaluated.
    NotScheduled(MatchStatus),
    /// No match with that id.
    Missing,
}

/// Result of an atomic "record this result for a match in progress" request.
#[derive(Clone, Debug, PartialEq)]
pub enum CompletionClaim {
    /// The result was written; holds the stored match.
    Completed(Match),
    /// The match was no longer in progress when the write was evaluated.
    NotInProgress(MatchStatus),
    /// No match with that id.
    Missing,
}

/// Queries and writes the bracket engine needs.
pub trait MatchStore: Send + Sync {
    fn tournament(&self, id: TournamentId) -> StoreResult<Option<Tournament>>;

    fn tournaments_with_status(&self, status: TournamentStatus) -> StoreResult<Vec<Tournament>>;

    /// Groups of a tournament, ordered by group id.
    fn groups(&self, tournament_id: TournamentId) -> StoreResult<Vec<Group>>;

    /// Every participation of a tournament, grouped or not, ordered by id.
    fn participations(&self, tournament_id: TournamentId) -> StoreResult<Vec<Participation>>;

    /// Participations placed in one group, ordered by id.
    fn group_participations(&self, group_id: GroupId) -> StoreResult<Vec<Participation>>;

    fn player(&self, id: PlayerId) -> StoreResult<Option<Player>>;

    /// All matches of a tournament, ordered by (round, match number). Always a fresh read.
    fn matches(&self, tournament_id: TournamentId) -> StoreResult<Vec<Match>>;

    fn find_match(&self, id: MatchId) -> StoreResult<Option<Match>>;

    /// The match currently in progress on `table`, if any.
    fn in_progress_on_table(&self, table: u32) -> StoreResult<Option<Match>>;

    /// Persist a batch of new matches. All or nothing: on error none are visible.
    fn insert_matches(&self, batch: Vec<NewMatch>) -> StoreResult<Vec<Match>>;

    /// Overwrite an existing match.
    fn save_match(&self, m: &Match) -> StoreResult<Match>;

    /// Atomically check that the match is scheduled and the table is free, then
    /// mark the match in progress on that table.
    fn start_on_table(
        &self,
        id: MatchId,
        table: u32,
        at: NaiveDateTime,
    ) -> StoreResult<TableClaim>;

    /// Atomically check that the stored match is still in progress, then
    /// overwrite it with `result`. Of two racing completions only one wins.
    fn finish_in_progress(&self, result: &Match) -> StoreResult<CompletionClaim>;
}
