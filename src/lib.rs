//! Table tennis tournament bracket engine: library with models and business logic.

pub mod config;
pub mod error;
pub mod logic;
pub mod models;
pub mod notify;
pub mod roster;
pub mod store;

pub use config::EngineConfig;
pub use error::{BracketError, BracketResult, ErrorKind};
pub use logic::{
    bracket_size, group_standings, project_bracket, round_robin_pairs, select_qualifiers,
    BracketData, BracketEngine, GroupSummary, MatchView, SeedView, Standing,
};
pub use models::{
    Group, GroupId, Match, MatchId, MatchStatus, NewMatch, Participation, ParticipationId, Player,
    PlayerId, Round, Tournament, TournamentId, TournamentStatus, BYE,
};
pub use notify::{EventKind, EventSink, LogSink, MatchUpdate, RecordingSink};
pub use store::{CompletionClaim, MatchStore, MemoryStore, StoreError, TableClaim};
