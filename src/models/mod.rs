//! Data structures for the bracket engine: tournaments, groups, players, matches.

mod game;
mod player;
mod tournament;

pub use game::{Match, MatchId, MatchStatus, NewMatch, Round, BYE};
pub use player::{Player, PlayerId, DEFAULT_RANKING};
pub use tournament::{
    Group, GroupId, Participation, ParticipationId, Tournament, TournamentId, TournamentStatus,
};
