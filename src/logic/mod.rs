//! Bracket business logic: preliminaries, qualifiers, main bracket, advancement,
//! match lifecycle and bracket projection.

mod advancement;
mod engine;
mod lifecycle;
mod main_bracket;
mod pairing;
mod preliminary;
mod projection;
mod qualification;

pub use engine::BracketEngine;
pub use pairing::{advance_slots, bracket_size, build_round, round_robin_pairs, seed_slots};
pub use projection::{project_bracket, BracketData, GroupSummary, MatchView, SeedView};
pub use qualification::{group_standings, select_qualifiers, GroupKey, Standing};
