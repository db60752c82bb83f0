//! Roster import: load tournaments, groups, players and registrations from CSV.
//!
//! Expected header: `tournament,group,player,ranking,seed`. An empty `group`
//! registers the player without a group; an empty `player` records a
//! registration that is not linked to any player.

use crate::models::{TournamentStatus, DEFAULT_RANKING};
use crate::store::{MemoryStore, StoreError};
use chrono::{Duration, NaiveDateTime};
use serde::Deserialize;
use std::io::Read;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Row {row}: tournament title is empty")]
    MissingTournament { row: usize },
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    tournament: String,
    #[serde(default)]
    group: String,
    #[serde(default)]
    player: String,
    #[serde(default)]
    ranking: Option<i32>,
    #[serde(default)]
    seed: Option<u32>,
}

/// What an import created.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RosterSummary {
    pub tournaments: usize,
    pub groups: usize,
    pub players: usize,
    pub participations: usize,
}

/// Import a roster into `store`. New tournaments start at `start_date`, last one
/// day and are open for registration. Players are matched by name.
pub fn import_roster<R: Read>(
    store: &MemoryStore,
    reader: R,
    start_date: NaiveDateTime,
) -> Result<RosterSummary, RosterError> {
    let mut rows = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut summary = RosterSummary::default();

    for (i, row) in rows.deserialize::<RosterRow>().enumerate() {
        let row = row?;
        if row.tournament.is_empty() {
            return Err(RosterError::MissingTournament { row: i + 1 });
        }

        let tournament = match store.find_tournament_by_title(&row.tournament)? {
            Some(t) => t,
            None => {
                summary.tournaments += 1;
                store.add_tournament(
                    row.tournament.as_str(),
                    start_date,
                    start_date + Duration::days(1),
                    TournamentStatus::Recruiting,
                )?
            }
        };

        let group_id = if row.group.is_empty() {
            None
        } else {
            let group = match store.find_group_by_name(tournament.id, &row.group)? {
                Some(g) => g,
                None => {
                    summary.groups += 1;
                    store.add_group(tournament.id, row.group.as_str())?
                }
            };
            Some(group.id)
        };

        let player_id = if row.player.is_empty() {
            log::warn!("Row {}: registration without a player", i + 1);
            None
        } else {
            let player = match store.find_player_by_name(&row.player)? {
                Some(p) => p,
                None => {
                    summary.players += 1;
                    store.add_player(row.player.as_str(), row.ranking.unwrap_or(DEFAULT_RANKING))?
                }
            };
            Some(player.id)
        };

        store.add_participation(tournament.id, group_id, player_id, row.seed)?;
        summary.participations += 1;
    }

    log::info!(
        "Roster imported: {} tournament(s), {} group(s), {} player(s), {} registration(s)",
        summary.tournaments,
        summary.groups,
        summary.players,
        summary.participations
    );
    Ok(summary)
}
