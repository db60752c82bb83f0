//! In-memory store used by the web binary and the tests.

use super::{CompletionClaim, MatchStore, StoreError, StoreResult, TableClaim};
use crate::models::{
    Group, GroupId, Match, MatchId, MatchStatus, NewMatch, Participation, Player, PlayerId,
    Tournament, TournamentId, TournamentStatus,
};
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    next_id: u64,
    tournaments: BTreeMap<TournamentId, Tournament>,
    groups: BTreeMap<GroupId, Group>,
    participations: BTreeMap<u64, Participation>,
    players: BTreeMap<PlayerId, Player>,
    matches: BTreeMap<MatchId, Match>,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Thread-safe in-memory [`MatchStore`]. All writes happen under one lock, so
/// batches and table claims are atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))
    }

    pub fn add_tournament(
        &self,
        title: impl Into<String>,
        start_date: NaiveDateTime,
        end_date: NaiveDateTime,
        status: TournamentStatus,
    ) -> StoreResult<Tournament> {
        let mut t = self.write()?;
        let tournament = Tournament {
            id: t.next_id(),
            title: title.into(),
            start_date,
            end_date,
            status,
        };
        t.tournaments.insert(tournament.id, tournament.clone());
        Ok(tournament)
    }

    pub fn set_tournament_status(
        &self,
        id: TournamentId,
        status: TournamentStatus,
    ) -> StoreResult<()> {
        let mut t = self.write()?;
        let tournament = t
            .tournaments
            .get_mut(&id)
            .ok_or_else(|| StoreError::Conflict(format!("tournament {id} does not exist")))?;
        tournament.status = status;
        Ok(())
    }

    pub fn add_group(
        &self,
        tournament_id: TournamentId,
        name: impl Into<String>,
    ) -> StoreResult<Group> {
        let mut t = self.write()?;
        if !t.tournaments.contains_key(&tournament_id) {
            return Err(StoreError::Conflict(format!(
                "tournament {tournament_id} does not exist"
            )));
        }
        let group = Group {
            id: t.next_id(),
            tournament_id,
            name: name.into(),
        };
        t.groups.insert(group.id, group.clone());
        Ok(group)
    }

    pub fn add_player(&self, name: impl Into<String>, ranking: i32) -> StoreResult<Player> {
        let mut t = self.write()?;
        let player = Player::new(t.next_id(), name, ranking);
        t.players.insert(player.id, player.clone());
        Ok(player)
    }

    /// Register an entry. `player_id` may be `None` for a registration that was
    /// never linked to a player profile.
    pub fn add_participation(
        &self,
        tournament_id: TournamentId,
        group_id: Option<GroupId>,
        player_id: Option<PlayerId>,
        seed_number: Option<u32>,
    ) -> StoreResult<Participation> {
        let mut t = self.write()?;
        if !t.tournaments.contains_key(&tournament_id) {
            return Err(StoreError::Conflict(format!(
                "tournament {tournament_id} does not exist"
            )));
        }
        let participation = Participation {
            id: t.next_id(),
            tournament_id,
            group_id,
            player_id,
            seed_number,
            status: "신청완료".into(),
        };
        t.participations.insert(participation.id, participation.clone());
        Ok(participation)
    }

    pub fn find_tournament_by_title(&self, title: &str) -> StoreResult<Option<Tournament>> {
        Ok(self
            .read()?
            .tournaments
            .values()
            .find(|t| t.title == title)
            .cloned())
    }

    pub fn find_group_by_name(
        &self,
        tournament_id: TournamentId,
        name: &str,
    ) -> StoreResult<Option<Group>> {
        Ok(self
            .read()?
            .groups
            .values()
            .find(|g| g.tournament_id == tournament_id && g.name == name)
            .cloned())
    }

    pub fn find_player_by_name(&self, name: &str) -> StoreResult<Option<Player>> {
        Ok(self
            .read()?
            .players
            .values()
            .find(|p| p.name == name)
            .cloned())
    }
}

impl MatchStore for MemoryStore {
    fn tournament(&self, id: TournamentId) -> StoreResult<Option<Tournament>> {
        Ok(self.read()?.tournaments.get(&id).cloned())
    }

    fn tournaments_with_status(&self, status: TournamentStatus) -> StoreResult<Vec<Tournament>> {
        Ok(self
            .read()?
            .tournaments
            .values()
            .filter(|t| t.status == status)
            .cloned()
            .collect())
    }

    fn groups(&self, tournament_id: TournamentId) -> StoreResult<Vec<Group>> {
        Ok(self
            .read()?
            .groups
            .values()
            .filter(|g| g.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    fn participations(&self, tournament_id: TournamentId) -> StoreResult<Vec<Participation>> {
        Ok(self
            .read()?
            .participations
            .values()
            .filter(|p| p.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    fn group_participations(&self, group_id: GroupId) -> StoreResult<Vec<Participation>> {
        Ok(self
            .read()?
            .participations
            .values()
            .filter(|p| p.group_id == Some(group_id))
            .cloned()
            .collect())
    }

    fn player(&self, id: PlayerId) -> StoreResult<Option<Player>> {
        Ok(self.read()?.players.get(&id).cloned())
    }

    fn matches(&self, tournament_id: TournamentId) -> StoreResult<Vec<Match>> {
        let mut matches: Vec<Match> = self
            .read()?
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect();
        matches.sort_by_key(|m| (m.round, m.match_number, m.id));
        Ok(matches)
    }

    fn find_match(&self, id: MatchId) -> StoreResult<Option<Match>> {
        Ok(self.read()?.matches.get(&id).cloned())
    }

    fn in_progress_on_table(&self, table: u32) -> StoreResult<Option<Match>> {
        Ok(self
            .read()?
            .matches
            .values()
            .find(|m| m.status == MatchStatus::InProgress && m.table_number == Some(table))
            .cloned())
    }

    fn insert_matches(&self, batch: Vec<NewMatch>) -> StoreResult<Vec<Match>> {
        let mut t = self.write()?;

        // Validate the whole batch before touching anything.
        let mut taken: HashSet<(TournamentId, _, u32)> = t
            .matches
            .values()
            .map(|m| (m.tournament_id, m.round, m.match_number))
            .collect();
        for m in &batch {
            if !t.tournaments.contains_key(&m.tournament_id) {
                return Err(StoreError::Conflict(format!(
                    "tournament {} does not exist",
                    m.tournament_id
                )));
            }
            if !taken.insert((m.tournament_id, m.round, m.match_number)) {
                return Err(StoreError::Conflict(format!(
                    "match {} {} already exists in tournament {}",
                    m.round, m.match_number, m.tournament_id
                )));
            }
        }

        let mut saved = Vec::with_capacity(batch.len());
        for m in batch {
            let id = t.next_id();
            let m = m.into_match(id);
            t.matches.insert(id, m.clone());
            saved.push(m);
        }
        Ok(saved)
    }

    fn save_match(&self, m: &Match) -> StoreResult<Match> {
        let mut t = self.write()?;
        match t.matches.get_mut(&m.id) {
            Some(slot) => {
                *slot = m.clone();
                Ok(m.clone())
            }
            None => Err(StoreError::Conflict(format!("match {} does not exist", m.id))),
        }
    }

    fn start_on_table(
        &self,
        id: MatchId,
        table: u32,
        at: NaiveDateTime,
    ) -> StoreResult<TableClaim> {
        let mut t = self.write()?;
        let status = match t.matches.get(&id) {
            Some(m) => m.status,
            None => return Ok(TableClaim::Missing),
        };
        if status != MatchStatus::Scheduled {
            return Ok(TableClaim::NotScheduled(status));
        }
        let occupant = t
            .matches
            .values()
            .find(|m| m.status == MatchStatus::InProgress && m.table_number == Some(table))
            .cloned();
        if let Some(occupant) = occupant {
            return Ok(TableClaim::Occupied(occupant));
        }
        match t.matches.get_mut(&id) {
            Some(m) => {
                m.table_number = Some(table);
                m.status = MatchStatus::InProgress;
                m.updated_at = at;
                Ok(TableClaim::Started(m.clone()))
            }
            None => Ok(TableClaim::Missing),
        }
    }

    fn finish_in_progress(&self, result: &Match) -> StoreResult<CompletionClaim> {
        let mut t = self.write()?;
        let Some(slot) = t.matches.get_mut(&result.id) else {
            return Ok(CompletionClaim::Missing);
        };
        if slot.status != MatchStatus::InProgress {
            return Ok(CompletionClaim::NotInProgress(slot.status));
        }
        *slot = result.clone();
        Ok(CompletionClaim::Completed(result.clone()))
    }
}
