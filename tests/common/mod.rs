//! Shared fixtures: an in-memory engine with a seeded draw and recorded events.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use pingpong_bracket::store::StoreResult;
use pingpong_bracket::{
    BracketEngine, CompletionClaim, EngineConfig, Group, GroupId, Match, MatchId, MatchStatus,
    MatchStore, MemoryStore, NewMatch, Participation, Player, PlayerId, RecordingSink, Round,
    StoreError, TableClaim, Tournament, TournamentId, TournamentStatus,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub type Engine = BracketEngine<ControlledStore, Arc<RecordingSink>>;

/// [`MemoryStore`] with knobs: slow match lookups to widen race windows, and
/// failing batch inserts to break round generation.
#[derive(Default)]
pub struct ControlledStore {
    pub inner: MemoryStore,
    lookup_delay_ms: AtomicU64,
    fail_inserts: AtomicBool,
}

impl ControlledStore {
    pub fn slow_lookups(&self, delay: Duration) {
        self.lookup_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }
}

impl MatchStore for ControlledStore {
    fn tournament(&self, id: TournamentId) -> StoreResult<Option<Tournament>> {
        self.inner.tournament(id)
    }

    fn tournaments_with_status(&self, status: TournamentStatus) -> StoreResult<Vec<Tournament>> {
        self.inner.tournaments_with_status(status)
    }

    fn groups(&self, tournament_id: TournamentId) -> StoreResult<Vec<Group>> {
        self.inner.groups(tournament_id)
    }

    fn participations(&self, tournament_id: TournamentId) -> StoreResult<Vec<Participation>> {
        self.inner.participations(tournament_id)
    }

    fn group_participations(&self, group_id: GroupId) -> StoreResult<Vec<Participation>> {
        self.inner.group_participations(group_id)
    }

    fn player(&self, id: PlayerId) -> StoreResult<Option<Player>> {
        self.inner.player(id)
    }

    fn matches(&self, tournament_id: TournamentId) -> StoreResult<Vec<Match>> {
        self.inner.matches(tournament_id)
    }

    fn find_match(&self, id: MatchId) -> StoreResult<Option<Match>> {
        let found = self.inner.find_match(id);
        let delay = self.lookup_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }
        found
    }

    fn in_progress_on_table(&self, table: u32) -> StoreResult<Option<Match>> {
        self.inner.in_progress_on_table(table)
    }

    fn insert_matches(&self, batch: Vec<NewMatch>) -> StoreResult<Vec<Match>> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("inserts disabled".into()));
        }
        self.inner.insert_matches(batch)
    }

    fn save_match(&self, m: &Match) -> StoreResult<Match> {
        self.inner.save_match(m)
    }

    fn start_on_table(
        &self,
        id: MatchId,
        table: u32,
        at: NaiveDateTime,
    ) -> StoreResult<TableClaim> {
        self.inner.start_on_table(id, table, at)
    }

    fn finish_in_progress(&self, result: &Match) -> StoreResult<CompletionClaim> {
        self.inner.finish_in_progress(result)
    }
}

pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

pub struct Fixture {
    pub engine: Engine,
    pub events: Arc<RecordingSink>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_seed(7)
    }

    pub fn with_seed(seed: u64) -> Self {
        let events = Arc::new(RecordingSink::new());
        let engine = BracketEngine::with_rng(
            ControlledStore::default(),
            events.clone(),
            EngineConfig::default(),
            StdRng::seed_from_u64(seed),
        );
        Self { engine, events }
    }

    pub fn store(&self) -> &MemoryStore {
        &self.engine.store().inner
    }

    pub fn controls(&self) -> &ControlledStore {
        self.engine.store()
    }

    pub fn tournament(&self, title: &str) -> Tournament {
        self.store()
            .add_tournament(title, start(), start(), TournamentStatus::InProgress)
            .unwrap()
    }

    /// Register `names` in a new group of `tournament`.
    pub fn group(&self, tournament: TournamentId, name: &str, names: &[&str]) -> Vec<Player> {
        let group = self.store().add_group(tournament, name).unwrap();
        names
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let p = self.store().add_player(*n, 1000).unwrap();
                self.store()
                    .add_participation(tournament, Some(group.id), Some(p.id), Some(i as u32 + 1))
                    .unwrap();
                p
            })
            .collect()
    }

    /// Register `names` without a group.
    pub fn entrants(&self, tournament: TournamentId, names: &[&str]) -> Vec<Player> {
        names
            .iter()
            .map(|n| {
                let p = self.store().add_player(*n, 1000).unwrap();
                self.store()
                    .add_participation(tournament, None, Some(p.id), None)
                    .unwrap();
                p
            })
            .collect()
    }

    pub fn matches(&self, tournament: TournamentId) -> Vec<Match> {
        self.store().matches(tournament).unwrap()
    }

    pub fn status(&self, id: MatchId) -> MatchStatus {
        self.store().find_match(id).unwrap().unwrap().status
    }

    pub fn round(&self, tournament: TournamentId, round: Round) -> Vec<Match> {
        self.matches(tournament)
            .into_iter()
            .filter(|m| m.round == round)
            .collect()
    }

    /// Start on table 1 and complete with player 1 winning 3:1.
    pub fn play(&self, m: &Match) -> Match {
        self.play_with(m, 3, 1)
    }

    pub fn play_with(&self, m: &Match, score1: u32, score2: u32) -> Match {
        self.engine.start_match(m.id, 1).unwrap();
        self.engine
            .complete_match(m.id, Some(score1), Some(score2))
            .unwrap()
    }

    /// Play every scheduled match of a round, player 1 winning.
    pub fn play_round(&self, tournament: TournamentId, round: Round) {
        for m in self.round(tournament, round) {
            if m.status == MatchStatus::Scheduled {
                self.play(&m);
            }
        }
    }
}
