//! The bracket engine service: store, event sink, settings, randomness and the
//! per-tournament locks that serialize round generation.

use crate::config::EngineConfig;
use crate::error::{BracketError, BracketResult};
use crate::models::{Match, MatchId, Tournament, TournamentId};
use crate::notify::EventSink;
use crate::store::MatchStore;
use chrono::{Local, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Schedules and progresses tournaments. Operations live in the sibling modules
/// (`preliminary`, `main_bracket`, `advancement`, `lifecycle`, `projection`).
pub struct BracketEngine<S, N> {
    pub(crate) store: S,
    pub(crate) events: N,
    pub(crate) config: EngineConfig,
    rng: Mutex<Box<dyn RngCore + Send>>,
    round_locks: Mutex<HashMap<TournamentId, Arc<Mutex<()>>>>,
}

impl<S: MatchStore, N: EventSink> BracketEngine<S, N> {
    /// Engine with an entropy-seeded random source.
    pub fn new(store: S, events: N, config: EngineConfig) -> Self {
        Self::with_rng(store, events, config, StdRng::from_entropy())
    }

    /// Engine with a caller-provided random source (e.g. a seeded `StdRng` for
    /// reproducible draws).
    pub fn with_rng(
        store: S,
        events: N,
        config: EngineConfig,
        rng: impl RngCore + Send + 'static,
    ) -> Self {
        Self {
            store,
            events,
            config,
            rng: Mutex::new(Box::new(rng)),
            round_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn events(&self) -> &N {
        &self.events
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `f` with exclusive access to the random source.
    pub(crate) fn with_random<T>(&self, f: impl FnOnce(&mut dyn RngCore) -> T) -> T {
        let mut guard = match self.rng.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut **guard)
    }

    /// Lock guarding round generation for one tournament. Other tournaments are
    /// not blocked.
    pub(crate) fn round_lock(&self, tournament_id: TournamentId) -> Arc<Mutex<()>> {
        let mut locks = match self.round_locks.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        locks.entry(tournament_id).or_default().clone()
    }

    pub(crate) fn load_tournament(&self, id: TournamentId) -> BracketResult<Tournament> {
        self.store
            .tournament(id)?
            .ok_or_else(|| BracketError::NotFound(format!("tournament {id}")))
    }

    pub(crate) fn load_match(&self, id: MatchId) -> BracketResult<Match> {
        self.store
            .find_match(id)?
            .ok_or_else(|| BracketError::NotFound(format!("match {id}")))
    }

    pub(crate) fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Acquire a round lock; a panic in another generator does not wedge the tournament.
pub(crate) fn hold(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    match lock.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}
