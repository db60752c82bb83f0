//! Main bracket: seeds group qualifiers into the first knockout round.

use super::engine::{hold, BracketEngine};
use super::pairing::{build_round, seed_slots};
use super::qualification::select_qualifiers;
use crate::error::{BracketError, BracketResult};
use crate::models::{Match, Round, TournamentId};
use crate::notify::{EventSink, MatchUpdate};
use crate::store::MatchStore;
use chrono::Duration;

impl<S: MatchStore, N: EventSink> BracketEngine<S, N> {
    /// Build the first main-bracket round from preliminary qualifiers.
    ///
    /// Fails with a conflict when a main bracket already exists, when any
    /// preliminary match is unfinished, or when nobody qualified.
    pub fn create_final_bracket(&self, tournament_id: TournamentId) -> BracketResult<Vec<Match>> {
        let tournament = self.load_tournament(tournament_id)?;
        log::info!("Generating main bracket for tournament {}", tournament.id);

        let lock = self.round_lock(tournament.id);
        let _guard = hold(&lock);

        let all = self.store.matches(tournament.id)?;
        if all.iter().any(|m| !m.round.is_preliminary()) {
            log::warn!("Main bracket already exists for tournament {}", tournament.id);
            return Err(BracketError::conflict("main bracket has already been generated"));
        }

        let preliminaries: Vec<Match> = all
            .into_iter()
            .filter(|m| m.round.is_preliminary())
            .collect();
        let unfinished = preliminaries.iter().filter(|m| !m.is_decided()).count();
        if unfinished > 0 {
            log::warn!(
                "Tournament {} still has {} unfinished preliminary match(es)",
                tournament.id,
                unfinished
            );
            return Err(BracketError::conflict(format!(
                "{unfinished} preliminary match(es) are not completed with a winner"
            )));
        }

        let qualifiers = select_qualifiers(&preliminaries, self.config.qualifiers_per_group);
        log::info!(
            "Qualifiers for tournament {}: {:?}",
            tournament.id,
            qualifiers.iter().map(|p| p.name.as_str()).collect::<Vec<_>>()
        );
        if qualifiers.is_empty() {
            return Err(BracketError::conflict("no players qualified for the main bracket"));
        }

        let slots = self.with_random(|rng| seed_slots(qualifiers, rng));
        if slots.len() < 2 {
            return Err(BracketError::conflict("main bracket needs at least 2 slots"));
        }

        let round = Round::for_slots(slots.len());
        let now = Self::now();
        let lead = self.config.main_round_lead_minutes;
        let spacing = self.config.main_match_spacing_minutes;
        let batch = build_round(
            tournament.id,
            round,
            slots,
            |i| now + Duration::minutes(lead + spacing * i as i64),
            now,
        );

        let saved = self.store.insert_matches(batch)?;
        log::info!(
            "Generated {} {} match(es) for tournament {}",
            saved.len(),
            round,
            tournament.id
        );
        self.events
            .notify(MatchUpdate::bracket_updated(tournament.id, round));
        Ok(saved)
    }

    /// Whether any match outside the preliminary stage exists.
    pub fn is_final_bracket_generated(&self, tournament_id: TournamentId) -> BracketResult<bool> {
        Ok(self
            .store
            .matches(tournament_id)?
            .iter()
            .any(|m| !m.round.is_preliminary()))
    }
}
