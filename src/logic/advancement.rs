//! Round advancement: once every match of a knockout round has a winner, the
//! winners are paired into the next round.

use super::engine::{hold, BracketEngine};
use super::pairing::{advance_slots, build_round};
use crate::error::BracketResult;
use crate::models::{Match, Player, Round, TournamentId};
use crate::notify::{EventSink, MatchUpdate};
use crate::store::MatchStore;
use chrono::Duration;

impl<S: MatchStore, N: EventSink> BracketEngine<S, N> {
    /// Called after a match completes. Generates the next round when the
    /// match's round is finished and the next round does not exist yet; otherwise
    /// does nothing.
    ///
    /// A freshly generated round that is already decided (only BYE pairings) is
    /// advanced in the same call, up to the final.
    pub fn auto_advance_winner(&self, completed: &Match) -> BracketResult<()> {
        let tournament_id = completed.tournament_id;
        if completed.round == Round::Final {
            log::info!(
                "Tournament {} final finished, champion: {}",
                tournament_id,
                completed.winner.as_deref().unwrap_or("-")
            );
            return Ok(());
        }
        if completed.round.is_preliminary() {
            log::debug!(
                "Match {} is preliminary; qualifiers are seeded by the main bracket",
                completed.id
            );
            return Ok(());
        }

        let lock = self.round_lock(tournament_id);
        let _guard = hold(&lock);

        let mut current = completed.round;
        while let Some(next) = current.next() {
            let Some(created) = self.generate_next_round(tournament_id, current, next)? else {
                return Ok(());
            };
            if !created.iter().all(Match::is_decided) {
                return Ok(());
            }
            if next == Round::Final {
                log::info!(
                    "Tournament {} final decided by BYE, champion: {}",
                    tournament_id,
                    created[0].winner.as_deref().unwrap_or("-")
                );
                return Ok(());
            }
            log::info!("{} of tournament {} decided by BYEs; advancing again", next, tournament_id);
            current = next;
        }
        Ok(())
    }

    /// Build `next` from the winners of `current`. `None` when nothing was generated.
    /// Must be called with the tournament's round lock held.
    fn generate_next_round(
        &self,
        tournament_id: TournamentId,
        current: Round,
        next: Round,
    ) -> BracketResult<Option<Vec<Match>>> {
        let all = self.store.matches(tournament_id)?;

        if all.iter().any(|m| m.round == next) {
            log::info!("Round {} already exists for tournament {}; skipping", next, tournament_id);
            return Ok(None);
        }

        let mut round: Vec<&Match> = all.iter().filter(|m| m.round == current).collect();
        if round.is_empty() {
            return Ok(None);
        }
        if round.iter().any(|m| !m.is_decided()) {
            log::info!(
                "Round {} of tournament {} is not finished yet",
                current,
                tournament_id
            );
            return Ok(None);
        }
        round.sort_by_key(|m| m.match_number);

        let winners: Vec<Player> = round
            .iter()
            .filter_map(|m| {
                let w = m.winning_player().cloned();
                if w.is_none() {
                    log::error!("Match {} winner {:?} matches neither side", m.id, m.winner);
                }
                w
            })
            .collect();
        if winners.is_empty() {
            return Ok(None);
        }

        let slots = self.with_random(|rng| advance_slots(winners, rng));
        let now = Self::now();
        let start = now + Duration::minutes(self.config.next_round_delay_minutes);
        let batch = build_round(tournament_id, next, slots, |_| start, now);

        let saved = self.store.insert_matches(batch)?;
        log::info!(
            "Next round {} generated for tournament {}: {} match(es)",
            next,
            tournament_id,
            saved.len()
        );
        self.events.notify(MatchUpdate::bracket_updated(tournament_id, next));
        Ok(Some(saved))
    }
}
