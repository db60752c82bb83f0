//! Preliminary stage: round-robin inside each group, or a single knockout
//! first round when the tournament has no groups.

use super::engine::{hold, BracketEngine};
use super::pairing::{build_round, round_robin_pairs, seed_slots};
use crate::error::{BracketError, BracketResult};
use crate::models::{NewMatch, Participation, Player, Round, Tournament, TournamentId};
use crate::notify::{EventSink, MatchUpdate};
use crate::store::MatchStore;
use chrono::Duration;

impl<S: MatchStore, N: EventSink> BracketEngine<S, N> {
    /// Generate the first competitive layer and return the number of matches the
    /// tournament now has.
    ///
    /// 1. If the tournament already has matches, return their count unchanged.
    /// 2. With groups: every pair of linked players inside each group, round name 예선,
    ///    numbered across the whole tournament.
    /// 3. Without groups: pad all linked players to a power of two with BYEs, shuffle,
    ///    and pair them into the first knockout round.
    ///
    /// Returns 0 when there is nothing to pair (fewer than two registrations).
    pub fn create_preliminary_matches(&self, tournament_id: TournamentId) -> BracketResult<usize> {
        let tournament = self.load_tournament(tournament_id)?;
        log::info!("Generating preliminary matches for tournament {}", tournament.id);

        let lock = self.round_lock(tournament.id);
        let _guard = hold(&lock);

        let existing = self.store.matches(tournament.id)?;
        if !existing.is_empty() {
            let preliminaries = existing.iter().filter(|m| m.round.is_preliminary()).count();
            log::info!(
                "Tournament {} already has matches ({} preliminary, {} main); nothing generated",
                tournament.id,
                preliminaries,
                existing.len() - preliminaries
            );
            return Ok(existing.len());
        }

        let groups = self.store.groups(tournament.id)?;
        let (batch, round) = if groups.is_empty() {
            log::info!("Tournament {} has no groups; seeding a single bracket", tournament.id);
            match self.single_bracket_matches(&tournament)? {
                Some(batch) => {
                    let round = batch[0].round;
                    (batch, round)
                }
                None => return Ok(0),
            }
        } else {
            log::info!(
                "Tournament {} has {} group(s); generating round-robin",
                tournament.id,
                groups.len()
            );
            let mut batch = Vec::new();
            for group in &groups {
                let participations = self.store.group_participations(group.id)?;
                if participations.len() < 2 {
                    log::warn!(
                        "Group {} has fewer than 2 participants ({}); skipping",
                        group.name,
                        participations.len()
                    );
                    continue;
                }
                let players = self.resolve_players(&participations)?;
                if players.len() < participations.len() {
                    log::error!(
                        "Group {}: {} participants but only {} linked to a player",
                        group.name,
                        participations.len(),
                        players.len()
                    );
                }
                if players.len() < 2 {
                    return Err(BracketError::conflict(format!(
                        "group '{}' has fewer than 2 participants linked to a player \
                         (participants: {}, with player: {})",
                        group.name,
                        participations.len(),
                        players.len()
                    )));
                }
                log::info!("Group {}: pairing {} players", group.name, players.len());

                let now = Self::now();
                for (i, j) in round_robin_pairs(players.len()) {
                    let number = batch.len() as u32 + 1;
                    batch.push(NewMatch::pairing(
                        tournament.id,
                        Some(group.id),
                        Round::Preliminary,
                        number,
                        Some(players[i].clone()),
                        Some(players[j].clone()),
                        Some(self.preliminary_time(&tournament, number as usize - 1)),
                        now,
                    ));
                }
            }
            (batch, Round::Preliminary)
        };

        if batch.is_empty() {
            log::warn!("No matches generated for tournament {}", tournament.id);
            return Ok(0);
        }

        let saved = self.store.insert_matches(batch)?;
        log::info!(
            "Generated {} {} match(es) for tournament {}",
            saved.len(),
            round,
            tournament.id
        );
        self.events
            .notify(MatchUpdate::matches_scheduled(tournament.id, saved.len()));
        if !round.is_preliminary() {
            self.events
                .notify(MatchUpdate::bracket_updated(tournament.id, round));
        }
        Ok(saved.len())
    }

    /// First knockout round over every registration. `None` when fewer than two
    /// registrations exist.
    fn single_bracket_matches(
        &self,
        tournament: &Tournament,
    ) -> BracketResult<Option<Vec<NewMatch>>> {
        let participations = self.store.participations(tournament.id)?;
        if participations.len() < 2 {
            log::warn!(
                "Tournament {} has fewer than 2 participants ({}); cannot create matches",
                tournament.id,
                participations.len()
            );
            return Ok(None);
        }
        let players = self.resolve_players(&participations)?;
        if players.len() < participations.len() {
            log::error!(
                "{} participants but only {} linked to a player",
                participations.len(),
                players.len()
            );
        }
        if players.len() < 2 {
            return Err(BracketError::conflict(format!(
                "fewer than 2 participants are linked to a player \
                 (participants: {}, with player: {})",
                participations.len(),
                players.len()
            )));
        }

        let slots = self.with_random(|rng| seed_slots(players, rng));
        let round = Round::for_slots(slots.len());
        log::info!(
            "Creating {} with {} match(es) for tournament {}",
            round,
            slots.len() / 2,
            tournament.id
        );
        let batch = build_round(
            tournament.id,
            round,
            slots,
            |i| self.preliminary_time(tournament, i),
            Self::now(),
        );
        Ok(Some(batch))
    }

    /// Players behind the given registrations. Registrations without a linked
    /// player are logged and left out.
    pub(crate) fn resolve_players(
        &self,
        participations: &[Participation],
    ) -> BracketResult<Vec<Player>> {
        let mut players = Vec::with_capacity(participations.len());
        for p in participations {
            let Some(player_id) = p.player_id else {
                log::warn!("Participation {} has no player; left out of pairing", p.id);
                continue;
            };
            match self.store.player(player_id)? {
                Some(player) => players.push(player),
                None => log::warn!(
                    "Participation {} points at missing player {}; left out of pairing",
                    p.id,
                    player_id
                ),
            }
        }
        Ok(players)
    }

    fn preliminary_time(&self, tournament: &Tournament, offset: usize) -> chrono::NaiveDateTime {
        let minutes = self.config.match_interval_minutes * offset as i64;
        tournament.start_date + Duration::minutes(minutes)
    }
}
