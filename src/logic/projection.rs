//! Read models for renderers: the knockout bracket, flat match rows, group boards.

use super::engine::BracketEngine;
use super::qualification::{group_standings, GroupKey, Standing};
use crate::error::BracketResult;
use crate::models::{
    GroupId, Match, MatchId, MatchStatus, ParticipationId, PlayerId, Round, TournamentId,
};
use crate::notify::EventSink;
use crate::store::MatchStore;
use serde::Serialize;
use std::collections::BTreeMap;

/// Bracket in the shape jQuery-bracket style renderers expect.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BracketData {
    /// First-round pairings by name, "BYE" for empty slots.
    pub teams: Vec<[String; 2]>,
    /// Per round, per match: [score1, score2]; zeros until completed.
    pub results: Vec<Vec<[u32; 2]>>,
}

impl BracketData {
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty() && self.results.is_empty()
    }
}

/// Flatten the main-bracket matches (preliminaries are ignored).
pub fn project_bracket(matches: &[Match]) -> BracketData {
    let mut rounds: BTreeMap<Round, Vec<&Match>> = BTreeMap::new();
    for m in matches.iter().filter(|m| !m.round.is_preliminary()) {
        rounds.entry(m.round).or_default().push(m);
    }
    for round in rounds.values_mut() {
        round.sort_by_key(|m| m.match_number);
    }

    let Some(first) = rounds.values().next() else {
        return BracketData::default();
    };
    let teams = first
        .iter()
        .map(|m| [m.player1_name().to_string(), m.player2_name().to_string()])
        .collect();
    let results = rounds
        .values()
        .map(|round| {
            round
                .iter()
                .map(|m| match m.status {
                    MatchStatus::Completed => [m.score1.unwrap_or(0), m.score2.unwrap_or(0)],
                    _ => [0, 0],
                })
                .collect()
        })
        .collect();
    BracketData { teams, results }
}

/// One match, flattened for listings.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchView {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub group_id: Option<GroupId>,
    pub round: Round,
    pub match_number: u32,
    pub status: MatchStatus,
    pub player1_id: Option<PlayerId>,
    pub player2_id: Option<PlayerId>,
    pub player1_name: String,
    pub player2_name: String,
    pub score1: Option<u32>,
    pub score2: Option<u32>,
    pub winner: Option<String>,
    pub table_number: Option<u32>,
}

impl From<&Match> for MatchView {
    fn from(m: &Match) -> Self {
        Self {
            id: m.id,
            tournament_id: m.tournament_id,
            group_id: m.group_id,
            round: m.round,
            match_number: m.match_number,
            status: m.status,
            player1_id: m.player1.as_ref().map(|p| p.id),
            player2_id: m.player2.as_ref().map(|p| p.id),
            player1_name: m.player1_name().to_string(),
            player2_name: m.player2_name().to_string(),
            score1: m.score1,
            score2: m.score2,
            winner: m.winner.clone(),
            table_number: m.table_number,
        }
    }
}

/// A seeded entry of a group.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeedView {
    pub participation_id: ParticipationId,
    pub player_id: Option<PlayerId>,
    /// `None` when the entry is not linked to a player.
    pub player_name: Option<String>,
    pub seed_number: Option<u32>,
}

/// A group with its entries and preliminary progress.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupSummary {
    pub id: GroupId,
    pub name: String,
    pub tournament_id: TournamentId,
    pub tournament_title: String,
    pub seeds: Vec<SeedView>,
    pub completed_matches: usize,
    pub total_matches: usize,
    pub standings: Vec<Standing>,
}

impl<S: MatchStore, N: EventSink> BracketEngine<S, N> {
    /// Current bracket of a tournament. Empty (not an error) before the main
    /// bracket exists.
    pub fn bracket_data(&self, tournament_id: TournamentId) -> BracketResult<BracketData> {
        let tournament = self.load_tournament(tournament_id)?;
        let data = project_bracket(&self.store.matches(tournament.id)?);
        if data.is_empty() {
            log::warn!("No main bracket matches for tournament {}", tournament.id);
        }
        Ok(data)
    }

    /// All matches of a tournament in (round, match number) order.
    pub fn matches_for(&self, tournament_id: TournamentId) -> BracketResult<Vec<MatchView>> {
        let tournament = self.load_tournament(tournament_id)?;
        Ok(self
            .store
            .matches(tournament.id)?
            .iter()
            .map(MatchView::from)
            .collect())
    }

    /// Winner of the completed final, if there is one.
    pub fn champion(&self, tournament_id: TournamentId) -> BracketResult<Option<String>> {
        Ok(self
            .store
            .matches(tournament_id)?
            .into_iter()
            .find(|m| m.round == Round::Final && m.is_decided())
            .and_then(|m| m.winner))
    }

    /// Groups of a tournament with seeds (seed order, unseeded last), match
    /// progress and current standings.
    pub fn group_overview(&self, tournament_id: TournamentId) -> BracketResult<Vec<GroupSummary>> {
        let tournament = self.load_tournament(tournament_id)?;
        let matches = self.store.matches(tournament.id)?;
        let mut standings = group_standings(
            &matches
                .iter()
                .filter(|m| m.round.is_preliminary())
                .cloned()
                .collect::<Vec<_>>(),
        );

        let mut summaries = Vec::new();
        for group in self.store.groups(tournament.id)? {
            let mut entries = self.store.group_participations(group.id)?;
            entries.sort_by_key(|p| (p.seed_number.is_none(), p.seed_number, p.id));
            let mut seeds = Vec::with_capacity(entries.len());
            for p in entries {
                let player = match p.player_id {
                    Some(id) => self.store.player(id)?,
                    None => None,
                };
                seeds.push(SeedView {
                    participation_id: p.id,
                    player_id: p.player_id,
                    player_name: player.map(|pl| pl.name),
                    seed_number: p.seed_number,
                });
            }

            let in_group = matches.iter().filter(|m| m.group_id == Some(group.id));
            let (completed, total) = in_group.fold((0, 0), |(done, all), m| {
                (done + usize::from(m.status == MatchStatus::Completed), all + 1)
            });
            summaries.push(GroupSummary {
                id: group.id,
                name: group.name,
                tournament_id: tournament.id,
                tournament_title: tournament.title.clone(),
                seeds,
                completed_matches: completed,
                total_matches: total,
                standings: standings.remove(&GroupKey::of(Some(group.id))).unwrap_or_default(),
            });
        }
        Ok(summaries)
    }
}
