//! Match lifecycle: start on a table, complete with a score, admin correction.

use super::engine::BracketEngine;
use crate::error::{BracketError, BracketResult};
use crate::models::{Match, MatchId, MatchStatus, TournamentStatus};
use crate::notify::{EventSink, MatchUpdate};
use crate::store::{CompletionClaim, MatchStore, TableClaim};
use chrono::NaiveDate;

impl<S: MatchStore, N: EventSink> BracketEngine<S, N> {
    /// Put a scheduled match on `table_number`. The table must not host another
    /// match in progress.
    pub fn start_match(&self, match_id: MatchId, table_number: u32) -> BracketResult<Match> {
        log::info!("Starting match {} on table {}", match_id, table_number);
        let current = self.load_match(match_id)?;
        if current.status != MatchStatus::Scheduled {
            log::warn!(
                "Match {} is {:?}, not scheduled; cannot start",
                match_id,
                current.status
            );
            return Err(BracketError::conflict("only scheduled matches can be started"));
        }

        match self.store.start_on_table(match_id, table_number, Self::now())? {
            TableClaim::Started(started) => {
                self.events.notify(MatchUpdate::match_started(&started));
                self.events
                    .notify(MatchUpdate::table_updated(started.tournament_id));
                log::info!("Match {} in progress on table {}", match_id, table_number);
                Ok(started)
            }
            TableClaim::Occupied(other) => Err(BracketError::conflict(format!(
                "table {} is already hosting match {}",
                table_number, other.id
            ))),
            TableClaim::NotScheduled(status) => Err(BracketError::conflict(format!(
                "only scheduled matches can be started (match is {status:?})"
            ))),
            TableClaim::Missing => Err(BracketError::NotFound(format!("match {match_id}"))),
        }
    }

    /// Record the result of a match in progress, free its table, and advance
    /// the bracket if the round is finished.
    ///
    /// The status check and the write are one store operation, so of two
    /// concurrent completions of the same match only one succeeds. Once the
    /// result is stored the call succeeds: a failure while generating the next
    /// round is logged, and `auto_advance_winner` can be called again later.
    pub fn complete_match(
        &self,
        match_id: MatchId,
        score1: Option<u32>,
        score2: Option<u32>,
    ) -> BracketResult<Match> {
        log::info!("Completing match {} with {:?}:{:?}", match_id, score1, score2);
        let mut m = self.load_match(match_id)?;
        if m.status != MatchStatus::InProgress {
            log::warn!(
                "Match {} is {:?}, not in progress; cannot complete",
                match_id,
                m.status
            );
            return Err(BracketError::conflict("only matches in progress can be completed"));
        }
        let (score1, score2) = validate_scores(score1, score2)?;
        apply_result(&mut m, score1, score2)?;
        m.status = MatchStatus::Completed;
        m.table_number = None;
        m.updated_at = Self::now();

        let completed = match self.store.finish_in_progress(&m)? {
            CompletionClaim::Completed(completed) => completed,
            CompletionClaim::NotInProgress(status) => {
                log::warn!(
                    "Match {} became {:?} before its result was stored",
                    match_id,
                    status
                );
                return Err(BracketError::conflict(format!(
                    "only matches in progress can be completed (match is {status:?})"
                )));
            }
            CompletionClaim::Missing => {
                return Err(BracketError::NotFound(format!("match {match_id}")))
            }
        };
        self.events.notify(MatchUpdate::match_completed(&completed));
        self.events
            .notify(MatchUpdate::table_updated(completed.tournament_id));
        log::info!(
            "Match {} completed, winner {} ({}:{})",
            match_id,
            completed.winner.as_deref().unwrap_or("-"),
            score1,
            score2
        );

        if let Err(e) = self.auto_advance_winner(&completed) {
            log::error!(
                "Match {} is completed but the next round was not generated: {}",
                match_id,
                e
            );
        }
        Ok(completed)
    }

    /// Correct the score of a completed match. The winner is recomputed; rounds
    /// already generated are left alone.
    pub fn edit_match(
        &self,
        match_id: MatchId,
        score1: Option<u32>,
        score2: Option<u32>,
    ) -> BracketResult<Match> {
        log::info!("Correcting match {} to {:?}:{:?}", match_id, score1, score2);
        let mut m = self.load_match(match_id)?;
        if m.status != MatchStatus::Completed {
            return Err(BracketError::conflict(format!(
                "only completed matches can be corrected (match is {:?})",
                m.status
            )));
        }
        let (score1, score2) = validate_scores(score1, score2)?;
        apply_result(&mut m, score1, score2)?;
        m.updated_at = Self::now();

        let updated = self.store.save_match(&m)?;
        self.events.notify(MatchUpdate::match_completed(&updated));
        log::info!(
            "Match {} corrected, winner {} ({}:{})",
            match_id,
            updated.winner.as_deref().unwrap_or("-"),
            score1,
            score2
        );
        Ok(updated)
    }

    /// The match currently in progress on a table.
    pub fn match_on_table(&self, table_number: u32) -> BracketResult<Option<Match>> {
        Ok(self.store.in_progress_on_table(table_number)?)
    }

    /// Matches scheduled on `date` across all tournaments in progress.
    pub fn matches_on(&self, date: NaiveDate) -> BracketResult<Vec<Match>> {
        let mut today = Vec::new();
        for t in self.store.tournaments_with_status(TournamentStatus::InProgress)? {
            today.extend(
                self.store
                    .matches(t.id)?
                    .into_iter()
                    .filter(|m| m.match_time.is_some_and(|at| at.date() == date)),
            );
        }
        today.sort_by_key(|m| (m.match_time, m.tournament_id, m.match_number));
        log::debug!("{} match(es) scheduled on {}", today.len(), date);
        Ok(today)
    }
}

fn validate_scores(score1: Option<u32>, score2: Option<u32>) -> BracketResult<(u32, u32)> {
    let (Some(s1), Some(s2)) = (score1, score2) else {
        return Err(BracketError::validation("both scores are required"));
    };
    if s1 == s2 {
        return Err(BracketError::validation("draws are not supported; scores must differ"));
    }
    Ok((s1, s2))
}

fn apply_result(m: &mut Match, score1: u32, score2: u32) -> BracketResult<()> {
    let winner = m
        .player_for_scores(score1, score2)
        .map(|p| p.name.clone())
        .ok_or_else(|| {
            BracketError::conflict(format!("match {} has no player on the winning side", m.id))
        })?;
    m.score1 = Some(score1);
    m.score2 = Some(score2);
    m.winner = Some(winner);
    Ok(())
}
