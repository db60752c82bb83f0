//! Match update events pushed to spectators. Delivery is someone else's job;
//! the engine only hands events to an [`EventSink`].

use crate::models::{Match, MatchId, MatchStatus, Round, TournamentId};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    MatchStarted,
    MatchCompleted,
    MatchScheduled,
    TableUpdated,
    BracketUpdated,
}

/// Payload of one event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchUpdate {
    pub id: Uuid,
    pub kind: EventKind,
    pub tournament_id: TournamentId,
    pub match_id: Option<MatchId>,
    pub round: Option<Round>,
    pub match_number: Option<u32>,
    pub status: Option<MatchStatus>,
    pub table_number: Option<u32>,
    pub player1_name: Option<String>,
    pub player2_name: Option<String>,
    pub score1: Option<u32>,
    pub score2: Option<u32>,
    pub winner: Option<String>,
    pub timestamp: NaiveDateTime,
    /// Human-readable line for the live board.
    pub message: String,
}

impl MatchUpdate {
    fn bare(kind: EventKind, tournament_id: TournamentId, message: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            tournament_id,
            match_id: None,
            round: None,
            match_number: None,
            status: None,
            table_number: None,
            player1_name: None,
            player2_name: None,
            score1: None,
            score2: None,
            winner: None,
            timestamp: Local::now().naive_local(),
            message,
        }
    }

    fn for_match(kind: EventKind, m: &Match, message: String) -> Self {
        Self {
            match_id: Some(m.id),
            round: Some(m.round),
            match_number: Some(m.match_number),
            status: Some(m.status),
            table_number: m.table_number,
            player1_name: Some(m.player1_name().to_string()),
            player2_name: Some(m.player2_name().to_string()),
            ..Self::bare(kind, m.tournament_id, message)
        }
    }

    pub fn match_started(m: &Match) -> Self {
        let table = m.table_number.map_or_else(|| "?".to_string(), |t| t.to_string());
        let message = format!(
            "{} {}경기가 {}번 탁구대에서 시작되었습니다",
            m.round, m.match_number, table
        );
        Self::for_match(EventKind::MatchStarted, m, message)
    }

    pub fn match_completed(m: &Match) -> Self {
        let message = format!(
            "{} {}경기 종료! 승자: {} ({}:{})",
            m.round,
            m.match_number,
            m.winner.as_deref().unwrap_or("-"),
            m.score1.unwrap_or(0),
            m.score2.unwrap_or(0)
        );
        Self {
            score1: m.score1,
            score2: m.score2,
            winner: m.winner.clone(),
            ..Self::for_match(EventKind::MatchCompleted, m, message)
        }
    }

    pub fn matches_scheduled(tournament_id: TournamentId, count: usize) -> Self {
        Self::bare(
            EventKind::MatchScheduled,
            tournament_id,
            format!("예선 {count}경기가 편성되었습니다"),
        )
    }

    pub fn bracket_updated(tournament_id: TournamentId, round: Round) -> Self {
        Self {
            round: Some(round),
            ..Self::bare(
                EventKind::BracketUpdated,
                tournament_id,
                format!("{round} 대진표가 업데이트되었습니다"),
            )
        }
    }

    pub fn table_updated(tournament_id: TournamentId) -> Self {
        Self::bare(
            EventKind::TableUpdated,
            tournament_id,
            "탁구대 상태가 업데이트되었습니다".to_string(),
        )
    }
}

/// Fire-and-forget event consumer. Implementations must not fail the caller.
pub trait EventSink: Send + Sync {
    fn notify(&self, event: MatchUpdate);
}

/// Writes events to the log as JSON lines.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn notify(&self, event: MatchUpdate) {
        match serde_json::to_string(&event) {
            Ok(json) => log::info!("event tournament={} {}", event.tournament_id, json),
            Err(e) => log::warn!("could not encode {:?} event: {}", event.kind, e),
        }
    }
}

/// Keeps every event in memory; handy for polling clients and tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: std::sync::Mutex<Vec<MatchUpdate>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<MatchUpdate> {
        match self.events.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Events of one tournament, oldest first.
    pub fn events_for(&self, tournament_id: TournamentId) -> Vec<MatchUpdate> {
        self.events()
            .into_iter()
            .filter(|e| e.tournament_id == tournament_id)
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn notify(&self, event: MatchUpdate) {
        log::debug!("recorded {:?} for tournament {}", event.kind, event.tournament_id);
        match self.events.lock() {
            Ok(mut g) => g.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

impl<T: EventSink + ?Sized> EventSink for std::sync::Arc<T> {
    fn notify(&self, event: MatchUpdate) {
        (**self).notify(event)
    }
}
