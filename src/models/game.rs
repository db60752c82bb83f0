//! Match, MatchStatus, and the Round table that drives bracket progression.

use crate::models::player::Player;
use crate::models::tournament::{GroupId, TournamentId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Unique identifier for a match (assigned by the store).
pub type MatchId = u64;

/// Display name used for an empty bracket slot.
pub const BYE: &str = "BYE";

/// Lifecycle of a match. Only moves forward: Scheduled -> InProgress -> Completed.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    /// Side exit; never produced by the bracket engine itself.
    Cancelled,
}

/// Bracket stage. Declaration order is the display/sort order; `Main` is the
/// catch-all for labels outside the fixed table and sorts last.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Round {
    Preliminary,
    RoundOf32,
    RoundOf16,
    QuarterFinal,
    SemiFinal,
    Final,
    Main,
}

impl Round {
    /// Label stored on matches and shown in brackets.
    pub fn label(self) -> &'static str {
        match self {
            Round::Preliminary => "예선",
            Round::RoundOf32 => "32강",
            Round::RoundOf16 => "16강",
            Round::QuarterFinal => "8강",
            Round::SemiFinal => "4강",
            Round::Final => "결승",
            Round::Main => "본선",
        }
    }

    /// Parse a stored label. Anything unknown maps to `Main`.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "예선" => Round::Preliminary,
            "32강" => Round::RoundOf32,
            "16강" => Round::RoundOf16,
            "8강" => Round::QuarterFinal,
            "4강" => Round::SemiFinal,
            "결승" => Round::Final,
            _ => Round::Main,
        }
    }

    /// Round name for a first round with `slots` bracket slots (a power of two).
    pub fn for_slots(slots: usize) -> Self {
        match slots {
            0..=2 => Round::Final,
            4 => Round::SemiFinal,
            8 => Round::QuarterFinal,
            16 => Round::RoundOf16,
            32 => Round::RoundOf32,
            _ => Round::Main,
        }
    }

    /// Successor stage, or `None` when the bracket stops here.
    ///
    /// The preliminary entry is nominal: qualifiers out of the round-robin stage
    /// are seeded by the main bracket generator, not by advancement.
    pub fn next(self) -> Option<Round> {
        match self {
            Round::Preliminary => Some(Round::RoundOf16),
            Round::RoundOf32 => Some(Round::RoundOf16),
            Round::RoundOf16 => Some(Round::QuarterFinal),
            Round::QuarterFinal => Some(Round::SemiFinal),
            Round::SemiFinal => Some(Round::Final),
            Round::Final | Round::Main => None,
        }
    }

    pub fn is_preliminary(self) -> bool {
        self == Round::Preliminary
    }
}

impl std::fmt::Display for Round {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Round {
    fn from(label: String) -> Self {
        Round::from_label(&label)
    }
}

impl From<Round> for String {
    fn from(round: Round) -> Self {
        round.label().to_string()
    }
}

/// A match that has not been persisted yet. The store assigns the id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewMatch {
    pub tournament_id: TournamentId,
    pub group_id: Option<GroupId>,
    pub round: Round,
    pub match_number: u32,
    /// `None` is a BYE slot.
    pub player1: Option<Player>,
    pub player2: Option<Player>,
    pub status: MatchStatus,
    pub score1: Option<u32>,
    pub score2: Option<u32>,
    pub winner: Option<String>,
    pub match_time: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl NewMatch {
    /// Build a scheduled pairing. A pairing with exactly one empty side is
    /// created already completed: 0:0, won by the present player.
    #[allow(clippy::too_many_arguments)]
    pub fn pairing(
        tournament_id: TournamentId,
        group_id: Option<GroupId>,
        round: Round,
        match_number: u32,
        player1: Option<Player>,
        player2: Option<Player>,
        match_time: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> Self {
        let mut m = Self {
            tournament_id,
            group_id,
            round,
            match_number,
            player1,
            player2,
            status: MatchStatus::Scheduled,
            score1: None,
            score2: None,
            winner: None,
            match_time,
            created_at: now,
        };
        let present = match (&m.player1, &m.player2) {
            (Some(p), None) | (None, Some(p)) => Some(p.name.clone()),
            _ => None,
        };
        if let Some(name) = present {
            m.score1 = Some(0);
            m.score2 = Some(0);
            m.winner = Some(name);
            m.status = MatchStatus::Completed;
        }
        m
    }

    /// Attach the store-assigned id.
    pub fn into_match(self, id: MatchId) -> Match {
        Match {
            id,
            tournament_id: self.tournament_id,
            group_id: self.group_id,
            round: self.round,
            match_number: self.match_number,
            player1: self.player1,
            player2: self.player2,
            status: self.status,
            score1: self.score1,
            score2: self.score2,
            winner: self.winner,
            table_number: None,
            match_time: self.match_time,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// A persisted match between two players (either side may be a BYE).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    /// Set for preliminary matches played inside a group.
    pub group_id: Option<GroupId>,
    pub round: Round,
    /// Sequence within the round, starting at 1.
    pub match_number: u32,
    pub player1: Option<Player>,
    pub player2: Option<Player>,
    pub status: MatchStatus,
    pub score1: Option<u32>,
    pub score2: Option<u32>,
    /// Name of the winning player.
    pub winner: Option<String>,
    /// Physical table; only held while in progress.
    pub table_number: Option<u32>,
    pub match_time: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Match {
    /// Completed with a winner recorded.
    pub fn is_decided(&self) -> bool {
        self.status == MatchStatus::Completed && self.winner.is_some()
    }

    /// Exactly one side is empty.
    pub fn is_bye(&self) -> bool {
        self.player1.is_some() != self.player2.is_some()
    }

    pub fn player1_name(&self) -> &str {
        self.player1.as_ref().map_or(BYE, |p| p.name.as_str())
    }

    pub fn player2_name(&self) -> &str {
        self.player2.as_ref().map_or(BYE, |p| p.name.as_str())
    }

    /// Resolve the stored winner name to (winner, loser). Player 1 is checked first.
    /// The loser is `None` for a BYE pairing.
    pub fn outcome(&self) -> Option<(&Player, Option<&Player>)> {
        let winner = self.winner.as_deref()?;
        match (&self.player1, &self.player2) {
            (Some(p1), p2) if p1.name == winner => Some((p1, p2.as_ref())),
            (p1, Some(p2)) if p2.name == winner => Some((p2, p1.as_ref())),
            _ => None,
        }
    }

    /// The winning player, if the winner name resolves to one of the sides.
    pub fn winning_player(&self) -> Option<&Player> {
        self.outcome().map(|(w, _)| w)
    }

    /// Player on the side with the higher score. `None` on equal scores or an empty side.
    pub fn player_for_scores(&self, score1: u32, score2: u32) -> Option<&Player> {
        match score1.cmp(&score2) {
            std::cmp::Ordering::Greater => self.player1.as_ref(),
            std::cmp::Ordering::Less => self.player2.as_ref(),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn player(id: u64, name: &str) -> Player {
        Player {
            id,
            name: name.to_string(),
            ranking: 1000,
        }
    }

    #[test]
    fn slot_counts_map_to_round_names() {
        assert_eq!(Round::for_slots(2), Round::Final);
        assert_eq!(Round::for_slots(4), Round::SemiFinal);
        assert_eq!(Round::for_slots(8), Round::QuarterFinal);
        assert_eq!(Round::for_slots(16), Round::RoundOf16);
        assert_eq!(Round::for_slots(32), Round::RoundOf32);
        assert_eq!(Round::for_slots(64), Round::Main);
        assert_eq!(Round::for_slots(64).label(), "본선");
    }

    #[test]
    fn progression_table() {
        assert_eq!(Round::Preliminary.next(), Some(Round::RoundOf16));
        assert_eq!(Round::RoundOf32.next(), Some(Round::RoundOf16));
        assert_eq!(Round::RoundOf16.next(), Some(Round::QuarterFinal));
        assert_eq!(Round::QuarterFinal.next(), Some(Round::SemiFinal));
        assert_eq!(Round::SemiFinal.next(), Some(Round::Final));
        assert_eq!(Round::Final.next(), None);
        assert_eq!(Round::Main.next(), None);
    }

    #[test]
    fn unknown_labels_sort_last() {
        let labels = ["결승", "본선", "8강", "예선", "16강", "4강", "32강", "우승"];
        let mut rounds: Vec<Round> = labels
            .iter()
            .map(|l| Round::from_label(l))
            .collect();
        rounds.sort();
        let labels: Vec<_> = rounds.iter().map(|r| r.label()).collect();
        assert_eq!(
            labels,
            vec!["예선", "32강", "16강", "8강", "4강", "결승", "본선", "본선"]
        );
    }

    #[test]
    fn round_serializes_as_label() {
        let json = serde_json::to_string(&Round::QuarterFinal).unwrap();
        assert_eq!(json, "\"8강\"");
        let back: Round = serde_json::from_str("\"결승\"").unwrap();
        assert_eq!(back, Round::Final);
    }

    #[test]
    fn bye_pairing_is_completed_for_present_side() {
        let m = NewMatch::pairing(
            1,
            None,
            Round::QuarterFinal,
            3,
            None,
            Some(player(7, "Kim")),
            None,
            now(),
        );
        assert_eq!(m.status, MatchStatus::Completed);
        assert_eq!((m.score1, m.score2), (Some(0), Some(0)));
        assert_eq!(m.winner.as_deref(), Some("Kim"));

        let m = NewMatch::pairing(
            1,
            None,
            Round::QuarterFinal,
            4,
            Some(player(1, "Lee")),
            Some(player(2, "Park")),
            None,
            now(),
        );
        assert_eq!(m.status, MatchStatus::Scheduled);
        assert!(m.winner.is_none());
    }

    #[test]
    fn outcome_resolves_winner_and_loser() {
        let mut m = NewMatch::pairing(
            1,
            None,
            Round::Final,
            1,
            Some(player(1, "Lee")),
            Some(player(2, "Park")),
            None,
            now(),
        )
        .into_match(10);
        m.status = MatchStatus::Completed;
        m.winner = Some("Park".into());
        let (w, l) = m.outcome().unwrap();
        assert_eq!(w.id, 2);
        assert_eq!(l.map(|p| p.id), Some(1));

        m.winner = Some("Nobody".into());
        assert!(m.outcome().is_none());
    }
}
