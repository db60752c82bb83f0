//! Group standings and qualifier selection from finished preliminary matches.

use crate::models::{GroupId, Match, Player, PlayerId};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

/// One player's record inside a group.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Standing {
    pub player: Player,
    pub wins: u32,
    /// Sum of winning margins minus sum of losing margins.
    pub score_diff: i64,
}

/// Groups in qualifier order: by group id, with ungrouped matches last.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct GroupKey {
    ungrouped: bool,
    id: GroupId,
}

impl GroupKey {
    pub fn of(group_id: Option<GroupId>) -> Self {
        Self {
            ungrouped: group_id.is_none(),
            id: group_id.unwrap_or(0),
        }
    }

    pub fn group_id(self) -> Option<GroupId> {
        (!self.ungrouped).then_some(self.id)
    }
}

/// Tally wins and score differentials per group, each group ranked by
/// (wins desc, differential desc, player id asc).
///
/// Matches whose winner does not resolve to either side are logged and skipped,
/// as are BYE pairings.
pub fn group_standings(preliminaries: &[Match]) -> BTreeMap<GroupKey, Vec<Standing>> {
    let mut tallies: BTreeMap<GroupKey, HashMap<PlayerId, Standing>> = BTreeMap::new();

    for m in preliminaries {
        if m.winner.is_none() {
            continue;
        }
        let Some((winner, loser)) = m.outcome() else {
            log::error!("Match {} winner {:?} matches neither side", m.id, m.winner);
            continue;
        };
        let Some(loser) = loser else {
            continue;
        };

        let margin = match (m.score1, m.score2) {
            (Some(s1), Some(s2)) => (i64::from(s1) - i64::from(s2)).abs(),
            _ => 0,
        };
        let table = tallies.entry(GroupKey::of(m.group_id)).or_default();
        let w = table.entry(winner.id).or_insert_with(|| Standing::new(winner));
        w.wins += 1;
        w.score_diff += margin;
        let l = table.entry(loser.id).or_insert_with(|| Standing::new(loser));
        l.score_diff -= margin;
    }

    tallies
        .into_iter()
        .map(|(key, table)| {
            let mut ranked: Vec<Standing> = table.into_values().collect();
            ranked.sort_by_key(|s| (Reverse(s.wins), Reverse(s.score_diff), s.player.id));
            (key, ranked)
        })
        .collect()
}

/// Top `per_group` players of every group, concatenated in group order. Only
/// players with at least one win are eligible.
pub fn select_qualifiers(preliminaries: &[Match], per_group: usize) -> Vec<Player> {
    group_standings(preliminaries)
        .into_values()
        .flat_map(|ranked| {
            ranked
                .into_iter()
                .filter(|s| s.wins > 0)
                .take(per_group)
                .map(|s| s.player)
        })
        .collect()
}

impl Standing {
    fn new(player: &Player) -> Self {
        Self {
            player: player.clone(),
            wins: 0,
            score_diff: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchStatus, NewMatch, Round};
    use chrono::NaiveDate;

    fn p(id: u64, name: &str) -> Player {
        Player::new(id, name, 1000)
    }

    fn played(id: u64, group: Option<u64>, a: &Player, b: &Player, s1: u32, s2: u32) -> Match {
        let now = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let mut m = NewMatch::pairing(
            1,
            group,
            Round::Preliminary,
            id as u32,
            Some(a.clone()),
            Some(b.clone()),
            None,
            now,
        )
        .into_match(id);
        m.status = MatchStatus::Completed;
        m.score1 = Some(s1);
        m.score2 = Some(s2);
        m.winner = Some(if s1 > s2 { a.name.clone() } else { b.name.clone() });
        m
    }

    #[test]
    fn ranks_by_wins_then_differential() {
        let (a, b, c, d) = (p(1, "A"), p(2, "B"), p(3, "C"), p(4, "D"));
        let matches = vec![
            played(1, Some(10), &a, &b, 3, 1),
            played(2, Some(10), &a, &c, 3, 2),
            played(3, Some(10), &a, &d, 0, 3),
            played(4, Some(10), &b, &c, 3, 0),
            played(5, Some(10), &b, &d, 3, 0),
            played(6, Some(10), &c, &d, 3, 1),
        ];
        let standings = group_standings(&matches);
        let ranked = &standings[&GroupKey::of(Some(10))];
        let order: Vec<_> = ranked.iter().map(|s| s.player.name.as_str()).collect();
        // B: 2 wins, diff -2+3+3 = 4; A: 2 wins, diff 2+1-3 = 0; D: 1 win, C: 1 win
        assert_eq!(order[..2], ["B", "A"]);
        assert_eq!(ranked[0].score_diff, 4);
        assert_eq!(ranked[1].score_diff, 0);

        let q = select_qualifiers(&matches, 2);
        assert_eq!(q, vec![b, a]);
    }

    #[test]
    fn groups_are_combined_by_group_id() {
        let (a, b, c, d) = (p(1, "A"), p(2, "B"), p(3, "C"), p(4, "D"));
        let matches = vec![played(1, Some(20), &c, &d, 3, 0), played(2, Some(5), &a, &b, 1, 3)];
        let q = select_qualifiers(&matches, 1);
        assert_eq!(q, vec![b, c]);
    }

    #[test]
    fn winless_players_do_not_qualify() {
        let (a, b) = (p(1, "A"), p(2, "B"));
        let q = select_qualifiers(&[played(1, None, &a, &b, 3, 2)], 2);
        assert_eq!(q, vec![a]);
    }

    #[test]
    fn mismatched_winner_is_skipped() {
        let (a, b) = (p(1, "A"), p(2, "B"));
        let mut m = played(1, None, &a, &b, 3, 2);
        m.winner = Some("Someone else".into());
        assert!(group_standings(&[m]).is_empty());
    }
}
