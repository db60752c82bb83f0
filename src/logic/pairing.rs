//! Slot arithmetic shared by the generators: bracket sizing, BYE placement,
//! round-robin pairs, and turning a slot list into match records.

use crate::models::{NewMatch, Player, Round, TournamentId};
use chrono::NaiveDateTime;
use rand::seq::SliceRandom;
use rand::Rng;

/// Smallest power of two that holds `entrants` (never less than 2).
pub fn bracket_size(entrants: usize) -> usize {
    entrants.max(2).next_power_of_two()
}

/// Every unordered pair of indices in `0..n`, in (i, j) order with i < j.
pub fn round_robin_pairs(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect()
}

/// Pad `entrants` with BYE slots up to the bracket size and shuffle.
///
/// BYEs never face each other: there are always fewer BYEs than pairings, so any
/// BYE/BYE pairing left by the shuffle is swapped against a full pairing.
pub fn seed_slots<R: Rng + ?Sized>(entrants: Vec<Player>, rng: &mut R) -> Vec<Option<Player>> {
    let size = bracket_size(entrants.len());
    let mut slots: Vec<Option<Player>> = entrants.into_iter().map(Some).collect();
    slots.resize_with(size, || None);
    slots.shuffle(rng);
    spread_byes(&mut slots);
    slots
}

/// Pad to the bracket size, keeping the given order when no padding is needed so
/// that winners of neighbouring matches meet. Shuffles only when BYEs are added.
pub fn advance_slots<R: Rng + ?Sized>(winners: Vec<Player>, rng: &mut R) -> Vec<Option<Player>> {
    if winners.len() >= 2 && winners.len().is_power_of_two() {
        return winners.into_iter().map(Some).collect();
    }
    seed_slots(winners, rng)
}

fn spread_byes(slots: &mut [Option<Player>]) {
    let pairs = slots.len() / 2;
    let mut full: Vec<usize> = (0..pairs)
        .filter(|&i| slots[2 * i].is_some() && slots[2 * i + 1].is_some())
        .collect();
    for i in 0..pairs {
        if slots[2 * i].is_none() && slots[2 * i + 1].is_none() {
            match full.pop() {
                Some(j) => slots.swap(2 * i + 1, 2 * j + 1),
                None => break,
            }
        }
    }
}

/// Pair slots sequentially into one round, numbered from 1. `schedule` gets the
/// zero-based pairing index.
pub fn build_round(
    tournament_id: TournamentId,
    round: Round,
    slots: Vec<Option<Player>>,
    schedule: impl Fn(usize) -> NaiveDateTime,
    now: NaiveDateTime,
) -> Vec<NewMatch> {
    let mut slots = slots.into_iter();
    let mut matches = Vec::new();
    while let Some(player1) = slots.next() {
        let player2 = slots.next().flatten();
        let index = matches.len();
        matches.push(NewMatch::pairing(
            tournament_id,
            None,
            round,
            index as u32 + 1,
            player1,
            player2,
            Some(schedule(index)),
            now,
        ));
    }
    matches
}
