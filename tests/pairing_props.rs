//! Property tests for bracket sizing, round-robin pairs and BYE placement.

use pingpong_bracket::{bracket_size, round_robin_pairs, Player};
use pingpong_bracket::logic::{advance_slots, seed_slots};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn players(n: usize) -> Vec<Player> {
    (1..=n as u64).map(|i| Player::new(i, format!("P{i}"), 1000)).collect()
}

proptest! {
    #[test]
    fn round_robin_covers_every_pair_once(n in 0usize..40) {
        let pairs = round_robin_pairs(n);
        prop_assert_eq!(pairs.len(), n * n.saturating_sub(1) / 2);
        let unique: HashSet<_> = pairs.iter().copied().collect();
        prop_assert_eq!(unique.len(), pairs.len());
        prop_assert!(pairs.iter().all(|&(i, j)| i < j && j < n));
    }

    #[test]
    fn bracket_is_smallest_power_of_two(n in 2usize..1000) {
        let size = bracket_size(n);
        prop_assert!(size.is_power_of_two());
        prop_assert!(size >= n);
        prop_assert!(size < 2 * n);
    }

    #[test]
    fn seeding_keeps_everyone_and_byes_never_meet(n in 1usize..70, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let slots = seed_slots(players(n), &mut rng);
        prop_assert_eq!(slots.len(), bracket_size(n));
        let seated: HashSet<u64> = slots.iter().flatten().map(|p| p.id).collect();
        prop_assert_eq!(seated.len(), n);
        for pair in slots.chunks(2) {
            prop_assert!(pair[0].is_some() || pair[1].is_some());
        }
    }

    #[test]
    fn full_rounds_advance_in_order(exp in 1u32..6, seed in any::<u64>()) {
        let n = 1usize << exp;
        let mut rng = StdRng::seed_from_u64(seed);
        let ids: Vec<u64> = advance_slots(players(n), &mut rng)
            .into_iter()
            .flatten()
            .map(|p| p.id)
            .collect();
        prop_assert_eq!(ids, (1..=n as u64).collect::<Vec<_>>());
    }
}
