//! Integration tests for the read side: bracket data, match listings and
//! group boards.

mod common;

use common::Fixture;
use pingpong_bracket::{BracketError, Round, BYE};

#[test]
fn bracket_is_empty_before_main_rounds() {
    let fx = Fixture::new();
    let t = fx.tournament("Spring Open");
    fx.group(t.id, "A조", &["Kim", "Lee", "Park"]);
    fx.engine.create_preliminary_matches(t.id).unwrap();

    let data = fx.engine.bracket_data(t.id).unwrap();
    assert!(data.teams.is_empty());
    assert!(data.results.is_empty());
    assert_eq!(
        serde_json::to_value(&data).unwrap(),
        serde_json::json!({ "teams": [], "results": [] })
    );
}

#[test]
fn bracket_follows_play() {
    let fx = Fixture::new();
    let t = fx.tournament("Club Night");
    fx.entrants(t.id, &["Kim", "Lee", "Park", "Choi"]);
    fx.engine.create_preliminary_matches(t.id).unwrap();

    let semis = fx.round(t.id, Round::SemiFinal);
    let data = fx.engine.bracket_data(t.id).unwrap();
    let expected_teams: Vec<[String; 2]> = semis
        .iter()
        .map(|m| [m.player1_name().to_string(), m.player2_name().to_string()])
        .collect();
    assert_eq!(data.teams, expected_teams);
    assert_eq!(data.results, vec![vec![[0, 0], [0, 0]]]);

    fx.play_with(&semis[0], 3, 2);
    fx.play_with(&semis[1], 0, 3);
    let data = fx.engine.bracket_data(t.id).unwrap();
    assert_eq!(data.teams, expected_teams);
    assert_eq!(data.results, vec![vec![[3, 2], [0, 3]], vec![[0, 0]]]);

    let final_match = fx.round(t.id, Round::Final).remove(0);
    fx.play_with(&final_match, 3, 1);
    let data = fx.engine.bracket_data(t.id).unwrap();
    assert_eq!(data.results[1], vec![[3, 1]]);
    assert_eq!(
        fx.engine.champion(t.id).unwrap().as_deref(),
        Some(final_match.player1_name())
    );
}

#[test]
fn bye_slots_are_named() {
    let fx = Fixture::new();
    let t = fx.tournament("Club Night");
    fx.entrants(t.id, &["Kim", "Lee", "Park"]);
    fx.engine.create_preliminary_matches(t.id).unwrap();

    let data = fx.engine.bracket_data(t.id).unwrap();
    let byes = data.teams.iter().flatten().filter(|n| n.as_str() == BYE).count();
    assert_eq!(byes, 1);

    let views = fx.engine.matches_for(t.id).unwrap();
    assert_eq!(views.len(), 2);
    let bye = views.iter().find(|v| v.player2_id.is_none() || v.player1_id.is_none()).unwrap();
    assert!(bye.player1_name == BYE || bye.player2_name == BYE);
    assert!(bye.winner.is_some());
}

#[test]
fn match_listing_is_ordered_by_round_then_number() {
    let fx = Fixture::new();
    let t = fx.tournament("Spring Open");
    fx.group(t.id, "A조", &["Kim", "Lee"]);
    fx.group(t.id, "B조", &["Park", "Choi"]);
    fx.engine.create_preliminary_matches(t.id).unwrap();
    fx.play_round(t.id, Round::Preliminary);
    fx.engine.create_final_bracket(t.id).unwrap();

    let listing: Vec<_> = fx
        .engine
        .matches_for(t.id)
        .unwrap()
        .into_iter()
        .map(|v| (v.round, v.match_number))
        .collect();
    assert_eq!(
        listing,
        vec![(Round::Preliminary, 1), (Round::Preliminary, 2), (Round::Final, 1)]
    );
}

#[test]
fn group_overview_reports_seeds_progress_and_standings() {
    let fx = Fixture::new();
    let t = fx.tournament("Spring Open");
    let players = fx.group(t.id, "A조", &["Kim", "Lee", "Park"]);
    let b = fx.store().add_group(t.id, "B조").unwrap();
    let late = fx.store().add_player("Choi", 1000).unwrap();
    fx.store()
        .add_participation(t.id, Some(b.id), Some(late.id), None)
        .unwrap();
    let jung = fx.store().add_player("Jung", 1000).unwrap();
    fx.store()
        .add_participation(t.id, Some(b.id), Some(jung.id), Some(1))
        .unwrap();
    fx.engine.create_preliminary_matches(t.id).unwrap();

    let first = fx.round(t.id, Round::Preliminary).remove(0);
    fx.play(&first);

    let groups = fx.engine.group_overview(t.id).unwrap();
    assert_eq!(groups.len(), 2);

    let a = &groups[0];
    assert_eq!(a.name, "A조");
    assert_eq!(a.tournament_title, "Spring Open");
    assert_eq!(
        a.seeds.iter().map(|s| s.player_name.as_deref()).collect::<Vec<_>>(),
        vec![Some("Kim"), Some("Lee"), Some("Park")]
    );
    assert_eq!((a.completed_matches, a.total_matches), (1, 3));
    assert_eq!(a.standings.len(), 2);
    assert_eq!(a.standings[0].player, players[0]);
    assert_eq!(a.standings[0].wins, 1);
    assert_eq!(a.standings[0].score_diff, 2);
    assert_eq!(a.standings[1].score_diff, -2);

    // Seeded entries first, unseeded last.
    let b = &groups[1];
    assert_eq!(
        b.seeds.iter().map(|s| s.player_name.as_deref()).collect::<Vec<_>>(),
        vec![Some("Jung"), Some("Choi")]
    );
    assert_eq!((b.completed_matches, b.total_matches), (0, 1));
    assert!(b.standings.is_empty());
}

#[test]
fn unknown_tournament_is_not_found() {
    let fx = Fixture::new();
    assert!(matches!(fx.engine.bracket_data(9), Err(BracketError::NotFound(_))));
    assert!(matches!(fx.engine.matches_for(9), Err(BracketError::NotFound(_))));
    assert!(matches!(fx.engine.group_overview(9), Err(BracketError::NotFound(_))));
}
