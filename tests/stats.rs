use std::fs;
use std::path::PathBuf;

use fpl_epaper::error::DataError;
use fpl_epaper::model::{Bootstrap, GameweekEvent, League, ManagerEntry, Player};
use fpl_epaper::stats::{
    Analyzer, Formation, captain_success_rate, current_event, league_gameweek_average,
    league_position, most_transferred_in, strength_ratio, top_form_players,
};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn load() -> (Bootstrap, League) {
    let bootstrap = serde_json::from_str(&read_fixture("player_data.json"))
        .expect("bootstrap fixture should parse");
    let league = serde_json::from_str(&read_fixture("league_data.json"))
        .expect("league fixture should parse");
    (bootstrap, league)
}

fn entry(name: &str, total: i64) -> ManagerEntry {
    ManagerEntry {
        entry_name: name.to_string(),
        total,
        ..ManagerEntry::default()
    }
}

fn player(id: u32, form: &str, transfers_in_event: u64) -> Player {
    Player {
        id,
        web_name: format!("P{id}"),
        form: form.to_string(),
        transfers_in_event,
        ..Player::default()
    }
}

#[test]
fn current_gameweek_is_resolved() {
    let (bootstrap, _) = load();
    assert_eq!(current_event(&bootstrap).map(|ev| ev.id), Ok(7));
}

#[test]
fn missing_current_gameweek_is_an_error() {
    let bootstrap = Bootstrap {
        events: vec![GameweekEvent {
            id: 1,
            ..GameweekEvent::default()
        }],
        ..Bootstrap::default()
    };
    let league = League::default();
    assert_eq!(current_event(&bootstrap).unwrap_err(), DataError::NoCurrentGameweek);
    assert!(Analyzer::new(&bootstrap, &league).is_err());
}

#[test]
fn top_selectors_sort_descending_and_keep_ties_stable() {
    let (bootstrap, league) = load();
    let analyzer = Analyzer::new(&bootstrap, &league).expect("analyzer");

    let form: Vec<&str> = analyzer
        .top_form_players()
        .iter()
        .map(|p| p.web_name.as_str())
        .collect();
    assert_eq!(form, vec!["M.Salah", "Palmer", "Saka", "Haaland", "Gabriel"]);

    let transfers: Vec<u32> = analyzer.most_transferred_in().iter().map(|p| p.id).collect();
    assert_eq!(transfers, vec![12, 8, 7, 10, 6]);

    let teams: Vec<&str> = analyzer
        .strongest_teams()
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(teams, vec!["Liverpool", "Arsenal", "Chelsea", "Spurs", "Fulham"]);
}

#[test]
fn top_selectors_return_min_of_five_and_len() {
    let three = vec![player(1, "1.0", 5), player(2, "3.0", 5), player(3, "2.0", 9)];
    let ids: Vec<u32> = top_form_players(&three).iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![2, 3, 1]);
    let ids: Vec<u32> = most_transferred_in(&three).iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![3, 1, 2]);
    assert!(top_form_players(&[]).is_empty());

    let eight: Vec<Player> = (1..=8).map(|id| player(id, "2.5", 0)).collect();
    let ids: Vec<u32> = top_form_players(&eight).iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn fixture_strength_pages_skip_unknown_teams_and_guard_zero_defence() {
    let (bootstrap, league) = load();
    let analyzer = Analyzer::new(&bootstrap, &league).expect("analyzer");
    let pages = analyzer.fixture_strength_pages();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].len(), 2);
    assert_eq!(pages[1].len(), 1);

    let ars_che = &pages[0][0];
    assert_eq!(ars_che.home_team, "Arsenal");
    assert_eq!(ars_che.away_team, "Chelsea");
    assert!((ars_che.home_strength - 1350.0 / 1210.0).abs() < 1e-12);
    assert!((ars_che.away_strength - 1240.0 / 1300.0).abs() < 1e-12);

    let eve_liv = &pages[0][1];
    assert_eq!(eve_liv.away_team, "Liverpool");
    assert!((eve_liv.home_strength - 1090.0 / 1330.0).abs() < 1e-12);
    assert_eq!(eve_liv.away_strength, 0.0);

    assert_eq!(pages[1][0].home_team, "Spurs");
}

#[test]
fn manager_summary_for_a_full_squad() {
    let (bootstrap, league) = load();
    let analyzer = Analyzer::new(&bootstrap, &league).expect("analyzer");
    let summary = analyzer.manager_summary(&league.entries()[0]);

    assert_eq!(summary.manager_name, "404error.log");
    assert_eq!(summary.points, 61);
    assert_eq!(summary.captain_name, "Saka");
    assert_eq!(summary.captain_points, 24);
    assert_eq!(summary.transfers, 1);
    assert!((summary.team_value - 102.3).abs() < 1e-9);
    assert!((summary.bank - 0.5).abs() < 1e-9);
    assert_eq!(summary.top_scorer_name, "Isak");
    assert_eq!(summary.top_scorer_points, 19);
    assert_eq!(
        summary.formation,
        Formation {
            defenders: 3,
            midfielders: 4,
            forwards: 3
        }
    );
    assert_eq!(summary.formation.to_string(), "3-4-3");
    assert!(summary.formation.outfield_total() <= 11);
    assert_eq!(summary.chip_used, None);
    assert_eq!(summary.rank_movement, -1);
    assert_eq!(summary.total_points, 480);
}

#[test]
fn manager_summary_without_captain_counts_bench_for_top_scorer_only() {
    let (bootstrap, league) = load();
    let analyzer = Analyzer::new(&bootstrap, &league).expect("analyzer");
    let summary = analyzer.manager_summary(&league.entries()[1]);

    assert_eq!(summary.captain_name, "Unknown");
    assert_eq!(summary.captain_points, 0);
    // Salah sits on the bench (slot 12) but still counts as top scorer.
    assert_eq!(summary.top_scorer_name, "M.Salah");
    assert_eq!(summary.top_scorer_points, 15);
    // Only starting slots count, and the keeper has no bucket.
    assert_eq!(summary.formation.to_string(), "1-1-1");
    assert_eq!(summary.chip_used.as_deref(), Some("bboost"));
    assert_eq!(summary.rank_movement, 0);
}

#[test]
fn manager_summary_tolerates_missing_gameweek_data() {
    let (bootstrap, league) = load();
    let analyzer = Analyzer::new(&bootstrap, &league).expect("analyzer");
    for manager in &league.entries()[2..] {
        let summary = analyzer.manager_summary(manager);
        assert_eq!(summary.points, 0);
        assert_eq!(summary.captain_name, "Unknown");
        assert_eq!(summary.captain_points, 0);
        assert_eq!(summary.top_scorer_name, "Unknown");
        assert_eq!(summary.top_scorer_points, 0);
        assert_eq!(summary.formation.to_string(), "0-0-0");
        assert_eq!(summary.team_value, 0.0);
        assert_eq!(summary.chip_used, None);
    }
    let bench_warmers = analyzer.manager_summary(&league.entries()[3]);
    assert_eq!(bench_warmers.rank_movement, 1);
    assert_eq!(bench_warmers.total_points, 450);
}

#[test]
fn gameweek_average_only_counts_entries_with_history() {
    let (_, league) = load();
    assert!((league_gameweek_average(league.entries(), 7) - 58.0).abs() < 1e-12);
    // every entry with history has a first row
    assert!((league_gameweek_average(league.entries(), 1) - 60.0).abs() < 1e-12);
    assert_eq!(league_gameweek_average(league.entries(), 30), 0.0);
    assert_eq!(league_gameweek_average(league.entries(), 0), 0.0);
}

#[test]
fn league_position_is_one_based_descending() {
    let entries = vec![entry("A", 100), entry("B", 80), entry("C", 120)];
    assert_eq!(league_position(&entries, "B"), Some(3));
    assert_eq!(league_position(&entries, "C"), Some(1));
    assert_eq!(league_position(&entries, "Z"), None);
}

#[test]
fn captain_success_rate_and_ratios_guard_zero() {
    assert_eq!(captain_success_rate(10, 2 * 8), 62.5);
    assert_eq!(captain_success_rate(10, 0), 0.0);
    assert_eq!(strength_ratio(1200, 0), 0.0);
    assert_eq!(strength_ratio(1200, 1000), 1.2);
}

#[test]
fn self_team_analysis_for_configured_team() {
    let (bootstrap, league) = load();
    let analyzer = Analyzer::new(&bootstrap, &league).expect("analyzer");
    let a = analyzer
        .self_team_analysis("404error.log")
        .expect("team should be found");

    assert_eq!(a.position, 2);
    assert_eq!(a.team_count, 4);
    assert_eq!(a.leader_points, 510);
    assert_eq!(a.leader_gap(), 30);
    assert!((a.average_total - 435.0).abs() < 1e-12);
    assert!((a.vs_average() - 45.0).abs() < 1e-12);
    assert_eq!(a.gameweek_points, 61);
    assert!((a.league_gameweek_average - 58.0).abs() < 1e-12);
    assert!((a.vs_gameweek_average() - 3.0).abs() < 1e-12);
    assert_eq!(a.captain_points, 24);
    assert_eq!(a.best_captain_points, 38);
    assert!((a.captain_success_rate - 24.0 / 38.0 * 100.0).abs() < 1e-9);
}

#[test]
fn self_team_analysis_reports_not_found() {
    let (bootstrap, league) = load();
    let analyzer = Analyzer::new(&bootstrap, &league).expect("analyzer");
    assert!(analyzer.self_team_analysis("Nobody FC").is_none());
}

#[test]
fn self_team_without_picks_has_zero_success_rate() {
    let (bootstrap, league) = load();
    let analyzer = Analyzer::new(&bootstrap, &league).expect("analyzer");
    let a = analyzer
        .self_team_analysis("Bench Warmers")
        .expect("team should be found");
    assert_eq!(a.position, 3);
    assert_eq!(a.captain_points, 0);
    assert_eq!(a.best_captain_points, 0);
    assert_eq!(a.captain_success_rate, 0.0);
}

#[test]
fn insights_resolve_player_names() {
    let (bootstrap, league) = load();
    let analyzer = Analyzer::new(&bootstrap, &league).expect("analyzer");
    let insights = analyzer.gameweek_insights();
    assert_eq!(insights.gameweek, 7);
    assert_eq!(insights.average_score, 52);
    assert_eq!(insights.highest_score, 118);
    assert_eq!(insights.most_captained, "Haaland");
    assert_eq!(insights.most_transferred_in, "Watkins");
    assert_eq!(insights.top_player, "Isak");
    assert_eq!(insights.top_player_points, 19);
    assert_eq!(analyzer.chip_usage().len(), 2);
    assert_eq!(analyzer.player_name(999), "Unknown");
    assert_eq!(analyzer.team_name(99), "?");
}
