use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::error::DataError;
use crate::model::{
    Bootstrap, ChipPlay, GameweekEvent, League, ManagerEntry, Pick, Player, Team, UNKNOWN_PLAYER,
    UNKNOWN_TEAM,
};

pub const TOP_N: usize = 5;
pub const FIXTURES_PER_PAGE: usize = 2;

const POSITION_DEFENDER: u8 = 2;
const POSITION_MIDFIELDER: u8 = 3;
const POSITION_FORWARD: u8 = 4;

/// The one event flagged current. Anything else means the snapshot is unusable.
pub fn current_event(bootstrap: &Bootstrap) -> Result<&GameweekEvent, DataError> {
    bootstrap
        .events
        .iter()
        .find(|ev| ev.is_current)
        .ok_or(DataError::NoCurrentGameweek)
}

/// Stable descending sort on `key`, truncated to [`TOP_N`]. Ties keep input order.
pub fn top_by<T, K, F>(items: &[T], key: F) -> Vec<&T>
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by(|a, b| key(*b).partial_cmp(&key(*a)).unwrap_or(Ordering::Equal));
    sorted.truncate(TOP_N);
    sorted
}

pub fn top_form_players(players: &[Player]) -> Vec<&Player> {
    top_by(players, Player::form_score)
}

pub fn most_transferred_in(players: &[Player]) -> Vec<&Player> {
    top_by(players, |p| p.transfers_in_event)
}

pub fn strongest_teams(teams: &[Team]) -> Vec<&Team> {
    top_by(teams, Team::overall_strength)
}

/// `attack / defence`, or 0 when the defence rating is missing.
pub fn strength_ratio(attack: u32, defence: u32) -> f64 {
    if defence == 0 {
        return 0.0;
    }
    f64::from(attack) / f64::from(defence)
}

/// Mean points of the `gameweek`-th history row, over entries that have one.
pub fn league_gameweek_average(entries: &[ManagerEntry], gameweek: u32) -> f64 {
    let (sum, count) = entries
        .iter()
        .filter_map(|m| m.history_points(gameweek))
        .fold((0i64, 0usize), |(sum, n), pts| (sum + i64::from(pts), n + 1));
    if count == 0 {
        return 0.0;
    }
    sum as f64 / count as f64
}

/// 1-based league position of `team_name` ranked by total points, descending.
pub fn league_position(entries: &[ManagerEntry], team_name: &str) -> Option<usize> {
    let mut by_points: Vec<&ManagerEntry> = entries.iter().collect();
    by_points.sort_by(|a, b| b.total.cmp(&a.total));
    by_points
        .iter()
        .position(|m| m.entry_name == team_name)
        .map(|idx| idx + 1)
}

/// Captain points as a percentage of the best possible (doubled) captain score.
pub fn captain_success_rate(captain_points: i32, best_possible: i32) -> f64 {
    if best_possible <= 0 {
        return 0.0;
    }
    f64::from(captain_points) / f64::from(best_possible) * 100.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Formation {
    pub defenders: usize,
    pub midfielders: usize,
    pub forwards: usize,
}

impl Formation {
    pub fn outfield_total(&self) -> usize {
        self.defenders + self.midfielders + self.forwards
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.defenders, self.midfielders, self.forwards)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureStrength {
    pub home_team: String,
    pub away_team: String,
    pub home_strength: f64,
    pub away_strength: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManagerSummary {
    pub manager_name: String,
    pub points: i32,
    pub captain_name: String,
    pub captain_points: i32,
    pub transfers: u32,
    pub team_value: f64,
    pub bank: f64,
    pub top_scorer_name: String,
    pub top_scorer_points: i32,
    pub formation: Formation,
    pub chip_used: Option<String>,
    pub rank_movement: i64,
    pub total_points: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelfTeamAnalysis {
    pub team_name: String,
    pub total_points: i64,
    pub leader_points: i64,
    pub average_total: f64,
    pub position: usize,
    pub team_count: usize,
    pub gameweek_points: i32,
    pub league_gameweek_average: f64,
    pub captain_points: i32,
    pub best_captain_points: i32,
    pub captain_success_rate: f64,
}

impl SelfTeamAnalysis {
    pub fn leader_gap(&self) -> i64 {
        self.leader_points - self.total_points
    }

    pub fn vs_average(&self) -> f64 {
        self.total_points as f64 - self.average_total
    }

    pub fn vs_gameweek_average(&self) -> f64 {
        f64::from(self.gameweek_points) - self.league_gameweek_average
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameweekInsights {
    pub gameweek: u32,
    pub average_score: i32,
    pub highest_score: i32,
    pub most_captained: String,
    pub most_transferred_in: String,
    pub top_player: String,
    pub top_player_points: i32,
}

/// Read-only view over one bootstrap/league snapshot pair.
pub struct Analyzer<'a> {
    bootstrap: &'a Bootstrap,
    league: &'a League,
    current: &'a GameweekEvent,
    player_names: HashMap<u32, &'a str>,
    player_points: HashMap<u32, i32>,
    player_positions: HashMap<u32, u8>,
    teams: HashMap<u32, &'a Team>,
}

impl<'a> Analyzer<'a> {
    pub fn new(bootstrap: &'a Bootstrap, league: &'a League) -> Result<Self, DataError> {
        let current = current_event(bootstrap)?;
        let players = &bootstrap.elements;
        Ok(Self {
            bootstrap,
            league,
            current,
            player_names: players.iter().map(|p| (p.id, p.web_name.as_str())).collect(),
            player_points: players.iter().map(|p| (p.id, p.event_points)).collect(),
            player_positions: players.iter().map(|p| (p.id, p.element_type)).collect(),
            teams: bootstrap.teams.iter().map(|t| (t.id, t)).collect(),
        })
    }

    pub fn bootstrap(&self) -> &'a Bootstrap {
        self.bootstrap
    }

    pub fn current_gameweek(&self) -> u32 {
        self.current.id
    }

    pub fn current_event(&self) -> &'a GameweekEvent {
        self.current
    }

    pub fn entries(&self) -> &'a [ManagerEntry] {
        self.league.entries()
    }

    pub fn player_name(&self, id: u32) -> &'a str {
        self.player_names.get(&id).copied().unwrap_or(UNKNOWN_PLAYER)
    }

    fn player_name_opt(&self, id: Option<u32>) -> String {
        id.map(|id| self.player_name(id))
            .unwrap_or(UNKNOWN_PLAYER)
            .to_string()
    }

    pub fn player_points(&self, id: u32) -> i32 {
        self.player_points.get(&id).copied().unwrap_or(0)
    }

    pub fn team_name(&self, id: u32) -> &'a str {
        self.teams
            .get(&id)
            .map(|t| t.name.as_str())
            .unwrap_or(UNKNOWN_TEAM)
    }

    pub fn chip_usage(&self) -> &'a [ChipPlay] {
        &self.current.chip_plays
    }

    pub fn top_form_players(&self) -> Vec<&'a Player> {
        top_form_players(&self.bootstrap.elements)
    }

    pub fn most_transferred_in(&self) -> Vec<&'a Player> {
        most_transferred_in(&self.bootstrap.elements)
    }

    pub fn strongest_teams(&self) -> Vec<&'a Team> {
        strongest_teams(&self.bootstrap.teams)
    }

    pub fn gameweek_insights(&self) -> GameweekInsights {
        let ev = self.current;
        GameweekInsights {
            gameweek: ev.id,
            average_score: ev.average_entry_score,
            highest_score: ev.highest_score,
            most_captained: self.player_name_opt(ev.most_captained),
            most_transferred_in: self.player_name_opt(ev.most_transferred_in),
            top_player: self.player_name_opt(ev.top_element),
            top_player_points: ev.top_element_info.as_ref().map_or(0, |info| info.points),
        }
    }

    /// Next-gameweek fixtures with attack/defence ratios, chunked into display pages.
    pub fn fixture_strength_pages(&self) -> Vec<Vec<FixtureStrength>> {
        let analyzed: Vec<FixtureStrength> = self
            .bootstrap
            .fixtures_next_gw
            .iter()
            .filter_map(|fixture| {
                let home = self.teams.get(&fixture.team_h)?;
                let away = self.teams.get(&fixture.team_a)?;
                Some(FixtureStrength {
                    home_team: home.name.clone(),
                    away_team: away.name.clone(),
                    home_strength: strength_ratio(
                        home.strength_attack_home,
                        away.strength_defence_away,
                    ),
                    away_strength: strength_ratio(
                        away.strength_attack_away,
                        home.strength_defence_home,
                    ),
                })
            })
            .collect();
        analyzed
            .chunks(FIXTURES_PER_PAGE)
            .map(|chunk| chunk.to_vec())
            .collect()
    }

    fn captain(&self, picks: &[Pick]) -> Option<(u32, i32)> {
        picks
            .iter()
            .find(|p| p.is_captain)
            .map(|p| (p.element, self.player_points(p.element) * p.multiplier))
    }

    /// First pick with the highest raw event points.
    fn best_pick<'p>(&self, picks: impl Iterator<Item = &'p Pick>) -> Option<&'p Pick> {
        let mut best: Option<&Pick> = None;
        for pick in picks {
            let better = best
                .map(|b| self.player_points(pick.element) > self.player_points(b.element))
                .unwrap_or(true);
            if better {
                best = Some(pick);
            }
        }
        best
    }

    pub fn formation(&self, picks: &[Pick]) -> Formation {
        let mut out = Formation::default();
        for pick in picks.iter().filter(|p| p.is_starter()) {
            match self.player_positions.get(&pick.element).copied() {
                Some(POSITION_DEFENDER) => out.defenders += 1,
                Some(POSITION_MIDFIELDER) => out.midfielders += 1,
                Some(POSITION_FORWARD) => out.forwards += 1,
                _ => {}
            }
        }
        out
    }

    pub fn manager_summary(&self, manager: &ManagerEntry) -> ManagerSummary {
        let gw_data = manager.picks_for(self.current.id);
        let picks: &[Pick] = gw_data.map(|gw| gw.picks.as_slice()).unwrap_or_default();
        let entry_history = gw_data.and_then(|gw| gw.entry_history.as_ref());

        let (captain_name, captain_points) = match self.captain(picks) {
            Some((id, pts)) => (self.player_name(id).to_string(), pts),
            None => (UNKNOWN_PLAYER.to_string(), 0),
        };
        let (top_scorer_name, top_scorer_points) = match self.best_pick(picks.iter()) {
            Some(p) => (
                self.player_name(p.element).to_string(),
                self.player_points(p.element),
            ),
            None => (UNKNOWN_PLAYER.to_string(), 0),
        };

        ManagerSummary {
            manager_name: manager.entry_name.clone(),
            points: entry_history.map_or(0, |h| h.points),
            captain_name,
            captain_points,
            transfers: entry_history.map_or(0, |h| h.event_transfers),
            team_value: entry_history.map_or(0.0, |h| h.value as f64 / 10.0),
            bank: entry_history.map_or(0.0, |h| h.bank as f64 / 10.0),
            top_scorer_name,
            top_scorer_points,
            formation: self.formation(picks),
            chip_used: gw_data.and_then(|gw| gw.active_chip.clone()),
            rank_movement: manager.rank_sort - manager.last_rank,
            total_points: manager.total,
        }
    }

    /// `None` when `team_name` is not in this league.
    pub fn self_team_analysis(&self, team_name: &str) -> Option<SelfTeamAnalysis> {
        let standings = self.entries();
        let mine = standings.iter().find(|m| m.entry_name == team_name)?;
        let position = league_position(standings, team_name)?;

        let leader_points = standings.iter().map(|m| m.total).max().unwrap_or(0);
        let average_total =
            standings.iter().map(|m| m.total).sum::<i64>() as f64 / standings.len() as f64;

        let gw = self.current.id;
        let gw_data = mine.picks_for(gw);
        let picks: &[Pick] = gw_data.map(|d| d.picks.as_slice()).unwrap_or_default();
        let gameweek_points = gw_data
            .and_then(|d| d.entry_history.as_ref())
            .map_or(0, |h| h.points);

        let captain_points = self.captain(picks).map_or(0, |(_, pts)| pts);
        let best_raw = self
            .best_pick(picks.iter().filter(|p| p.is_starter()))
            .map_or(0, |p| self.player_points(p.element));
        let best_captain_points = best_raw * 2;

        Some(SelfTeamAnalysis {
            team_name: team_name.to_string(),
            total_points: mine.total,
            leader_points,
            average_total,
            position,
            team_count: standings.len(),
            gameweek_points,
            league_gameweek_average: league_gameweek_average(standings, gw),
            captain_points,
            best_captain_points,
            captain_success_rate: captain_success_rate(captain_points, best_captain_points),
        })
    }
}
