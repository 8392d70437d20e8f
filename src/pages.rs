use crate::model::{ChipPlay, Player, Team};
use crate::stats::{Analyzer, FixtureStrength, GameweekInsights, ManagerSummary, SelfTeamAnalysis};

/// One display page: a title and the text lines under it, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub lines: Vec<String>,
}

impl Page {
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = format!("{}\n{}\n", self.title, "-".repeat(self.title.len()));
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Every page in display order for one snapshot.
pub fn build_pages(analyzer: &Analyzer<'_>, self_team: &str) -> Vec<Page> {
    let mut pages = vec![
        insights_page(&analyzer.gameweek_insights()),
        chips_page(analyzer.chip_usage()),
        form_page(analyzer, &analyzer.top_form_players()),
        transfers_page(analyzer, &analyzer.most_transferred_in()),
        team_strength_page(&analyzer.strongest_teams()),
    ];
    pages.extend(
        analyzer
            .entries()
            .iter()
            .map(|m| manager_page(&analyzer.manager_summary(m))),
    );
    pages.push(self_team_page(
        self_team,
        analyzer.self_team_analysis(self_team).as_ref(),
    ));
    pages.extend(fixture_pages(
        analyzer.current_gameweek() + 1,
        &analyzer.fixture_strength_pages(),
    ));
    pages
}

pub fn insights_page(insights: &GameweekInsights) -> Page {
    Page::new(
        format!("GW{} Insights", insights.gameweek),
        vec![
            format!("Average: {}", insights.average_score),
            format!("Highest: {}", insights.highest_score),
            format!("Most Cap: {}", insights.most_captained),
            format!("Most Trans: {}", insights.most_transferred_in),
            format!(
                "Top Player: {} ({})",
                insights.top_player, insights.top_player_points
            ),
        ],
    )
}

pub fn chips_page(chips: &[ChipPlay]) -> Page {
    Page::new(
        "Chips Used",
        chips
            .iter()
            .map(|c| format!("{}: {}", c.chip_name, c.num_played))
            .collect(),
    )
}

pub fn form_page(analyzer: &Analyzer<'_>, players: &[&Player]) -> Page {
    Page::new(
        "Top Form Players",
        players
            .iter()
            .map(|p| format!("{} ({}): {}", p.web_name, analyzer.team_name(p.team), p.form))
            .collect(),
    )
}

pub fn transfers_page(analyzer: &Analyzer<'_>, players: &[&Player]) -> Page {
    Page::new(
        "Most Transferred In",
        players
            .iter()
            .map(|p| {
                format!(
                    "{} ({}): {}",
                    p.web_name,
                    analyzer.team_name(p.team),
                    p.transfers_in_event
                )
            })
            .collect(),
    )
}

pub fn team_strength_page(teams: &[&Team]) -> Page {
    Page::new(
        "Team Strength",
        teams
            .iter()
            .map(|t| format!("{}: {}", t.name, t.overall_strength()))
            .collect(),
    )
}

pub fn manager_page(summary: &ManagerSummary) -> Page {
    Page::new(
        format!("Manager: {}", summary.manager_name),
        vec![
            format!("Points: {}", summary.points),
            format!(
                "Captain: {} ({})",
                summary.captain_name, summary.captain_points
            ),
            format!("Transfers: {}", summary.transfers),
            format!("Team Value: {:.1}", summary.team_value),
            format!(
                "Top Scorer: {} ({})",
                summary.top_scorer_name, summary.top_scorer_points
            ),
            format!("Formation: {}", summary.formation),
            format!("Chip: {}", summary.chip_used.as_deref().unwrap_or("None")),
            format!("Rank Move: {}", summary.rank_movement),
            format!("Total Points: {}", summary.total_points),
        ],
    )
}

pub fn self_team_page(team_name: &str, analysis: Option<&SelfTeamAnalysis>) -> Page {
    const TITLE: &str = "My Team Analysis";
    let Some(a) = analysis else {
        return Page::new(
            TITLE,
            vec![
                format!("{team_name} not found"),
                "in this league.".to_string(),
            ],
        );
    };
    Page::new(
        TITLE,
        vec![
            format!("Team: {}", a.team_name),
            format!("Total Points: {}", a.total_points),
            format!("League Pos: {} of {}", a.position, a.team_count),
            format!("Leader Diff: {}", a.leader_gap()),
            format!("vs. Average: {:+.1}", a.vs_average()),
            String::new(),
            "Weekly Analysis:".to_string(),
            format!("  This GW's Pts: {}", a.gameweek_points),
            format!("  League GW Avg: {:.1}", a.league_gameweek_average),
            format!("  vs. GW Avg: {:+.1}", a.vs_gameweek_average()),
            String::new(),
            "Captaincy Analysis:".to_string(),
            format!("  Actual Captain: {}", a.captain_points),
            format!("  Best Captain: {}", a.best_captain_points),
            format!("  Success Rate: {:.1}%", a.captain_success_rate),
        ],
    )
}

pub fn fixture_pages(next_gameweek: u32, chunks: &[Vec<FixtureStrength>]) -> Vec<Page> {
    let total = chunks.len();
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let mut lines = Vec::with_capacity(chunk.len() * 5);
            for f in chunk {
                lines.push(format!("{} (H) vs", f.home_team));
                lines.push(format!("{} (A)", f.away_team));
                lines.push(format!("  {} Atk: {:.2}", f.home_team, f.home_strength));
                lines.push(format!("  {} Atk: {:.2}", f.away_team, f.away_strength));
                lines.push(String::new());
            }
            Page::new(
                format!("GW{next_gameweek} Fixtures ({}/{total})", i + 1),
                lines,
            )
        })
        .collect()
}
