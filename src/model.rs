use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const UNKNOWN_PLAYER: &str = "Unknown";
pub const UNKNOWN_TEAM: &str = "?";

/// Snapshot of `bootstrap-static/` plus the injected next-gameweek fixtures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bootstrap {
    #[serde(default, deserialize_with = "null_default")]
    pub elements: Vec<Player>,
    #[serde(default, deserialize_with = "null_default")]
    pub teams: Vec<Team>,
    #[serde(default, deserialize_with = "null_default")]
    pub events: Vec<GameweekEvent>,
    #[serde(default, deserialize_with = "null_default")]
    pub fixtures_next_gw: Vec<Fixture>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    #[serde(default)]
    pub web_name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub element_type: u8,
    #[serde(default, deserialize_with = "null_default")]
    pub team: u32,
    // Upstream sends form as a decimal string ("5.2"); kept verbatim for display.
    #[serde(default, deserialize_with = "number_or_string")]
    pub form: String,
    #[serde(default, deserialize_with = "null_default")]
    pub transfers_in_event: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub event_points: i32,
}

impl Player {
    pub fn form_score(&self) -> f64 {
        self.form.trim().parse::<f64>().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub strength_overall_home: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub strength_overall_away: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub strength_attack_home: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub strength_attack_away: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub strength_defence_home: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub strength_defence_away: u32,
}

impl Team {
    pub fn overall_strength(&self) -> u32 {
        self.strength_overall_home + self.strength_overall_away
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameweekEvent {
    pub id: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub is_current: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub average_entry_score: i32,
    #[serde(default, deserialize_with = "null_default")]
    pub highest_score: i32,
    #[serde(default)]
    pub most_captained: Option<u32>,
    #[serde(default)]
    pub most_transferred_in: Option<u32>,
    #[serde(default)]
    pub top_element: Option<u32>,
    #[serde(default)]
    pub top_element_info: Option<TopElementInfo>,
    #[serde(default, deserialize_with = "null_default")]
    pub chip_plays: Vec<ChipPlay>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopElementInfo {
    #[serde(default)]
    pub id: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub points: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChipPlay {
    #[serde(default)]
    pub chip_name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub num_played: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub event: Option<u32>,
    pub team_h: u32,
    pub team_a: u32,
    #[serde(default)]
    pub kickoff_time: Option<String>,
}

/// Classic league standings enriched with per-manager data at fetch time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct League {
    #[serde(default)]
    pub league: Option<LeagueInfo>,
    #[serde(default)]
    pub standings: Standings,
}

impl League {
    pub fn entries(&self) -> &[ManagerEntry] {
        &self.standings.results
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeagueInfo {
    pub id: u32,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Standings {
    #[serde(default)]
    pub has_next: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub results: Vec<ManagerEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManagerEntry {
    pub entry: u32,
    #[serde(default)]
    pub entry_name: String,
    #[serde(default)]
    pub player_name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub total: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub rank: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub rank_sort: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub last_rank: i64,
    #[serde(default)]
    pub manager_details: Option<Value>,
    #[serde(default, deserialize_with = "null_default")]
    pub transfers: Vec<Transfer>,
    #[serde(default)]
    pub history: Option<ManagerHistory>,
    #[serde(default, deserialize_with = "null_default")]
    pub gameweek_data: HashMap<String, Option<GameweekPicks>>,
}

impl ManagerEntry {
    /// Picks recorded for `gameweek`, if the fetch for that week succeeded.
    pub fn picks_for(&self, gameweek: u32) -> Option<&GameweekPicks> {
        self.gameweek_data
            .get(&gameweek.to_string())
            .and_then(|gw| gw.as_ref())
    }

    /// Points scored in the `gameweek`-th recorded history row (1-based).
    pub fn history_points(&self, gameweek: u32) -> Option<i32> {
        let idx = usize::try_from(gameweek).ok()?.checked_sub(1)?;
        self.history
            .as_ref()
            .and_then(|h| h.current.get(idx))
            .map(|row| row.points)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transfer {
    #[serde(default)]
    pub element_in: u32,
    #[serde(default)]
    pub element_out: u32,
    #[serde(default)]
    pub event: u32,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManagerHistory {
    #[serde(default, deserialize_with = "null_default")]
    pub current: Vec<GameweekHistory>,
    #[serde(default, deserialize_with = "null_default")]
    pub chips: Vec<ChipUse>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameweekHistory {
    #[serde(default)]
    pub event: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub points: i32,
    #[serde(default, deserialize_with = "null_default")]
    pub total_points: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChipUse {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub event: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameweekPicks {
    #[serde(default)]
    pub active_chip: Option<String>,
    #[serde(default)]
    pub entry_history: Option<EntryHistory>,
    #[serde(default, deserialize_with = "null_default")]
    pub picks: Vec<Pick>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryHistory {
    #[serde(default, deserialize_with = "null_default")]
    pub points: i32,
    #[serde(default, deserialize_with = "null_default")]
    pub event_transfers: u32,
    // Tenths of a currency unit.
    #[serde(default, deserialize_with = "null_default")]
    pub value: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub bank: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pick {
    pub element: u32,
    pub position: u8,
    #[serde(default)]
    pub is_captain: bool,
    #[serde(default)]
    pub is_vice_captain: bool,
    #[serde(default = "default_multiplier")]
    pub multiplier: i32,
}

impl Pick {
    pub fn is_starter(&self) -> bool {
        self.position <= 11
    }
}

fn default_multiplier() -> i32 {
    1
}

fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::{Bootstrap, ManagerEntry};

    #[test]
    fn form_accepts_string_or_number() {
        let raw = r#"{"elements":[
            {"id":1,"web_name":"A","form":"5.2"},
            {"id":2,"web_name":"B","form":3.5},
            {"id":3,"web_name":"C","form":null}
        ]}"#;
        let doc: Bootstrap = serde_json::from_str(raw).expect("bootstrap should parse");
        assert_eq!(doc.elements[0].form, "5.2");
        assert_eq!(doc.elements[1].form_score(), 3.5);
        assert_eq!(doc.elements[2].form_score(), 0.0);
    }

    #[test]
    fn failed_enrichments_parse_as_empty() {
        let raw = r#"{"entry":7,"entry_name":"X","total":10,
            "transfers":null,"history":null,"gameweek_data":{"3":null}}"#;
        let entry: ManagerEntry = serde_json::from_str(raw).expect("entry should parse");
        assert!(entry.transfers.is_empty());
        assert!(entry.picks_for(3).is_none());
        assert!(entry.history_points(3).is_none());
    }
}
