use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;

use crate::http_client::http_client;

pub const DEFAULT_BASE_URL: &str = "https://fantasy.premierleague.com/api/";

/// Read-only client for the Fantasy Premier League endpoints.
pub struct FplApi {
    client: &'static Client,
    base_url: String,
}

impl FplApi {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.to_string(),
        })
    }

    fn get_json(&self, path: &str) -> Result<Value> {
        let url = endpoint_url(&self.base_url, path);
        debug!(%url, "GET");
        let resp = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("request failed: {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("http {status}: {url}"));
        }
        let body = resp.text().context("failed reading body")?;
        serde_json::from_str(&body).with_context(|| format!("invalid json from {url}"))
    }

    /// Players, teams and events.
    pub fn bootstrap(&self) -> Result<Value> {
        self.get_json("bootstrap-static/")
    }

    /// Fixtures scheduled in `gameweek`. The endpoint has no event filter, so the
    /// full season is fetched and filtered here.
    pub fn fixtures_for_event(&self, gameweek: u32) -> Result<Value> {
        let all = self.get_json("fixtures/")?;
        Ok(filter_fixtures(all, gameweek))
    }

    /// Classic league standings, following `has_next` for at most `max_pages` pages.
    pub fn league_standings(&self, league_id: u32, max_pages: u32) -> Result<Value> {
        let mut page_no = 1;
        let mut doc = self.get_json(&standings_path(league_id, page_no))?;
        if doc.get("standings").is_none() {
            return Err(anyhow!("league {league_id} response has no standings"));
        }
        while standings_has_next(&doc) && page_no < max_pages.max(1) {
            page_no += 1;
            let page = self.get_json(&standings_path(league_id, page_no))?;
            merge_standings_page(&mut doc, page);
        }
        Ok(doc)
    }

    pub fn manager(&self, entry: u32) -> Result<Value> {
        self.get_json(&format!("entry/{entry}/"))
    }

    pub fn manager_transfers(&self, entry: u32) -> Result<Value> {
        self.get_json(&format!("entry/{entry}/transfers/"))
    }

    pub fn manager_history(&self, entry: u32) -> Result<Value> {
        self.get_json(&format!("entry/{entry}/history/"))
    }

    pub fn manager_picks(&self, entry: u32, gameweek: u32) -> Result<Value> {
        self.get_json(&format!("entry/{entry}/event/{gameweek}/picks/"))
    }
}

pub fn endpoint_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn standings_path(league_id: u32, page: u32) -> String {
    format!("leagues-classic/{league_id}/standings/?page_standings={page}")
}

fn standings_has_next(doc: &Value) -> bool {
    doc.get("standings")
        .and_then(|s| s.get("has_next"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Keep only fixtures whose `event` equals `gameweek`. Non-arrays become `[]`.
pub fn filter_fixtures(all: Value, gameweek: u32) -> Value {
    let Value::Array(list) = all else {
        return Value::Array(Vec::new());
    };
    Value::Array(
        list.into_iter()
            .filter(|f| f.get("event").and_then(Value::as_u64) == Some(u64::from(gameweek)))
            .collect(),
    )
}

/// Append `page`'s standings rows to `doc` and carry over its `has_next` flag.
pub fn merge_standings_page(doc: &mut Value, page: Value) {
    let has_next = standings_has_next(&page);
    let rows = match page
        .get("standings")
        .and_then(|s| s.get("results"))
        .cloned()
    {
        Some(Value::Array(rows)) => rows,
        _ => Vec::new(),
    };
    let Some(standings) = doc.get_mut("standings").and_then(Value::as_object_mut) else {
        return;
    };
    if let Some(Value::Array(existing)) = standings.get_mut("results") {
        existing.extend(rows);
    } else {
        standings.insert("results".to_string(), Value::Array(rows));
    }
    standings.insert("has_next".to_string(), Value::Bool(has_next));
}
