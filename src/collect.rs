use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::api::FplApi;
use crate::config::Config;
use crate::model::Bootstrap;
use crate::persist::save_document;
use crate::stats::current_event;

#[derive(Debug, Clone)]
pub struct CollectSummary {
    pub current_gameweek: u32,
    pub next_gameweek: u32,
    pub fixtures: usize,
    pub managers: usize,
    pub errors: Vec<String>,
    pub bootstrap_path: PathBuf,
    pub league_path: PathBuf,
}

/// Fetch a fresh snapshot and overwrite both documents under the data dir.
pub fn collect(cfg: &Config) -> Result<CollectSummary> {
    let api = FplApi::new(&cfg.base_url, cfg.http_timeout)?;
    let mut errors = Vec::new();

    let mut bootstrap = api.bootstrap().context("fetch bootstrap data")?;
    let current_gameweek = {
        let typed = Bootstrap::deserialize(&bootstrap).context("parse bootstrap data")?;
        current_event(&typed)?.id
    };
    let next_gameweek = current_gameweek + 1;
    info!(current_gameweek, "bootstrap loaded");

    let fixtures = match api.fixtures_for_event(next_gameweek) {
        Ok(list) => list,
        Err(err) => {
            warn!("fixtures for GW{next_gameweek} unavailable: {err:#}");
            errors.push(format!("fixtures GW{next_gameweek}: {err:#}"));
            Value::Array(Vec::new())
        }
    };
    let fixture_count = fixtures.as_array().map_or(0, Vec::len);
    bootstrap
        .as_object_mut()
        .ok_or_else(|| anyhow!("bootstrap data is not an object"))?
        .insert("fixtures_next_gw".to_string(), fixtures);

    let mut league = api
        .league_standings(cfg.league_id, cfg.max_standings_pages)
        .with_context(|| format!("fetch league {}", cfg.league_id))?;
    let managers = enrich_standings(&api, &mut league, current_gameweek, &mut errors);

    let bootstrap_path = cfg.bootstrap_path();
    let league_path = cfg.league_path();
    save_document(&bootstrap_path, &bootstrap)?;
    save_document(&league_path, &league)?;
    info!(
        bootstrap = %bootstrap_path.display(),
        league = %league_path.display(),
        managers,
        "snapshot saved"
    );

    Ok(CollectSummary {
        current_gameweek,
        next_gameweek,
        fixtures: fixture_count,
        managers,
        errors,
        bootstrap_path,
        league_path,
    })
}

/// Attach profile, transfers, history and current-gameweek picks to every
/// standings row. A failed sub-fetch is stored as `null`.
fn enrich_standings(
    api: &FplApi,
    league: &mut Value,
    gameweek: u32,
    errors: &mut Vec<String>,
) -> usize {
    let Some(rows) = league
        .get_mut("standings")
        .and_then(|s| s.get_mut("results"))
        .and_then(Value::as_array_mut)
    else {
        return 0;
    };

    for row in rows.iter_mut() {
        let Some(obj) = row.as_object_mut() else {
            continue;
        };
        let Some(entry) = obj.get("entry").and_then(Value::as_u64) else {
            continue;
        };
        let Ok(entry) = u32::try_from(entry) else {
            warn!(entry, "entry id out of range, skipping");
            errors.push(format!("entry {entry}: id out of range"));
            continue;
        };
        let name = obj
            .get("entry_name")
            .and_then(Value::as_str)
            .unwrap_or("");
        info!(entry, name, "enriching manager");

        let details = or_null(errors, entry, "manager", api.manager(entry));
        let transfers = or_null(errors, entry, "transfers", api.manager_transfers(entry));
        let history = or_null(errors, entry, "history", api.manager_history(entry));
        let picks = or_null(errors, entry, "picks", api.manager_picks(entry, gameweek));

        let mut gw_data = Map::new();
        gw_data.insert(gameweek.to_string(), picks);
        obj.insert("manager_details".to_string(), details);
        obj.insert("transfers".to_string(), transfers);
        obj.insert("history".to_string(), history);
        obj.insert("gameweek_data".to_string(), Value::Object(gw_data));
    }
    rows.len()
}

fn or_null(errors: &mut Vec<String>, entry: u32, what: &str, res: Result<Value>) -> Value {
    match res {
        Ok(v) => v,
        Err(err) => {
            warn!(entry, what, "fetch failed: {err:#}");
            errors.push(format!("entry {entry} {what}: {err:#}"));
            Value::Null
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::enrich_standings;
    use crate::api::FplApi;

    #[test]
    fn oversized_entry_ids_are_reported_not_truncated() {
        let api = FplApi::new("http://127.0.0.1:9/", None).expect("api");
        let mut league = json!({
            "standings": { "results": [{ "entry": 4_294_967_397u64, "entry_name": "Overflow" }] }
        });
        let mut errors = Vec::new();

        let rows = enrich_standings(&api, &mut league, 7, &mut errors);

        assert_eq!(rows, 1);
        assert_eq!(errors, vec!["entry 4294967397: id out of range".to_string()]);
        let row = &league["standings"]["results"][0];
        assert!(row.get("gameweek_data").is_none());
    }
}
