use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::warn;

use crate::api::DEFAULT_BASE_URL;

pub const BOOTSTRAP_FILE: &str = "player_data.json";
pub const LEAGUE_FILE: &str = "league_data.json";

const DEFAULT_LEAGUE_ID: u32 = 405_323;
const DEFAULT_SELF_TEAM: &str = "404error.log";
const DEFAULT_DWELL_SECS: u64 = 60;
const DEFAULT_MAX_STANDINGS_PAGES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    Pbm,
    Terminal,
}

impl FromStr for DisplayKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pbm" | "file" => Ok(Self::Pbm),
            "terminal" | "tui" => Ok(Self::Terminal),
            other => Err(anyhow!("unknown display '{other}' (expected pbm or terminal)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub league_id: u32,
    pub self_team: String,
    pub data_dir: PathBuf,
    pub dwell: Duration,
    pub display: DisplayKind,
    pub frame_dir: PathBuf,
    pub http_timeout: Option<Duration>,
    pub max_standings_pages: u32,
}

impl Config {
    /// Environment (after `.env.local` / `.env`) overridden by process arguments.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        let args = std::env::args().skip(1).collect::<Vec<_>>();
        Self::from_sources(|key| std::env::var(key).ok(), &args)
    }

    pub fn from_sources(env: impl Fn(&str) -> Option<String>, args: &[String]) -> Result<Self> {
        let lookup = |flag: &str, key: &str| {
            arg_value(args, flag).or_else(|| env(key).and_then(non_empty))
        };

        let data_dir = lookup("--data-dir", "FPL_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let frame_dir = lookup("--frame-dir", "FPL_FRAME_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("frames"));
        let display = match lookup("--display", "FPL_DISPLAY") {
            Some(raw) => raw.parse()?,
            None => DisplayKind::Pbm,
        };

        Ok(Self {
            base_url: env("FPL_BASE_URL")
                .and_then(non_empty)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            league_id: parse_or(
                "FPL_LEAGUE_ID",
                lookup("--league", "FPL_LEAGUE_ID"),
                DEFAULT_LEAGUE_ID,
            ),
            self_team: lookup("--team", "FPL_SELF_TEAM")
                .unwrap_or_else(|| DEFAULT_SELF_TEAM.to_string()),
            dwell: Duration::from_secs(
                parse_or("FPL_DWELL_SECS", lookup("--dwell", "FPL_DWELL_SECS"), DEFAULT_DWELL_SECS)
                    .max(1),
            ),
            display,
            frame_dir,
            data_dir,
            http_timeout: env("FPL_HTTP_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            max_standings_pages: parse_or(
                "FPL_MAX_STANDINGS_PAGES",
                env("FPL_MAX_STANDINGS_PAGES"),
                DEFAULT_MAX_STANDINGS_PAGES,
            )
            .max(1),
        })
    }

    pub fn bootstrap_path(&self) -> PathBuf {
        self.data_dir.join(BOOTSTRAP_FILE)
    }

    pub fn league_path(&self) -> PathBuf {
        self.data_dir.join(LEAGUE_FILE)
    }
}

fn parse_or<T: FromStr + Copy>(name: &str, raw: Option<String>, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(v) => v,
        Err(_) => {
            warn!(setting = name, value = %raw, "unparseable setting, using default");
            default
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// `--flag value` or `--flag=value`.
fn arg_value(args: &[String], flag: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(rest) = arg.strip_prefix(flag) {
            if let Some(value) = rest.strip_prefix('=') {
                if let Some(v) = non_empty(value.to_string()) {
                    return Some(v);
                }
                continue;
            }
            if !rest.is_empty() {
                continue;
            }
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if let Some(v) = non_empty(next.clone()) {
                return Some(v);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    use super::{Config, DisplayKind};

    fn config(env: &[(&str, &str)], args: &[&str]) -> anyhow::Result<Config> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        Config::from_sources(|k| env.get(k).cloned(), &args)
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = config(&[], &[]).expect("defaults");
        assert_eq!(cfg.league_id, 405_323);
        assert_eq!(cfg.self_team, "404error.log");
        assert_eq!(cfg.dwell, Duration::from_secs(60));
        assert_eq!(cfg.display, DisplayKind::Pbm);
        assert_eq!(cfg.bootstrap_path(), PathBuf::from("./player_data.json"));
        assert_eq!(cfg.frame_dir, PathBuf::from("./frames"));
        assert!(cfg.http_timeout.is_none());
    }

    #[test]
    fn args_override_env() {
        let cfg = config(
            &[("FPL_LEAGUE_ID", "1"), ("FPL_SELF_TEAM", "Env FC"), ("FPL_DWELL_SECS", "0")],
            &["--league", "42", "--team=Arg FC", "--display", "terminal", "--data-dir", "/tmp/fpl"],
        )
        .expect("config");
        assert_eq!(cfg.league_id, 42);
        assert_eq!(cfg.self_team, "Arg FC");
        assert_eq!(cfg.display, DisplayKind::Terminal);
        assert_eq!(cfg.dwell, Duration::from_secs(1));
        assert_eq!(cfg.league_path(), PathBuf::from("/tmp/fpl/league_data.json"));
    }

    #[test]
    fn bad_numbers_fall_back_and_bad_display_fails() {
        let cfg = config(&[("FPL_LEAGUE_ID", "abc")], &[]).expect("config");
        assert_eq!(cfg.league_id, 405_323);
        assert!(config(&[("FPL_DISPLAY", "hdmi")], &[]).is_err());
    }
}
