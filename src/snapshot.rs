use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::model::{Bootstrap, League};
use crate::pages::{Page, build_pages};
use crate::persist::{load_bootstrap, load_league};
use crate::stats::Analyzer;

/// Both documents from one collection run, loaded for analysis.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub bootstrap: Bootstrap,
    pub league: League,
}

impl Snapshot {
    pub fn load(bootstrap_path: &Path, league_path: &Path) -> Result<Self> {
        let bootstrap = load_bootstrap(bootstrap_path)?;
        let league = load_league(league_path)?;
        info!(
            players = bootstrap.elements.len(),
            teams = bootstrap.teams.len(),
            managers = league.entries().len(),
            "snapshot loaded"
        );
        Ok(Self { bootstrap, league })
    }

    pub fn analyzer(&self) -> Result<Analyzer<'_>> {
        Ok(Analyzer::new(&self.bootstrap, &self.league)?)
    }

    pub fn pages(&self, self_team: &str) -> Result<Vec<Page>> {
        Ok(build_pages(&self.analyzer()?, self_team))
    }
}
