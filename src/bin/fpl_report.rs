use anyhow::Result;

use fpl_epaper::config::Config;
use fpl_epaper::logging;
use fpl_epaper::snapshot::Snapshot;

// Prints every page of the saved snapshot as text. No display, no network.
fn main() -> Result<()> {
    logging::init();
    let cfg = Config::load()?;
    let snapshot = Snapshot::load(&cfg.bootstrap_path(), &cfg.league_path())?;
    for page in snapshot.pages(&cfg.self_team)? {
        println!("{}", page.to_text());
    }
    Ok(())
}
