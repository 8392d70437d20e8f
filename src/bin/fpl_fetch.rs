use anyhow::Result;
use chrono::Local;

use fpl_epaper::collect::collect;
use fpl_epaper::config::Config;
use fpl_epaper::logging;

fn main() -> Result<()> {
    logging::init();
    let cfg = Config::load()?;
    let summary = collect(&cfg)?;

    println!("Bootstrap data saved to {}", summary.bootstrap_path.display());
    println!(
        "League {} ({} managers) saved to {}",
        cfg.league_id,
        summary.managers,
        summary.league_path.display()
    );
    println!(
        "Current gameweek is GW{}, next is GW{} ({} fixtures)",
        summary.current_gameweek, summary.next_gameweek, summary.fixtures
    );
    if !summary.errors.is_empty() {
        println!("Errors: {}", summary.errors.len());
        for err in summary.errors.iter().take(8) {
            println!(" - {err}");
        }
    }
    println!("Timestamp: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));

    Ok(())
}
