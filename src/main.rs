use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::{error, info};

use fpl_epaper::config::{Config, DisplayKind};
use fpl_epaper::display::{Panel, PbmDisplay, TerminalDisplay, run_slideshow};
use fpl_epaper::logging;
use fpl_epaper::render::{RenderOptions, render_pages};
use fpl_epaper::snapshot::Snapshot;

fn main() -> ExitCode {
    logging::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cfg = Config::load()?;
    let snapshot = Snapshot::load(&cfg.bootstrap_path(), &cfg.league_path())?;
    let pages = snapshot.pages(&cfg.self_team)?;
    info!(pages = pages.len(), "pages built");

    let opts = RenderOptions::default();
    let frames = render_pages(&pages, &opts);

    let stop = Arc::new(AtomicBool::new(false));
    for sig in [SIGINT, SIGTERM] {
        signal_hook::flag::register(sig, Arc::clone(&stop))
            .with_context(|| format!("register handler for signal {sig}"))?;
    }

    let mut panel: Box<dyn Panel> = match cfg.display {
        DisplayKind::Pbm => Box::new(PbmDisplay::new(&cfg.frame_dir, opts.width, opts.height)?),
        DisplayKind::Terminal => Box::new(TerminalDisplay::new()?),
    };
    info!(display = ?cfg.display, dwell_secs = cfg.dwell.as_secs(), "display initialized");

    run_slideshow(panel.as_mut(), &frames, cfg.dwell, &stop)?;
    info!("stopped, exiting");
    Ok(())
}
