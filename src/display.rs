use std::fs;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::style::Color;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::widgets::{Block, Borders};
use ratatui::Terminal;
use tracing::{debug, info, warn};

use crate::error::DataError;
use crate::render::Bitmap;

const PAUSE_TICK: Duration = Duration::from_millis(250);

/// A monochrome panel that pages are pushed to.
pub trait Panel {
    fn show(&mut self, frame: &Bitmap) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
    /// Put the panel into its low-power state. Called once on shutdown.
    fn sleep(&mut self) -> Result<()>;

    /// Hold the current frame for `dwell`, returning early once `stop` is set.
    fn pause(&mut self, dwell: Duration, stop: &AtomicBool) -> Result<()> {
        let deadline = Instant::now() + dwell;
        while !stop.load(Ordering::Relaxed) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(PAUSE_TICK.min(deadline - now));
        }
        Ok(())
    }
}

/// Cycle `frames` on `panel` until `stop` is set, then clear and sleep the panel.
/// The shutdown sequence also runs when the loop fails.
pub fn run_slideshow(
    panel: &mut dyn Panel,
    frames: &[Bitmap],
    dwell: Duration,
    stop: &AtomicBool,
) -> Result<()> {
    if frames.is_empty() {
        return Err(DataError::NoPages.into());
    }
    let result = cycle(panel, frames, dwell, stop);
    if let Err(err) = &result {
        warn!("display loop failed: {err:#}");
    }
    info!("shutting down display");
    let cleared = panel.clear();
    let slept = panel.sleep();
    result.and(cleared).and(slept)
}

fn cycle(
    panel: &mut dyn Panel,
    frames: &[Bitmap],
    dwell: Duration,
    stop: &AtomicBool,
) -> Result<()> {
    let mut rounds = 0u64;
    loop {
        for (idx, frame) in frames.iter().enumerate() {
            if stop.load(Ordering::Relaxed) {
                return Ok(());
            }
            debug!(page = idx + 1, total = frames.len(), round = rounds, "showing page");
            panel.clear()?;
            panel.show(frame)?;
            panel.pause(dwell, stop)?;
        }
        rounds += 1;
    }
}

/// Headless panel: the current frame is kept as `frame.pbm` in a directory.
pub struct PbmDisplay {
    dir: PathBuf,
    width: u32,
    height: u32,
}

impl PbmDisplay {
    pub fn new(dir: impl Into<PathBuf>, width: u32, height: u32) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("create frame dir {}", dir.display()))?;
        Ok(Self { dir, width, height })
    }

    pub fn frame_path(&self) -> PathBuf {
        self.dir.join("frame.pbm")
    }

    fn write_frame(&self, frame: &Bitmap) -> Result<()> {
        write_atomic(&self.frame_path(), &frame.to_pbm())
    }
}

impl Panel for PbmDisplay {
    fn show(&mut self, frame: &Bitmap) -> Result<()> {
        self.write_frame(frame)
    }

    fn clear(&mut self) -> Result<()> {
        self.write_frame(&Bitmap::new(self.width, self.height))
    }

    fn sleep(&mut self) -> Result<()> {
        info!(path = %self.frame_path().display(), "pbm panel asleep");
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("pbm.tmp");
    fs::write(&tmp, bytes).context("write frame")?;
    fs::rename(&tmp, path).context("swap frame")?;
    Ok(())
}

/// Terminal preview of the panel drawn with braille dots.
pub struct TerminalDisplay {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl TerminalDisplay {
    pub fn new() -> Result<Self> {
        enable_raw_mode().context("enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout)).context("init terminal")?;
        Ok(Self {
            terminal,
            active: true,
        })
    }

    fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        disable_raw_mode().context("disable raw mode")?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)
            .context("leave alternate screen")?;
        self.terminal.show_cursor().context("show cursor")?;
        Ok(())
    }
}

impl Panel for TerminalDisplay {
    fn show(&mut self, frame: &Bitmap) -> Result<()> {
        let (w, h) = (frame.width(), frame.height());
        let coords: Vec<(f64, f64)> = (0..h)
            .flat_map(|y| (0..w).map(move |x| (x, y)))
            .filter(|&(x, y)| frame.is_black(x, y))
            .map(|(x, y)| (f64::from(x), f64::from(h - 1 - y)))
            .collect();
        self.terminal
            .draw(|f| {
                let canvas = Canvas::default()
                    .block(Block::default().borders(Borders::ALL).title("e-paper"))
                    .marker(Marker::Braille)
                    .x_bounds([0.0, f64::from(w)])
                    .y_bounds([0.0, f64::from(h)])
                    .paint(|ctx| {
                        ctx.draw(&Points {
                            coords: &coords,
                            color: Color::White,
                        });
                    });
                f.render_widget(canvas, f.size());
            })
            .context("draw frame")?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.terminal.clear().context("clear terminal")
    }

    fn sleep(&mut self) -> Result<()> {
        self.restore()
    }

    fn pause(&mut self, dwell: Duration, stop: &AtomicBool) -> Result<()> {
        let deadline = Instant::now() + dwell;
        while !stop.load(Ordering::Relaxed) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            if !event::poll(PAUSE_TICK.min(deadline - now))? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let ctrl_c = key.code == KeyCode::Char('c')
                    && key.modifiers.contains(KeyModifiers::CONTROL);
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => stop.store(true, Ordering::Relaxed),
                    KeyCode::Char('n') | KeyCode::Right => break,
                    _ if ctrl_c => stop.store(true, Ordering::Relaxed),
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}
