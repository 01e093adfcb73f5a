//! `bolsa`: terminal client for the Bolsa de Trabajo job board.
//!
//! # Usage
//!
//! ```
//! bolsa --url http://localhost:3000
//! bolsa --config ~/.config/bolsa/config.toml --idle-timeout 300
//! ```

mod app;
mod form;
mod settings;
mod ui;

use std::{fs, io, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use app::App;
use bolsa_client::HttpBackend;
use bolsa_core::{session::SessionStore, token::FileTokenSlot};
use clap::Parser;
use crossterm::{
  event::{self, DisableMouseCapture, EnableMouseCapture, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::{Args, Settings};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let settings = Settings::load(&args)?;

  fs::create_dir_all(&settings.state_dir).with_context(|| {
    format!("creating state directory {}", settings.state_dir.display())
  })?;
  init_logging(&settings)?;
  info!(base_url = %settings.base_url, "starting");

  let backend = Arc::new(HttpBackend::new(settings.client_config())?);
  let session = SessionStore::with_idle_timeout(
    backend,
    FileTokenSlot::new(settings.token_path()),
    settings.idle_timeout(),
  );
  let events = session.subscribe();
  let mut app = App::new(session);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
    .context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  app.start().await;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app, events).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture).ok();
  terminal.show_cursor().ok();

  info!("exiting");
  run_result
}

/// Log to a file in the state directory; the terminal belongs to the UI.
fn init_logging(settings: &Settings) -> Result<()> {
  let path = settings.log_path();
  let file = fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(&path)
    .with_context(|| format!("opening log file {}", path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(std::sync::Mutex::new(file))
    .init();
  Ok(())
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
  mut events: broadcast::Receiver<bolsa_core::session::SessionEvent>,
) -> Result<()> {
  loop {
    // Session changes made behind the UI's back, such as idle expiry.
    loop {
      match events.try_recv() {
        Ok(event) => app.on_session_event(event),
        Err(TryRecvError::Lagged(skipped)) => warn!(skipped, "missed session events"),
        Err(TryRecvError::Empty | TryRecvError::Closed) => break,
      }
    }

    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    let Some(evt) = maybe_event else { continue };

    // Any input counts as activity for the idle timer.
    app.session.touch();

    match evt {
      Event::Key(key) if key.kind == event::KeyEventKind::Press => {
        if !app.handle_key(key).await? {
          break;
        }
      }
      _ => {
        // Mouse, paste and resize events only reset the timer; the terminal
        // redraws on the next iteration.
      }
    }
  }

  Ok(())
}
