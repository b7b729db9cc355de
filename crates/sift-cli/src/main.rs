//! `sift`: terminal client for natural-language queries over a database and
//! a document corpus.
//!
//! # Usage
//!
//! ```
//! sift --base-url http://localhost:8000
//! sift --config ~/.config/sift/config.toml
//! ```
//!
//! Logs go to a file (`--log-file`, default next to the state database)
//! because the terminal belongs to the UI. Filter them with `RUST_LOG`.

mod app;
mod client;
mod ui;

use std::{
  fs::OpenOptions,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use client::HttpClient;
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use sift_session::{Session, SessionConfig};
use sift_store_sqlite::SqliteSettings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "sift", version, about = "Natural-language queries over your data")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "~/.config/sift/config.toml")]
  config: PathBuf,

  /// Base URL of the Sift backend (default: http://localhost:8000).
  #[arg(long, env = "SIFT_BASE_URL")]
  base_url: Option<String>,

  /// SQLite file holding the last good connection string.
  #[arg(long, env = "SIFT_STATE_PATH", value_name = "FILE")]
  state_path: Option<PathBuf>,

  /// Upper bound on a single backend call, in seconds.
  #[arg(long, env = "SIFT_TIMEOUT_SECS")]
  timeout_secs: Option<u64>,

  /// Where to write logs.
  #[arg(long, env = "SIFT_LOG_FILE", value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Config ───────────────────────────────────────────────────────────────────

/// Resolved settings: CLI flags over environment over config file over
/// defaults.
#[derive(Deserialize, Debug)]
struct Settings {
  base_url:     String,
  state_path:   PathBuf,
  timeout_secs: u64,
  log_file:     Option<PathBuf>,
}

impl Settings {
  fn load(args: &Args) -> Result<Self> {
    let config = config::Config::builder()
      .set_default("base_url", "http://localhost:8000")?
      .set_default("state_path", "~/.local/share/sift/state.db")?
      .set_default("timeout_secs", 30)?
      .add_source(config::File::from(expand_tilde(&args.config)).required(false))
      .add_source(config::Environment::with_prefix("SIFT"))
      .set_override_option("base_url", args.base_url.clone())?
      .set_override_option(
        "state_path",
        args.state_path.as_ref().map(|p| p.display().to_string()),
      )?
      .set_override_option("timeout_secs", args.timeout_secs)?
      .set_override_option(
        "log_file",
        args.log_file.as_ref().map(|p| p.display().to_string()),
      )?
      .build()
      .context("failed to read config file")?;

    let mut settings: Settings = config
      .try_deserialize()
      .context("failed to deserialise settings")?;
    settings.state_path = expand_tilde(&settings.state_path);
    settings.log_file = settings.log_file.as_deref().map(expand_tilde);
    Ok(settings)
  }

  fn log_path(&self) -> PathBuf {
    self.log_file.clone().unwrap_or_else(|| {
      self
        .state_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("sift.log")
    })
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let settings = Settings::load(&args)?;

  init_logging(&settings.log_path())?;
  tracing::info!(base_url = %settings.base_url, "starting sift");

  let timeout = Duration::from_secs(settings.timeout_secs);
  let client = HttpClient::new(settings.base_url.clone(), timeout)
    .context("failed to build HTTP client")?;
  let store = SqliteSettings::open(&settings.state_path)
    .await
    .with_context(|| format!("failed to open state at {:?}", settings.state_path))?;

  let config = SessionConfig {
    operation_timeout: timeout,
    ..SessionConfig::default()
  };
  let session = Session::restore(client, store, config).await;
  let mut app = App::new(session, settings.base_url.clone());

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

fn init_logging(path: &Path) -> Result<()> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create log directory {parent:?}"))?;
  }
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("failed to open log file {path:?}"))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    // Redraw on every tick so progress and notification expiry show up
    // without input.
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && key.kind == KeyEventKind::Press
      && !app.handle_key(key).await?
    {
      break;
    }
  }

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
pub(crate) fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
