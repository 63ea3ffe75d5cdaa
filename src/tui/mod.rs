//! Terminal browser for the tic-tac-toe client.
//!
//! Renders the in-memory surface as an indented outline and maps keys to
//! widget actions, navigation and form input.

mod browser;
mod ui;

pub use browser::{Browser, Command, Mode, focusables};

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, error, info, instrument};

use crate::auth::FileStorage;
use crate::config::AppConfig;
use crate::router::App;
use crate::screens;
use crate::view::{MemorySurface, Surface};

/// Wires an [`App`] to a fresh [`MemorySurface`] and the credential file
/// named in `config`.
pub fn build_app(config: AppConfig) -> Result<(App, Arc<MemorySurface>)> {
    let surface = Arc::new(MemorySurface::new());
    let storage = Arc::new(FileStorage::open(config.storage_path())?);
    let app = App::builder(config)
        .with_surface(surface.clone())
        .with_storage(storage)
        .build();
    screens::register_all(&app)?;
    Ok((app, surface))
}

/// Runs the terminal browser until the user quits.
pub async fn run_tui(config: AppConfig) -> Result<()> {
    // Logging goes to a file so it does not scribble over the terminal.
    let log_file = std::fs::File::create(config.log_file())?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_filter())),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    info!(server_url = %config.server_url(), "Starting terminal browser");
    let (app, surface) = build_app(config)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let start = app.clone();
    tokio::spawn(async move { start.start().await });

    let res = run_browser(&mut terminal, &app, &surface).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "Browser loop error");
    }
    res
}

#[instrument(skip_all)]
async fn run_browser(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &App,
    surface: &Arc<MemorySurface>,
) -> Result<()> {
    let mut browser = Browser::new();
    let mut seen_generation = surface.generation();

    loop {
        if surface.generation() != seen_generation {
            seen_generation = surface.generation();
            browser.reset_focus();
        }

        let outline = surface.outline();
        let history = app.history();
        let location = history.location();
        let title = history.title();
        terminal.draw(|f| ui::draw(f, &outline, &browser, &location, &title))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match browser.handle_key(key.code, surface) {
            Command::None => {}
            Command::Quit => {
                info!("User quit");
                return Ok(());
            }
            Command::Dispatch(action) => {
                debug!(?action, "Dispatching");
                let app = app.clone();
                tokio::spawn(async move { app.dispatch(action).await });
            }
            Command::Navigate(url) => {
                let app = app.clone();
                tokio::spawn(async move { app.navigate_to_url(&url).await });
            }
            Command::Back => {
                let app = app.clone();
                tokio::spawn(async move { app.back().await });
            }
            Command::Forward => {
                let app = app.clone();
                tokio::spawn(async move { app.forward().await });
            }
            Command::SetValue(node, value) => {
                surface.set_value(surface.generation(), node, &value);
            }
        }
    }
}
