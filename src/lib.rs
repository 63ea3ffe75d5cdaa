//! Tic-tac-toe client core
//!
//! Client side of an online tic-tac-toe service: a URL router with
//! browser-like history, a game engine that keeps a board in sync with the
//! server, and the screens that tie them together.
//!
//! # Architecture
//!
//! - **Router**: registered states, URL matching, history and banners
//! - **Game**: optimistic move placement, commit and refresh
//! - **Screens**: home, game, browse, users, account and competition pages
//! - **View**: declarative widgets drawn on a generation-checked surface
//! - **TUI**: a terminal browser over the in-memory surface
//!
//! # Example
//!
//! ```no_run
//! use tictactoe_webapp::{App, AppConfig, screens};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let app = App::builder(AppConfig::default().with_start_url("/games")).build();
//! screens::register_all(&app)?;
//! app.start().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod api;
pub mod auth;
mod config;
mod error;
pub mod game;
pub mod router;
pub mod screens;
pub mod tui;
pub mod view;

// Crate-level exports - Configuration and errors
pub use config::{AppConfig, SERVER_URL_ENV};
pub use error::{ApiError, ApiErrorKind, ConfigError, RouterError, StorageError};

// Crate-level exports - Router
pub use router::{App, AppBuilder, ErrorOptions, History, MemoryHistory, State, StateId};

// Crate-level exports - Game
pub use game::{GameMetaData, MoveRejection, TicTacToeGame};

// Crate-level exports - View
pub use view::{MemorySurface, OutlineLine, Surface, Widget};

// Crate-level exports - Board
pub use tictactoe_board::{Board, Move, Position, Side};
