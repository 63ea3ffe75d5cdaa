//! Game synchronization: engine, metadata and bound widgets.

mod engine;
mod metadata;
mod view;

pub use engine::{MoveRejection, TicTacToeGame};
pub use metadata::{GameMetaData, GameState, Players, should_celebrate};
pub use view::GameView;
