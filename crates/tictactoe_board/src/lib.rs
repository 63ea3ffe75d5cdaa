//! Pure tic-tac-toe board model.
//!
//! Positions, sides, moves and the deterministic replay that turns an ordered
//! move list into a board. No I/O lives here; the client engine in
//! `tictactoe_webapp` owns synchronization with the server.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod position;
mod types;
pub mod wire;

pub use board::{Board, last_move, next_mover};
pub use position::{Position, PositionOutOfRange, coords_to_position, position_to_coords};
pub use types::{AUTOMATED_OPPONENT, Cell, GUEST, Move, Side};
