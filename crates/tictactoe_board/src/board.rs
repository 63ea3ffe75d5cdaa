//! Board derived from the ordered move list.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{instrument, trace};

use crate::{Cell, Move, Position, Side};

/// 3x3 tic-tac-toe board.
///
/// Never authoritative on its own: it is always the replay of a move list,
/// plus at most one optimistic write that the next replay supersedes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Board {
    /// Cells in row-major order (0-8).
    cells: [Cell; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replays `moves` in `move_index` order onto an empty board.
    #[instrument(level = "debug", skip(moves), fields(moves = moves.len()))]
    pub fn replay(moves: &[Move], automated_opponent: &str) -> Self {
        let mut ordered: Vec<&Move> = moves.iter().collect();
        ordered.sort_by_key(|m| m.move_index);

        let mut board = Self::new();
        for mv in ordered {
            let side = mv.side(automated_opponent);
            trace!(position = %mv.move_position, %side, "Replaying move");
            board.set(mv.move_position, Cell::Occupied(side));
        }
        board
    }

    /// Gets the cell at the given position.
    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.to_index()]
    }

    /// Gets the cell at column `x`, row `y`.
    pub fn at(&self, x: usize, y: usize) -> Option<Cell> {
        Position::from_coords(x, y).map(|pos| self.get(pos))
    }

    /// Sets the cell at the given position.
    pub fn set(&mut self, pos: Position, cell: Cell) {
        self.cells[pos.to_index()] = cell;
    }

    /// Checks if a cell is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Cell::Empty
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| **c != Cell::Empty).count()
    }

    /// Iterates `(position, cell)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        Position::iter().map(|pos| (pos, self.get(pos)))
    }

    /// Formats the board as a human-readable string.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for (pos, cell) in self.cells() {
            let symbol = match cell {
                Cell::Empty => (pos.to_index() + 1).to_string(),
                Cell::Occupied(side) => side.icon().to_uppercase(),
            };
            result.push_str(&symbol);
            let (x, y) = pos.coords();
            if x < 2 {
                result.push('|');
            } else if y < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

/// Returns the move with the highest `move_index`.
pub fn last_move(moves: &[Move]) -> Option<&Move> {
    moves.iter().max_by_key(|m| m.move_index)
}

/// Computes whose turn it is.
///
/// Nobody moves in a finished game. With no moves the attacker opens;
/// otherwise the side that did not make the most recent move is next.
#[instrument(level = "debug", skip(moves), fields(moves = moves.len()))]
pub fn next_mover(moves: &[Move], finished: bool, automated_opponent: &str) -> Option<Side> {
    if finished {
        return None;
    }
    match last_move(moves) {
        None => Some(Side::Attacker),
        Some(last) => Some(last.side(automated_opponent).opponent()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AUTOMATED_OPPONENT;

    fn mv(index: u32, pos: usize, player: &str) -> Move {
        Move {
            game_id: "1".to_string(),
            move_index: index,
            move_position: Position::from_index(pos).unwrap(),
            player: player.to_string(),
        }
    }

    #[test]
    fn test_replay_guest_and_bot() {
        let moves = vec![mv(0, 0, "guest"), mv(1, 4, "bot")];
        let board = Board::replay(&moves, AUTOMATED_OPPONENT);
        assert_eq!(board.at(0, 0), Some(Cell::Occupied(Side::Attacker)));
        assert_eq!(board.at(1, 1), Some(Cell::Occupied(Side::Defender)));
        assert_eq!(board.occupied_count(), 2);
        assert_eq!(
            next_mover(&moves, false, AUTOMATED_OPPONENT),
            Some(Side::Attacker)
        );
    }

    #[test]
    fn test_replay_ignores_arrival_order() {
        let ordered = vec![mv(0, 0, "guest"), mv(1, 4, "bot"), mv(2, 8, "guest")];
        let shuffled = vec![ordered[2].clone(), ordered[0].clone(), ordered[1].clone()];
        assert_eq!(
            Board::replay(&ordered, AUTOMATED_OPPONENT),
            Board::replay(&shuffled, AUTOMATED_OPPONENT)
        );
    }

    #[test]
    fn test_prefix_replay_is_consistent_with_full_replay() {
        let moves = vec![mv(0, 2, "guest"), mv(1, 5, "bot"), mv(2, 6, "guest")];
        let prefix = Board::replay(&moves[..2], AUTOMATED_OPPONENT);
        let full = Board::replay(&moves, AUTOMATED_OPPONENT);
        for (pos, cell) in prefix.cells() {
            if cell != Cell::Empty {
                assert_eq!(full.get(pos), cell);
            }
        }
        assert_eq!(
            full.get(Position::BottomLeft),
            Cell::Occupied(Side::Attacker)
        );
    }

    #[test]
    fn test_turn_alternation() {
        let players = ["guest", "bot", "guest", "bot", "guest"];
        let moves: Vec<Move> = players
            .iter()
            .enumerate()
            .map(|(i, p)| mv(i as u32, i, p))
            .collect();
        for k in 0..moves.len() {
            let mover = moves[k].side(AUTOMATED_OPPONENT);
            assert_eq!(
                next_mover(&moves[..=k], false, AUTOMATED_OPPONENT),
                Some(mover.opponent())
            );
        }
    }

    #[test]
    fn test_empty_and_finished() {
        assert_eq!(
            next_mover(&[], false, AUTOMATED_OPPONENT),
            Some(Side::Attacker)
        );
        assert_eq!(
            next_mover(&[mv(0, 0, "guest")], true, AUTOMATED_OPPONENT),
            None
        );
    }

    #[test]
    fn test_display() {
        let board = Board::replay(&[mv(0, 4, "guest")], AUTOMATED_OPPONENT);
        assert_eq!(board.display(), "1|2|3\n-+-+-\n4|X|6\n-+-+-\n7|8|9");
    }
}
