//! Cell addressing on the 3×3 board.
//!
//! A move is sent to the server as a single row-major index
//! (`movePosition = x + y * 3`); tiles on screen are addressed by `(x, y)`.
//! Both directions live here so they cannot drift apart.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A position on the tic-tac-toe board (0-8).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::EnumIter,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Position {
    /// Top-left (position 0)
    TopLeft,
    /// Top-center (position 1)
    TopCenter,
    /// Top-right (position 2)
    TopRight,
    /// Middle-left (position 3)
    MiddleLeft,
    /// Center (position 4)
    Center,
    /// Middle-right (position 5)
    MiddleRight,
    /// Bottom-left (position 6)
    BottomLeft,
    /// Bottom-center (position 7)
    BottomCenter,
    /// Bottom-right (position 8)
    BottomRight,
}

/// Raised when a wire index or coordinate pair is off the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("position index {} is outside 0..=8", index)]
pub struct PositionOutOfRange {
    /// Offending index.
    pub index: usize,
}

impl Position {
    /// All 9 positions.
    pub const ALL: [Position; 9] = [
        Position::TopLeft,
        Position::TopCenter,
        Position::TopRight,
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ];

    /// Get label for this position (for display).
    pub fn label(&self) -> &'static str {
        match self {
            Position::TopLeft => "Top-left",
            Position::TopCenter => "Top-center",
            Position::TopRight => "Top-right",
            Position::MiddleLeft => "Middle-left",
            Position::Center => "Center",
            Position::MiddleRight => "Middle-right",
            Position::BottomLeft => "Bottom-left",
            Position::BottomCenter => "Bottom-center",
            Position::BottomRight => "Bottom-right",
        }
    }

    /// Converts position to board index (0-8).
    pub fn to_index(self) -> usize {
        self as usize
    }

    /// Creates position from board index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Creates a position from column `x` and row `y`, both in `0..3`.
    #[instrument(level = "trace")]
    pub fn from_coords(x: usize, y: usize) -> Option<Self> {
        if x > 2 || y > 2 {
            return None;
        }
        Self::from_index(x + y * 3)
    }

    /// Returns `(x, y)`: column then row.
    pub fn coords(self) -> (usize, usize) {
        let index = self.to_index();
        let y = index / 3;
        let x = index - y * 3;
        (x, y)
    }
}

impl TryFrom<u8> for Position {
    type Error = PositionOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value as usize).ok_or(PositionOutOfRange {
            index: value as usize,
        })
    }
}

impl From<Position> for u8 {
    fn from(position: Position) -> Self {
        position.to_index() as u8
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Maps `(x, y)` to the wire index `x + y * 3`.
pub fn coords_to_position(x: usize, y: usize) -> Option<usize> {
    Position::from_coords(x, y).map(Position::to_index)
}

/// Maps a wire index back to `(x, y)`.
pub fn position_to_coords(index: usize) -> Option<(usize, usize)> {
    Position::from_index(index).map(Position::coords)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_mapping_is_a_bijection() {
        for p in 0..9 {
            let (x, y) = position_to_coords(p).unwrap();
            assert_eq!(coords_to_position(x, y), Some(p));
        }
    }

    #[test]
    fn test_center_is_one_one() {
        assert_eq!(Position::Center.coords(), (1, 1));
        assert_eq!(Position::from_coords(1, 1), Some(Position::Center));
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(Position::from_index(9), None);
        assert_eq!(Position::from_coords(3, 0), None);
        assert_eq!(position_to_coords(12), None);
        assert!(Position::try_from(9u8).is_err());
    }

    #[test]
    fn test_serializes_as_index() {
        let json = serde_json::to_string(&Position::BottomRight).unwrap();
        assert_eq!(json, "8");
        let back: Position = serde_json::from_str("4").unwrap();
        assert_eq!(back, Position::Center);
        assert!(serde_json::from_str::<Position>("9").is_err());
    }
}
