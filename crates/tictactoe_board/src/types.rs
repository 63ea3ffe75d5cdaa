//! Core domain types for tic-tac-toe.

use serde::{Deserialize, Serialize};

use crate::Position;

/// Identity the server uses for the automated opponent.
pub const AUTOMATED_OPPONENT: &str = "bot";

/// Identity recorded for moves made by an anonymous player.
pub const GUEST: &str = "guest";

/// Side of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    /// Moves first, drawn as a cross.
    Attacker,
    /// Moves second, drawn as a circle. Defaults to the automated opponent.
    Defender,
}

impl Side {
    /// Returns the opponent side.
    pub fn opponent(self) -> Self {
        match self {
            Side::Attacker => Side::Defender,
            Side::Defender => Side::Attacker,
        }
    }

    /// Classifies a move's `player` identity.
    ///
    /// Binary on purpose: the automated opponent is the defender and every
    /// other identity is the attacker. A game between two humans would be
    /// misclassified.
    pub fn classify(player: &str, automated_opponent: &str) -> Self {
        if player == automated_opponent {
            Side::Defender
        } else {
            Side::Attacker
        }
    }

    /// Mark drawn on a tile.
    pub fn icon(self) -> &'static str {
        match self {
            Side::Attacker => "x",
            Side::Defender => "o",
        }
    }
}

/// A cell on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell occupied by a side.
    Occupied(Side),
}

impl Cell {
    /// Returns the occupying side, if any.
    pub fn side(self) -> Option<Side> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(side) => Some(side),
        }
    }
}

/// One placed mark, identified by `(game_id, move_index)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    /// Game the move belongs to.
    #[serde(deserialize_with = "crate::wire::string_or_number")]
    pub game_id: String,
    /// Sequence number, starting at 0.
    pub move_index: u32,
    /// Wire index of the cell.
    pub move_position: Position,
    /// Identity of the mover.
    pub player: String,
}

impl Move {
    /// Side that made this move.
    pub fn side(&self, automated_opponent: &str) -> Side {
        Side::classify(&self.player, automated_opponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_bot_is_defender() {
        assert_eq!(Side::classify("bot", AUTOMATED_OPPONENT), Side::Defender);
        assert_eq!(Side::classify("guest", AUTOMATED_OPPONENT), Side::Attacker);
        assert_eq!(Side::classify("alice", AUTOMATED_OPPONENT), Side::Attacker);
    }

    #[test]
    fn test_move_wire_format() {
        let json = r#"{"gameId":"7","moveIndex":1,"movePosition":4,"player":"bot"}"#;
        let mv: Move = serde_json::from_str(json).unwrap();
        assert_eq!(mv.move_position, Position::Center);
        assert_eq!(mv.side(AUTOMATED_OPPONENT), Side::Defender);
    }

    #[test]
    fn test_move_accepts_numeric_game_id() {
        let json = r#"{"gameId":7,"moveIndex":0,"movePosition":8,"player":"guest"}"#;
        let mv: Move = serde_json::from_str(json).unwrap();
        assert_eq!(mv.game_id, "7");
        assert_eq!(mv.move_position, Position::BottomRight);
    }
}
