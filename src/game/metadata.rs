//! Players and outcome of a game, as reported by `/viewGame`.

use derive_new::new;
use serde::{Deserialize, Serialize};
use tictactoe_board::{AUTOMATED_OPPONENT, GUEST, Side};

use crate::auth::Credentials;

fn default_defender() -> String {
    AUTOMATED_OPPONENT.to_string()
}

/// Who plays which side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct Players {
    /// Attacker identity; `None` for an anonymous guest.
    #[serde(default)]
    pub attacker: Option<String>,
    /// Defender identity, the automated opponent unless stated otherwise.
    #[serde(default = "default_defender")]
    pub defender: String,
}

impl Default for Players {
    fn default() -> Self {
        Self::new(None, default_defender())
    }
}

impl Players {
    /// Identity playing `side`; `None` for an anonymous attacker.
    pub fn identity(&self, side: Side) -> Option<&str> {
        match side {
            Side::Attacker => self.attacker.as_deref(),
            Side::Defender => Some(&self.defender),
        }
    }
}

/// Finished flag, draw flag and winner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// No further moves are accepted.
    #[serde(default)]
    pub finished: bool,
    /// Finished without a winner.
    #[serde(default, alias = "isDraw")]
    pub draw: bool,
    /// Identity of the winner, if there is one yet.
    #[serde(default)]
    pub winner: Option<String>,
}

/// Everything known about a game besides its moves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct GameMetaData {
    /// Who plays which side.
    pub players: Players,
    /// Outcome so far.
    pub game_state: GameState,
}

impl GameMetaData {
    /// True once the server closed the game.
    pub fn is_finished(&self) -> bool {
        self.game_state.finished
    }

    /// Winner identity of a finished game.
    pub fn winner(&self) -> Option<&str> {
        if self.game_state.finished && !self.game_state.draw {
            self.game_state.winner.as_deref()
        } else {
            None
        }
    }
}

/// Whether the viewer should see a victory celebration.
///
/// Only a finished game with a winner celebrates: for the signed-in winner,
/// or for an anonymous viewer when the winner is a guest.
pub fn should_celebrate(metadata: &GameMetaData, viewer: Option<&Credentials>) -> bool {
    match (metadata.winner(), viewer) {
        (Some(GUEST), None) => true,
        (Some(winner), Some(viewer)) => winner == viewer.username,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished(winner: Option<&str>) -> GameMetaData {
        GameMetaData::new(
            Players::default(),
            GameState::new(true, winner.is_none(), winner.map(str::to_string)),
        )
    }

    fn viewer(name: &str) -> Credentials {
        Credentials::new(name.to_string(), "tok".to_string(), i64::MAX)
    }

    #[test]
    fn test_winner_celebrates_only_for_themselves() {
        let meta = finished(Some("alice"));
        assert!(should_celebrate(&meta, Some(&viewer("alice"))));
        assert!(!should_celebrate(&meta, Some(&viewer("bob"))));
        assert!(!should_celebrate(&meta, None));
    }

    #[test]
    fn test_guest_winner_celebrates_for_guests() {
        let meta = finished(Some(GUEST));
        assert!(should_celebrate(&meta, None));
        assert!(!should_celebrate(&meta, Some(&viewer("alice"))));
    }

    #[test]
    fn test_draw_and_running_games_do_not_celebrate() {
        assert!(!should_celebrate(&finished(None), None));
        let running = GameMetaData::new(
            Players::default(),
            GameState::new(false, false, Some("alice".into())),
        );
        assert!(!should_celebrate(&running, Some(&viewer("alice"))));
    }

    #[test]
    fn test_wire_defaults() {
        let meta: GameMetaData = serde_json::from_value(serde_json::json!({
            "players": {"attacker": "alice"},
            "gameState": {"finished": true, "isDraw": true, "winner": null}
        }))
        .unwrap();
        assert_eq!(meta.players.defender, AUTOMATED_OPPONENT);
        assert!(meta.game_state.draw);
        assert_eq!(meta.winner(), None);
    }
}
