//! Typed `data` payloads of the backend endpoints.

use serde::{Deserialize, Deserializer, Serialize};
use tictactoe_board::Move;
use tictactoe_board::wire::string_or_number;

use crate::game::{GameState, Players};

/// Endpoint paths.
pub mod paths {
    /// Allocates a game.
    pub const START_NEW_GAME: &str = "/startNewGame";
    /// Returns moves and metadata of one game.
    pub const VIEW_GAME: &str = "/viewGame";
    /// Appends a move.
    pub const MAKE_MOVE: &str = "/makeMove";
    /// Returns the password salt of a user.
    pub const GET_SALT: &str = "/getsalt";
    /// Exchanges a derived key for a bearer token.
    pub const LOGIN: &str = "/login";
    /// Creates an account.
    pub const SIGNUP: &str = "/signup";
    /// Validates the held bearer token.
    pub const CHECK_CREDENTIALS: &str = "/checkCredentials";
    /// Paginated user leaderboard.
    pub const USERS: &str = "/users";
    /// Paginated public game list.
    pub const GAMES: &str = "/games";
    /// Enrolls the signed-in user in the competition.
    pub const JOIN_COMPETITION: &str = "/joinCompetition";
    /// Deployed build identifier.
    pub const VERSION: &str = "/version";

    /// Game history and stats of one user.
    pub fn user(username: &str) -> String {
        format!("{}/{}", USERS, username)
    }
}

/// Answer of `/startNewGame`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGame {
    /// Allocated game.
    #[serde(deserialize_with = "string_or_number")]
    pub game_id: String,
    /// Secret for guests; absent for signed-in players.
    #[serde(default)]
    pub game_key: Option<String>,
}

/// Answer of `/viewGame`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Ordered move list.
    #[serde(default)]
    pub moves: Vec<Move>,
    /// Who plays which side.
    pub players: Players,
    /// Finished / draw / winner.
    pub game_state: GameState,
}

/// Answer of `/getsalt`: the salt itself, or an object holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SaltWire")]
pub struct SaltData {
    /// Hex encoded salt.
    pub salt: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SaltWire {
    Bare(String),
    Object { salt: String },
}

impl From<SaltWire> for SaltData {
    fn from(wire: SaltWire) -> Self {
        match wire {
            SaltWire::Bare(salt) | SaltWire::Object { salt } => Self { salt },
        }
    }
}

/// Session length in seconds, sent as a number or as numeric text.
fn lifetime_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Integer(i64),
        Float(f64),
        Text(String),
    }

    let seconds = match Option::<Wire>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(Wire::Integer(n)) => n,
        Some(Wire::Float(f)) => f as i64,
        Some(Wire::Text(text)) => {
            let text = text.trim();
            match text.parse::<i64>() {
                Ok(n) => n,
                Err(_) => text
                    .parse::<f64>()
                    .map(|f| f as i64)
                    .map_err(|_| {
                        <D::Error as serde::de::Error>::custom(format!("not a duration: {text:?}"))
                    })?,
            }
        }
    };
    Ok(Some(seconds))
}

/// When a session handed out by `/login` or `/signup` ends.
///
/// Servers send either an absolute `tokenExpiration` (unix seconds) or a
/// relative `token_expires` (session length in seconds from now).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLifetime {
    /// Expiry as unix seconds.
    #[serde(default, rename = "tokenExpiration")]
    pub expiration: Option<i64>,
    /// Session length in seconds.
    #[serde(default, rename = "token_expires", deserialize_with = "lifetime_seconds")]
    pub expires_in: Option<i64>,
}

impl TokenLifetime {
    /// Absolute expiry, preferring the server's own timestamp.
    pub fn expires_at(&self, now: i64) -> Option<i64> {
        self.expiration
            .or_else(|| self.expires_in.map(|seconds| now.saturating_add(seconds)))
    }
}

/// Answer of `/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    /// Bearer token.
    pub token: String,
    /// When the token stops working.
    #[serde(flatten)]
    pub lifetime: TokenLifetime,
    /// Whether the user is enrolled in the competition.
    #[serde(default)]
    pub in_competition: bool,
}

/// Answer of `/signup`; the token is present when the server logs in directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupData {
    /// Bearer token.
    #[serde(default)]
    pub token: Option<String>,
    /// When the token stops working.
    #[serde(flatten)]
    pub lifetime: TokenLifetime,
}

/// Aggregate results of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    /// Games played.
    #[serde(default)]
    pub games_played: u32,
    /// Games won.
    #[serde(default)]
    pub games_won: u32,
    /// Games lost.
    #[serde(default)]
    pub games_lost: u32,
    /// Games drawn.
    #[serde(default)]
    pub draws: u32,
}

/// One row of a game list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    /// Game id, also the pagination cursor.
    #[serde(deserialize_with = "string_or_number")]
    pub game_id: String,
    /// Attacker identity, `None` for a guest.
    #[serde(default)]
    pub attacker: Option<String>,
    /// Defender identity.
    #[serde(default = "default_defender")]
    pub defender: String,
    /// Whether the game is over.
    #[serde(default)]
    pub finished: bool,
    /// Winner identity.
    #[serde(default)]
    pub winner: Option<String>,
}

fn default_defender() -> String {
    tictactoe_board::AUTOMATED_OPPONENT.to_string()
}

/// Answer of `/users/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    /// Whose page this is.
    pub username: String,
    /// Aggregate results.
    #[serde(default)]
    pub stats: UserStats,
    /// One page of games, newest first.
    #[serde(default)]
    pub games: Vec<GameSummary>,
}

/// One row of the `/users` leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Username.
    pub username: String,
    /// Aggregate results.
    #[serde(flatten)]
    pub stats: UserStats,
    /// Whether the user is enrolled in the competition.
    #[serde(default)]
    pub in_competition: bool,
}

/// Fields sent to `/joinCompetition`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionEntry {
    /// Real name.
    pub name: String,
    /// Age in years.
    pub age: u32,
    /// Self-described gender.
    pub gender: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_wire_format() {
        let snapshot: GameSnapshot = serde_json::from_value(json!({
            "moves": [{"gameId": "7", "moveIndex": 0, "movePosition": 0, "player": "guest"}],
            "players": {"attacker": null, "defender": "bot"},
            "gameState": {"finished": false, "winner": null}
        }))
        .unwrap();
        assert_eq!(snapshot.moves.len(), 1);
        assert_eq!(snapshot.players.attacker, None);
        assert!(!snapshot.game_state.finished);
    }

    #[test]
    fn test_user_summary_flattens_stats() {
        let row: UserSummary = serde_json::from_value(json!({
            "username": "alice", "gamesPlayed": 3, "gamesWon": 2
        }))
        .unwrap();
        assert_eq!(row.stats.games_won, 2);
        assert!(!row.in_competition);
    }

    #[test]
    fn test_salt_as_bare_string_or_object() {
        let bare: SaltData = serde_json::from_value(json!("00ff")).unwrap();
        let object: SaltData = serde_json::from_value(json!({"salt": "00ff"})).unwrap();
        assert_eq!(bare, object);
        assert_eq!(bare.salt, "00ff");
    }

    #[test]
    fn test_login_session_length_becomes_expiry() {
        let login: LoginData =
            serde_json::from_value(json!({"token": "t-1", "token_expires": "3600"})).unwrap();
        assert_eq!(login.token, "t-1");
        assert_eq!(login.lifetime.expires_at(1_000), Some(4_600));

        let login: LoginData =
            serde_json::from_value(json!({"token": "t-1", "tokenExpiration": 5_000})).unwrap();
        assert_eq!(login.lifetime.expires_at(1_000), Some(5_000));

        let login: LoginData = serde_json::from_value(json!({"token": "t-1"})).unwrap();
        assert_eq!(login.lifetime.expires_at(1_000), None);
    }

    #[test]
    fn test_numeric_game_ids() {
        let game: NewGame = serde_json::from_value(json!({"gameId": 12})).unwrap();
        assert_eq!(game.game_id, "12");
        let row: GameSummary = serde_json::from_value(json!({
            "gameId": 3, "defender": "bot", "finished": false
        }))
        .unwrap();
        assert_eq!(row.game_id, "3");
    }
}
