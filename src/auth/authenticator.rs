//! Per-request authentication strategy.

use tracing::{debug, instrument};

use crate::api::{Form, paths};
use crate::auth::Credentials;

/// Request after authentication: what to send and whether to attach the
/// current bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedRequest {
    /// Target path.
    pub path: String,
    /// Payload, possibly extended with a game key.
    pub form: Form,
    /// Whether the caller must attach the bearer token.
    pub attach_token: bool,
}

/// Decides how a request is credentialed.
///
/// Bound either to the secret key of an anonymous game or to a signed-in
/// member. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authenticator {
    /// Anonymous game secret returned by `/startNewGame`.
    GameKey(String),
    /// Signed-in member; the token itself is read from the credential store
    /// at send time.
    Member {
        /// Member identity.
        username: String,
    },
}

impl Authenticator {
    /// Authenticator for an anonymous game.
    pub fn from_game_key(game_key: impl Into<String>) -> Self {
        Self::GameKey(game_key.into())
    }

    /// Authenticator for the signed-in member.
    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self::Member {
            username: credentials.username.clone(),
        }
    }

    /// Identity recorded on moves made through this authenticator.
    pub fn player_identity(&self) -> &str {
        match self {
            Self::GameKey(_) => tictactoe_board::GUEST,
            Self::Member { username } => username,
        }
    }

    /// Produces the exact parameters to send for `path`.
    #[instrument(skip(self, form), fields(kind = self.kind()))]
    pub fn authenticate(&self, path: &str, form: Form) -> AuthenticatedRequest {
        match self {
            Self::GameKey(key) => {
                let form = if path == paths::MAKE_MOVE {
                    form.field("gameKey", key)
                } else {
                    debug!("Skipping authentication for target without game key");
                    form
                };
                AuthenticatedRequest {
                    path: path.to_string(),
                    form,
                    attach_token: false,
                }
            }
            Self::Member { .. } => AuthenticatedRequest {
                path: path.to_string(),
                form,
                attach_token: true,
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::GameKey(_) => "game_key",
            Self::Member { .. } => "member",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_key_only_for_make_move() {
        let auth = Authenticator::from_game_key("secret");
        let req = auth.authenticate(paths::MAKE_MOVE, Form::new().field("gameId", 1));
        assert_eq!(req.form.get("gameKey"), Some("secret"));
        assert!(!req.attach_token);

        let req = auth.authenticate(paths::VIEW_GAME, Form::new().field("gameId", 1));
        assert_eq!(req.form.get("gameKey"), None);
        assert!(!req.attach_token);
    }

    #[test]
    fn test_member_requests_token() {
        let auth = Authenticator::Member {
            username: "alice".to_string(),
        };
        let req = auth.authenticate(paths::MAKE_MOVE, Form::new());
        assert!(req.attach_token);
        assert_eq!(req.form.get("gameKey"), None);
        assert_eq!(auth.player_identity(), "alice");
    }
}
