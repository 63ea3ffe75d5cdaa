//! Every screen of the app and its registration.

mod account;
mod common;
mod competition;
mod games;
mod home;
mod users;

use tracing::instrument;

use crate::RouterError;
use crate::router::{App, State, StateId};
use crate::view::{Action, Screen, Widget};

/// State ids of all screens.
pub mod ids {
    /// `/`
    pub const HOME: &str = "home";
    /// `/games/new`
    pub const NEW_GAME: &str = "new_game";
    /// `/games/<id>`
    pub const GAME_INFO: &str = "game_info";
    /// `/games`
    pub const BROWSE_GAMES: &str = "browse_games";
    /// `/users`
    pub const USERS: &str = "users";
    /// `/users/<name>`
    pub const USER_INFO: &str = "user_info";
    /// `/login`
    pub const LOGIN: &str = "login";
    /// `/signup`
    pub const SIGNUP: &str = "signup";
    /// `/competition`
    pub const COMPETITION: &str = "competition";
    /// `/competition/join`
    pub const JOIN_COMPETITION: &str = "join_competition";
    /// Anything unclaimed.
    pub const NOT_FOUND: &str = "not_found";
}

/// Pattern of the game info URL.
pub const GAME_INFO_PATTERN: &str = r"^/games/(\d+)$";
/// Pattern of the user info URL.
pub const USER_INFO_PATTERN: &str = r"^/users/(.+)$";

/// Registers all screens with `app`.
///
/// Literal URLs come first so `/games/new` never reaches the game info
/// pattern.
#[instrument(skip(app))]
pub fn register_all(app: &App) -> Result<(), RouterError> {
    app.register(State::new(ids::HOME, "Home", home::render).with_url("/"));
    app.register(State::new(ids::NEW_GAME, "New game", games::render_new).with_url("/games/new"));
    app.register(
        State::new(ids::BROWSE_GAMES, "Browse games", games::render_browse).with_url("/games"),
    );
    app.register(State::new(ids::USERS, "Users", users::render_list).with_url("/users"));
    app.register(State::new(ids::LOGIN, "Log in", account::render_login).with_url("/login"));
    app.register(State::new(ids::SIGNUP, "Sign up", account::render_signup).with_url("/signup"));
    app.register(
        State::new(ids::COMPETITION, "Competition", competition::render_overview)
            .with_url("/competition"),
    );
    app.register(
        State::new(ids::JOIN_COMPETITION, "Join competition", competition::render_join)
            .with_url("/competition/join"),
    );
    app.register(
        State::new(ids::GAME_INFO, "Game", games::render_info)
            .with_pattern(GAME_INFO_PATTERN)?
            .with_canonical(|groups| groups.last().cloned()),
    );
    app.register(
        State::new(ids::USER_INFO, "User", users::render_info)
            .with_pattern(USER_INFO_PATTERN)?
            .with_canonical(|groups| groups.last().map(|name| format!("/users/{}", name))),
    );
    app.register_not_found(State::new(ids::NOT_FOUND, "Not found", render_not_found));
    Ok(())
}

/// Shorthand for navigating to a registered screen.
pub fn go(id: &str) -> Action {
    Action::NavigateTo(StateId::from(id))
}

async fn render_not_found(screen: Screen, app: App) {
    let location = app.history().location();
    let Some(tile) = common::tile(&screen) else {
        return;
    };
    tile.add(Widget::heading(1, "404"));
    tile.add(Widget::text(format!("Nothing lives at {}.", location)));
    tile.add(Widget::primary_button("Home", go(ids::HOME)));
}
