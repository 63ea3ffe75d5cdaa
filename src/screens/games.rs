//! New game, game info and the public game list.

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{debug, instrument, warn};

use super::{common, ids};
use crate::ApiError;
use crate::api::{ApiResponse, Form, GameSummary, UserPage, paths};
use crate::game::{GameView, TicTacToeGame};
use crate::router::{App, StateId};
use crate::view::{Action, Callback, NodeId, Screen, Widget};

/// Allocates a game and plays it.
///
/// Once allocated, the history entry is rewritten to the game's own URL so
/// reloading or going back returns to this game rather than a new one.
#[instrument(skip_all)]
pub(super) async fn render_new(screen: Screen, app: App) {
    let Some(tile) = common::tile(&screen) else {
        return;
    };
    let view = GameView::mount(&tile);
    let Some(game) = TicTacToeGame::create_new(app.clone(), Some(view.clone())).await else {
        return;
    };
    if view.is_attached() {
        let id = game.game_id().to_string();
        app.replace_location(&StateId::from(ids::GAME_INFO), &id, vec![id.clone()]);
    } else {
        debug!(game_id = %game.game_id(), "Left the new game screen before allocation finished");
    }
}

/// Shows one game, playable when this client holds its credentials.
#[instrument(skip_all)]
pub(super) async fn render_info(screen: Screen, app: App) {
    let Some(tile) = common::tile(&screen) else {
        return;
    };
    let Some(game_id) = common::first_capture(&app) else {
        warn!("Game screen without a game id");
        tile.add(Widget::text("No game selected."));
        return;
    };
    let view = GameView::mount(&tile);
    let authenticator = app.authenticator_for(&game_id);
    TicTacToeGame::attach(app, game_id, authenticator, Some(view)).await;
}

fn game_row(game: &GameSummary) -> Widget {
    let attacker = game
        .attacker
        .as_deref()
        .map(|name| format!("@{}", name))
        .unwrap_or_else(|| "Guest".to_string());
    let status = match (&game.winner, game.finished) {
        (Some(winner), true) => format!("{} won", winner),
        (None, true) => "draw".to_string(),
        _ => "running".to_string(),
    };
    Widget::row([
        Widget::link(
            format!("#{}", game.game_id),
            Action::NavigateToUrl(format!("/games/{}", game.game_id)),
        ),
        Widget::text(format!("{} vs. @{}", attacker, game.defender)),
        Widget::text(status).class("gameStatus"),
    ])
    .class("gameRow")
}

/// Where a paginated game list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum GameSource {
    /// `/games`
    Public,
    /// `/users/<name>`
    User(String),
}

impl GameSource {
    fn path(&self) -> String {
        match self {
            Self::Public => paths::GAMES.to_string(),
            Self::User(name) => paths::user(name),
        }
    }

    fn decode(&self, response: &ApiResponse) -> Result<Vec<GameSummary>, ApiError> {
        match self {
            Self::Public => response.data_as(),
            Self::User(_) => response.data_as::<UserPage>().map(|page| page.games),
        }
    }
}

/// Fetches the page after `cursor` (a game id) into `list`, then offers
/// the next page.
pub(super) fn load_games(
    screen: Screen,
    app: App,
    source: GameSource,
    list: NodeId,
    cursor: Option<String>,
) -> BoxFuture<'static, ()> {
    async move {
        let form = match &cursor {
            Some(game_id) => Form::new().field("gameId", game_id),
            None => Form::new(),
        };
        let response = app.api(&source.path(), form, false).await;
        match source.decode(&response) {
            Ok(page) => append_games(&screen, &app, source, list, page),
            Err(e) => {
                warn!(error = %e, ?source, "Game list failed");
                let (s, a, src) = (screen.clone(), app.clone(), source.clone());
                let retry = Callback::new(move || {
                    load_games(s.clone(), a.clone(), src.clone(), list, cursor.clone())
                });
                common::report_failure(&screen, &app, "Games could not be loaded", &response, retry);
            }
        }
    }
    .boxed()
}

/// Appends rows and a "load more" button keyed on the last game id.
pub(super) fn append_games(
    screen: &Screen,
    app: &App,
    source: GameSource,
    list: NodeId,
    page: Vec<GameSummary>,
) {
    let Some(next) = page.last().map(|g| g.game_id.clone()) else {
        screen.add_to(Some(list), Widget::text("No more games.").class("listEnd"));
        return;
    };
    for game in &page {
        screen.add_to(Some(list), game_row(game));
    }
    let Some(slot) = screen.add_to(Some(list), Widget::container([]).class("loadMore")) else {
        return;
    };
    let (s, a) = (screen.clone(), app.clone());
    let more = Callback::new(move || {
        let (s, a, src, next) = (s.clone(), a.clone(), source.clone(), next.clone());
        async move {
            s.remove(slot);
            load_games(s, a, src, list, Some(next)).await;
        }
    });
    screen.add_to(Some(slot), Widget::button("Load more", Action::Invoke(more)));
}

/// Public game list.
#[instrument(skip_all)]
pub(super) async fn render_browse(screen: Screen, app: App) {
    let Some(tile) = common::tile(&screen) else {
        return;
    };
    tile.add(Widget::heading(1, "Games"));
    let Some(list) = tile.add(Widget::column([]).class("gameList")) else {
        return;
    };
    load_games(tile, app, GameSource::Public, list, None).await;
}
