//! Landing screen.

use super::{common, go, ids};
use crate::router::App;
use crate::view::{Screen, Widget};

pub(super) async fn render(screen: Screen, app: App) {
    let Some(tile) = common::tile(&screen) else {
        return;
    };
    tile.add(Widget::row([
        Widget::icon("tictactoe").class("logo"),
        Widget::heading(1, "TicTacToe"),
    ]));

    let signed_in = app.credentials().is_some();
    let play = if signed_in { "New game" } else { "Play as guest" };
    tile.add(Widget::column([
        Widget::primary_button(play, go(ids::NEW_GAME)),
        Widget::button("Browse games", go(ids::BROWSE_GAMES)),
        Widget::button("Leaderboard", go(ids::USERS)),
        Widget::button("Competition", go(ids::COMPETITION)),
    ]));

    if !signed_in {
        tile.add(Widget::separator(Some("or")));
        tile.add(Widget::column([
            Widget::button("Create account", go(ids::SIGNUP)),
            Widget::button("Log in", go(ids::LOGIN)),
        ]));
    }
}
