//! Leaderboard and per-user pages.

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{instrument, warn};

use super::common;
use super::games::{GameSource, append_games};
use crate::api::{Form, UserPage, UserStats, UserSummary, paths};
use crate::router::App;
use crate::view::{Action, Callback, NodeId, Screen, Widget};

fn stats_text(stats: &UserStats) -> String {
    format!(
        "played {} · won {} · lost {} · draws {}",
        stats.games_played, stats.games_won, stats.games_lost, stats.draws
    )
}

fn user_row(user: &UserSummary) -> Widget {
    let mut row = Widget::row([
        Widget::link(
            format!("@{}", user.username),
            Action::NavigateToUrl(paths::user(&user.username)),
        ),
        Widget::text(stats_text(&user.stats)),
    ])
    .class("userRow");
    if user.in_competition {
        row = row.child(Widget::icon("trophy").class("competitor"));
    }
    row
}

/// Which rows of the leaderboard to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum UserFilter {
    /// Everyone.
    All,
    /// Only users enrolled in the competition.
    Competitors,
}

/// Fetches the leaderboard from `offset` into `list`, then offers the next
/// page.
pub(super) fn load_users(
    screen: Screen,
    app: App,
    filter: UserFilter,
    list: NodeId,
    offset: usize,
) -> BoxFuture<'static, ()> {
    async move {
        let form = Form::new().field("offset", offset);
        let response = app.api(paths::USERS, form, false).await;
        let page = match response.data_as::<Vec<UserSummary>>() {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, offset, "User list failed");
                let (s, a) = (screen.clone(), app.clone());
                let retry =
                    Callback::new(move || load_users(s.clone(), a.clone(), filter, list, offset));
                common::report_failure(&screen, &app, "Users could not be loaded", &response, retry);
                return;
            }
        };
        if page.is_empty() {
            screen.add_to(Some(list), Widget::text("No more users.").class("listEnd"));
            return;
        }
        let next = offset + page.len();
        page.iter()
            .filter(|u| filter == UserFilter::All || u.in_competition)
            .for_each(|u| {
                screen.add_to(Some(list), user_row(u));
            });
        let Some(slot) = screen.add_to(Some(list), Widget::container([]).class("loadMore")) else {
            return;
        };
        let (s, a) = (screen.clone(), app.clone());
        let more = Callback::new(move || {
            let (s, a) = (s.clone(), a.clone());
            async move {
                s.remove(slot);
                load_users(s, a, filter, list, next).await;
            }
        });
        screen.add_to(Some(slot), Widget::button("Load more", Action::Invoke(more)));
    }
    .boxed()
}

/// Leaderboard.
#[instrument(skip_all)]
pub(super) async fn render_list(screen: Screen, app: App) {
    let Some(tile) = common::tile(&screen) else {
        return;
    };
    tile.add(Widget::heading(1, "Users"));
    let Some(list) = tile.add(Widget::column([]).class("userList")) else {
        return;
    };
    load_users(tile, app, UserFilter::All, list, 0).await;
}

fn load_user(screen: Screen, app: App, username: String) -> BoxFuture<'static, ()> {
    async move {
        let response = app.api(&paths::user(&username), Form::new(), false).await;
        let page = match response.data_as::<UserPage>() {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, username = %username, "User page failed");
                let (s, a, u) = (screen.clone(), app.clone(), username.clone());
                let retry = Callback::new(move || load_user(s.clone(), a.clone(), u.clone()));
                common::report_failure(&screen, &app, "User could not be loaded", &response, retry);
                return;
            }
        };
        screen.add(Widget::heading(1, format!("@{}", page.username)));
        screen.add(Widget::text(stats_text(&page.stats)).class("userStats"));
        screen.add(Widget::separator(Some("games")));
        let Some(list) = screen.add(Widget::column([]).class("gameList")) else {
            return;
        };
        append_games(&screen, &app, GameSource::User(username), list, page.games);
    }
    .boxed()
}

/// One user's stats and game history.
#[instrument(skip_all)]
pub(super) async fn render_info(screen: Screen, app: App) {
    let Some(tile) = common::tile(&screen) else {
        return;
    };
    match common::first_capture(&app) {
        Some(username) => load_user(tile, app, username).await,
        None => {
            tile.add(Widget::text("No user selected."));
        }
    }
}
