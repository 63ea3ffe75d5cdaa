//! Competition overview and enrollment.

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{Instrument, info, info_span, warn};

use super::users::{UserFilter, load_users};
use super::{common, go, ids};
use crate::api::{CompetitionEntry, Form, paths};
use crate::router::{App, ErrorOptions};
use crate::view::{Action, Callback, InputType, NodeId, Screen, Widget};

/// Rules, enrollment status and the list of competitors.
pub(super) async fn render_overview(screen: Screen, app: App) {
    let Some(tile) = common::tile(&screen) else {
        return;
    };
    tile.add(Widget::heading(1, "Competition"));
    tile.add(Widget::text(
        "Play against the bot as often as you like. Every finished game counts towards the leaderboard.",
    ));
    match app.credentials() {
        Some(creds) if creds.in_competition => {
            tile.add(Widget::text("You are enrolled.").class("enrolled"));
        }
        Some(_) => {
            tile.add(Widget::primary_button("Join", go(ids::JOIN_COMPETITION)));
        }
        None => {
            tile.add(Widget::row([
                Widget::text("Log in to take part."),
                Widget::button("Log in", go(ids::LOGIN)),
            ]));
        }
    }
    tile.add(Widget::separator(Some("competitors")));
    let Some(list) = tile.add(Widget::column([]).class("userList")) else {
        return;
    };
    load_users(tile, app, UserFilter::Competitors, list, 0).await;
}

fn join(screen: Screen, app: App, form: NodeId) -> BoxFuture<'static, ()> {
    async move {
        let Some(mut credentials) = app.credentials() else {
            app.show_error("Log in to join the competition.", ErrorOptions::acknowledge());
            return;
        };
        let values = screen.form_values(form);
        let name = values.get("name").map(|v| v.trim().to_string()).unwrap_or_default();
        let gender = values.get("gender").map(|v| v.trim().to_string()).unwrap_or_default();
        let age = values.get("age").map(|v| v.trim().parse::<u32>());
        let entry = match (name.is_empty(), age) {
            (false, Some(Ok(age))) => CompetitionEntry { name, age, gender },
            (true, _) => {
                app.show_error("Enter your name.", ErrorOptions::acknowledge());
                return;
            }
            _ => {
                app.show_error("Age must be a whole number.", ErrorOptions::acknowledge());
                return;
            }
        };

        let form_data = Form::new()
            .field("name", &entry.name)
            .field("age", entry.age)
            .field("gender", &entry.gender);
        let response = app.api(paths::JOIN_COMPETITION, form_data, true).await;
        if !response.success {
            warn!(error = %response.error_message(), "Joining failed");
            let (s, a) = (screen.clone(), app.clone());
            let retry = Callback::new(move || join(s.clone(), a.clone(), form));
            common::report_failure(&screen, &app, "Could not join", &response, retry);
            return;
        }

        info!(username = %credentials.username, "Joined the competition");
        credentials.in_competition = true;
        app.set_credentials(Some(credentials));
        app.navigate_to_url("/competition").await;
        app.show_info("You joined the competition.");
    }
    .instrument(info_span!("join_competition"))
    .boxed()
}

/// Enrollment form; signed-in users only.
pub(super) async fn render_join(screen: Screen, app: App) {
    let Some(tile) = common::tile(&screen) else {
        return;
    };
    tile.add(Widget::heading(1, "Join the competition"));
    if app.credentials().is_none() {
        tile.add(Widget::text("Only signed-in players can join."));
        tile.add(Widget::primary_button("Log in", go(ids::LOGIN)));
        return;
    }
    let Some(form) = tile.add(Widget::form([
        Widget::input("name", "Name", InputType::Text),
        Widget::input("age", "Age", InputType::Number),
        Widget::input("gender", "Gender", InputType::Text),
    ])) else {
        return;
    };
    let s = tile.clone();
    let action = Action::invoke(move || join(s.clone(), app.clone(), form));
    tile.add_to(Some(form), Widget::primary_button("Join", action));
}
