//! Page chrome shared by every state: header, notice area, body, footer.

use tracing::{debug, instrument};

use super::App;
use crate::view::{Action, NodeId, Screen, Widget, WidgetKind};

/// Nodes of a freshly built page frame.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Frame {
    pub notices: Option<NodeId>,
    pub main: Option<NodeId>,
    pub version: Option<NodeId>,
}

/// Header row showing who is signed in.
fn header(app: &App) -> Widget {
    let brand = Widget::link("TicTacToe", Action::NavigateToUrl("/".to_string())).class("brand");
    let account = match app.credentials() {
        Some(creds) => {
            let sign_out_app = app.clone();
            vec![
                Widget::link(
                    format!("@{}", creds.username),
                    Action::NavigateToUrl(format!("/users/{}", creds.username)),
                )
                .class("username"),
                Widget::button(
                    "Sign out",
                    Action::invoke(move || {
                        let app = sign_out_app.clone();
                        async move { app.sign_out().await }
                    }),
                ),
            ]
        }
        None => vec![
            Widget::button("Log in", Action::NavigateToUrl("/login".to_string())),
            Widget::button("Sign up", Action::NavigateToUrl("/signup".to_string())),
        ],
    };
    Widget::new(WidgetKind::Header).child(Widget::row(std::iter::once(brand).chain(account)))
}

fn version_text(hash: Option<&str>) -> Widget {
    Widget::text(format!("version {}", hash.unwrap_or("…"))).class("version")
}

/// Builds the frame at the root of `screen`.
#[instrument(level = "debug", skip_all, fields(generation = screen.generation()))]
pub(crate) fn build(screen: &Screen, app: &App) -> Frame {
    if screen.add_to(None, header(app)).is_none() {
        return Frame::default();
    }
    let notices = screen.add_to(None, Widget::new(WidgetKind::Container).class("notices"));
    let main = screen.add_to(None, Widget::main([]));
    let footer = screen.add_to(None, Widget::new(WidgetKind::Footer));
    let version = footer.and_then(|footer| {
        screen.add_to(Some(footer), version_text(app.cached_version_hash().as_deref()))
    });
    Frame {
        notices,
        main,
        version,
    }
}

/// Writes the deployed version into the footer once known.
pub(crate) async fn fill_footer(screen: &Screen, node: Option<NodeId>, app: &App) {
    let Some(node) = node else {
        return;
    };
    if app.cached_version_hash().is_some() {
        return;
    }
    let hash = app.version_hash().await;
    if !screen.replace(node, version_text(hash.as_deref())) {
        debug!("Footer belongs to a detached screen");
    }
}
