//! Log in and sign up.
//!
//! The password never leaves the client: it is turned into a key with the
//! user's salt and only the key is sent.

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{Instrument, info, info_span, warn};

use super::{common, go, ids};
use crate::api::{Form, LoginData, SaltData, SignupData, paths};
use crate::auth::{Credentials, generate_salt};
use crate::router::{App, ErrorOptions};
use crate::view::{Action, Callback, InputType, NodeId, Screen, Widget};

fn field(values: &std::collections::BTreeMap<String, String>, name: &str) -> String {
    values.get(name).map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Adds a submit button to `form` that runs `submit` with the form node.
fn submit_button<F, Fut>(screen: &Screen, form: NodeId, label: &str, submit: F)
where
    F: Fn(Screen, NodeId) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let s = screen.clone();
    let action = Action::invoke(move || submit(s.clone(), form));
    screen.add_to(Some(form), Widget::primary_button(label, action));
}

fn log_in(screen: Screen, app: App, form: NodeId) -> BoxFuture<'static, ()> {
    async move {
        let values = screen.form_values(form);
        let username = field(&values, "username");
        let password = values.get("password").cloned().unwrap_or_default();
        if username.is_empty() || password.is_empty() {
            app.show_error("Enter a username and a password.", ErrorOptions::acknowledge());
            return;
        }
        let retry = {
            let (s, a) = (screen.clone(), app.clone());
            Callback::new(move || log_in(s.clone(), a.clone(), form))
        };

        let response = app
            .api(paths::GET_SALT, Form::new().field("username", &username), false)
            .await;
        let salt = match response.data_as::<SaltData>() {
            Ok(data) => data.salt,
            Err(e) => {
                warn!(error = %e, "Salt lookup failed");
                common::report_failure(&screen, &app, "Log in failed", &response, retry);
                return;
            }
        };

        let key = app.key_deriver().derive(&password, &salt);
        let form_data = Form::new().field("username", &username).field("key", key);
        let response = app.api(paths::LOGIN, form_data, false).await;
        let login = match response.data_as::<LoginData>() {
            Ok(login) => login,
            Err(e) => {
                warn!(error = %e, "Log in rejected");
                common::report_failure(&screen, &app, "Log in failed", &response, retry);
                return;
            }
        };

        let Some(expiration) = login.lifetime.expires_at(chrono::Utc::now().timestamp()) else {
            warn!("Log in answer without a token lifetime");
            app.show_error(
                "Log in failed: the server sent no session lifetime.",
                ErrorOptions::acknowledge(),
            );
            return;
        };
        let mut credentials = Credentials::new(username, login.token, expiration);
        credentials.in_competition = login.in_competition;
        info!(username = %credentials.username, "Logged in");
        let greeting = format!("Welcome back, @{}.", credentials.username);
        app.set_credentials(Some(credentials));
        app.navigate_to_url("/").await;
        app.show_info(&greeting);
    }
    .instrument(info_span!("log_in"))
    .boxed()
}

/// Log in form.
pub(super) async fn render_login(screen: Screen, app: App) {
    let Some(tile) = common::tile(&screen) else {
        return;
    };
    tile.add(Widget::heading(1, "Log in"));
    let Some(form) = tile.add(Widget::form([
        Widget::input("username", "Username", InputType::Text),
        Widget::input("password", "Password", InputType::Password),
    ])) else {
        return;
    };
    submit_button(&tile, form, "Log in", move |s, f| log_in(s, app.clone(), f));
    tile.add(Widget::separator(Some("or")));
    tile.add(Widget::button("Create account", go(ids::SIGNUP)));
}

fn sign_up(screen: Screen, app: App, form: NodeId) -> BoxFuture<'static, ()> {
    async move {
        let values = screen.form_values(form);
        let email = field(&values, "email");
        let username = field(&values, "username");
        let password = values.get("password").cloned().unwrap_or_default();
        if email.is_empty() || username.is_empty() || password.is_empty() {
            app.show_error("Fill in every field.", ErrorOptions::acknowledge());
            return;
        }
        if !email.contains('@') {
            app.show_error("That does not look like an e-mail address.", ErrorOptions::acknowledge());
            return;
        }

        let salt = generate_salt();
        let key = app.key_deriver().derive(&password, &salt);
        let form_data = Form::new()
            .field("username", &username)
            .field("email", &email)
            .field("key", key)
            .field("salt", salt);
        let response = app.api(paths::SIGNUP, form_data, false).await;
        let signup = match response.data_as::<Option<SignupData>>() {
            Ok(signup) => signup.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Sign up failed");
                let (s, a) = (screen.clone(), app.clone());
                let retry = Callback::new(move || sign_up(s.clone(), a.clone(), form));
                common::report_failure(&screen, &app, "Sign up failed", &response, retry);
                return;
            }
        };

        info!(username = %username, auto_login = signup.token.is_some(), "Account created");
        let expiration = signup.lifetime.expires_at(chrono::Utc::now().timestamp());
        match (signup.token, expiration) {
            (Some(token), Some(expiration)) => {
                app.set_credentials(Some(Credentials::new(username.clone(), token, expiration)));
                app.navigate_to_url("/").await;
                app.show_info(&format!("Welcome, @{}.", username));
            }
            _ => {
                app.navigate_to_url("/login").await;
                app.show_info("Account created, please log in.");
            }
        }
    }
    .instrument(info_span!("sign_up"))
    .boxed()
}

/// Sign up form.
pub(super) async fn render_signup(screen: Screen, app: App) {
    let Some(tile) = common::tile(&screen) else {
        return;
    };
    tile.add(Widget::heading(1, "Sign up"));
    let Some(form) = tile.add(Widget::form([
        Widget::input("email", "E-Mail", InputType::Email),
        Widget::input("username", "Username", InputType::Text),
        Widget::input("password", "Password", InputType::Password),
    ])) else {
        return;
    };
    submit_button(&tile, form, "Sign up", move |s, f| sign_up(s, app.clone(), f));
    tile.add(Widget::separator(Some("or")));
    tile.add(Widget::button("Log in", go(ids::LOGIN)));
}
