//! Log in, sign up and competition enrollment flows.

mod common;

use common::{FakeBackend, Reply, harness};
use serde_json::json;
use tictactoe_webapp::auth::{Blake3Deriver, KeyDeriver};
use tictactoe_webapp::router::History;

#[tokio::test]
async fn test_log_in_derives_key_from_salt() {
    let backend = FakeBackend::new();
    backend.always("/getsalt", Reply::Ok(json!({"salt": "00ff"})));
    backend.always(
        "/login",
        Reply::Ok(json!({"token": "t-1", "tokenExpiration": 4102444800i64, "inCompetition": true})),
    );
    let h = harness("/login", backend);
    h.app.start().await;

    h.type_into("username", " alice ");
    h.type_into("password", "hunter2");
    h.click_primary("Log in").await;

    let salt = h.backend.calls_to("/getsalt");
    assert_eq!(salt[0].field("username"), Some("alice"));
    let login = h.backend.calls_to("/login");
    let expected = Blake3Deriver.derive("hunter2", "00ff");
    assert_eq!(login[0].field("key"), Some(expected.as_str()));
    assert_eq!(login[0].field("password"), None);

    let credentials = h.app.credentials().unwrap();
    assert_eq!(credentials.username, "alice");
    assert_eq!(credentials.token, "t-1");
    assert!(credentials.in_competition);
    assert_eq!(h.history.location(), "/");
    assert_eq!(h.banner_text().as_deref(), Some("Welcome back, @alice."));
    assert!(h.surface.find_clickable("Sign out").is_some());
}

#[tokio::test]
async fn test_log_in_with_bare_salt_and_session_length() {
    let backend = FakeBackend::new();
    backend.always("/getsalt", Reply::Ok(json!("00ff")));
    backend.always(
        "/login",
        Reply::Ok(json!({"token": "t-1", "token_expires": "3600"})),
    );
    let h = harness("/login", backend);
    h.app.start().await;

    h.type_into("username", "alice");
    h.type_into("password", "hunter2");
    let before = chrono::Utc::now().timestamp();
    h.click_primary("Log in").await;

    let login = h.backend.calls_to("/login");
    assert_eq!(login.len(), 1);
    let expected = Blake3Deriver.derive("hunter2", "00ff");
    assert_eq!(login[0].field("key"), Some(expected.as_str()));

    let credentials = h.app.credentials().unwrap();
    assert_eq!(credentials.token, "t-1");
    assert!(credentials.token_expiration >= before + 3600);
    assert!(credentials.token_expiration <= chrono::Utc::now().timestamp() + 3600);
    assert!(!credentials.in_competition);
    assert_eq!(h.banner_text().as_deref(), Some("Welcome back, @alice."));
}

#[tokio::test]
async fn test_sign_up_with_session_length_logs_in() {
    let backend = FakeBackend::new();
    backend.always(
        "/signup",
        Reply::Ok(json!({"token": "t-3", "token_expires": 600})),
    );
    let h = harness("/signup", backend);
    h.app.start().await;

    h.type_into("email", "carol@example.com");
    h.type_into("username", "carol");
    h.type_into("password", "pw");
    h.click_primary("Sign up").await;

    let credentials = h.app.credentials().unwrap();
    assert_eq!(credentials.token, "t-3");
    assert!(credentials.token_expiration > chrono::Utc::now().timestamp());
    assert_eq!(h.history.location(), "/");
}

#[tokio::test]
async fn test_log_in_requires_both_fields() {
    let h = harness("/login", FakeBackend::new());
    h.app.start().await;

    h.type_into("username", "alice");
    h.click_primary("Log in").await;

    assert_eq!(
        h.banner_text().as_deref(),
        Some("Enter a username and a password.")
    );
    assert!(h.backend.calls_to("/getsalt").is_empty());
}

#[tokio::test]
async fn test_rejected_log_in_is_acknowledged_only() {
    let backend = FakeBackend::new();
    backend.always("/getsalt", Reply::Reject("unknown user".into()));
    let h = harness("/login", backend);
    h.app.start().await;

    h.type_into("username", "mallory");
    h.type_into("password", "x");
    h.click_primary("Log in").await;

    assert_eq!(h.banner_text().as_deref(), Some("Log in failed: unknown user"));
    assert!(h.surface.find_clickable("Retry").is_none());
    assert!(h.app.credentials().is_none());
    assert!(h.backend.calls_to("/login").is_empty());
}

#[tokio::test]
async fn test_sign_up_sends_salt_and_key() {
    let backend = FakeBackend::new();
    backend.always("/signup", Reply::Ok(json!(null)));
    let h = harness("/signup", backend);
    h.app.start().await;

    h.type_into("email", "alice@example.com");
    h.type_into("username", "alice");
    h.type_into("password", "hunter2");
    h.click_primary("Sign up").await;

    let signup = h.backend.calls_to("/signup");
    assert_eq!(signup.len(), 1);
    let salt = signup[0].field("salt").unwrap();
    assert_eq!(salt.len(), 256);
    let expected = Blake3Deriver.derive("hunter2", salt);
    assert_eq!(signup[0].field("key"), Some(expected.as_str()));
    assert_eq!(signup[0].field("email"), Some("alice@example.com"));

    assert!(h.app.credentials().is_none());
    assert_eq!(h.history.location(), "/login");
    assert_eq!(
        h.banner_text().as_deref(),
        Some("Account created, please log in.")
    );
}

#[tokio::test]
async fn test_sign_up_with_token_logs_in() {
    let backend = FakeBackend::new();
    backend.always(
        "/signup",
        Reply::Ok(json!({"token": "t-2", "tokenExpiration": 4102444800i64})),
    );
    let h = harness("/signup", backend);
    h.app.start().await;

    h.type_into("email", "bob@example.com");
    h.type_into("username", "bob");
    h.type_into("password", "pw");
    h.click_primary("Sign up").await;

    assert_eq!(h.app.credentials().unwrap().username, "bob");
    assert_eq!(h.history.location(), "/");
    assert_eq!(h.banner_text().as_deref(), Some("Welcome, @bob."));
}

#[tokio::test]
async fn test_sign_up_rejects_malformed_email() {
    let h = harness("/signup", FakeBackend::new());
    h.app.start().await;

    h.type_into("email", "not-an-address");
    h.type_into("username", "bob");
    h.type_into("password", "pw");
    h.click_primary("Sign up").await;

    assert_eq!(
        h.banner_text().as_deref(),
        Some("That does not look like an e-mail address.")
    );
    assert!(h.backend.calls_to("/signup").is_empty());
}

#[tokio::test]
async fn test_join_competition() {
    let backend = FakeBackend::new();
    backend.always("/joinCompetition", Reply::Ok(json!(null)));
    backend.always(
        "/users",
        Reply::Ok(json!([{"username": "alice", "inCompetition": true}])),
    );
    let h = harness("/competition/join", backend);
    h.sign_in("alice");
    h.app.start().await;

    h.type_into("name", "Alice");
    h.type_into("age", "31");
    h.type_into("gender", "f");
    h.click_primary("Join").await;

    let join = h.backend.calls_to("/joinCompetition");
    assert_eq!(join[0].bearer.as_deref(), Some("tok"));
    assert_eq!(join[0].field("age"), Some("31"));
    assert_eq!(join[0].field("name"), Some("Alice"));

    assert!(h.app.credentials().unwrap().in_competition);
    assert_eq!(h.history.location(), "/competition");
    assert_eq!(h.banner_text().as_deref(), Some("You joined the competition."));
    assert!(h.surface.contains_text("You are enrolled."));
}

#[tokio::test]
async fn test_join_competition_validates_age() {
    let h = harness("/competition/join", FakeBackend::new());
    h.sign_in("alice");
    h.app.start().await;

    h.type_into("name", "Alice");
    h.type_into("age", "thirty");
    h.click_primary("Join").await;

    assert_eq!(h.banner_text().as_deref(), Some("Age must be a whole number."));
    assert!(h.backend.calls_to("/joinCompetition").is_empty());
}

#[tokio::test]
async fn test_join_page_asks_guests_to_log_in() {
    let h = harness("/competition/join", FakeBackend::new());
    h.app.start().await;

    assert!(h.surface.contains_text("Only signed-in players can join."));
    assert!(h.surface.find(|w| w.has_class("primary") && w.text.as_deref() == Some("Join")).is_empty());
}
