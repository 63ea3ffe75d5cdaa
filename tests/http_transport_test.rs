//! `HttpTransport` against a local axum server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{Form as AxumForm, Json, Router, extract::State, http::HeaderMap, http::StatusCode, routing::post};
use serde_json::{Value, json};
use tictactoe_webapp::api::{Form, HttpTransport, Transport};
use tictactoe_webapp::ApiErrorKind;

#[derive(Debug, Default, Clone)]
struct Seen {
    form: HashMap<String, String>,
    authorization: Option<String>,
}

type Shared = Arc<Mutex<Vec<Seen>>>;

async fn make_move(
    State(seen): State<Shared>,
    headers: HeaderMap,
    AxumForm(form): AxumForm<HashMap<String, String>>,
) -> Json<Value> {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    seen.lock().unwrap().push(Seen { form, authorization });
    Json(json!({"success": true, "data": {"accepted": true}}))
}

async fn rejected() -> Json<Value> {
    Json(json!({"success": false, "error": {"message": "game is over"}}))
}

async fn broken() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn serve() -> (String, Shared) {
    let seen: Shared = Arc::default();
    let router = Router::new()
        .route("/makeMove", post(make_move))
        .route("/viewGame", post(rejected))
        .route("/version", post(broken))
        .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{}/", addr), seen)
}

#[tokio::test]
async fn test_posts_form_with_bearer_token() {
    let (base, seen) = serve().await;
    let transport = HttpTransport::new(base);

    let form = Form::new().field("gameId", 7).field("movePosition", 4);
    let response = transport.post("/makeMove", &form, Some("t-1")).await.unwrap();

    assert!(response.success);
    assert_eq!(response.data, Some(json!({"accepted": true})));
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].form.get("gameId").map(String::as_str), Some("7"));
    assert_eq!(seen[0].form.get("movePosition").map(String::as_str), Some("4"));
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer t-1"));
}

#[tokio::test]
async fn test_no_token_no_header() {
    let (base, seen) = serve().await;
    let transport = HttpTransport::new(base);

    transport
        .post("/makeMove", &Form::new().field("gameKey", "k"), None)
        .await
        .unwrap();

    assert_eq!(seen.lock().unwrap()[0].authorization, None);
}

#[tokio::test]
async fn test_semantic_rejection_is_an_envelope() {
    let (base, _) = serve().await;
    let transport = HttpTransport::new(base);

    let response = transport.post("/viewGame", &Form::new(), None).await.unwrap();

    assert!(!response.success);
    assert!(!response.is_transport_failure());
    assert_eq!(response.error_message(), "game is over");
}

#[tokio::test]
async fn test_error_status_is_transport_error() {
    let (base, _) = serve().await;
    let transport = HttpTransport::new(base);

    let err = transport.post("/version", &Form::new(), None).await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Transport);
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let transport = HttpTransport::new("http://127.0.0.1:9");

    let err = transport.post("/version", &Form::new(), None).await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Transport);
}
