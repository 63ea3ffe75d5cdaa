//! Shared fixtures: a scripted backend and an app wired to in-memory parts.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tictactoe_webapp::api::{ApiResponse, Form, Transport};
use tictactoe_webapp::auth::{Credentials, MemoryStorage};
use tictactoe_webapp::view::Surface;
use tictactoe_webapp::{
    ApiError, ApiErrorKind, App, AppConfig, MemoryHistory, MemorySurface, screens,
};

/// What the fake backend answers.
#[derive(Debug, Clone)]
pub enum Reply {
    /// `success: true` with data.
    Ok(Value),
    /// `success: false` with a message.
    Reject(String),
    /// No envelope at all.
    Fail(String),
}

/// One recorded request.
#[derive(Debug, Clone)]
pub struct Call {
    pub path: String,
    pub form: Form,
    pub bearer: Option<String>,
}

impl Call {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.form.get(name)
    }
}

#[derive(Debug, Default)]
struct Script {
    queued: HashMap<String, VecDeque<Reply>>,
    fallback: HashMap<String, Reply>,
    calls: Vec<Call>,
}

/// Scripted [`Transport`]: queued replies first, then a per-path fallback.
#[derive(Debug, Default)]
pub struct FakeBackend {
    script: Mutex<Script>,
}

impl FakeBackend {
    /// Backend that already answers `/version` and `/checkCredentials`.
    pub fn new() -> Arc<Self> {
        let backend = Arc::new(Self::default());
        backend.always("/version", Reply::Ok(json!("abc123")));
        backend.always("/checkCredentials", Reply::Ok(Value::Null));
        backend
    }

    /// Answers every request to `path` with `reply` once the queue is empty.
    pub fn always(&self, path: &str, reply: Reply) {
        self.script().fallback.insert(path.to_string(), reply);
    }

    /// Queues `reply` for the next request to `path`.
    pub fn once(&self, path: &str, reply: Reply) {
        self.script()
            .queued
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Every request so far.
    pub fn calls(&self) -> Vec<Call> {
        self.script().calls.clone()
    }

    /// Requests to `path` so far.
    pub fn calls_to(&self, path: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }

    fn script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn post(
        &self,
        path: &str,
        form: &Form,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        let reply = {
            let mut script = self.script();
            script.calls.push(Call {
                path: path.to_string(),
                form: form.clone(),
                bearer: bearer.map(str::to_string),
            });
            let queued = script.queued.get_mut(path).and_then(VecDeque::pop_front);
            queued.or_else(|| script.fallback.get(path).cloned())
        };
        match reply {
            Some(Reply::Ok(data)) => Ok(ApiResponse::ok(data)),
            Some(Reply::Reject(message)) => Ok(ApiResponse::rejected(message)),
            Some(Reply::Fail(message)) => Err(ApiError::new(ApiErrorKind::Transport, message)),
            None => Ok(ApiResponse::rejected(format!("no route for {}", path))),
        }
    }
}

/// App plus handles on its in-memory collaborators.
pub struct Harness {
    pub app: App,
    pub surface: Arc<MemorySurface>,
    pub history: Arc<MemoryHistory>,
    pub storage: Arc<MemoryStorage>,
    pub backend: Arc<FakeBackend>,
}

/// Builds an app at `start_url` with every screen registered.
pub fn harness(start_url: &str, backend: Arc<FakeBackend>) -> Harness {
    let surface = Arc::new(MemorySurface::new());
    let history = Arc::new(MemoryHistory::new(start_url));
    let storage = Arc::new(MemoryStorage::new());
    let app = App::builder(AppConfig::default().with_start_url(start_url))
        .with_transport(backend.clone())
        .with_surface(surface.clone())
        .with_history(history.clone())
        .with_storage(storage.clone())
        .build();
    screens::register_all(&app).unwrap();
    Harness {
        app,
        surface,
        history,
        storage,
        backend,
    }
}

impl Harness {
    /// Stores valid credentials for `username` without a server round trip.
    pub fn sign_in(&self, username: &str) {
        let expiration = chrono::Utc::now().timestamp() + 3600;
        Credentials::new(username.to_string(), "tok".to_string(), expiration)
            .store(&*self.storage)
            .unwrap();
    }

    /// Clicks the first interactive widget labelled `label`.
    pub async fn click(&self, label: &str) {
        let node = self
            .surface
            .find_clickable(label)
            .unwrap_or_else(|| panic!("nothing clickable labelled {label:?}"));
        let action = self.surface.action_of(node).unwrap();
        self.app.dispatch(action).await;
    }

    /// Clicks the first primary button labelled `label`, skipping the page
    /// header.
    pub async fn click_primary(&self, label: &str) {
        let node = self
            .surface
            .find(|w| w.has_class("primary") && w.text.as_deref() == Some(label))
            .into_iter()
            .next()
            .unwrap_or_else(|| panic!("no primary button labelled {label:?}"));
        let action = self.surface.action_of(node).unwrap();
        self.app.dispatch(action).await;
    }

    /// Types into the input field called `name`.
    pub fn type_into(&self, name: &str, value: &str) {
        let node = self
            .surface
            .find(|w| {
                matches!(&w.kind, tictactoe_webapp::view::WidgetKind::Input { name: n, .. } if n == name)
            })
            .into_iter()
            .next()
            .unwrap_or_else(|| panic!("no input named {name:?}"));
        self.surface
            .set_value(self.surface.generation(), node, value);
    }

    /// Text of the banner currently showing, if any.
    pub fn banner_text(&self) -> Option<String> {
        self.surface
            .find_by_class("banner")
            .into_iter()
            .next()
            .and_then(|node| self.surface.text_of(node))
    }
}

/// `/viewGame` payload.
pub fn snapshot(
    game_id: &str,
    moves: &[(u8, &str)],
    attacker: Option<&str>,
    finished: bool,
    winner: Option<&str>,
) -> Value {
    let moves: Vec<Value> = moves
        .iter()
        .enumerate()
        .map(|(i, (position, player))| {
            json!({
                "gameId": game_id,
                "moveIndex": i,
                "movePosition": position,
                "player": player,
            })
        })
        .collect();
    json!({
        "moves": moves,
        "players": {"attacker": attacker, "defender": "bot"},
        "gameState": {"finished": finished, "draw": false, "winner": winner},
    })
}
