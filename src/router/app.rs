//! Application context: state registry, navigation, API access and
//! credentials.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use derive_setters::Setters;
use futures::FutureExt;
use futures::future::BoxFuture;
use strum::Display;
use tracing::{debug, error, info, instrument, trace, warn};

use super::{
    ErrorOptions, History, HistoryEntry, MemoryHistory, State, StateId, join_url, route_path,
};
use crate::api::{ApiResponse, Form, HttpTransport, Transport, paths};
use crate::auth::{Authenticator, Blake3Deriver, CredentialStorage, Credentials, KeyDeriver, MemoryStorage};
use crate::config::AppConfig;
use crate::game::TicTacToeGame;
use crate::view::{Action, BannerKind, MemorySurface, Surface};

/// Where the router is in a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RouterPhase {
    /// Nothing resolved yet.
    Uninitialized,
    /// Picking the state for a location.
    Resolving,
    /// A state's render function is running.
    Rendering,
    /// Render finished; async work may still update the screen.
    Idle,
}

/// Outcome of [`App::resolve`].
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Selected state.
    pub state: Arc<State>,
    /// Capture groups of the match; empty for literal hits and the fallback.
    pub captures: Vec<String>,
}

#[derive(Debug, Default)]
struct GameSlot {
    engine: Option<TicTacToeGame>,
    authenticator: Option<Authenticator>,
}

#[derive(Debug)]
struct AppInner {
    config: AppConfig,
    registry: Mutex<Vec<Arc<State>>>,
    not_found: Mutex<Option<StateId>>,
    history: Arc<dyn History>,
    surface: Arc<dyn Surface>,
    transport: Arc<dyn Transport>,
    storage: Arc<dyn CredentialStorage>,
    deriver: Arc<dyn KeyDeriver>,
    games: Mutex<HashMap<String, GameSlot>>,
    version: Mutex<Option<String>>,
    phase: Mutex<RouterPhase>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Collaborators for [`App::builder`]; unset ones get in-memory or
/// configured defaults.
#[derive(Debug, Default, Setters)]
#[setters(prefix = "with_", strip_option)]
pub struct AppBuilder {
    #[setters(skip)]
    config: AppConfig,
    transport: Option<Arc<dyn Transport>>,
    surface: Option<Arc<dyn Surface>>,
    history: Option<Arc<dyn History>>,
    storage: Option<Arc<dyn CredentialStorage>>,
    deriver: Option<Arc<dyn KeyDeriver>>,
}

impl AppBuilder {
    /// Assembles the application context.
    #[instrument(skip(self), fields(server_url = %self.config.server_url()))]
    pub fn build(self) -> App {
        let config = self.config;
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::new(config.server_url().clone())));
        let history = self
            .history
            .unwrap_or_else(|| Arc::new(MemoryHistory::new(config.start_url().clone())));
        App {
            inner: Arc::new(AppInner {
                registry: Mutex::new(Vec::new()),
                not_found: Mutex::new(None),
                history,
                surface: self.surface.unwrap_or_else(|| Arc::new(MemorySurface::new())),
                transport,
                storage: self.storage.unwrap_or_else(|| Arc::new(MemoryStorage::new())),
                deriver: self.deriver.unwrap_or_else(|| Arc::new(Blake3Deriver)),
                games: Mutex::new(HashMap::new()),
                version: Mutex::new(None),
                phase: Mutex::new(RouterPhase::Uninitialized),
                config,
            }),
        }
    }
}

/// Explicit application context.
///
/// Constructed once at startup and handed to every state and game engine.
/// Cloning is cheap and all clones share one context.
#[derive(Debug, Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

impl App {
    /// Starts building a context for `config`.
    pub fn builder(config: AppConfig) -> AppBuilder {
        AppBuilder {
            config,
            ..AppBuilder::default()
        }
    }

    /// Configuration.
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Rendering surface.
    pub fn surface(&self) -> Arc<dyn Surface> {
        self.inner.surface.clone()
    }

    /// Session history.
    pub fn history(&self) -> Arc<dyn History> {
        self.inner.history.clone()
    }

    /// Password key derivation used by login and signup.
    pub fn key_deriver(&self) -> Arc<dyn KeyDeriver> {
        self.inner.deriver.clone()
    }

    /// Identity of the automated opponent.
    pub fn automated_opponent(&self) -> &str {
        self.inner.config.automated_opponent()
    }

    /// Current navigation phase.
    pub fn phase(&self) -> RouterPhase {
        *lock(&self.inner.phase)
    }

    fn set_phase(&self, phase: RouterPhase) {
        let mut current = lock(&self.inner.phase);
        trace!(from = %*current, to = %phase, "Router phase");
        *current = phase;
    }

    // ─────────────────────────────────────────────────────────────
    // Registry
    // ─────────────────────────────────────────────────────────────

    /// Adds `state`, replacing a state registered earlier under the same id
    /// at its original position.
    #[instrument(skip(self, state), fields(state = %state.id()))]
    pub fn register(&self, state: State) -> Arc<State> {
        let state = Arc::new(state);
        let mut registry = lock(&self.inner.registry);
        match registry.iter_mut().find(|s| s.id() == state.id()) {
            Some(slot) => {
                debug!("Replacing registered state");
                *slot = state.clone();
            }
            None => registry.push(state.clone()),
        }
        state
    }

    /// Registers the state selected when no other state claims a URL.
    pub fn register_not_found(&self, state: State) -> Arc<State> {
        let state = self.register(state);
        *lock(&self.inner.not_found) = Some(state.id().clone());
        state
    }

    /// Looks up a registered state.
    pub fn state(&self, id: &StateId) -> Option<Arc<State>> {
        lock(&self.inner.registry)
            .iter()
            .find(|s| s.id() == id)
            .cloned()
    }

    /// State of the current history entry.
    pub fn current_state(&self) -> Option<Arc<State>> {
        let entry = self.inner.history.current()?;
        self.state(&entry.state_id)
    }

    /// Picks the state for `url` (or the current location).
    ///
    /// The first state in registration order that claims the path wins;
    /// otherwise the not-found state. Pure: nothing is recorded.
    #[instrument(skip(self))]
    pub fn resolve(&self, url: Option<&str>) -> Option<Resolution> {
        let location = match url {
            Some(url) => url.to_string(),
            None => self.inner.history.location(),
        };
        let path = route_path(&location);
        let registry = lock(&self.inner.registry);
        if let Some((state, captures)) = registry
            .iter()
            .find_map(|s| s.matches(path).map(|caps| (s.clone(), caps)))
        {
            debug!(state = %state.id(), ?captures, "Resolved");
            return Some(Resolution { state, captures });
        }
        let fallback = lock(&self.inner.not_found).clone()?;
        let state = registry.iter().find(|s| *s.id() == fallback)?.clone();
        debug!(state = %state.id(), "No state claims the path, using fallback");
        Some(Resolution {
            state,
            captures: Vec::new(),
        })
    }

    // ─────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────

    /// First load: resolves the current location, records it without
    /// adding a history entry and renders.
    #[instrument(skip(self))]
    pub async fn start(&self) {
        self.set_phase(RouterPhase::Resolving);
        let location = self.inner.history.location();
        let Some(resolution) = self.resolve(Some(&location)) else {
            warn!(location = %location, "No state to start with");
            self.set_phase(RouterPhase::Idle);
            return;
        };
        let state = resolution.state;
        state.set_last_match(resolution.captures);
        self.inner.history.replace(HistoryEntry::new(
            state.id().clone(),
            state.title().to_string(),
            location,
        ));
        self.inner.history.set_title(state.title());
        self.render().await;
    }

    /// Makes `id` current, pushes a history entry and renders.
    ///
    /// The entry's URL is `url` if given, else the state's canonical URL,
    /// else the current location; relative URLs resolve against the current
    /// location.
    #[instrument(skip(self))]
    pub async fn navigate(&self, id: &StateId, url: Option<&str>) {
        let Some(state) = self.state(id) else {
            warn!("Navigation to unregistered state ignored");
            return;
        };
        self.set_phase(RouterPhase::Resolving);
        let location = self.inner.history.location();
        let url = url
            .map(str::to_string)
            .or_else(|| state.canonical_url())
            .unwrap_or_else(|| location.clone());
        let url = join_url(&location, &url);
        info!(state = %state.id(), url = %url, "Navigating");
        self.inner.history.push(HistoryEntry::new(
            state.id().clone(),
            state.title().to_string(),
            url,
        ));
        self.inner.history.set_title(state.title());
        self.render().await;
    }

    /// Resolves `url` and navigates to whatever claims it.
    #[instrument(skip(self))]
    pub async fn navigate_to_url(&self, url: &str) {
        let location = self.inner.history.location();
        let url = join_url(&location, url);
        let Some(resolution) = self.resolve(Some(&url)) else {
            warn!("Nothing to navigate to");
            return;
        };
        resolution.state.set_last_match(resolution.captures);
        self.navigate(resolution.state.id(), Some(&url)).await;
    }

    /// Rewrites the current history entry without rendering.
    #[instrument(skip(self))]
    pub fn replace_location(&self, id: &StateId, url: &str, captures: Vec<String>) {
        let Some(state) = self.state(id) else {
            warn!("Cannot replace location with unregistered state");
            return;
        };
        let url = join_url(&self.inner.history.location(), url);
        state.set_last_match(captures);
        if let Some(previous) = self.current_state() {
            state.adopt_notices(&previous);
        }
        self.inner.history.replace(HistoryEntry::new(
            state.id().clone(),
            state.title().to_string(),
            url,
        ));
    }

    /// Activates the state of the current history entry.
    ///
    /// Logs and renders nothing when the entry is missing or names an
    /// unregistered state.
    pub fn render(&self) -> BoxFuture<'static, ()> {
        let app = self.clone();
        async move {
            app.set_phase(RouterPhase::Rendering);
            let Some(entry) = app.inner.history.current() else {
                warn!("No history entry to render");
                app.inner.surface.clear();
                app.set_phase(RouterPhase::Idle);
                return;
            };
            let Some(state) = app.state(&entry.state_id) else {
                warn!(state = %entry.state_id, "No state found to render");
                app.inner.surface.clear();
                app.set_phase(RouterPhase::Idle);
                return;
            };
            state.activate(app.clone(), &entry.url).await;
            app.set_phase(RouterPhase::Idle);
        }
        .boxed()
    }

    /// Re-renders after the history moved.
    #[instrument(skip(self))]
    pub async fn on_pop(&self) {
        self.set_phase(RouterPhase::Resolving);
        self.render().await;
    }

    /// History back.
    pub async fn back(&self) {
        if self.inner.history.back() {
            self.on_pop().await;
        }
    }

    /// History forward.
    pub async fn forward(&self) {
        if self.inner.history.forward() {
            self.on_pop().await;
        }
    }

    /// Runs a widget action.
    #[instrument(skip(self))]
    pub async fn dispatch(&self, action: Action) {
        match action {
            Action::NavigateTo(id) => self.navigate(&id, None).await,
            Action::Invoke(callback) => callback.invoke().await,
            Action::NavigateToUrl(url) => self.navigate_to_url(&url).await,
            Action::Disabled => trace!("Disabled action ignored"),
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Banners
    // ─────────────────────────────────────────────────────────────

    /// Shows an error banner on the current state.
    pub fn show_error(&self, text: &str, options: ErrorOptions) {
        match self.current_state() {
            Some(state) => state.report(BannerKind::Error, text, options),
            None => warn!(text, "No current state for error banner"),
        }
    }

    /// Shows an informational banner on the current state.
    pub fn show_info(&self, text: &str) {
        match self.current_state() {
            Some(state) => state.report(BannerKind::Info, text, ErrorOptions::acknowledge()),
            None => warn!(text, "No current state for info banner"),
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Backend
    // ─────────────────────────────────────────────────────────────

    /// POSTs to the backend.
    ///
    /// Never fails: transport errors come back as a failed envelope.
    /// With `attach_token`, the current bearer token is sent if there is one.
    #[instrument(skip(self, form), fields(fields = form.pairs().len()))]
    pub async fn api(&self, path: &str, form: Form, attach_token: bool) -> ApiResponse {
        let token = if attach_token {
            self.credentials().map(|c| c.token)
        } else {
            None
        };
        match self.inner.transport.post(path, &form, token.as_deref()).await {
            Ok(response) => {
                if !response.success {
                    debug!(error = %response.error_message(), "Request rejected");
                }
                response
            }
            Err(e) => {
                warn!(error = %e, "Request failed");
                ApiResponse::transport_failure(e.message)
            }
        }
    }

    /// POSTs with parameters produced by `authenticator`.
    pub async fn api_as(&self, authenticator: &Authenticator, path: &str, form: Form) -> ApiResponse {
        let request = authenticator.authenticate(path, form);
        self.api(&request.path, request.form, request.attach_token).await
    }

    /// Cached deployed build identifier.
    pub fn cached_version_hash(&self) -> Option<String> {
        lock(&self.inner.version).clone()
    }

    /// Deployed build identifier, asked from the server once.
    #[instrument(skip(self))]
    pub async fn version_hash(&self) -> Option<String> {
        if let Some(hash) = self.cached_version_hash() {
            return Some(hash);
        }
        let response = self.api(paths::VERSION, Form::new(), false).await;
        match response.data_as::<String>() {
            Ok(hash) => {
                *lock(&self.inner.version) = Some(hash.clone());
                Some(hash)
            }
            Err(e) => {
                debug!(error = %e, "Version unavailable");
                None
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Credentials
    // ─────────────────────────────────────────────────────────────

    /// Credentials from durable storage, absent when incomplete or expired.
    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::load(&*self.inner.storage, chrono::Utc::now().timestamp())
    }

    /// Persists or clears credentials.
    ///
    /// Setting them also starts a background check that signs out if the
    /// server no longer recognizes the token.
    #[instrument(skip(self, credentials), fields(signed_in = credentials.is_some()))]
    pub fn set_credentials(&self, credentials: Option<Credentials>) {
        match credentials {
            Some(credentials) => {
                if let Err(e) = credentials.store(&*self.inner.storage) {
                    error!(error = %e, "Failed to persist credentials");
                    return;
                }
                info!(username = %credentials.username, "Signed in");
                match tokio::runtime::Handle::try_current() {
                    Ok(handle) => {
                        let app = self.clone();
                        handle.spawn(async move {
                            app.check_credentials().await;
                        });
                    }
                    Err(_) => debug!("No runtime, skipping credential check"),
                }
            }
            None => {
                if let Err(e) = Credentials::clear(&*self.inner.storage) {
                    error!(error = %e, "Failed to clear credentials");
                }
            }
        }
    }

    /// Asks the server whether the held token is still valid; signs out if
    /// it says no. Transport failures keep the credentials.
    pub fn check_credentials(&self) -> BoxFuture<'static, bool> {
        let app = self.clone();
        async move {
            if app.credentials().is_none() {
                return false;
            }
            let response = app.api(paths::CHECK_CREDENTIALS, Form::new(), true).await;
            if response.success {
                debug!("Credentials confirmed");
                return true;
            }
            if response.is_transport_failure() {
                warn!("Could not verify credentials, keeping them");
                return true;
            }
            info!(error = %response.error_message(), "Server rejected credentials");
            app.sign_out().await;
            false
        }
        .boxed()
    }

    /// Clears credentials, goes home and says so.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) {
        self.set_credentials(None);
        self.navigate_to_url("/").await;
        self.show_info("You have been signed out.");
    }

    // ─────────────────────────────────────────────────────────────
    // Game arena
    // ─────────────────────────────────────────────────────────────

    /// Keeps `engine` addressable by its game id, replacing any earlier
    /// engine for that game.
    ///
    /// Engines whose screen was replaced are dropped on the way; remembered
    /// authenticators stay so a guest can return to their game.
    pub fn insert_game(&self, engine: TicTacToeGame) {
        let id = engine.game_id().to_string();
        let mut games = lock(&self.inner.games);
        games.retain(|game_id, slot| {
            if slot.engine.as_ref().is_some_and(TicTacToeGame::is_detached) {
                trace!(%game_id, "Dropping engine of a left screen");
                slot.engine = None;
            }
            slot.engine.is_some() || slot.authenticator.is_some()
        });
        games.entry(id).or_default().engine = Some(engine);
    }

    /// Number of games holding a live engine.
    pub fn live_games(&self) -> usize {
        lock(&self.inner.games)
            .values()
            .filter(|slot| slot.engine.is_some())
            .count()
    }

    /// Engine bound to `game_id`.
    pub fn game(&self, game_id: &str) -> Option<TicTacToeGame> {
        lock(&self.inner.games)
            .get(game_id)
            .and_then(|slot| slot.engine.clone())
    }

    /// Remembers the authenticator a game was created with.
    pub fn remember_authenticator(&self, game_id: &str, authenticator: Authenticator) {
        lock(&self.inner.games)
            .entry(game_id.to_string())
            .or_default()
            .authenticator = Some(authenticator);
    }

    /// Authenticator to play `game_id` with: the one it was created with, or
    /// the signed-in member.
    pub fn authenticator_for(&self, game_id: &str) -> Option<Authenticator> {
        let remembered = lock(&self.inner.games)
            .get(game_id)
            .and_then(|slot| slot.authenticator.clone());
        remembered.or_else(|| self.credentials().map(|c| Authenticator::from_credentials(&c)))
    }
}
