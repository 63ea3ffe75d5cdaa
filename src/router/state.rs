//! Addressable screens.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use derive_more::Display;
use derive_setters::Setters;
use futures::FutureExt;
use futures::future::BoxFuture;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use super::{App, frame};
use crate::RouterError;
use crate::view::{Action, BannerKind, Callback, NodeId, Screen, Widget, WidgetKind};

/// Stable identity of a [`State`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub struct StateId(String);

impl StateId {
    /// Creates an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StateId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// How a state claims URLs.
#[derive(Debug, Clone)]
pub enum UrlMatcher {
    /// Exact string equality.
    Literal(String),
    /// Regular expression; capture groups are recorded on a match.
    Pattern(Regex),
}

impl UrlMatcher {
    /// Capture groups when `path` matches; empty for a literal hit.
    pub fn captures(&self, path: &str) -> Option<Vec<String>> {
        match self {
            Self::Literal(url) => (url == path).then(Vec::new),
            Self::Pattern(re) => re.captures(path).map(|caps| {
                caps.iter()
                    .skip(1)
                    .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect()
            }),
        }
    }
}

/// Actions offered by a banner.
///
/// Buttons appear as retry, ok, cancel, and only when set.
#[derive(Debug, Clone, Default, Setters)]
#[setters(prefix = "with_", strip_option)]
pub struct ErrorOptions {
    /// Re-runs the failed operation.
    pub retry: Option<Callback>,
    /// Plain acknowledgement.
    pub ok: bool,
    /// Backs out of the failed operation.
    pub cancel: Option<Callback>,
}

impl ErrorOptions {
    /// Only an "ok" button.
    pub fn acknowledge() -> Self {
        Self::default().with_ok(true)
    }

    /// Only a "retry" button.
    pub fn retry_with(retry: Callback) -> Self {
        Self::default().with_retry(retry)
    }

    /// True when the banner offers no action.
    pub fn is_empty(&self) -> bool {
        self.retry.is_none() && !self.ok && self.cancel.is_none()
    }
}

/// Render procedure of a state.
pub type RenderFn = Arc<dyn Fn(Screen, App) -> BoxFuture<'static, ()> + Send + Sync>;

/// Computes a canonical URL from the last capture groups.
pub type CanonicalFn = Arc<dyn Fn(&[String]) -> Option<String> + Send + Sync>;

/// A named, URL-addressable screen.
pub struct State {
    id: StateId,
    title: String,
    matcher: Option<UrlMatcher>,
    canonical: Option<CanonicalFn>,
    render: RenderFn,
    last_match: Mutex<Vec<String>>,
    notices: Mutex<Option<Screen>>,
    banner: Mutex<Option<NodeId>>,
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("matcher", &self.matcher)
            .field("last_match", &*lock(&self.last_match))
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl State {
    /// Creates a state that matches no URL until given one.
    pub fn new<F, Fut>(id: impl Into<StateId>, title: impl Into<String>, render: F) -> Self
    where
        F: Fn(Screen, App) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            id: id.into(),
            title: title.into(),
            matcher: None,
            canonical: None,
            render: Arc::new(move |screen, app| render(screen, app).boxed()),
            last_match: Mutex::new(Vec::new()),
            notices: Mutex::new(None),
            banner: Mutex::new(None),
        }
    }

    /// Matches `url` exactly.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.matcher = Some(UrlMatcher::Literal(url.into()));
        self
    }

    /// Matches URLs against `pattern`.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, RouterError> {
        self.matcher = Some(UrlMatcher::Pattern(Regex::new(pattern)?));
        Ok(self)
    }

    /// Reports its own canonical URL derived from the last capture groups.
    pub fn with_canonical<F>(mut self, getter: F) -> Self
    where
        F: Fn(&[String]) -> Option<String> + Send + Sync + 'static,
    {
        self.canonical = Some(Arc::new(getter));
        self
    }

    /// Identity.
    pub fn id(&self) -> &StateId {
        &self.id
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// How this state claims URLs.
    pub fn matcher(&self) -> Option<&UrlMatcher> {
        self.matcher.as_ref()
    }

    /// Literal URL, if this state has one.
    pub fn url(&self) -> Option<&str> {
        match &self.matcher {
            Some(UrlMatcher::Literal(url)) => Some(url),
            _ => None,
        }
    }

    /// Capture groups when this state claims `path`.
    pub fn matches(&self, path: &str) -> Option<Vec<String>> {
        self.matcher.as_ref().and_then(|m| m.captures(path))
    }

    /// Capture groups of the most recent resolution.
    pub fn last_match(&self) -> Vec<String> {
        lock(&self.last_match).clone()
    }

    /// Records capture groups.
    pub fn set_last_match(&self, captures: Vec<String>) {
        *lock(&self.last_match) = captures;
    }

    /// URL this state reports for its history entry: the capture-derived
    /// URL if it has a getter, otherwise its literal URL.
    pub fn canonical_url(&self) -> Option<String> {
        match &self.canonical {
            Some(getter) => getter(&self.last_match()),
            None => self.url().map(str::to_string),
        }
    }

    /// Becomes the visible screen.
    ///
    /// Refreshes the capture groups against `location`, clears the surface,
    /// drops the banner of any earlier activation and runs the render
    /// function inside the page frame.
    #[instrument(skip(self, app), fields(state = %self.id))]
    pub async fn activate(self: &Arc<Self>, app: App, location: &str) {
        let path = super::route_path(location);
        self.set_last_match(self.matches(path).unwrap_or_default());

        let surface = app.surface();
        surface.clear();
        let screen = Screen::current(surface);
        *lock(&self.banner) = None;

        info!(title = %self.title, "Rendering state");
        let frame = frame::build(&screen, &app);
        *lock(&self.notices) = frame.notices.map(|node| screen.within(node));

        let body = match frame.main {
            Some(main) => screen.within(main),
            None => screen.clone(),
        };
        (self.render)(body, app.clone()).await;
        frame::fill_footer(&screen, frame.version, &app).await;
    }

    /// Shows a banner, replacing any banner already on this screen.
    ///
    /// Each offered button dismisses the banner before running its action.
    /// Ignored once the screen has been replaced by a later render.
    #[instrument(skip(self, options), fields(state = %self.id))]
    pub fn report(self: &Arc<Self>, kind: BannerKind, text: &str, options: ErrorOptions) {
        let Some(notices) = lock(&self.notices).clone() else {
            warn!("State was never activated, dropping banner");
            return;
        };
        if !notices.is_attached() {
            debug!("Banner for a detached screen dropped");
            return;
        }
        self.dismiss();

        let mut buttons = Vec::new();
        if let Some(retry) = options.retry {
            buttons.push(self.banner_button("Retry", Some(retry)));
        }
        if options.ok {
            buttons.push(self.banner_button("OK", None));
        }
        if let Some(cancel) = options.cancel {
            buttons.push(self.banner_button("Cancel", Some(cancel)));
        }

        let class = match kind {
            BannerKind::Error => "error",
            BannerKind::Info => "info",
        };
        let banner = Widget::new(WidgetKind::Banner(kind))
            .with_text(text)
            .class("banner")
            .class(class)
            .with_children(buttons);
        *lock(&self.banner) = notices.add(banner);
    }

    /// Removes the banner, if one is showing.
    pub fn dismiss(&self) {
        let node = lock(&self.banner).take();
        let notices = lock(&self.notices).clone();
        if let (Some(node), Some(notices)) = (node, notices) {
            notices.remove(node);
        }
    }

    /// Takes over the banner slot of `previous`, whose render is still on
    /// the surface. Used when the history entry is rewritten in place.
    pub fn adopt_notices(&self, previous: &State) {
        if std::ptr::eq(self, previous) {
            return;
        }
        let notices = lock(&previous.notices).take();
        let banner = lock(&previous.banner).take();
        *lock(&self.notices) = notices;
        *lock(&self.banner) = banner;
    }

    /// Banner currently showing on this screen.
    pub fn banner(&self) -> Option<NodeId> {
        *lock(&self.banner)
    }

    fn banner_button(self: &Arc<Self>, label: &str, then: Option<Callback>) -> Widget {
        let state = Arc::clone(self);
        Widget::button(
            label,
            Action::invoke(move || {
                let state = state.clone();
                let then = then.clone();
                async move {
                    state.dismiss();
                    if let Some(action) = then {
                        action.invoke().await;
                    }
                }
            }),
        )
    }
}
