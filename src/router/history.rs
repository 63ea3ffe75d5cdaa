//! Session history: entries, location and document title.

use std::sync::{Mutex, MutexGuard};

use derive_new::new;
use tracing::{debug, instrument};

use super::StateId;

/// One history entry.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct HistoryEntry {
    /// State shown for this entry.
    pub state_id: StateId,
    /// Title at the time of the push.
    pub title: String,
    /// Location of the entry.
    pub url: String,
}

/// Browser-style session history.
pub trait History: Send + Sync + std::fmt::Debug {
    /// Adds an entry after the current one, dropping any forward entries.
    fn push(&self, entry: HistoryEntry);
    /// Overwrites the current entry.
    fn replace(&self, entry: HistoryEntry);
    /// Current entry, if any.
    fn current(&self) -> Option<HistoryEntry>;
    /// Current location.
    fn location(&self) -> String;
    /// Steps back; false at the first entry.
    fn back(&self) -> bool;
    /// Steps forward; false at the last entry.
    fn forward(&self) -> bool;
    /// Sets the document title.
    fn set_title(&self, title: &str);
    /// Document title.
    fn title(&self) -> String;
}

#[derive(Debug)]
struct Timeline {
    entries: Vec<HistoryEntry>,
    index: usize,
    initial_location: String,
    title: String,
}

/// [`History`] kept in memory.
#[derive(Debug)]
pub struct MemoryHistory {
    timeline: Mutex<Timeline>,
}

impl MemoryHistory {
    /// Starts at `location` with no entries.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            timeline: Mutex::new(Timeline {
                entries: Vec::new(),
                index: 0,
                initial_location: location.into(),
                title: String::new(),
            }),
        }
    }

    fn timeline(&self) -> MutexGuard<'_, Timeline> {
        self.timeline.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.timeline().entries.clone()
    }

    /// Position of the current entry.
    pub fn index(&self) -> usize {
        self.timeline().index
    }
}

impl History for MemoryHistory {
    #[instrument(skip(self), fields(state = %entry.state_id, url = %entry.url))]
    fn push(&self, entry: HistoryEntry) {
        let mut timeline = self.timeline();
        if !timeline.entries.is_empty() {
            let keep = timeline.index + 1;
            timeline.entries.truncate(keep);
        }
        timeline.entries.push(entry);
        timeline.index = timeline.entries.len() - 1;
        debug!(len = timeline.entries.len(), "History entry pushed");
    }

    #[instrument(skip(self), fields(state = %entry.state_id, url = %entry.url))]
    fn replace(&self, entry: HistoryEntry) {
        let mut timeline = self.timeline();
        let index = timeline.index;
        match timeline.entries.get_mut(index) {
            Some(slot) => *slot = entry,
            None => {
                timeline.entries.push(entry);
                timeline.index = 0;
            }
        }
    }

    fn current(&self) -> Option<HistoryEntry> {
        let timeline = self.timeline();
        timeline.entries.get(timeline.index).cloned()
    }

    fn location(&self) -> String {
        let timeline = self.timeline();
        timeline
            .entries
            .get(timeline.index)
            .map(|e| e.url.clone())
            .unwrap_or_else(|| timeline.initial_location.clone())
    }

    fn back(&self) -> bool {
        let mut timeline = self.timeline();
        if timeline.index == 0 || timeline.entries.is_empty() {
            return false;
        }
        timeline.index -= 1;
        true
    }

    fn forward(&self) -> bool {
        let mut timeline = self.timeline();
        if timeline.index + 1 >= timeline.entries.len() {
            return false;
        }
        timeline.index += 1;
        true
    }

    fn set_title(&self, title: &str) {
        self.timeline().title = title.to_string();
    }

    fn title(&self) -> String {
        self.timeline().title.clone()
    }
}

/// Resolves `url` against the directory of `base`.
///
/// Absolute paths and full URLs are returned unchanged, so `"7"` on
/// `/games/new` becomes `/games/7`.
pub fn join_url(base: &str, url: &str) -> String {
    if url.starts_with('/') || url.contains("://") {
        return url.to_string();
    }
    let base = super::route_path(base);
    match base.rfind('/') {
        Some(slash) => format!("{}{}", &base[..=slash], url),
        None => format!("/{}", url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, url: &str) -> HistoryEntry {
        HistoryEntry::new(StateId::from(id), id.to_string(), url.to_string())
    }

    #[test]
    fn test_push_drops_forward_entries() {
        let history = MemoryHistory::new("/");
        history.push(entry("home", "/"));
        history.push(entry("games", "/games"));
        history.push(entry("users", "/users"));
        assert!(history.back());
        assert!(history.back());
        history.push(entry("login", "/login"));
        let urls: Vec<_> = history.entries().into_iter().map(|e| e.url).collect();
        assert_eq!(urls, ["/", "/login"]);
        assert!(!history.forward());
    }

    #[test]
    fn test_back_and_forward_move_location() {
        let history = MemoryHistory::new("/start");
        assert_eq!(history.location(), "/start");
        assert!(!history.back());
        history.push(entry("home", "/"));
        history.push(entry("games", "/games"));
        assert!(history.back());
        assert_eq!(history.location(), "/");
        assert!(history.forward());
        assert_eq!(history.location(), "/games");
    }

    #[test]
    fn test_replace_on_empty_history_creates_entry() {
        let history = MemoryHistory::new("/games/7");
        history.replace(entry("game", "/games/7"));
        assert_eq!(history.entries().len(), 1);
        history.replace(entry("game", "/games/8"));
        assert_eq!(history.entries().len(), 1);
        assert_eq!(history.location(), "/games/8");
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("/games/new", "7"), "/games/7");
        assert_eq!(join_url("/games/new?x=1", "7"), "/games/7");
        assert_eq!(join_url("/games", "/users"), "/users");
        assert_eq!(join_url("", "7"), "/7");
    }
}
