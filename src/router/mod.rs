//! URL router: states, history and the application context.

mod app;
mod frame;
mod history;
mod state;

pub use app::{App, AppBuilder, Resolution, RouterPhase};
pub use history::{History, HistoryEntry, MemoryHistory, join_url};
pub use state::{CanonicalFn, ErrorOptions, RenderFn, State, StateId, UrlMatcher};

/// Path part of a location, without query or fragment.
pub fn route_path(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    &location[..end]
}

#[cfg(test)]
mod tests {
    use super::route_path;

    #[test]
    fn test_route_path_strips_query_and_fragment() {
        assert_eq!(route_path("/games?page=2"), "/games");
        assert_eq!(route_path("/users/alice#top"), "/users/alice");
        assert_eq!(route_path("/"), "/");
    }
}
