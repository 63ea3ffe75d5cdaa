//! Helpers shared by the screen builders.

use crate::api::ApiResponse;
use crate::router::{App, ErrorOptions};
use crate::view::{Callback, Screen, Widget};

/// Adds a card to `screen` and returns a screen appending into it.
pub(super) fn tile(screen: &Screen) -> Option<Screen> {
    screen.add(Widget::tile([])).map(|node| screen.within(node))
}

/// First capture group of the current state.
pub(super) fn first_capture(app: &App) -> Option<String> {
    app.current_state()
        .and_then(|state| state.last_match().into_iter().next())
}

/// Narrowest recovery for a failed request: retry when the request never
/// got an answer, a plain acknowledgement when the server said no.
pub(super) fn recovery(response: &ApiResponse, retry: Callback) -> ErrorOptions {
    if response.is_transport_failure() {
        ErrorOptions::retry_with(retry).with_ok(true)
    } else {
        ErrorOptions::acknowledge()
    }
}

/// Reports a failed request, unless `screen` was replaced meanwhile.
pub(super) fn report_failure(
    screen: &Screen,
    app: &App,
    what: &str,
    response: &ApiResponse,
    retry: Callback,
) {
    if !screen.is_attached() {
        return;
    }
    let text = format!("{}: {}", what, response.error_message());
    app.show_error(&text, recovery(response, retry));
}
