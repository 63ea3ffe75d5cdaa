//! HTTP transport to the game backend.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::{ApiResponse, Form};
use crate::{ApiError, ApiErrorKind};

/// Carries a form POST to the backend and returns its envelope.
///
/// Implementations return `Err` only when no envelope was obtained; the
/// router folds that into [`ApiResponse::transport_failure`].
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// POSTs `form` to `path`, attaching `bearer` as a bearer token if given.
    async fn post(
        &self,
        path: &str,
        form: &Form,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, ApiError>;
}

/// [`Transport`] over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport rooted at `base_url`.
    #[instrument]
    pub fn new(base_url: impl Into<String> + std::fmt::Debug) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, form, bearer), fields(base_url = %self.base_url, fields = form.pairs().len()))]
    async fn post(
        &self,
        path: &str,
        form: &Form,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(path);
        debug!(url = %url, with_token = bearer.is_some(), "Sending request");

        let mut request = self.client.post(&url).form(form.pairs());
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, url = %url, "Backend answered with an error status");
            return Err(ApiError::new(
                ApiErrorKind::Transport,
                status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| status.to_string()),
            ));
        }

        let body = response.text().await?;
        if body.trim().is_empty() || body.trim() == "null" {
            debug!("Empty body, treating as empty envelope");
            return Ok(ApiResponse::default());
        }
        let envelope: ApiResponse = serde_json::from_str(&body)?;
        debug!(success = envelope.success, "Received envelope");
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let transport = HttpTransport::new("http://localhost:5000/");
        assert_eq!(transport.url_for("/viewGame"), "http://localhost:5000/viewGame");
        assert_eq!(transport.url_for("users/alice"), "http://localhost:5000/users/alice");
    }
}
