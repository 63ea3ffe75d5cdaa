//! Request payloads and the `{success, data, error}` response envelope.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::{ApiError, ApiErrorKind};

/// Ordered form-encoded payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Form(Vec<(String, String)>);

impl Form {
    /// Creates an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field, replacing an earlier field of the same name.
    pub fn field(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a field in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl ToString) {
        let name = name.into();
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Looks up a field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Field pairs in insertion order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Uniform response envelope.
///
/// Transport failures are folded into the same shape (`success: false`) so
/// callers only ever inspect one kind of value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Whether the server accepted the request.
    #[serde(default)]
    pub success: bool,
    /// Payload on success.
    #[serde(default)]
    pub data: Option<Value>,
    /// Server-supplied failure description.
    #[serde(default)]
    pub error: Option<Value>,
    /// Set locally when no envelope was received at all.
    #[serde(skip)]
    transport_failure: bool,
}

impl ApiResponse {
    /// Successful envelope carrying `data`.
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            ..Self::default()
        }
    }

    /// Semantic failure with a server message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(Value::String(message.into())),
            ..Self::default()
        }
    }

    /// Failure produced locally because the request never completed.
    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self {
            transport_failure: true,
            ..Self::rejected(message)
        }
    }

    /// True when the request never reached a server verdict.
    pub fn is_transport_failure(&self) -> bool {
        self.transport_failure
    }

    /// Human readable failure text.
    pub fn error_message(&self) -> String {
        match &self.error {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Object(map)) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(map.clone()).to_string()),
            Some(other) => other.to_string(),
            None => "unknown error".to_string(),
        }
    }

    /// Decodes `data` into `T`, turning failures into an [`ApiError`].
    #[instrument(skip(self), fields(success = self.success))]
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        if !self.success {
            let kind = if self.transport_failure {
                ApiErrorKind::Transport
            } else {
                ApiErrorKind::Rejected
            };
            return Err(ApiError::new(kind, self.error_message()));
        }
        let data = self.data.clone().unwrap_or(Value::Null);
        Ok(serde_json::from_value(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_form_replaces_duplicate_fields() {
        let form = Form::new().field("gameId", 7).field("gameId", 8);
        assert_eq!(form.pairs().len(), 1);
        assert_eq!(form.get("gameId"), Some("8"));
    }

    #[test]
    fn test_missing_fields_default_to_failure() {
        let response: ApiResponse = serde_json::from_value(json!({})).unwrap();
        assert!(!response.success);
        assert!(!response.is_transport_failure());
    }

    #[test]
    fn test_data_as_reports_kind() {
        let err = ApiResponse::transport_failure("offline")
            .data_as::<String>()
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Transport);

        let err = ApiResponse::rejected("nope").data_as::<String>().unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Rejected);
        assert_eq!(err.message, "nope");

        let err = ApiResponse::ok(json!(5)).data_as::<String>().unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Decode);
    }

    #[test]
    fn test_error_message_from_object() {
        let response = ApiResponse {
            error: Some(json!({"message": "token expired"})),
            ..ApiResponse::default()
        };
        assert_eq!(response.error_message(), "token expired");
    }
}
