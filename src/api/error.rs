//! Clinic API error types and server error-body parsing.

use serde_json::Value;

/// Validation messages the server attached to one request field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub messages: Vec<String>,
}

/// Errors from calls to the clinic API.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("Clinic API is not reachable at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Server returned error (status {status}): {}", .message.as_deref().unwrap_or("no details"))]
    Server {
        status: u16,
        message: Option<String>,
        field_errors: Vec<FieldError>,
    },

    #[error("Response parsing error: {0}")]
    Decode(String),

    #[error("HTTP client error: {0}")]
    Http(String),
}

impl ApiError {
    /// Build a `Server` error from a non-2xx status and its raw body.
    ///
    /// Understands `{"error": ".."}`, `{"detail": ".."}` and field maps of the
    /// form `{"dosage": ["This field is required."]}`. Anything else yields
    /// an error without a message.
    pub fn from_response(status: u16, body: &str) -> Self {
        let mut message = None;
        let mut field_errors = Vec::new();

        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
            for (key, value) in map {
                let is_message_key = matches!(key.as_str(), "error" | "detail" | "message");
                match value {
                    Value::String(s) if is_message_key => {
                        if message.is_none() {
                            message = Some(s);
                        }
                    }
                    Value::Array(items) => {
                        let messages: Vec<String> = items
                            .into_iter()
                            .filter_map(|v| match v {
                                Value::String(s) => Some(s),
                                _ => None,
                            })
                            .collect();
                        if !messages.is_empty() {
                            field_errors.push(FieldError {
                                field: key,
                                messages,
                            });
                        }
                    }
                    Value::String(s) => field_errors.push(FieldError {
                        field: key,
                        messages: vec![s],
                    }),
                    _ => {}
                }
            }
        } else if !body.is_empty() {
            tracing::debug!(status, "Non-JSON error body from clinic API");
        }

        ApiError::Server {
            status,
            message,
            field_errors,
        }
    }

    /// Server-supplied message, if the server gave one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Field errors flattened to `"field: msg msg; field: msg"`.
    pub fn joined_field_errors(&self) -> Option<String> {
        match self {
            ApiError::Server { field_errors, .. } if !field_errors.is_empty() => Some(
                field_errors
                    .iter()
                    .map(|fe| format!("{}: {}", fe.field, fe.messages.join(" ")))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_key_becomes_message() {
        let err = ApiError::from_response(404, r#"{"error": "Patient not found"}"#);
        assert_eq!(err.server_message(), Some("Patient not found"));
        assert!(err.joined_field_errors().is_none());
        assert_eq!(
            err.to_string(),
            "Server returned error (status 404): Patient not found"
        );
    }

    #[test]
    fn detail_key_becomes_message() {
        let err = ApiError::from_response(403, r#"{"detail": "Not allowed"}"#);
        assert_eq!(err.server_message(), Some("Not allowed"));
    }

    #[test]
    fn field_maps_are_joined_per_field() {
        let err = ApiError::from_response(
            400,
            r#"{"dosage": ["This field is required."], "quantity": ["Must be positive.", "Too large."]}"#,
        );
        assert!(err.server_message().is_none());
        let joined = err.joined_field_errors().unwrap();
        assert!(joined.contains("dosage: This field is required."));
        assert!(joined.contains("quantity: Must be positive. Too large."));
        assert!(joined.contains("; "));
    }

    #[test]
    fn non_json_body_has_no_message() {
        let err = ApiError::from_response(502, "<html>Bad gateway</html>");
        assert!(err.server_message().is_none());
        assert_eq!(err.to_string(), "Server returned error (status 502): no details");
    }

    #[test]
    fn transport_errors_have_no_server_message() {
        assert!(ApiError::Timeout(30).server_message().is_none());
        assert!(ApiError::Connection("http://x".into())
            .joined_field_errors()
            .is_none());
    }
}
