use serde_json::Value;
use thiserror::Error;

/// Defines errors that can occur when talking to the pricing back end.
///
/// Token failures that the client recovers from (refresh, then one retry) are
/// never surfaced. What reaches the caller is either an ordinary failure to
/// display, or [`ClientError::SessionExpired`], after which the user has to
/// log in again.
///
/// # Example: Handling errors in a UI layer
///
/// ```ignore
/// match client.products().list().await {
///     Ok(products) => render(products),
///     Err(e) if e.is_session_expired() => navigate_to_login(),
///     Err(e) => show_message(e.server_message().unwrap_or_else(|| e.to_string())),
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Transport failure, no response was received. Never retried.
    #[error("HTTP request error: {0}")]
    Network(#[from] reqwest::Error),
    /// The server answered with a non-2xx status unrelated to token validity.
    ///
    /// `payload` is the server's body, unmodified: parsed JSON when it is
    /// JSON, otherwise the raw text as a JSON string.
    #[error("API error (HTTP {status_code}): {payload}")]
    Api {
        /// HTTP status code (e.g., 400, 404, 500)
        status_code: u16,
        /// Error body returned by the server
        payload: Value,
    },
    /// The server rejected the access token (`code == "token_not_valid"`).
    ///
    /// Only surfaced when the request was already retried once after a
    /// successful refresh and got rejected again.
    #[error("Access token rejected (HTTP {status_code})")]
    TokenInvalid {
        status_code: u16,
        payload: Value,
    },
    /// Refreshing the access token failed; the session has been cleared.
    #[error("Session expired, login required")]
    SessionExpired,
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// Reading or writing the persisted session failed.
    #[error("Session storage error: {0}")]
    Storage(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A session transition that the state machine does not allow.
    #[error("Invalid session transition: {0}")]
    InvalidState(String),
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl ClientError {
    /// Returns `true` when the caller must treat the user as logged out.
    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::SessionExpired)
    }

    /// HTTP status of the failed response, if a response was received.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Api { status_code, .. } | ClientError::TokenInvalid { status_code, .. } => {
                Some(*status_code)
            }
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Extracts a human-readable message from the server payload.
    ///
    /// The back end uses `detail` (framework errors), `error` (auth views) or
    /// `message` (custom actions). A bare string payload is returned as is.
    #[must_use]
    pub fn server_message(&self) -> Option<String> {
        let payload = match self {
            ClientError::Api { payload, .. } | ClientError::TokenInvalid { payload, .. } => payload,
            _ => return None,
        };

        if let Value::String(s) = payload {
            return Some(s.clone());
        }

        ["detail", "error", "message"]
            .iter()
            .find_map(|key| payload.get(key).and_then(Value::as_str))
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_error_display_includes_status() {
        let error = ClientError::Api {
            status_code: 404,
            payload: json!({"detail": "Não encontrado."}),
        };
        let display = format!("{}", error);
        assert!(display.contains("404"));
        assert!(display.contains("Não encontrado."));
    }

    #[test]
    fn test_session_expired_display() {
        let display = format!("{}", ClientError::SessionExpired);
        assert!(display.contains("Session expired"));
        assert!(ClientError::SessionExpired.is_session_expired());
    }

    #[test]
    fn test_is_session_expired_false_for_other_errors() {
        let error = ClientError::Api {
            status_code: 401,
            payload: json!({"detail": "Credenciais não fornecidas."}),
        };
        assert!(!error.is_session_expired());
        assert!(!ClientError::InvalidInput("x".to_string()).is_session_expired());
    }

    #[test]
    fn test_status_code() {
        let api = ClientError::Api {
            status_code: 400,
            payload: Value::Null,
        };
        assert_eq!(api.status_code(), Some(400));

        let token = ClientError::TokenInvalid {
            status_code: 401,
            payload: json!({"code": "token_not_valid"}),
        };
        assert_eq!(token.status_code(), Some(401));

        assert_eq!(ClientError::SessionExpired.status_code(), None);
    }

    #[test]
    fn test_server_message_prefers_detail() {
        let error = ClientError::Api {
            status_code: 400,
            payload: json!({"detail": "first", "error": "second"}),
        };
        assert_eq!(error.server_message().as_deref(), Some("first"));
    }

    #[test]
    fn test_server_message_from_error_key() {
        let error = ClientError::Api {
            status_code: 401,
            payload: json!({"error": "Credenciais inválidas"}),
        };
        assert_eq!(
            error.server_message().as_deref(),
            Some("Credenciais inválidas")
        );
    }

    #[test]
    fn test_server_message_from_plain_text_payload() {
        let error = ClientError::Api {
            status_code: 502,
            payload: Value::String("Bad Gateway".to_string()),
        };
        assert_eq!(error.server_message().as_deref(), Some("Bad Gateway"));
    }

    #[test]
    fn test_server_message_field_errors_have_no_message() {
        // Validation errors are keyed by field name
        let error = ClientError::Api {
            status_code: 400,
            payload: json!({"codigo_sku": ["Já existe um produto com este SKU"]}),
        };
        assert_eq!(error.server_message(), None);
    }

    #[test]
    fn test_json_error_from() {
        let json_err = serde_json::from_str::<Value>("not valid json").unwrap_err();
        let error: ClientError = json_err.into();
        assert!(format!("{}", error).contains("JSON deserialization error"));
    }
}
