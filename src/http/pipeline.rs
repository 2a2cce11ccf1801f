//! The request pipeline: attach token, dispatch, classify.
//!
//! Each step is a plain function over its inputs. Recovery (refresh and
//! retry) is driven by [`Client::request`](crate::Client::request), which
//! composes these steps with [`super::refresh`].

use super::common::construct_url;
use super::error_helpers::payload_from_body;
use super::wire_log;
use crate::errors::ClientError;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client as ReqwestClient, Method, StatusCode};
use serde_json::Value;

/// Error code the back end uses when the bearer token is expired or invalid.
pub const TOKEN_NOT_VALID: &str = "token_not_valid";

/// A request that may be dispatched at most twice: once, then once more
/// after a successful token refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    retried: bool,
}

impl PendingRequest {
    pub fn new(method: Method, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
            retried: false,
        }
    }

    /// Marks the request as retried. Idempotent.
    #[must_use]
    pub fn mark_retried(mut self) -> Self {
        self.retried = true;
        self
    }

    #[must_use]
    pub const fn is_retry(&self) -> bool {
        self.retried
    }
}

/// A pending request paired with the bearer token it will carry.
#[derive(Debug, Clone, Copy)]
pub struct Authorized<'a> {
    pub request: &'a PendingRequest,
    pub bearer: Option<&'a str>,
}

/// Pairs `request` with `token`. An absent token means an anonymous request.
pub fn attach_token<'a>(request: &'a PendingRequest, token: Option<&'a str>) -> Authorized<'a> {
    Authorized {
        request,
        bearer: token.filter(|t| !t.is_empty()),
    }
}

/// How a response is interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// 2xx, with the parsed body (`Null` when empty).
    Success(Value),
    /// The server rejected the bearer token.
    TokenInvalid { status_code: u16, payload: Value },
    /// Any other non-2xx response.
    Failed { status_code: u16, payload: Value },
}

impl Outcome {
    /// Converts a terminal outcome (no recovery left) into a result.
    pub fn into_result(self) -> Result<Value, ClientError> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::TokenInvalid {
                status_code,
                payload,
            } => Err(ClientError::TokenInvalid {
                status_code,
                payload,
            }),
            Outcome::Failed {
                status_code,
                payload,
            } => Err(ClientError::Api {
                status_code,
                payload,
            }),
        }
    }
}

/// Classifies a response by status and body.
///
/// A token failure is recognized by the `code` field of the error body, not
/// by the status: a 401 without `token_not_valid` (missing credentials, wrong
/// password) is an ordinary failure.
///
/// # Errors
///
/// Returns [`ClientError::Json`] when a 2xx body is not valid JSON.
pub fn classify(status: StatusCode, body: &str) -> Result<Outcome, ClientError> {
    let status_code = status.as_u16();

    if status.is_success() {
        if body.trim().is_empty() {
            return Ok(Outcome::Success(Value::Null));
        }
        return Ok(Outcome::Success(serde_json::from_str(body)?));
    }

    let payload = payload_from_body(body);
    let token_invalid = payload.get("code").and_then(Value::as_str) == Some(TOKEN_NOT_VALID);
    Ok(if token_invalid {
        Outcome::TokenInvalid {
            status_code,
            payload,
        }
    } else {
        Outcome::Failed {
            status_code,
            payload,
        }
    })
}

/// Sends an authorized request and classifies the response.
///
/// # Errors
///
/// Returns [`ClientError::Network`] if no response was received, or
/// [`ClientError::Json`] if a 2xx body is not JSON.
pub async fn dispatch(
    http_client: &ReqwestClient,
    base_url: &str,
    authorized: Authorized<'_>,
) -> Result<Outcome, ClientError> {
    let request = authorized.request;
    let url = construct_url(base_url, &request.path);

    let request_id = wire_log::next_request_id();
    wire_log::log_request(
        request_id,
        request.method.as_str(),
        &url,
        request.body.as_ref(),
        authorized.bearer.is_some(),
    );

    let mut builder = http_client.request(request.method.clone(), &url);
    if let Some(token) = authorized.bearer {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    if let Some(body) = &request.body {
        builder = builder.json(body);
    }

    let response = builder.send().await?;
    let status = response.status();
    wire_log::log_response_status(request_id, status.as_u16());

    let body = response.text().await?;
    wire_log::log_response_body(request_id, &body);

    classify(status, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mark_retried_is_idempotent() {
        let request = PendingRequest::new(Method::GET, "/produtos/", None);
        assert!(!request.is_retry());

        let retried = request.mark_retried().mark_retried();
        assert!(retried.is_retry());
        assert_eq!(retried.path, "/produtos/");
    }

    #[test]
    fn test_attach_token_present() {
        let request = PendingRequest::new(Method::GET, "/produtos/", None);
        let authorized = attach_token(&request, Some("A1"));
        assert_eq!(authorized.bearer, Some("A1"));
    }

    #[test]
    fn test_attach_token_absent_or_empty() {
        let request = PendingRequest::new(Method::GET, "/plans/", None);
        assert_eq!(attach_token(&request, None).bearer, None);
        assert_eq!(attach_token(&request, Some("")).bearer, None);
    }

    #[test]
    fn test_classify_success_json() {
        let outcome = classify(StatusCode::OK, r#"[{"id":1}]"#).unwrap();
        assert_eq!(outcome, Outcome::Success(json!([{"id": 1}])));
    }

    #[test]
    fn test_classify_no_content() {
        let outcome = classify(StatusCode::NO_CONTENT, "").unwrap();
        assert_eq!(outcome, Outcome::Success(Value::Null));
    }

    #[test]
    fn test_classify_success_with_invalid_json() {
        let err = classify(StatusCode::OK, "<html>").unwrap_err();
        assert!(matches!(err, ClientError::Json(_)));
    }

    #[test]
    fn test_classify_token_not_valid_on_401() {
        let body = r#"{"detail":"Given token not valid for any token type","code":"token_not_valid"}"#;
        let outcome = classify(StatusCode::UNAUTHORIZED, body).unwrap();
        assert!(matches!(outcome, Outcome::TokenInvalid { status_code: 401, .. }));
    }

    #[test]
    fn test_classify_token_not_valid_on_400() {
        let outcome = classify(StatusCode::BAD_REQUEST, r#"{"code":"token_not_valid"}"#).unwrap();
        assert!(matches!(outcome, Outcome::TokenInvalid { status_code: 400, .. }));
    }

    #[test]
    fn test_classify_bare_401_is_not_token_failure() {
        let body = r#"{"detail":"As credenciais de autenticação não foram fornecidas."}"#;
        let outcome = classify(StatusCode::UNAUTHORIZED, body).unwrap();
        match outcome {
            Outcome::Failed {
                status_code,
                payload,
            } => {
                assert_eq!(status_code, 401);
                assert_eq!(payload["detail"], "As credenciais de autenticação não foram fornecidas.");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_classify_other_code_is_failure() {
        let outcome = classify(StatusCode::UNAUTHORIZED, r#"{"code":"user_inactive"}"#).unwrap();
        assert!(matches!(outcome, Outcome::Failed { .. }));
    }

    #[test]
    fn test_into_result_keeps_payload_unmodified() {
        let payload = json!({"codigo_sku": ["Já existe um produto com este SKU (X) na sua empresa."]});
        let err = Outcome::Failed {
            status_code: 400,
            payload: payload.clone(),
        }
        .into_result()
        .unwrap_err();
        match err {
            ClientError::Api {
                status_code,
                payload: got,
            } => {
                assert_eq!(status_code, 400);
                assert_eq!(got, payload);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
