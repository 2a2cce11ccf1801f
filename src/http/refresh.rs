//! Single-flight access token renewal.
//!
//! Every request that fails with `token_not_valid` calls
//! [`RefreshCoordinator::renew`] with the token it was sent with. Callers
//! queue on one gate; the first through performs the refresh, and the ones
//! behind it find the session already renewed (or expired) and reuse that
//! outcome. A wave of N concurrent failures therefore costs one call to the
//! refresh endpoint.

use super::common::{Endpoint, construct_url};
use super::error_helpers::{decode_with_context, payload_from_body};
use super::wire_log;
use crate::errors::ClientError;
use crate::models::{RefreshRequest, RefreshResponse};
use crate::session::{Session, SessionState};
use reqwest::Client as ReqwestClient;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    gate: Mutex<()>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an access token to retry with, refreshing only if nobody else
    /// already did since `stale_token` was read.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionExpired`] if the session holds no
    /// credentials or the refresh fails; in the latter case the session is
    /// cleared before returning.
    pub async fn renew(
        &self,
        http_client: &ReqwestClient,
        base_url: &str,
        session: &Session,
        stale_token: Option<&str>,
    ) -> Result<String, ClientError> {
        let _guard = self.gate.lock().await;

        if session.state().requires_login() {
            debug!("Token rejected but session requires login");
            return Err(ClientError::SessionExpired);
        }

        // Renewed by an earlier holder of the gate, or a fresh login.
        if let Some(current) = session.access_token()
            && session.state() == SessionState::Authenticated
            && stale_token != Some(current.as_str())
        {
            debug!("Access token already renewed, reusing it");
            return Ok(current);
        }

        let refresh_token = session.begin_refresh()?;
        info!("Access token rejected, refreshing");

        match request_new_token(http_client, base_url, &refresh_token).await {
            Ok(renewed) => {
                let access = renewed.access.clone();
                match session.install_access_token(renewed.access, renewed.refresh) {
                    Ok(()) => {
                        info!("Access token renewed");
                        Ok(access)
                    }
                    Err(e) => {
                        debug!("Discarding renewed token: {}", e);
                        current_login(session)
                    }
                }
            }
            Err(e) => {
                warn!("Token refresh failed, ending session: {}", e);
                session.expire();
                current_login(session)
            }
        }
    }
}

/// Outcome for a refresh whose session was logged out, or logged into
/// again, while the refresh endpoint was being called.
fn current_login(session: &Session) -> Result<String, ClientError> {
    let snapshot = session.snapshot();
    match (session.state(), snapshot.access_token) {
        (SessionState::Authenticated, Some(token)) => Ok(token),
        _ => Err(ClientError::SessionExpired),
    }
}

/// Calls `POST /auth/token/refresh/` with `{refresh}`. Never carries a bearer.
async fn request_new_token(
    http_client: &ReqwestClient,
    base_url: &str,
    refresh_token: &str,
) -> Result<RefreshResponse, ClientError> {
    let url = construct_url(base_url, &Endpoint::TokenRefresh.to_path());
    let body = serde_json::to_value(RefreshRequest {
        refresh: refresh_token,
    })?;

    let request_id = wire_log::next_request_id();
    wire_log::log_request(request_id, "POST", &url, Some(&body), false);

    let response = http_client.post(&url).json(&body).send().await?;
    let status = response.status();
    wire_log::log_response_status(request_id, status.as_u16());

    let text = response.text().await?;
    wire_log::log_response_body(request_id, &text);

    let payload = payload_from_body(&text);
    if !status.is_success() {
        return Err(ClientError::Api {
            status_code: status.as_u16(),
            payload,
        });
    }
    decode_with_context(payload, "RefreshResponse")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Credentials;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_renew_refreshes_when_token_is_current() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token/refresh/"))
            .and(body_json(json!({"refresh": "R1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A2"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let session = Session::with_credentials(Credentials::new("A1", "R1"), None);
        let coordinator = RefreshCoordinator::new();
        let token = coordinator
            .renew(&ReqwestClient::new(), &mock_server.uri(), &session, Some("A1"))
            .await
            .unwrap();

        assert_eq!(token, "A2");
        assert_eq!(session.state(), SessionState::Authenticated);
        assert_eq!(session.refresh_token().as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn test_renew_reuses_token_renewed_by_someone_else() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token/refresh/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A3"})))
            .expect(0)
            .mount(&mock_server)
            .await;

        let session = Session::with_credentials(Credentials::new("A2", "R1"), None);
        let token = RefreshCoordinator::new()
            .renew(&ReqwestClient::new(), &mock_server.uri(), &session, Some("A1"))
            .await
            .unwrap();

        assert_eq!(token, "A2");
    }

    #[tokio::test]
    async fn test_renew_failure_expires_session() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token/refresh/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "detail": "Token is invalid or expired",
                "code": "token_not_valid"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let session = Session::with_credentials(Credentials::new("A1", "R1"), None);
        let err = RefreshCoordinator::new()
            .renew(&ReqwestClient::new(), &mock_server.uri(), &session, Some("A1"))
            .await
            .unwrap_err();

        assert!(err.is_session_expired());
        assert_eq!(session.state(), SessionState::Expired);
        assert!(session.access_token().is_none());
        assert!(session.refresh_token().is_none());
    }

    #[tokio::test]
    async fn test_renew_malformed_refresh_response_expires_session() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token/refresh/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
            .mount(&mock_server)
            .await;

        let session = Session::with_credentials(Credentials::new("A1", "R1"), None);
        let err = RefreshCoordinator::new()
            .renew(&ReqwestClient::new(), &mock_server.uri(), &session, Some("A1"))
            .await
            .unwrap_err();

        assert!(err.is_session_expired());
        assert_eq!(session.state(), SessionState::Expired);
    }

    #[tokio::test]
    async fn test_renew_without_session_does_not_call_server() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let session = Session::in_memory();
        let err = RefreshCoordinator::new()
            .renew(&ReqwestClient::new(), &mock_server.uri(), &session, None)
            .await
            .unwrap_err();

        assert!(err.is_session_expired());
        assert_eq!(session.state(), SessionState::Unauthenticated);
    }
}
