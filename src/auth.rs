//! Session lifecycle actions: login, registration, social-login callback,
//! profile and logout.

use crate::client::Client;
use crate::errors::ClientError;
use crate::http::common::Endpoint;
use crate::http::error_helpers::decode_with_context;
use crate::http::pipeline::PendingRequest;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, User};
use crate::session::Credentials;
use reqwest::Method;
use tracing::{debug, info, warn};

impl Client {
    /// Logs in with email and password and establishes the session.
    ///
    /// The request is sent without a bearer token. On failure the session is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with the server's message (e.g. 401
    /// `{"error": "Credenciais inválidas"}`) or [`ClientError::Network`].
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        if email.is_empty() || password.is_empty() {
            return Err(ClientError::InvalidInput(
                "email and password are required".to_string(),
            ));
        }

        debug!("Logging in");
        let body = serde_json::to_value(LoginRequest { email, password })?;
        let pending = PendingRequest::new(Method::POST, Endpoint::Login.to_path(), Some(body));
        self.authenticate(&pending).await
    }

    /// Registers a new account and establishes the session with the tokens
    /// the server issues for it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with field validation errors, or
    /// [`ClientError::Network`].
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ClientError> {
        debug!("Registering account");
        let body = serde_json::to_value(request)?;
        let pending = PendingRequest::new(Method::POST, Endpoint::Register.to_path(), Some(body));
        self.authenticate(&pending).await
    }

    /// Completes a social login whose provider redirected back with a token
    /// pair.
    ///
    /// The tokens are only installed once the profile endpoint accepts the
    /// access token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidInput`] if either token is empty, or
    /// the profile request's error.
    pub async fn complete_oauth_callback(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<User, ClientError> {
        if access_token.is_empty() || refresh_token.is_empty() {
            return Err(ClientError::InvalidInput(
                "callback is missing the access or refresh token".to_string(),
            ));
        }

        let pending = PendingRequest::new(Method::GET, Endpoint::Profile.to_path(), None);
        let payload = self.execute(&pending, Some(access_token)).await?.into_result()?;
        let user: User = decode_with_context(payload, "User from profile")?;

        self.session.establish(
            Credentials::new(access_token, refresh_token),
            Some(user.clone()),
        )?;
        info!(user = user.pk, "Social login completed");
        Ok(user)
    }

    /// Fetches the signed-in user's profile and stores it in the session.
    ///
    /// # Errors
    ///
    /// As [`Client::request`].
    pub async fn profile(&self) -> Result<User, ClientError> {
        let user: User = self
            .request_json(Method::GET, &Endpoint::Profile.to_path(), None)
            .await?;
        self.session.update_user(user.clone());
        Ok(user)
    }

    /// Logs out locally: clears the session and its persisted copy.
    pub fn logout(&self) {
        self.session.teardown();
    }

    async fn authenticate(&self, pending: &PendingRequest) -> Result<User, ClientError> {
        let payload = match self.execute(pending, None).await?.into_result() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(status = ?e.status_code(), "Authentication rejected");
                return Err(e);
            }
        };
        let response: AuthResponse = decode_with_context(payload, "AuthResponse")?;

        self.session.establish(
            Credentials::new(response.tokens.access, response.tokens.refresh),
            Some(response.user.clone()),
        )?;
        info!(user = response.user.pk, "Logged in");
        Ok(response.user)
    }
}
