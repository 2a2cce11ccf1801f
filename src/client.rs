use crate::errors::ClientError;
use crate::http::common::{BASE_URL_ENV, DEFAULT_BASE_URL, normalize_base_url};
use crate::http::error_helpers::decode_with_context;
use crate::http::pipeline::{Outcome, PendingRequest, attach_token, dispatch};
use crate::http::refresh::RefreshCoordinator;
use crate::session::Session;
use reqwest::{Client as ReqwestClient, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Authenticated client for the pricing back end.
///
/// Attaches the session's access token to every request and, when the server
/// reports the token as invalid, refreshes it once (shared by all concurrent
/// callers) and retries the request once.
///
/// Cloning is cheap; clones share the transport, the session and the refresh
/// coordinator.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) base_url: Arc<str>,
    #[allow(clippy::struct_field_names)]
    pub(crate) http_client: ReqwestClient,
    pub(crate) session: Arc<Session>,
    refresher: Arc<RefreshCoordinator>,
}

/// Builder for `Client` instances.
///
/// # Example
///
/// ```
/// use pricing_client::{Client, Session};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let client = Client::builder("http://localhost:8000/api")
///     .session(Arc::new(Session::in_memory()))
///     .timeout(Duration::from_secs(30))
///     .connect_timeout(Duration::from_secs(5))
///     .build()
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: String,
    session: Option<Arc<Session>>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Starts a builder whose base URL comes from `PRICING_API_URL`,
    /// falling back to `http://localhost:8000/api`.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Client::builder(base_url)
    }

    /// Injects the session the client reads tokens from and renews.
    ///
    /// If not called, the client starts with an empty in-memory session.
    #[must_use]
    pub fn session(mut self, session: Arc<Session>) -> Self {
        self.session = Some(session);
        self
    }

    /// Sets the total request timeout.
    ///
    /// If not set, uses reqwest's default (no timeout).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the `Client`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidInput`] if the base URL is not an
    /// `http(s)` URL, or [`ClientError::ClientBuild`] if the HTTP client
    /// cannot be constructed (e.g. TLS backend initialization failure).
    pub fn build(self) -> Result<Client, ClientError> {
        let base_url = normalize_base_url(&self.base_url).ok_or_else(|| {
            ClientError::InvalidInput(format!("base URL must be http(s): {:?}", self.base_url))
        })?;

        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("pricing-client/{}", env!("CARGO_PKG_VERSION")));
        builder = builder.user_agent(user_agent);

        let http_client = builder
            .build()
            .map_err(|e| ClientError::ClientBuild(e.to_string()))?;

        Ok(Client {
            base_url: base_url.into(),
            http_client,
            session: self.session.unwrap_or_else(|| Arc::new(Session::in_memory())),
            refresher: Arc::new(RefreshCoordinator::new()),
        })
    }
}

impl Client {
    /// Creates a new builder for `Client` instances.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Back end API root, e.g. `http://localhost:8000/api`.
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            base_url: base_url.into(),
            session: None,
            timeout: None,
            connect_timeout: None,
            user_agent: None,
        }
    }

    /// Creates a client with default settings around `session`.
    ///
    /// # Errors
    ///
    /// See [`ClientBuilder::build`].
    pub fn new(base_url: impl Into<String>, session: Arc<Session>) -> Result<Self, ClientError> {
        Self::builder(base_url).session(session).build()
    }

    /// Normalized base URL (no trailing slash).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The session this client reads tokens from.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Performs an authenticated request and returns the parsed JSON body.
    ///
    /// The current access token, if any, is attached as a bearer credential.
    /// If the server answers with `code: "token_not_valid"`, the token is
    /// refreshed (one refresh per wave of concurrent failures) and the
    /// request is sent exactly once more with the renewed token.
    ///
    /// An empty 2xx body (e.g. 204 on delete) yields `Value::Null`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Network`]: no response received; not retried.
    /// - [`ClientError::Api`]: any non-2xx unrelated to token validity,
    ///   carrying the server payload unmodified.
    /// - [`ClientError::SessionExpired`]: the refresh failed; the session
    ///   has been cleared and the user must log in again.
    /// - [`ClientError::TokenInvalid`]: the retried request was rejected
    ///   again.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use pricing_client::Client;
    /// # use pricing_client::Method;
    /// # async fn example(client: Client) -> Result<(), pricing_client::ClientError> {
    /// let products = client.request(Method::GET, "/produtos/", None).await?;
    /// println!("{products}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        let mut pending = PendingRequest::new(method, path, body);
        let mut token = self.session.access_token();

        loop {
            match self.execute(&pending, token.as_deref()).await? {
                Outcome::TokenInvalid { .. } if !pending.is_retry() => {
                    pending = pending.mark_retried();
                    let renewed = self
                        .refresher
                        .renew(&self.http_client, &self.base_url, &self.session, token.as_deref())
                        .await?;
                    debug!(method = %pending.method, path = %pending.path, "Retrying with renewed token");
                    token = Some(renewed);
                }
                outcome => return outcome.into_result(),
            }
        }
    }

    /// Like [`request`](Self::request), decoding the response into `T`.
    ///
    /// # Errors
    ///
    /// As [`request`](Self::request), plus [`ClientError::Json`] if the body
    /// does not match `T`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        let value = self.request(method, path, body).await?;
        decode_with_context(value, path)
    }

    /// Shorthand for requests whose body is a serializable value.
    pub(crate) async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let body = serde_json::to_value(body)?;
        self.request_json(method, path, Some(body)).await
    }

    /// One dispatch with an explicit token, bypassing recovery.
    pub(crate) async fn execute(
        &self,
        pending: &PendingRequest,
        token: Option<&str>,
    ) -> Result<Outcome, ClientError> {
        dispatch(&self.http_client, &self.base_url, attach_token(pending, token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Credentials;

    #[test]
    fn test_client_builder_default() {
        let client = Client::builder("http://localhost:8000/api/").build().unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert!(!client.session().is_authenticated());
    }

    #[test]
    fn test_client_builder_with_timeouts() {
        let client = Client::builder("https://api.example.com")
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .user_agent("dashboard/1.0")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "https://api.example.com");
    }

    #[test]
    fn test_client_builder_rejects_invalid_base_url() {
        let err = Client::builder("localhost:8000").build().unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
    }

    #[test]
    fn test_client_shares_injected_session() {
        let session = Arc::new(Session::with_credentials(Credentials::new("A1", "R1"), None));
        let client = Client::new("http://localhost:8000/api", Arc::clone(&session)).unwrap();
        let clone = client.clone();

        session.teardown();
        assert!(!client.session().is_authenticated());
        assert!(!clone.session().is_authenticated());
    }
}
