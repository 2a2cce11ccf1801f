//! The canonical session: credential pair, user, and lifecycle state.
//!
//! A [`Session`] is created once at start-up with [`Session::init`], which
//! loads whatever was persisted under [`SESSION_STORAGE_KEY`], and is then
//! injected into the [`Client`](crate::Client). The client reads tokens from
//! it and asks it to transition; it never keeps its own copy.
//!
//! Transitions:
//!
//! - `Unauthenticated` / `Expired` --[`establish`](Session::establish)--> `Authenticated`
//! - `Authenticated` --token rejected--> `Refreshing`
//! - `Refreshing` --refresh succeeded--> `Authenticated`
//! - `Refreshing` --refresh failed--> `Expired`
//! - any --[`teardown`](Session::teardown)--> `Unauthenticated`

use crate::errors::ClientError;
use crate::models::User;
use crate::storage::{MemoryStore, SessionStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Key under which the serialized session is persisted.
pub const SESSION_STORAGE_KEY: &str = "auth-storage";

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No credentials. Initial state, and the state after logout.
    Unauthenticated,
    /// Holds a credential pair that is believed valid.
    Authenticated,
    /// The access token was rejected and a refresh is in flight.
    Refreshing,
    /// The refresh failed; credentials were cleared. Requires a new login.
    Expired,
}

impl SessionState {
    /// Both `Unauthenticated` and `Expired` can only be left by logging in.
    #[must_use]
    pub const fn requires_login(self) -> bool {
        matches!(self, Self::Unauthenticated | Self::Expired)
    }
}

/// Access/refresh token pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
}

impl Credentials {
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Tokens must never end up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Point-in-time copy of the session contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<User>,
}

/// On-disk shape: one flat document.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    user: Option<User>,
}

#[derive(Debug)]
struct Inner {
    state: SessionState,
    credentials: Option<Credentials>,
    user: Option<User>,
}

impl Inner {
    const fn empty(state: SessionState) -> Self {
        Self {
            state,
            credentials: None,
            user: None,
        }
    }
}

/// Owner of the credential pair and the signed-in user.
///
/// All mutation goes through the lifecycle methods below. Every mutation is
/// written through to the [`SessionStore`]; a failed write is logged and the
/// in-memory state stays authoritative.
#[derive(Debug)]
pub struct Session {
    inner: RwLock<Inner>,
    store: Arc<dyn SessionStore>,
}

impl Session {
    /// Loads the persisted session from `store`.
    ///
    /// A missing document yields an `Unauthenticated` session. A document
    /// that cannot be parsed is discarded (and removed from the store) rather
    /// than failing start-up.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the store itself cannot be read.
    pub fn init(store: Arc<dyn SessionStore>) -> Result<Self, ClientError> {
        let inner = match store.load(SESSION_STORAGE_KEY)? {
            None => {
                debug!("No persisted session found");
                Inner::empty(SessionState::Unauthenticated)
            }
            Some(raw) => match serde_json::from_str::<PersistedSession>(&raw) {
                Ok(persisted) => {
                    debug!(
                        has_user = persisted.user.is_some(),
                        "Restored persisted session"
                    );
                    Inner {
                        state: SessionState::Authenticated,
                        credentials: Some(Credentials::new(
                            persisted.access_token,
                            persisted.refresh_token,
                        )),
                        user: persisted.user,
                    }
                }
                Err(e) => {
                    warn!("Discarding unreadable persisted session: {}", e);
                    if let Err(e) = store.remove(SESSION_STORAGE_KEY) {
                        warn!("Failed to remove unreadable session: {}", e);
                    }
                    Inner::empty(SessionState::Unauthenticated)
                }
            },
        };

        Ok(Self {
            inner: RwLock::new(inner),
            store,
        })
    }

    /// Creates an empty session backed by a [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            inner: RwLock::new(Inner::empty(SessionState::Unauthenticated)),
            store: Arc::new(MemoryStore::new()),
        }
    }

    /// Creates a session already holding `credentials`, backed by a [`MemoryStore`].
    #[must_use]
    pub fn with_credentials(credentials: Credentials, user: Option<User>) -> Self {
        let session = Self::in_memory();
        {
            let mut inner = session.write();
            inner.state = SessionState::Authenticated;
            inner.credentials = Some(credentials);
            inner.user = user;
            session.persist(&inner);
        }
        session
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.read().state
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().credentials.is_some()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.read()
            .credentials
            .as_ref()
            .map(|c| c.access_token.clone())
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.read()
            .credentials
            .as_ref()
            .map(|c| c.refresh_token.clone())
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.read();
        SessionSnapshot {
            access_token: inner.credentials.as_ref().map(|c| c.access_token.clone()),
            refresh_token: inner.credentials.as_ref().map(|c| c.refresh_token.clone()),
            user: inner.user.clone(),
        }
    }

    /// Login transition: installs a fresh credential pair and user.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidState`] while a refresh is in flight.
    pub fn establish(&self, credentials: Credentials, user: Option<User>) -> Result<(), ClientError> {
        let mut inner = self.write();
        if inner.state == SessionState::Refreshing {
            return Err(ClientError::InvalidState(
                "cannot log in while a token refresh is in flight".to_string(),
            ));
        }
        inner.state = SessionState::Authenticated;
        inner.credentials = Some(credentials);
        inner.user = user;
        self.persist(&inner);
        info!("Session established");
        Ok(())
    }

    /// Replaces the stored user (e.g. after fetching the profile).
    pub fn update_user(&self, user: User) {
        let mut inner = self.write();
        if inner.credentials.is_none() {
            return;
        }
        inner.user = Some(user);
        self.persist(&inner);
    }

    /// `Authenticated -> Refreshing`. Returns the refresh token to use.
    ///
    /// `Refreshing` is also accepted: a refresh whose future was dropped
    /// midway leaves that state behind.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionExpired`] when there is nothing to
    /// refresh with.
    pub(crate) fn begin_refresh(&self) -> Result<String, ClientError> {
        let mut inner = self.write();
        match (inner.state, inner.credentials.as_ref()) {
            (SessionState::Authenticated | SessionState::Refreshing, Some(credentials)) => {
                let refresh_token = credentials.refresh_token.clone();
                inner.state = SessionState::Refreshing;
                Ok(refresh_token)
            }
            _ => Err(ClientError::SessionExpired),
        }
    }

    /// `Refreshing -> Authenticated`, installing the renewed access token.
    ///
    /// The refresh token is only replaced when the server rotated it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidState`] if no refresh is in flight,
    /// e.g. because the session was torn down while the refresh ran.
    pub(crate) fn install_access_token(
        &self,
        access_token: String,
        rotated_refresh_token: Option<String>,
    ) -> Result<(), ClientError> {
        let mut inner = self.write();
        if inner.state != SessionState::Refreshing {
            return Err(ClientError::InvalidState(format!(
                "cannot install a renewed token in state {:?}",
                inner.state
            )));
        }
        let Some(credentials) = inner.credentials.as_mut() else {
            return Err(ClientError::InvalidState(
                "refreshing session has no credentials".to_string(),
            ));
        };
        credentials.access_token = access_token;
        if let Some(refresh_token) = rotated_refresh_token {
            credentials.refresh_token = refresh_token;
        }
        inner.state = SessionState::Authenticated;
        self.persist(&inner);
        Ok(())
    }

    /// Terminal refresh failure: clears everything and moves to `Expired`.
    ///
    /// Only a refreshing session expires; a session torn down or logged
    /// into again while the refresh ran is left as it is.
    pub(crate) fn expire(&self) {
        let mut inner = self.write();
        if inner.state != SessionState::Refreshing {
            debug!(state = ?inner.state, "Ignoring expiry outside of a refresh");
            return;
        }
        *inner = Inner::empty(SessionState::Expired);
        self.forget();
        warn!("Session expired, credentials cleared");
    }

    /// Logout: clears everything and moves to `Unauthenticated`, whatever
    /// the previous state was.
    pub fn teardown(&self) {
        let mut inner = self.write();
        *inner = Inner::empty(SessionState::Unauthenticated);
        self.forget();
        info!("Session torn down");
    }

    // Store writes happen under the write guard, so the persisted document
    // always matches the last transition.
    fn persist(&self, inner: &Inner) {
        let Some(credentials) = inner.credentials.as_ref() else {
            return;
        };
        let document = PersistedSession {
            access_token: credentials.access_token.clone(),
            refresh_token: credentials.refresh_token.clone(),
            user: inner.user.clone(),
        };

        let result = serde_json::to_string(&document)
            .map_err(ClientError::from)
            .and_then(|raw| self.store.save(SESSION_STORAGE_KEY, &raw));
        if let Err(e) = result {
            warn!("Failed to persist session: {}", e);
        }
    }

    fn forget(&self) {
        if let Err(e) = self.store.remove(SESSION_STORAGE_KEY) {
            warn!("Failed to remove persisted session: {}", e);
        }
    }
}
