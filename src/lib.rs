//! # pricing-client
//!
//! Async client for the pricing back end: products and inputs, recipe
//! compositions (bills-of-materials), plans, subscriptions and payments.
//!
//! The client owns the bearer-token protocol. It attaches the session's
//! access token to every request; when the server reports the token as
//! invalid (`code: "token_not_valid"`) it refreshes the token once, shared
//! by all requests that failed concurrently, and retries each of them once.
//! If the refresh itself fails the session is cleared and callers get
//! [`ClientError::SessionExpired`].
//!
//! # Quick Start
//!
//! ```no_run
//! use pricing_client::{Client, FileStore, Session};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), pricing_client::ClientError> {
//! let session = Arc::new(Session::init(Arc::new(FileStore::new(".session")))?);
//! let client = Client::builder("http://localhost:8000/api")
//!     .session(session)
//!     .build()?;
//!
//! if !client.session().is_authenticated() {
//!     client.login("a@b.com", "secret").await?;
//! }
//!
//! match client.products().list().await {
//!     Ok(products) => println!("{} products", products.len()),
//!     Err(e) if e.is_session_expired() => println!("please log in again"),
//!     Err(e) => println!("error: {}", e.server_message().unwrap_or_else(|| e.to_string())),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Debugging
//!
//! Set `PRICING_LOUD_WIRE=1` to dump every request and response to stderr,
//! with passwords and tokens redacted.

mod api;
mod auth;
mod client;
mod errors;
pub(crate) mod http;
pub mod models;
pub mod session;
pub mod storage;

pub use api::{CompositionsApi, PaymentsApi, PlansApi, ProductsApi, SubscriptionsApi};
pub use client::{Client, ClientBuilder};
pub use errors::ClientError;
pub use http::common::{BASE_URL_ENV, DEFAULT_BASE_URL};
pub use http::pipeline::TOKEN_NOT_VALID;
pub use http::wire_log::LOUD_WIRE_ENV;
pub use reqwest::Method;
pub use session::{Credentials, SESSION_STORAGE_KEY, Session, SessionSnapshot, SessionState};
pub use storage::{FileStore, MemoryStore, SessionStore};
