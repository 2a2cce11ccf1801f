//! Common test utilities shared across all integration test files.
//!
//! Usage in test files:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

use pricing_client::{Client, Credentials, Session};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::{MockServer, ResponseTemplate};

/// Client against `server` whose session already holds `access`/`refresh`.
#[allow(dead_code)]
pub fn authenticated_client(server: &MockServer, access: &str, refresh: &str) -> Client {
    let session = Arc::new(Session::with_credentials(
        Credentials::new(access, refresh),
        None,
    ));
    client_with_session(server, session)
}

/// Client against `server` around an existing session.
#[allow(dead_code)]
pub fn client_with_session(server: &MockServer, session: Arc<Session>) -> Client {
    Client::builder(server.uri())
        .session(session)
        .build()
        .expect("mock server URI is a valid base URL")
}

/// The back end's response for an expired or otherwise invalid access token.
#[allow(dead_code)]
pub fn token_not_valid() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "detail": "Given token not valid for any token type",
        "code": "token_not_valid",
        "messages": [{
            "token_class": "AccessToken",
            "token_type": "access",
            "message": "Token is invalid or expired"
        }]
    }))
}

#[allow(dead_code)]
pub fn sample_user() -> Value {
    json!({"pk": 7, "email": "a@b.com", "username": "ana", "company_name": "Padaria"})
}

#[allow(dead_code)]
pub fn sample_product(id: u64, name: &str, sku: &str) -> Value {
    json!({
        "id": id,
        "empresa": 1,
        "nome": name,
        "codigo_sku": sku,
        "tipo": "MP",
        "unidade_medida": "kg",
        "preco_custo": "4.5000",
        "is_active": true
    })
}

/// Authorization headers of the requests `server` received on `path`, in order.
#[allow(dead_code)]
pub async fn bearers_for(server: &MockServer, path: &str) -> Vec<Option<String>> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == path)
        .map(|r| {
            r.headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .collect()
}
