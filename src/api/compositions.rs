use crate::client::Client;
use crate::errors::ClientError;
use crate::http::common::Endpoint;
use crate::models::{Composition, NewComposition};
use reqwest::Method;

/// Bills-of-materials (`/composicoes/`).
#[derive(Debug, Clone, Copy)]
pub struct CompositionsApi<'a> {
    client: &'a Client,
}

impl<'a> CompositionsApi<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Composition>, ClientError> {
        self.client
            .request_json(Method::GET, &Endpoint::Compositions.to_path(), None)
            .await
    }

    pub async fn get(&self, id: u64) -> Result<Composition, ClientError> {
        self.client
            .request_json(Method::GET, &Endpoint::Composition { id }.to_path(), None)
            .await
    }

    pub async fn create(&self, composition: &NewComposition) -> Result<Composition, ClientError> {
        if composition.items.is_empty() {
            return Err(ClientError::InvalidInput(
                "a composition needs at least one item".to_string(),
            ));
        }
        self.client
            .send_json(Method::POST, &Endpoint::Compositions.to_path(), composition)
            .await
    }

    /// Replaces the composition, including its whole item list.
    pub async fn update(
        &self,
        id: u64,
        composition: &NewComposition,
    ) -> Result<Composition, ClientError> {
        if composition.items.is_empty() {
            return Err(ClientError::InvalidInput(
                "a composition needs at least one item".to_string(),
            ));
        }
        self.client
            .send_json(Method::PUT, &Endpoint::Composition { id }.to_path(), composition)
            .await
    }

    pub async fn delete(&self, id: u64) -> Result<(), ClientError> {
        self.client
            .request(Method::DELETE, &Endpoint::Composition { id }.to_path(), None)
            .await
            .map(|_| ())
    }
}
