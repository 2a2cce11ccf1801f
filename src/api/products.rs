use crate::client::Client;
use crate::errors::ClientError;
use crate::http::common::Endpoint;
use crate::models::{NewProduct, Product, ProductPatch};
use reqwest::Method;

/// Products and inputs of the signed-in user's company (`/produtos/`).
#[derive(Debug, Clone, Copy)]
pub struct ProductsApi<'a> {
    client: &'a Client,
}

impl<'a> ProductsApi<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Product>, ClientError> {
        self.client
            .request_json(Method::GET, &Endpoint::Products.to_path(), None)
            .await
    }

    pub async fn get(&self, id: u64) -> Result<Product, ClientError> {
        self.client
            .request_json(Method::GET, &Endpoint::Product { id }.to_path(), None)
            .await
    }

    /// Creates a product. The server rejects a SKU already used in the same
    /// company with a 400 keyed by `codigo_sku`.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, ClientError> {
        self.client
            .send_json(Method::POST, &Endpoint::Products.to_path(), product)
            .await
    }

    /// Replaces the product with `PUT`.
    ///
    /// The server validates a `PUT` as a full update, so every required
    /// field (`name`, `sku`, `kind`, `unit`, `cost_price`) must be set in
    /// `patch`; a missing one is answered with a 400 keyed by that field.
    /// Use [`patch`](Self::patch) to change only some fields.
    pub async fn update(&self, id: u64, patch: &ProductPatch) -> Result<Product, ClientError> {
        self.client
            .send_json(Method::PUT, &Endpoint::Product { id }.to_path(), patch)
            .await
    }

    /// Changes only the fields set in `patch`, with `PATCH`.
    pub async fn patch(&self, id: u64, patch: &ProductPatch) -> Result<Product, ClientError> {
        self.client
            .send_json(Method::PATCH, &Endpoint::Product { id }.to_path(), patch)
            .await
    }

    pub async fn delete(&self, id: u64) -> Result<(), ClientError> {
        self.client
            .request(Method::DELETE, &Endpoint::Product { id }.to_path(), None)
            .await
            .map(|_| ())
    }
}
