use crate::client::Client;
use crate::errors::ClientError;
use crate::http::common::Endpoint;
use crate::models::{CreateSubscription, Payment, Plan, Subscription};
use reqwest::Method;
use serde::Deserialize;

/// Public plan catalog (`/plans/`).
#[derive(Debug, Clone, Copy)]
pub struct PlansApi<'a> {
    client: &'a Client,
}

impl<'a> PlansApi<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Plan>, ClientError> {
        self.client
            .request_json(Method::GET, &Endpoint::Plans.to_path(), None)
            .await
    }

    pub async fn get(&self, slug: &str) -> Result<Plan, ClientError> {
        if slug.is_empty() {
            return Err(ClientError::InvalidInput("plan slug is empty".to_string()));
        }
        self.client
            .request_json(Method::GET, &Endpoint::Plan { slug }.to_path(), None)
            .await
    }
}

/// The signed-in user's subscriptions (`/subscriptions/`).
#[derive(Debug, Clone, Copy)]
pub struct SubscriptionsApi<'a> {
    client: &'a Client,
}

#[derive(Debug, Deserialize)]
struct CancelResponse {
    subscription: Subscription,
}

impl<'a> SubscriptionsApi<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Subscription>, ClientError> {
        self.client
            .request_json(Method::GET, &Endpoint::Subscriptions.to_path(), None)
            .await
    }

    /// Subscribes to a plan; new subscriptions start in `trialing`.
    pub async fn create(&self, plan_id: u64) -> Result<Subscription, ClientError> {
        self.client
            .send_json(
                Method::POST,
                &Endpoint::Subscriptions.to_path(),
                &CreateSubscription { plan_id },
            )
            .await
    }

    pub async fn cancel(&self, id: u64) -> Result<Subscription, ClientError> {
        let response: CancelResponse = self
            .client
            .request_json(Method::POST, &Endpoint::CancelSubscription { id }.to_path(), None)
            .await?;
        Ok(response.subscription)
    }

    /// The trialing or active subscription, if any.
    ///
    /// The back end answers 404 when there is none; that maps to `Ok(None)`.
    pub async fn active(&self) -> Result<Option<Subscription>, ClientError> {
        match self
            .client
            .request_json(Method::GET, &Endpoint::ActiveSubscription.to_path(), None)
            .await
        {
            Ok(subscription) => Ok(Some(subscription)),
            Err(ClientError::Api {
                status_code: 404, ..
            }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Payment history (`/payments/`).
#[derive(Debug, Clone, Copy)]
pub struct PaymentsApi<'a> {
    client: &'a Client,
}

impl<'a> PaymentsApi<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Payment>, ClientError> {
        self.client
            .request_json(Method::GET, &Endpoint::Payments.to_path(), None)
            .await
    }
}
