//! Typed wrappers over [`Client::request`] for each back end resource.
//!
//! Every call goes through the authenticated pipeline, so token refresh
//! applies here exactly as it does to raw requests.
//!
//! ```no_run
//! # use pricing_client::Client;
//! # async fn example(client: Client) -> Result<(), pricing_client::ClientError> {
//! for product in client.products().list().await? {
//!     println!("{} ({})", product.name, product.cost_price);
//! }
//! # Ok(())
//! # }
//! ```

mod billing;
mod compositions;
mod products;

pub use billing::{PaymentsApi, PlansApi, SubscriptionsApi};
pub use compositions::CompositionsApi;
pub use products::ProductsApi;

use crate::client::Client;

impl Client {
    #[must_use]
    pub fn products(&self) -> ProductsApi<'_> {
        ProductsApi::new(self)
    }

    #[must_use]
    pub fn compositions(&self) -> CompositionsApi<'_> {
        CompositionsApi::new(self)
    }

    #[must_use]
    pub fn plans(&self) -> PlansApi<'_> {
        PlansApi::new(self)
    }

    #[must_use]
    pub fn subscriptions(&self) -> SubscriptionsApi<'_> {
        SubscriptionsApi::new(self)
    }

    #[must_use]
    pub fn payments(&self) -> PaymentsApi<'_> {
        PaymentsApi::new(self)
    }
}
