//! Wire types exchanged with the back end.
//!
//! Field names follow the back end's JSON. Decimal values (prices, costs,
//! quantities) travel as strings, exactly as the server serializes them, so
//! no precision is lost on the client.

mod auth;
mod billing;
mod pricing;

pub use auth::{
    AuthResponse, LoginRequest, RefreshRequest, RefreshResponse, RegisterRequest, TokenPair, User,
};
pub use billing::{
    BillingPeriod, CreateSubscription, Payment, PaymentStatus, Plan, Subscription,
    SubscriptionStatus,
};
pub use pricing::{
    Composition, CompositionItem, NewComposition, NewProduct, Product, ProductKind, ProductPatch,
};
