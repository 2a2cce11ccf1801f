use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingPeriod {
    Monthly,
    Quarterly,
    Yearly,
    #[serde(other)]
    Unknown,
}

/// A subscription plan. Plans are public; no session is needed to list them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    /// Decimal string.
    pub price: String,
    pub billing_period: BillingPeriod,
    pub max_users: i64,
    pub max_projects: i64,
    #[serde(default)]
    pub features: Value,
    pub is_active: bool,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trialing,
    Active,
    PastDue,
    Canceled,
    Unpaid,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: u64,
    pub user: u64,
    #[serde(default)]
    pub user_email: Option<String>,
    pub plan: u64,
    #[serde(default)]
    pub plan_details: Option<Plan>,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub current_period_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub trial_end: Option<DateTime<Utc>>,
    /// Decimal string.
    pub price_at_subscription: String,
    pub auto_renew: bool,
    #[serde(default)]
    pub is_active: bool,
}

/// Body of `POST /subscriptions/`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CreateSubscription {
    pub plan_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Succeeded,
    Failed,
    Refunded,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: u64,
    pub user: u64,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub subscription: Option<u64>,
    /// Decimal string.
    pub amount: String,
    pub currency: String,
    pub status: PaymentStatus,
    /// `stripe` or `mercadopago`.
    pub gateway: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
