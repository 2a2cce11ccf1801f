/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Environment variable read by [`ClientBuilder::from_env`](crate::ClientBuilder::from_env).
pub const BASE_URL_ENV: &str = "PRICING_API_URL";

/// Back end endpoints used by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint<'a> {
    Login,
    Register,
    Profile,
    TokenRefresh,
    Products,
    Product { id: u64 },
    Compositions,
    Composition { id: u64 },
    Plans,
    Plan { slug: &'a str },
    Subscriptions,
    CancelSubscription { id: u64 },
    ActiveSubscription,
    Payments,
}

impl Endpoint<'_> {
    /// Path relative to the base URL. Every path ends with `/`, as the
    /// back end's router requires.
    #[must_use]
    pub fn to_path(&self) -> String {
        match self {
            Self::Login => "/auth/login/".to_string(),
            Self::Register => "/auth/register/".to_string(),
            Self::Profile => "/auth/profile/".to_string(),
            Self::TokenRefresh => "/auth/token/refresh/".to_string(),
            Self::Products => "/produtos/".to_string(),
            Self::Product { id } => format!("/produtos/{id}/"),
            Self::Compositions => "/composicoes/".to_string(),
            Self::Composition { id } => format!("/composicoes/{id}/"),
            Self::Plans => "/plans/".to_string(),
            Self::Plan { slug } => format!("/plans/{}/", urlencoding::encode(slug)),
            Self::Subscriptions => "/subscriptions/".to_string(),
            Self::CancelSubscription { id } => format!("/subscriptions/{id}/cancel/"),
            Self::ActiveSubscription => "/subscriptions/active/".to_string(),
            Self::Payments => "/payments/".to_string(),
        }
    }
}

/// Normalizes a configured base URL: trims whitespace and trailing slashes.
///
/// Returns `None` unless the URL uses `http` or `https`.
#[must_use]
pub fn normalize_base_url(base_url: &str) -> Option<String> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let scheme_ok = trimmed.starts_with("http://") || trimmed.starts_with("https://");
    let has_host = trimmed
        .split_once("://")
        .is_some_and(|(_, rest)| !rest.is_empty());
    (scheme_ok && has_host).then(|| trimmed.to_string())
}

/// Joins a normalized base URL and a request path.
#[must_use]
pub fn construct_url(base_url: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{base_url}{path}")
    } else {
        format!("{base_url}/{path}")
    }
}
