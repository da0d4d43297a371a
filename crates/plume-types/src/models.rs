use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub tenant_id: String,
}

impl User {
    /// Name to show in the header; falls back to the email address.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub subdomain: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Tenant {
    /// Host the tenant is canonically served from. A custom domain wins over
    /// the subdomain of the shared base domain.
    pub fn canonical_host(&self, base_domain: Option<&str>) -> Option<String> {
        if let Some(domain) = self.domain.as_deref().filter(|d| !d.is_empty()) {
            return Some(domain.to_ascii_lowercase());
        }
        base_domain.map(|base| format!("{}.{}", self.subdomain, base).to_ascii_lowercase())
    }
}

/// The authenticated user/tenant/token triple.
///
/// User and tenant only ever travel together with a token, so holding an
/// `Option<Session>` is enough to answer "is anyone logged in".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub tenant: Tenant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Publishing,
    Published,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub networks: Vec<String>,
    #[serde(default)]
    pub media_urls: Vec<String>,
    pub status: PostStatus,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedAccount {
    pub id: String,
    pub network: String,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub connected_at: Option<DateTime<Utc>>,
}

/// Per-network OAuth application credentials configured by the tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthAppCredentials {
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationUrl {
    pub network: String,
    pub url: String,
}
