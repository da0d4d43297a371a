use std::time::Duration;

use plume_types::models::Tenant;

/// Header naming the tenant when the app runs off the tenant's own host.
pub const TENANT_HEADER: &str = "X-Tenant-ID";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST backend, without trailing slash.
    pub api_url: String,
    /// Host the front end is served from, if known.
    pub app_host: Option<String>,
    /// Shared domain tenants get subdomains under.
    pub base_domain: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            app_host: None,
            base_domain: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// Whether requests for `tenant` must carry [`TENANT_HEADER`].
    ///
    /// The backend resolves the tenant from the host on its canonical host;
    /// anywhere else (shared host, localhost, unknown) it needs the header.
    pub fn needs_tenant_header(&self, tenant: &Tenant) -> bool {
        let Some(app_host) = self.app_host.as_deref() else {
            return true;
        };
        match tenant.canonical_host(self.base_domain.as_deref()) {
            Some(canonical) => !app_host.eq_ignore_ascii_case(&canonical),
            None => true,
        }
    }
}
