use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

use plume_client::ClientConfig;

pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub data_path: PathBuf,
    pub app_host: Option<String>,
    pub base_domain: Option<String>,
    pub http_timeout: Duration,
}

impl AppConfig {
    /// Read `PLUME_*` variables. Call after `.env` has been loaded.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = non_empty("PLUME_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        url::Url::parse(&api_url).with_context(|| format!("PLUME_API_URL is not a valid URL: {}", api_url))?;

        let timeout_secs: u64 = match non_empty("PLUME_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PLUME_HTTP_TIMEOUT_SECS must be a number of seconds, got {}", raw))?,
            None => 30,
        };

        Ok(Self {
            api_url,
            data_path: non_empty("PLUME_DATA_PATH").unwrap_or_else(|| "plume.db".into()).into(),
            app_host: non_empty("PLUME_APP_HOST"),
            base_domain: non_empty("PLUME_BASE_DOMAIN"),
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(&self.api_url);
        config.app_host = self.app_host.clone();
        config.base_domain = self.base_domain.clone();
        config.timeout = self.http_timeout;
        config
    }
}
