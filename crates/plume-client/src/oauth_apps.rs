use plume_types::api::{AuthorizationUrls, OAuthAppConfig};
use plume_types::models::AuthorizationUrl;
use plume_types::validation::ValidationErrors;

use crate::error::ClientError;
use crate::http::ApiClient;

pub async fn config(client: &ApiClient) -> Result<OAuthAppConfig, ClientError> {
    client.get("/oauth-apps/config").await
}

/// Validates locally, then `PUT /oauth-apps/config`.
pub async fn update_config(client: &ApiClient, config: &OAuthAppConfig) -> Result<OAuthAppConfig, ClientError> {
    validate(config)?;
    client.put("/oauth-apps/config", config).await
}

pub async fn authorization_urls(client: &ApiClient) -> Result<Vec<AuthorizationUrl>, ClientError> {
    let urls: AuthorizationUrls = client.get("/oauth-apps/authorization-urls").await?;
    Ok(urls.urls)
}

/// An enabled app needs a client id.
pub fn validate(config: &OAuthAppConfig) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for creds in config.apps.values() {
        if creds.enabled && creds.client_id.trim().is_empty() {
            errors.push("clientId", "Client ID is required for enabled networks");
        }
    }
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use plume_types::models::OAuthAppCredentials;

    #[test]
    fn enabled_apps_need_client_id() {
        let mut config = OAuthAppConfig::default();
        config.apps.insert(
            "linkedin".into(),
            OAuthAppCredentials { enabled: false, ..Default::default() },
        );
        assert!(validate(&config).is_ok());

        config.apps.insert(
            "twitter".into(),
            OAuthAppCredentials { enabled: true, ..Default::default() },
        );
        assert!(validate(&config).is_err());
    }
}
