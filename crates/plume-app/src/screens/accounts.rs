use std::fmt::Write;

use plume_types::api::OAuthAppConfig;
use plume_types::models::{AuthorizationUrl, ConnectedAccount};

pub fn render_accounts(accounts: &[ConnectedAccount]) -> String {
    if accounts.is_empty() {
        return "No connected accounts.\n".into();
    }
    let mut out = String::new();
    for account in accounts {
        let name = account.display_name.as_deref().unwrap_or(&account.username);
        let _ = writeln!(out, "{:<12} {:<10} @{} ({})", account.id, account.network, account.username, name);
    }
    out
}

/// Secrets are never echoed back.
pub fn render_oauth(config: &OAuthAppConfig) -> String {
    if config.apps.is_empty() {
        return "No OAuth apps configured.\n".into();
    }
    let mut out = String::new();
    for (network, creds) in &config.apps {
        let _ = writeln!(
            out,
            "{:<10} {:<8} client_id={} secret={}",
            network,
            if creds.enabled { "enabled" } else { "disabled" },
            if creds.client_id.is_empty() { "-" } else { creds.client_id.as_str() },
            if creds.client_secret.is_some() { "set" } else { "unset" },
        );
    }
    out
}

pub fn render_authorization_urls(urls: &[AuthorizationUrl]) -> String {
    let mut out = String::new();
    for url in urls {
        let _ = writeln!(out, "{:<10} {}", url.network, url.url);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use plume_types::models::OAuthAppCredentials;

    #[test]
    fn oauth_render_hides_secret() {
        let mut config = OAuthAppConfig::default();
        config.apps.insert(
            "twitter".into(),
            OAuthAppCredentials {
                client_id: "abc".into(),
                client_secret: Some("hunter2".into()),
                redirect_uri: None,
                enabled: true,
            },
        );
        let out = render_oauth(&config);
        assert!(out.contains("client_id=abc"));
        assert!(out.contains("secret=set"));
        assert!(!out.contains("hunter2"));
    }
}
