use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{AuthorizationUrl, OAuthAppCredentials, Post, Session, Tenant, User};

// -- Auth --

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body returned by both `/auth/login` and `/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
    pub tenant: Tenant,
}

impl From<AuthResponse> for Session {
    fn from(resp: AuthResponse) -> Self {
        Session {
            token: resp.token,
            user: resp.user,
            tenant: resp.tenant,
        }
    }
}

/// `/users/me` may or may not embed the tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: User,
    #[serde(default)]
    pub tenant: Option<Tenant>,
}

// -- Errors --

/// Error payload the backend sends on non-2xx responses. Different endpoints
/// use `message` or `error`, and validation failures send `message` as a list,
/// so both fields are kept loose and read in [`ErrorBody::into_message`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl ErrorBody {
    /// `message` first, then `error`; whichever yields text.
    pub fn into_message(self) -> Option<String> {
        self.message
            .and_then(text_of)
            .or_else(|| self.error.and_then(text_of))
    }
}

/// A string, or a list of strings joined with "; ". Anything else is ignored.
fn text_of(value: Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        _ => return None,
    };
    Some(text).filter(|t| !t.is_empty())
}

// -- Posts --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub content: String,
    pub networks: Vec<String>,
    pub media_urls: Vec<String>,
    /// ISO-8601; absent means publish immediately.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub networks: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostList {
    pub posts: Vec<Post>,
}

// -- OAuth apps --

/// Tenant OAuth configuration keyed by network identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthAppConfig {
    #[serde(default)]
    pub apps: BTreeMap<String, OAuthAppCredentials>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationUrls {
    #[serde(default)]
    pub urls: Vec<AuthorizationUrl>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_post_omits_missing_schedule() {
        let req = CreatePostRequest {
            content: "hi".into(),
            networks: vec!["twitter".into()],
            media_urls: vec![],
            scheduled_at: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"content": "hi", "networks": ["twitter"], "mediaUrls": []})
        );
    }

    #[test]
    fn error_body_prefers_message() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message": "Invalid credentials", "error": "x"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Invalid credentials"));

        let body: ErrorBody = serde_json::from_str(r#"{"error": "  "}"#).unwrap();
        assert_eq!(body.into_message(), None);
    }

    #[test]
    fn error_body_accepts_message_lists() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"statusCode":400,"message":["content must be shorter than 2200 characters"],"error":"Bad Request"}"#,
        )
        .unwrap();
        assert_eq!(
            body.into_message().as_deref(),
            Some("content must be shorter than 2200 characters")
        );

        let body: ErrorBody =
            serde_json::from_str(r#"{"message":["name is required", " ", "email is invalid"]}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("name is required; email is invalid"));
    }

    #[test]
    fn unusable_message_falls_back_to_error() {
        let body: ErrorBody = serde_json::from_str(r#"{"message": {"code": 7}, "error": "Conflict"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Conflict"));

        let body: ErrorBody = serde_json::from_str(r#"{"message": [], "error": "Bad Request"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Bad Request"));
    }
}
