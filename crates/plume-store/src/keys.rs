/// Bearer token of the current session.
pub const AUTH_TOKEN: &str = "auth_token";
/// Cached user JSON.
pub const AUTH_USER: &str = "auth_user";
/// Cached tenant JSON.
pub const AUTH_TENANT: &str = "auth_tenant";
/// Unsent composer draft snapshot.
pub const POST_DRAFT: &str = "post_draft";
