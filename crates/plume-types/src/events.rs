use serde::{Deserialize, Serialize};

/// Session lifecycle events broadcast to whatever renders the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SessionEvent {
    /// A login or registration succeeded
    LoggedIn { user_id: String, tenant_id: String },

    /// The user logged out on purpose
    LoggedOut,

    /// An authenticated call came back 401; the session is gone and the
    /// shell must navigate to `redirect`
    Expired { redirect: String },
}
