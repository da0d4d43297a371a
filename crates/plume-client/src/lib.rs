//! Typed client for the Plume scheduling backend.
//!
//! [`ApiClient`] is the single configured request path: it attaches the
//! bearer token and tenant header from the shared [`SessionHandle`] and turns
//! any 401 on an authenticated call into a forced logout.

pub mod accounts;
pub mod auth;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod oauth_apps;
pub mod posts;
pub mod session;
pub mod users;

pub use auth::{RegistrationForm, SessionStore};
pub use config::ClientConfig;
pub use dispatcher::SessionEvents;
pub use error::{AuthError, ClientError};
pub use http::ApiClient;
pub use session::{SessionHandle, SessionStatus};
