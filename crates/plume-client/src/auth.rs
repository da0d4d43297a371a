use tracing::{info, warn};

use plume_types::api::{AuthResponse, LoginRequest, RegisterRequest};
use plume_types::events::SessionEvent;
use plume_types::models::{Session, User};
use plume_types::validation::ValidationErrors;

use crate::error::{AuthError, ClientError};
use crate::http::ApiClient;
use crate::session::SessionHandle;
use crate::users;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Registration form as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Every field problem at once, in form order.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.name.trim().is_empty() {
            errors.push("name", "Name is required");
        }
        if let Err(message) = check_email(&self.email) {
            errors.push("email", message);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            );
        }
        if self.password != self.confirm_password {
            errors.push("confirmPassword", "Passwords do not match");
        }

        errors.into_result()
    }
}

fn check_email(email: &str) -> Result<(), &'static str> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Email is required");
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => Ok(()),
        _ => Err("Enter a valid email address"),
    }
}

/// Login/register/logout/restore over a shared [`SessionHandle`].
///
/// Constructed once at startup and handed to whatever needs it; there is no
/// global instance.
#[derive(Clone)]
pub struct SessionStore {
    client: ApiClient,
}

impl SessionStore {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn handle(&self) -> &SessionHandle {
        self.client.session()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let mut errors = ValidationErrors::new();
        if let Err(message) = check_email(email) {
            errors.push("email", message);
        }
        if password.is_empty() {
            errors.push("password", "Password is required");
        }
        errors.into_result()?;

        let req = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let resp: AuthResponse = self
            .client
            .post_public("/auth/login", &req)
            .await
            .map_err(reject_client_errors)?;
        self.accept(resp)
    }

    pub async fn register(&self, form: &RegistrationForm) -> Result<Session, ClientError> {
        form.validate()?;

        let req = RegisterRequest {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form.password.clone(),
        };
        let resp: AuthResponse = self
            .client
            .post_public("/auth/register", &req)
            .await
            .map_err(reject_client_errors)?;
        self.accept(resp)
    }

    /// Clear memory and durable state. Safe to call repeatedly.
    pub fn logout(&self) -> Result<(), ClientError> {
        if self.handle().clear()? {
            info!("Logged out");
            self.client.events().broadcast(SessionEvent::LoggedOut);
        }
        Ok(())
    }

    /// Startup hydration from durable storage; trusts the cache until a
    /// request proves it stale.
    pub fn restore(&self) -> Result<Option<Session>, ClientError> {
        self.handle().restore()
    }

    /// Ask the backend who the token belongs to and refresh the cache. A 401
    /// goes through the usual forced-logout path.
    pub async fn revalidate(&self) -> Result<User, ClientError> {
        let me = users::me(&self.client).await?;
        self.handle().update_profile(me.user.clone(), me.tenant)?;
        Ok(me.user)
    }

    fn accept(&self, resp: AuthResponse) -> Result<Session, ClientError> {
        if resp.token.is_empty() {
            warn!("Auth response carried an empty token");
            return Err(ClientError::Decode("missing token in auth response".into()));
        }
        let session = Session::from(resp);
        self.handle().establish(session.clone())?;

        info!(user_id = %session.user.id, tenant_id = %session.tenant.id, "Logged in");
        self.client.events().broadcast(SessionEvent::LoggedIn {
            user_id: session.user.id.clone(),
            tenant_id: session.tenant.id.clone(),
        });
        Ok(session)
    }
}

/// 4xx answers from the auth endpoints are the user's problem, not the
/// server's: surface them as rejections with the server's wording.
fn reject_client_errors(err: ClientError) -> ClientError {
    match err {
        ClientError::Server { status, message } if (400..500).contains(&status) => {
            AuthError::Rejected { message }.into()
        }
        other => other,
    }
}
