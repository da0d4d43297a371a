use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use plume_store::{Store, keys};
use plume_types::models::{Session, Tenant, User};

use crate::error::ClientError;

/// Entry point every unauthenticated visitor lands on.
pub const LOGIN_PATH: &str = "/login";

/// Login URL that returns the user to `from` afterwards.
pub fn login_redirect(from: &str) -> String {
    if from.is_empty() || from == "/" || from.starts_with(LOGIN_PATH) {
        return LOGIN_PATH.to_string();
    }
    let encoded: String = url::form_urlencoded::byte_serialize(from.as_bytes()).collect();
    format!("{}?redirect={}", LOGIN_PATH, encoded)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// `restore()` has not finished yet
    Restoring,
    Anonymous,
    Authenticated,
}

struct SessionState {
    restored: bool,
    session: Option<Session>,
}

struct SessionInner {
    store: Arc<Store>,
    state: RwLock<SessionState>,
}

/// Shared session cell. The durable store is the source of truth; the
/// in-memory copy is a cache of it, written after the store.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<SessionInner>,
}

impl SessionHandle {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                store,
                state: RwLock::new(SessionState {
                    restored: false,
                    session: None,
                }),
            }),
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.inner.store
    }

    pub fn status(&self) -> SessionStatus {
        let state = self.inner.state.read().unwrap_or_else(PoisonError::into_inner);
        match (&state.session, state.restored) {
            (Some(_), _) => SessionStatus::Authenticated,
            (None, false) => SessionStatus::Restoring,
            (None, true) => SessionStatus::Anonymous,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated
    }

    pub fn current(&self) -> Option<Session> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .session
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .session
            .as_ref()
            .map(|s| s.token.clone())
    }

    /// Persist and cache a freshly issued session. Last write wins.
    pub fn establish(&self, session: Session) -> Result<(), ClientError> {
        let user = serde_json::to_string(&session.user).map_err(|e| ClientError::Decode(e.to_string()))?;
        let tenant = serde_json::to_string(&session.tenant).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.inner
            .store
            .put_many(&[
                (keys::AUTH_TOKEN, session.token.clone()),
                (keys::AUTH_USER, user),
                (keys::AUTH_TENANT, tenant),
            ])
            .map_err(ClientError::storage)?;

        let mut state = self.inner.state.write().unwrap_or_else(PoisonError::into_inner);
        state.restored = true;
        state.session = Some(session);
        Ok(())
    }

    /// Refresh the cached user (and tenant when the backend sent one) without
    /// touching the token.
    pub fn update_profile(&self, user: User, tenant: Option<Tenant>) -> Result<(), ClientError> {
        let Some(mut session) = self.current() else {
            return Ok(());
        };
        session.user = user;
        if let Some(tenant) = tenant {
            session.tenant = tenant;
        }
        self.establish(session)
    }

    /// Drop the session from memory and durable storage. Idempotent.
    ///
    /// Memory is cleared even when the store write fails, so the caller is
    /// logged out either way. Returns whether a session was present.
    pub fn clear(&self) -> Result<bool, ClientError> {
        let had_session = {
            let mut state = self.inner.state.write().unwrap_or_else(PoisonError::into_inner);
            state.restored = true;
            state.session.take().is_some()
        };

        self.inner
            .store
            .delete_many(&[keys::AUTH_TOKEN, keys::AUTH_USER, keys::AUTH_TENANT])
            .map_err(ClientError::storage)?;
        Ok(had_session)
    }

    /// Hydrate memory from durable storage. Does not contact the server.
    ///
    /// A token without a readable user and tenant is treated as no session at
    /// all and the leftovers are removed.
    pub fn restore(&self) -> Result<Option<Session>, ClientError> {
        let store = &self.inner.store;
        let token = store.get(keys::AUTH_TOKEN).map_err(ClientError::storage)?;

        let session = match token.filter(|t| !t.is_empty()) {
            Some(token) => {
                let user = store.get_json::<User>(keys::AUTH_USER);
                let tenant = store.get_json::<Tenant>(keys::AUTH_TENANT);
                match (user, tenant) {
                    (Ok(Some(user)), Ok(Some(tenant))) => Some(Session { token, user, tenant }),
                    (user, tenant) => {
                        if let Err(e) = user.and(tenant) {
                            warn!("Discarding unreadable cached session: {:#}", e);
                        } else {
                            warn!("Discarding cached token without user/tenant");
                        }
                        store
                            .delete_many(&[keys::AUTH_TOKEN, keys::AUTH_USER, keys::AUTH_TENANT])
                            .map_err(ClientError::storage)?;
                        None
                    }
                }
            }
            None => None,
        };

        if let Some(s) = &session {
            info!(user_id = %s.user.id, tenant_id = %s.tenant.id, "Session restored from local storage");
        }

        let mut state = self.inner.state.write().unwrap_or_else(PoisonError::into_inner);
        state.restored = true;
        state.session = session.clone();
        Ok(session)
    }
}
