use std::sync::{Arc, PoisonError, RwLock};

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use plume_types::api::ErrorBody;
use plume_types::events::SessionEvent;

use crate::config::{ClientConfig, TENANT_HEADER};
use crate::dispatcher::SessionEvents;
use crate::error::{AuthError, ClientError, fallback_message};
use crate::session::{SessionHandle, login_redirect};

struct ApiClientInner {
    http: Client,
    config: ClientConfig,
    session: SessionHandle,
    events: SessionEvents,
    /// Path the user is looking at, used as the post-login return target.
    current_path: RwLock<String>,
}

/// The one configured request path to the backend.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

impl ApiClient {
    pub fn new(
        config: ClientConfig,
        session: SessionHandle,
        events: SessionEvents,
    ) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                config,
                session,
                events,
                current_path: RwLock::new("/".into()),
            }),
        })
    }

    pub fn session(&self) -> &SessionHandle {
        &self.inner.session
    }

    pub fn events(&self) -> &SessionEvents {
        &self.inner.events
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn set_current_path(&self, path: &str) {
        *self.inner.current_path.write().unwrap_or_else(PoisonError::into_inner) = path.to_string();
    }

    pub fn current_path(&self) -> String {
        self.inner.current_path.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    // -- Authenticated calls --

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self.send(self.request(Method::GET, path)).await?;
        decode(resp).await
    }

    pub async fn get_query<Q, T>(&self, path: &str, query: &Q) -> Result<T, ClientError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send(self.request(Method::GET, path).query(query)).await?;
        decode(resp).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send(self.request(Method::POST, path).json(body)).await?;
        decode(resp).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send(self.request(Method::PUT, path).json(body)).await?;
        decode(resp).await
    }

    /// DELETE; any response body is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    // -- Unauthenticated calls --

    /// POST without credentials. A 401 here is a plain rejection, not an
    /// expired session, so it never triggers the forced logout.
    pub async fn post_public<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.inner.config.url(path);
        debug!("POST {} (public)", url);
        let resp = self
            .inner
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            let message = error_message(resp).await;
            return Err(AuthError::Rejected { message }.into());
        }
        if !status.is_success() {
            let message = error_message(resp).await;
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }
        decode(resp).await
    }

    // -- Plumbing --

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.inner.config.url(path);
        debug!("{} {}", method, url);
        let builder = self.inner.http.request(method, url);
        self.authorize(builder)
    }

    /// Attach bearer token and, off the tenant's canonical host, the tenant id.
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let Some(session) = self.inner.session.current() else {
            return builder;
        };
        let mut builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", session.token));
        if self.inner.config.needs_tenant_header(&session.tenant) {
            builder = builder.header(TENANT_HEADER, session.tenant.id.as_str());
        }
        builder
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            self.force_logout();
            return Err(AuthError::SessionExpired.into());
        }
        if !status.is_success() {
            let message = error_message(resp).await;
            warn!(status = status.as_u16(), "Request failed: {}", message);
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp)
    }

    /// Global reaction to a 401: drop the session no matter which call saw
    /// it and send the shell to the login page.
    fn force_logout(&self) {
        match self.inner.session.clear() {
            Ok(true) => info!("Session rejected by server; logged out"),
            Ok(false) => debug!("401 received with no active session"),
            Err(e) => warn!("Failed to clear stored session after 401: {}", e),
        }
        let redirect = login_redirect(&self.current_path());
        self.inner.events.broadcast(SessionEvent::Expired { redirect });
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| ClientError::Network(e.to_string()))?;
    // Empty bodies (204) decode as JSON null so `()` and `Option<_>` work.
    let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
    serde_json::from_slice(body).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Server-provided message, or a fallback for the status.
async fn error_message(resp: Response) -> String {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| fallback_message(status).to_string())
}
