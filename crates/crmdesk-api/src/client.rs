// CRM API HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, bearer-token injection
// from the injected `SessionStore`, and uniform response handling. The
// per-resource endpoints live in `resource.rs` on top of these verbs.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::error::Error;
use crate::models::{LoginRequest, LoginResponse, RawLoginResponse};
use crate::resource::{Clients, Payments, ResourceClient, Users};
use crate::session::SessionStore;
use crate::transport::{ClientConfig, normalize_base_url};

/// Async client for the CRM REST API.
///
/// Cheaply cloneable. Every request asks the session store for the current
/// token and, when one is present, sends `Authorization: Bearer <token>`.
/// Calls are attempted exactly once; retries are the caller's decision.
#[derive(Clone)]
pub struct CrmClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<dyn SessionStore>,
}

impl CrmClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a client config, constructing the HTTP client from its
    /// transport settings.
    pub fn new(config: &ClientConfig, session: Arc<dyn SessionStore>) -> Result<Self, Error> {
        let http = config.transport.build_client()?;
        Ok(Self::with_client(http, config.base_url.clone(), session))
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: normalize_base_url(base_url),
                session,
            }),
        }
    }

    /// The API root every endpoint path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The session store this client reads its token from.
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.inner.session
    }

    // ── Resource clients ─────────────────────────────────────────────

    pub fn users(&self) -> ResourceClient<Users> {
        ResourceClient::new(self.clone())
    }

    pub fn clients(&self) -> ResourceClient<Clients> {
        ResourceClient::new(self.clone())
    }

    pub fn payments(&self) -> ResourceClient<Payments> {
        ResourceClient::new(self.clone())
    }

    // ── Authentication ───────────────────────────────────────────────

    /// `POST /auth/login`. On success the token (and the returned account)
    /// are written to the session store before this returns. If the store
    /// rejects either write, the session is cleared and the error returned.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, Error> {
        let raw: RawLoginResponse = self.post("auth/login", credentials).await?;
        let response = LoginResponse::from(raw);

        let stored = self
            .inner
            .session
            .set_user(&response.user)
            .and_then(|()| self.inner.session.set_token(response.token.clone()));
        if let Err(e) = stored {
            // Never leave a token without its user, or the reverse.
            let _ = self.inner.session.clear_token();
            return Err(e);
        }
        info!(user_id = response.user.id, role = %response.user.role, "logged in");

        Ok(response)
    }

    /// Drop the local session. Purely client-side: no request is sent.
    pub fn logout(&self) -> Result<(), Error> {
        self.inner.session.clear_token()?;
        info!("logged out");
        Ok(())
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"user/3"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.inner.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, Error> {
        let url = self.url(path)?;
        debug!("{method} {url}");

        let mut builder = self.inner.http.request(method, url);
        if let Some(token) = self.inner.session.token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| Error::Session(format!("token is not a valid header value: {e}")))?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }
        Ok(builder)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let resp = self.request(Method::GET, path)?.send().await?;
        handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let resp = self.request(Method::POST, path)?.json(body).send().await?;
        handle_response(resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let resp = self.request(Method::PUT, path)?.json(body).send().await?;
        handle_response(resp).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), Error> {
        let resp = self.request(Method::DELETE, path)?.send().await?;
        handle_empty(resp).await
    }
}

impl std::fmt::Debug for CrmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrmClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if !status.is_success() {
        return Err(request_failed(status, resp).await);
    }

    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Decode {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(request_failed(status, resp).await)
    }
}

async fn request_failed(status: StatusCode, resp: reqwest::Response) -> Error {
    let raw = resp.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), "request failed");

    Error::RequestFailed {
        status: status.as_u16(),
        message: if raw.trim().is_empty() {
            status.to_string()
        } else {
            raw
        },
    }
}
