//! HTTP transport to the gateway API.
//!
//! Owns bearer-token injection, the status-code-to-error-kind mapping,
//! and response decoding. The token is read from the session manager at
//! the start of every authenticated request and never cached across
//! operations; a 401 from the gateway tears the session down on the spot
//! so no stale authorization header survives it.

pub mod envelope;

use std::sync::Arc;

use bytes::Bytes;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use smsadmin_core::config::api::ApiConfig;
use smsadmin_core::error::{AppError, ErrorKind};
use smsadmin_session::SessionManager;

pub use envelope::normalize_page;

/// Shared HTTP transport for all gateway clients.
#[derive(Clone)]
pub struct ApiTransport {
    base_url: String,
    http: reqwest::Client,
    session: Arc<SessionManager>,
}

impl std::fmt::Debug for ApiTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiTransport")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ApiTransport {
    /// Creates a transport against the configured gateway origin.
    pub fn new(config: &ApiConfig, session: Arc<SessionManager>) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build HTTP client: {e}"),
                    e,
                )
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            session,
        })
    }

    /// The session manager this transport authenticates with.
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Builds an authenticated request, reading the token now.
    ///
    /// Fails closed with an authentication error before any network
    /// activity when no valid token exists.
    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, AppError> {
        let token = self.session.bearer_token()?;
        Ok(self
            .http
            .request(method, self.url(path))
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json"))
    }

    async fn send(&self, req: RequestBuilder, authed: bool) -> Result<Response, AppError> {
        let resp = req.send().await.map_err(|e| {
            AppError::with_source(ErrorKind::Network, format!("Request failed: {e}"), e)
        })?;
        self.check_status(resp, authed).await
    }

    /// Maps non-2xx statuses onto the console error taxonomy.
    async fn check_status(&self, resp: Response, authed: bool) -> Result<Response, AppError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body: Value = resp.json().await.unwrap_or(Value::Null);
        let message = body
            .get("message")
            .or_else(|| body.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string);

        debug!(status = %status, message = ?message, "Gateway rejected request");

        let err = match status {
            StatusCode::UNAUTHORIZED => {
                if authed {
                    // The gateway no longer honors this token.
                    self.session.logout();
                }
                AppError::authentication(
                    message.unwrap_or_else(|| "Session expired or unauthorized".into()),
                )
            }
            StatusCode::FORBIDDEN => AppError::authorization(
                message.unwrap_or_else(|| "Insufficient role for this action".into()),
            ),
            StatusCode::NOT_FOUND => {
                AppError::not_found(message.unwrap_or_else(|| "Resource not found".into()))
            }
            StatusCode::CONFLICT => {
                AppError::conflict(message.unwrap_or_else(|| "Conflicting state".into()))
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                AppError::validation(message.unwrap_or_else(|| "Invalid request".into()))
            }
            s => AppError::external_service(
                message.unwrap_or_else(|| format!("Gateway error ({s})")),
            ),
        };
        Err(err)
    }

    /// Authenticated GET decoding a JSON body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let req = self.authed(Method::GET, path)?.query(query);
        let resp = self.send(req, true).await?;
        Self::decode(resp).await
    }

    /// Authenticated GET returning the raw response bytes (PDF streams).
    pub async fn get_bytes(&self, path: &str) -> Result<Bytes, AppError> {
        let req = self.authed(Method::GET, path)?;
        let resp = self.send(req, true).await?;
        resp.bytes().await.map_err(|e| {
            AppError::with_source(ErrorKind::Network, format!("Failed to read body: {e}"), e)
        })
    }

    /// Authenticated POST with an optional JSON body, decoding a JSON
    /// response.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, AppError> {
        let mut req = self.authed(Method::POST, path)?.query(query);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = self.send(req, true).await?;
        Self::decode(resp).await
    }

    /// Authenticated POST where the response body is ignored (action
    /// endpoints returning nothing useful).
    pub async fn post_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), AppError> {
        let mut req = self.authed(Method::POST, path)?;
        if let Some(body) = body {
            req = req.json(body);
        }
        self.send(req, true).await?;
        Ok(())
    }

    /// Authenticated PATCH with a JSON body, ignoring the response.
    pub async fn patch_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), AppError> {
        let req = self.authed(Method::PATCH, path)?.json(body);
        self.send(req, true).await?;
        Ok(())
    }

    /// Authenticated PUT with a JSON body, ignoring the response.
    pub async fn put_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), AppError> {
        let req = self.authed(Method::PUT, path)?.json(body);
        self.send(req, true).await?;
        Ok(())
    }

    /// Unauthenticated POST (login). A 401 here is bad credentials, not a
    /// dead session, so the stored session is left untouched.
    pub async fn post_public<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let req = self
            .http
            .post(self.url(path))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body);
        let resp = self.send(req, false).await?;
        Self::decode(resp).await
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, AppError> {
        resp.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Failed to decode response: {e}"),
                e,
            )
        })
    }
}
