use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

use crate::config::{CollectorConfig, Credentials};
use crate::error::{CollectorError, Result};
use crate::models::CameraRecord;

pub const SESSION_HEADER: &str = "x-vsaas-session";
pub const PAGE_LIMIT_HEADER: &str = "X-Page-Limit";
pub const PAGE_OFFSET_HEADER: &str = "X-Page-Offset";

/// Session token returned by `POST /auth/login`.
///
/// Valid for the lifetime of one run; never refreshed.
#[derive(Clone, PartialEq, Eq)]
pub struct Session(String);

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Session(***)")
    }
}

/// Window requested from `GET /cameras`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
}

#[async_trait]
pub trait CameraApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<Session>;
    async fn fetch_page(&self, session: &Session, request: PageRequest) -> Result<Vec<CameraRecord>>;
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    login: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    session: Option<String>,
}

pub struct HttpCameraApi {
    base: Url,
    client: reqwest::Client,
}

impl HttpCameraApi {
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CollectorError::config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            base: config.base_url.clone(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| CollectorError::config(format!("invalid api endpoint {path}: {e}")))
    }
}

#[async_trait]
impl CameraApi for HttpCameraApi {
    #[instrument(skip_all, fields(login = %credentials.login))]
    async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let url = self.endpoint("auth/login")?;
        let resp = self
            .client
            .post(url)
            .json(&LoginRequest {
                login: &credentials.login,
                password: &credentials.password,
            })
            .send()
            .await
            .map_err(|e| CollectorError::authentication_request("login request failed", e))?;
        let resp = resp
            .error_for_status()
            .map_err(|e| CollectorError::authentication_request("login returned error status", e))?;
        let body: LoginResponse = resp
            .json()
            .await
            .map_err(|e| CollectorError::authentication_request("failed to parse login response", e))?;

        match body.session {
            Some(token) if !token.is_empty() => Ok(Session::new(token)),
            _ => Err(CollectorError::authentication(
                "login response carries no session token",
            )),
        }
    }

    #[instrument(skip_all, fields(limit = request.limit, offset = request.offset))]
    async fn fetch_page(&self, session: &Session, request: PageRequest) -> Result<Vec<CameraRecord>> {
        let offset = request.offset;
        let mut url = self.endpoint("cameras")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &request.limit.to_string());
            pairs.append_pair("offset", &offset.to_string());
        }

        let resp = self
            .client
            .get(url)
            .header(SESSION_HEADER, session.as_str())
            .header(PAGE_LIMIT_HEADER, request.limit.to_string())
            .header(PAGE_OFFSET_HEADER, offset.to_string())
            .send()
            .await
            .map_err(|source| CollectorError::PageFetch { offset, source })?;
        let resp = resp
            .error_for_status()
            .map_err(|source| CollectorError::PageFetch { offset, source })?;
        let body = resp
            .bytes()
            .await
            .map_err(|source| CollectorError::PageFetch { offset, source })?;

        serde_json::from_slice(&body).map_err(|source| CollectorError::MalformedPage { offset, source })
    }
}
