//! OData Client module
//!
//! HTTP client for the business partner OData service.
//! Handles the CSRF session handshake and the identity lookup.

use super::query::IdentityQuery;
use super::session::{SessionArtifacts, CSRF_TOKEN_HEADER};
use crate::auth::BasicCredentials;
use reqwest::header::{self, HeaderMap, HeaderValue, InvalidHeaderValue};
use reqwest::{Client, Identity, Method, Response};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// OData client errors
#[derive(Error, Debug)]
pub enum ODataError {
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("No response received from server for {method} {url}: {source}")]
    NoResponse {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("Could not obtain session cookies. Check the URL and the credentials.")]
    MissingSessionCookies,
}

/// Which reporting path an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server answered with an error status
    HttpResponse,
    /// The request went out but nothing came back
    NoResponse,
    /// Anything that failed locally
    Local,
}

impl ODataError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ODataError::ServerError(..) => FailureKind::HttpResponse,
            ODataError::NoResponse { .. } => FailureKind::NoResponse,
            _ => FailureKind::Local,
        }
    }

    /// Sort a `send()` failure into "never sent" (local) or "no response"
    fn from_send(err: reqwest::Error, method: Method, url: &str) -> Self {
        if err.is_builder() {
            ODataError::HttpError(err)
        } else {
            ODataError::NoResponse {
                method,
                url: url.to_string(),
                source: err,
            }
        }
    }
}

/// OData error envelope (v2 nests the message under `value`)
#[derive(Debug, Deserialize)]
struct ODataErrorEnvelope {
    error: ODataErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ODataErrorDetail {
    #[serde(default)]
    code: Option<String>,
    message: ODataErrorMessage,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ODataErrorMessage {
    Plain(String),
    Localized { value: String },
}

/// One-line summary of an OData error body, if the body is one
pub fn summarize_error_body(body: &str) -> Option<String> {
    let envelope: ODataErrorEnvelope = serde_json::from_str(body).ok()?;
    let message = match envelope.error.message {
        ODataErrorMessage::Plain(m) => m,
        ODataErrorMessage::Localized { value } => value,
    };

    Some(match envelope.error.code {
        Some(code) => format!("{}: {}", code, message),
        None => message,
    })
}

/// OData client for the business partner service
#[derive(Debug)]
pub struct ODataClient {
    csrf_fetch_url: String,
    api_base_url: String,
    http_client: Client,
}

impl ODataClient {
    /// Create a new OData client
    ///
    /// # Arguments
    /// * `csrf_fetch_url` - URL answering `X-CSRF-Token: Fetch` with a token and session cookies
    /// * `api_base_url` - Service root of the business partner API
    /// * `credentials` - Basic auth credentials sent with every request
    /// * `identity` - Client certificate for mutual TLS
    pub fn new(
        csrf_fetch_url: String,
        api_base_url: String,
        credentials: &BasicCredentials,
        identity: Option<Identity>,
    ) -> Result<Self, ODataError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(header::AUTHORIZATION, credentials.header_value()?);
        default_headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .use_native_tls()
            .default_headers(default_headers);

        if let Some(identity) = identity {
            builder = builder.identity(identity);
        }

        let http_client = builder.build().map_err(ODataError::ClientBuild)?;

        Ok(Self {
            csrf_fetch_url,
            api_base_url,
            http_client,
        })
    }

    pub fn csrf_fetch_url(&self) -> &str {
        &self.csrf_fetch_url
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Request a CSRF token and session cookies
    pub async fn fetch_session(&self) -> Result<SessionArtifacts, ODataError> {
        tracing::debug!("Fetching CSRF token from {}", self.csrf_fetch_url);

        let response = self
            .http_client
            .get(&self.csrf_fetch_url)
            .header(CSRF_TOKEN_HEADER, "Fetch")
            .send()
            .await
            .map_err(|e| ODataError::from_send(e, Method::GET, &self.csrf_fetch_url))?;

        let response = ensure_success(response).await?;
        let session = SessionArtifacts::from_headers(response.headers())?;

        tracing::debug!(
            "Session established: {} cookie(s), csrf token issued: {}",
            session.cookies.len(),
            session.csrf_token.is_some()
        );

        Ok(session)
    }

    /// Look up business partners by identity using an established session
    ///
    /// The CSRF token is only sent when `attach_csrf` is set; read-only OData
    /// calls do not need it.
    pub async fn find_business_partner_by_identity(
        &self,
        session: &SessionArtifacts,
        query: &IdentityQuery,
        attach_csrf: bool,
    ) -> Result<Value, ODataError> {
        let url = self.identity_query_url(query);
        tracing::debug!("Querying: {}", url);

        let mut request = self
            .http_client
            .get(&url)
            .header(header::COOKIE, session.cookie_header()?);

        if attach_csrf {
            match session.csrf_token {
                Some(ref token) => request = request.header(CSRF_TOKEN_HEADER, token),
                None => tracing::warn!("CSRF token requested but the server did not issue one"),
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| ODataError::from_send(e, Method::GET, &url))?;

        let response = ensure_success(response).await?;

        let body = response.text().await?;
        Ok(parse_payload(body))
    }

    /// URL of the identity lookup for this service
    pub fn identity_query_url(&self, query: &IdentityQuery) -> String {
        query.to_url(&self.api_base_url)
    }
}

/// JSON payloads are parsed; anything else is kept as a JSON string
fn parse_payload(body: String) -> Value {
    match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("Response body is not JSON ({}), keeping it as text", e);
            Value::String(body)
        }
    }
}

async fn ensure_success(response: Response) -> Result<Response, ODataError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!("Request failed: {} - {}", status, body);
    Err(ODataError::ServerError(status.as_u16(), body))
}
