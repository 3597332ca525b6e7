//! Authenticated transport to the Confluence REST API.
//!
//! [`ConfluenceClient`] owns one pooled HTTP client and the endpoint
//! descriptor. Every operation goes through [`ConfluenceClient::execute_request`];
//! [`ConfluenceClient::do_request`] and [`ConfluenceClient::get_json`] are the
//! two ways a response body is consumed.

mod error;

pub use error::TransportError;

use crate::config::{ConfluenceConfig, HttpSettings};
use crate::models::QuerySpec;
use crate::observability::current_request_id;
use crate::{Error, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Response};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Maximum number of error-body bytes captured by [`ConfluenceClient::get_json`].
pub const ERROR_BODY_CAP: usize = 1024;

const USER_AGENT: &str = concat!("confluence-mcp/", env!("CARGO_PKG_VERSION"));
const JSON: &str = "application/json";

/// Builds the pooled async HTTP client with the configured timeouts.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the TLS backend cannot be initialized.
pub fn build_http_client(settings: HttpSettings) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .pool_max_idle_per_host(10);
    if settings.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(settings.timeout_ms));
    }
    if settings.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(settings.connect_timeout_ms));
    }

    builder.build().map_err(|e| Error::OperationFailed {
        operation: "build_http_client".to_string(),
        cause: e.to_string(),
    })
}

/// Shared, cheaply clonable Confluence transport.
#[derive(Clone)]
pub struct ConfluenceClient {
    config: Arc<ConfluenceConfig>,
    http: reqwest::Client,
}

impl ConfluenceClient {
    /// Creates a client owning `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the HTTP client cannot be built.
    pub fn new(config: ConfluenceConfig, settings: HttpSettings) -> Result<Self> {
        Ok(Self {
            config: Arc::new(config),
            http: build_http_client(settings)?,
        })
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.config.base_url()
    }

    /// Joins a relative operation path onto the base URL path.
    ///
    /// `relative` is split on `/` and each piece is appended as one encoded
    /// segment: `%`, `\`, `?` and `#` are escaped and `.`/`..` pieces are
    /// dropped, so the result always stays under the base path.
    #[must_use]
    pub fn endpoint(&self, relative: &str) -> Url {
        let mut url = self.config.base_url().clone();
        url.set_query(None);
        url.set_fragment(None);
        // http(s) base URLs always have path segments.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(relative.split('/').filter(|s| !s.is_empty()));
        }
        url
    }

    /// Performs one authenticated request and hands back the live response.
    ///
    /// The body, when given, is serialized before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::EncodingFailed`] if `body` cannot be
    /// serialized, or [`TransportError::NetworkFailed`] if no response is
    /// received.
    pub async fn execute_request<B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&QuerySpec>,
        body: Option<&B>,
    ) -> std::result::Result<Response, TransportError>
    where
        B: Serialize + ?Sized,
    {
        let payload = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| TransportError::EncodingFailed(e.to_string()))?;

        let url = self.endpoint(path);
        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(self.config.token().expose_secret())
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON);

        if let Some(query) = query.filter(|q| !q.is_empty()) {
            request = request.query(query);
        }
        if let Some(payload) = payload {
            request = request.body(payload);
        }

        let start = Instant::now();
        let result = request.send().await;
        let elapsed_ms = start.elapsed().as_millis();
        let request_id = current_request_id().unwrap_or_default();

        match result {
            Ok(response) => {
                let status = response.status().as_u16();
                tracing::debug!(
                    method = %method,
                    path = path,
                    status = status,
                    request_id = %request_id,
                    elapsed_ms = elapsed_ms,
                    "Confluence request completed"
                );
                metrics::counter!(
                    "confluence_http_requests_total",
                    "method" => method.to_string(),
                    "status" => status.to_string()
                )
                .increment(1);
                Ok(response)
            },
            Err(e) => {
                let err = TransportError::network(&e);
                tracing::warn!(
                    method = %method,
                    path = path,
                    error = %err,
                    is_timeout = e.is_timeout(),
                    is_connect = e.is_connect(),
                    request_id = %request_id,
                    elapsed_ms = elapsed_ms,
                    "Confluence request failed"
                );
                metrics::counter!(
                    "confluence_http_requests_total",
                    "method" => method.to_string(),
                    "status" => "error"
                )
                .increment(1);
                Err(err)
            },
        }
    }

    /// Performs a request and returns the full response body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::RemoteError`] with the full body for status
    /// 400 and above, or the failures of [`Self::execute_request`]. A body
    /// that ends early is a [`TransportError::NetworkFailed`].
    pub async fn do_request<B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&QuerySpec>,
        body: Option<&B>,
    ) -> std::result::Result<Vec<u8>, TransportError>
    where
        B: Serialize + ?Sized,
    {
        let response = self.execute_request(method, path, query, body).await?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::network(&e))?;

        if status >= 400 {
            return Err(TransportError::RemoteError {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(bytes.to_vec())
    }

    /// Performs a GET and decodes the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::RemoteError`] with at most
    /// [`ERROR_BODY_CAP`] bytes of body for status 400 and above, or
    /// [`TransportError::DecodeFailed`] if the body is not valid JSON for `T`.
    pub async fn get_json<T>(
        &self,
        path: &str,
        query: Option<&QuerySpec>,
    ) -> std::result::Result<T, TransportError>
    where
        T: DeserializeOwned,
    {
        let response = self.execute_request::<()>(Method::GET, path, query, None).await?;
        let status = response.status().as_u16();

        if status >= 400 {
            let body = read_capped(response, ERROR_BODY_CAP).await;
            return Err(TransportError::RemoteError {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::network(&e))?;
        serde_json::from_slice(&bytes).map_err(|e| TransportError::DecodeFailed(e.to_string()))
    }

    /// GET returning the raw body.
    ///
    /// # Errors
    ///
    /// See [`Self::do_request`].
    pub async fn get(
        &self,
        path: &str,
        query: &QuerySpec,
    ) -> std::result::Result<Vec<u8>, TransportError> {
        self.do_request::<()>(Method::GET, path, Some(query), None).await
    }

    /// POST a JSON body, returning the raw response body.
    ///
    /// # Errors
    ///
    /// See [`Self::do_request`].
    pub async fn post<B>(&self, path: &str, body: &B) -> std::result::Result<Vec<u8>, TransportError>
    where
        B: Serialize + ?Sized,
    {
        self.do_request(Method::POST, path, None, Some(body)).await
    }

    /// PUT a JSON body, returning the raw response body.
    ///
    /// # Errors
    ///
    /// See [`Self::do_request`].
    pub async fn put<B>(&self, path: &str, body: &B) -> std::result::Result<Vec<u8>, TransportError>
    where
        B: Serialize + ?Sized,
    {
        self.do_request(Method::PUT, path, None, Some(body)).await
    }
}

impl std::fmt::Debug for ConfluenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfluenceClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Reads at most `cap` bytes of the body; stops quietly on read errors.
async fn read_capped(mut response: Response, cap: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    while buf.len() < cap {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let take = (cap - buf.len()).min(chunk.len());
                buf.extend_from_slice(&chunk[..take]);
            },
            Ok(None) | Err(_) => break,
        }
    }
    buf
}
