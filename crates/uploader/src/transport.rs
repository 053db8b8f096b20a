//! Single request/response cycle over `reqwest`.
//!
//! No retries happen here. Network failures come back as a typed
//! [`TransportError`]; any HTTP status, 4xx/5xx included, is a normal
//! [`HttpResponse`].

use std::error::Error as StdError;
use std::time::Duration;

use packsync_protocol::constants::{
    CONTENT_TYPE_JSON, CONTENT_TYPE_OCTET_STREAM, ENCODING_GZIP, HEADER_CHUNK_HASH,
};
use reqwest::Method;
use reqwest::header::{
    AUTHORIZATION, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue,
};
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::{ConfigError, TransportError, UploadError};

/// Status code and body text of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turns a non-2xx response into [`UploadError::Http`].
    pub fn error_for_status(self) -> Result<Self, UploadError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(UploadError::Http {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Authenticated HTTP client with one timeout for every request.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Builds the client with bearer auth and user agent as default headers.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.auth_token))
            .map_err(|_| ConfigError::InvalidToken)?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            timeout: config.timeout,
        })
    }

    /// Issues one request and reads the whole body as text.
    ///
    /// A 2xx body that cannot be read fails like the request itself did.
    /// An unreadable error-status body yields an empty string.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, TransportError> {
        let mut req = self.http.request(method, url).headers(headers);
        if let Some(body) = body {
            req = req.body(body);
        }

        let resp = req.send().await.map_err(|e| classify(&e, self.timeout))?;
        let status = resp.status().as_u16();
        let body = if resp.status().is_success() {
            resp.text().await.map_err(|e| classify(&e, self.timeout))?
        } else {
            resp.text().await.unwrap_or_default()
        };
        Ok(HttpResponse { status, body })
    }

    pub async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.request(Method::GET, url, HeaderMap::new(), None).await
    }

    /// POSTs `value` as a UTF-8 JSON body.
    pub async fn post_json<T: Serialize>(
        &self,
        url: &str,
        value: &T,
    ) -> Result<HttpResponse, UploadError> {
        let body = serde_json::to_vec(value)?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        Ok(self
            .request(Method::POST, url, headers, Some(body))
            .await?)
    }

    /// POSTs a chunk body with its digest, marking gzip bodies as such.
    pub async fn post_chunk(
        &self,
        url: &str,
        body: Vec<u8>,
        chunk_hash: &str,
        gzipped: bool,
    ) -> Result<HttpResponse, UploadError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(CONTENT_TYPE_OCTET_STREAM),
        );
        headers.insert(
            HeaderName::from_static(HEADER_CHUNK_HASH),
            HeaderValue::from_str(chunk_hash)
                .map_err(|_| UploadError::Protocol(format!("unusable chunk hash {chunk_hash}")))?,
        );
        if gzipped {
            headers.insert(CONTENT_ENCODING, HeaderValue::from_static(ENCODING_GZIP));
        }
        Ok(self
            .request(Method::POST, url, headers, Some(body))
            .await?)
    }

    /// POSTs with an empty body (`Content-Length: 0`).
    pub async fn post_empty(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
        self.request(Method::POST, url, headers, Some(Vec::new()))
            .await
    }
}

// ---------------------------------------------------------------------------
// Failure classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NetworkFailure {
    TimedOut,
    Resolution,
    Refused,
}

fn classify(err: &reqwest::Error, timeout: Duration) -> TransportError {
    let host = err
        .url()
        .and_then(|u| u.host_str())
        .unwrap_or("server")
        .to_string();
    let detail = error_chain(err);

    if err.is_timeout() {
        return TransportError::Timeout { after: timeout };
    }
    match classify_source(err) {
        Some(NetworkFailure::TimedOut) => TransportError::Timeout { after: timeout },
        Some(NetworkFailure::Resolution) => TransportError::HostResolution { host, detail },
        Some(NetworkFailure::Refused) => TransportError::ConnectionRefused { host, detail },
        None => TransportError::Other(detail),
    }
}

/// Walks the source chain looking for a known network failure.
fn classify_source(err: &(dyn StdError + 'static)) -> Option<NetworkFailure> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            match io.kind() {
                std::io::ErrorKind::ConnectionRefused => return Some(NetworkFailure::Refused),
                std::io::ErrorKind::TimedOut => return Some(NetworkFailure::TimedOut),
                _ => {}
            }
        }

        let text = e.to_string().to_ascii_lowercase();
        if text.contains("dns error")
            || text.contains("failed to lookup address")
            || text.contains("name or service not known")
            || text.contains("no such host")
        {
            return Some(NetworkFailure::Resolution);
        }
        if text.contains("connection refused") {
            return Some(NetworkFailure::Refused);
        }

        current = e.source();
    }
    None
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(e) = current {
        let text = e.to_string();
        if !parts.iter().any(|p| p.contains(&text)) {
            parts.push(text);
        }
        current = e.source();
    }
    parts.join(": ")
}
