//! Public entry points of the upload client.

use std::fmt::Display;
use std::sync::Arc;

use packsync_protocol::{CheckUploadResponse, Endpoints, UploadKind};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::ClientConfig;
use crate::error::{ConfigError, UploadError};
use crate::progress::ProgressListener;
use crate::session::{SessionSummary, UploadSession};
use crate::transport::HttpTransport;
use crate::types::{UploadOutcome, UploadResult};

/// Uploads payloads for one modpack.
///
/// Cheap to clone; clones share the HTTP connection pool. Holds no
/// per-upload state, so uploads of different payloads may run
/// concurrently on the same client.
#[derive(Clone)]
pub struct UploadClient {
    transport: HttpTransport,
    config: Arc<ClientConfig>,
}

impl UploadClient {
    /// Validates `config` and builds the HTTP client.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Ok(Self {
            transport,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether the server already holds a finished upload of `kind` for
    /// `version`.
    ///
    /// Any failure counts as "not there", so callers fall through to a
    /// normal upload.
    pub async fn exists(&self, version: &str, kind: UploadKind) -> bool {
        self.query_exists(version, kind).await.unwrap_or(false)
    }

    async fn query_exists(&self, version: &str, kind: UploadKind) -> Option<bool> {
        let url = self.config.endpoints(version).check(kind);
        let resp = match self.transport.get(&url).await {
            Ok(resp) => resp,
            Err(e) => {
                debug!(%url, error = %e, "existence check failed");
                return None;
            }
        };
        if !resp.is_success() {
            debug!(%url, status = resp.status, "existence check rejected");
            return None;
        }
        match serde_json::from_str::<CheckUploadResponse>(&resp.body) {
            Ok(check) => Some(check.exists),
            Err(e) => {
                debug!(%url, error = %e, "existence check returned malformed body");
                None
            }
        }
    }

    /// Uploads `payload` with the configured chunk size for `kind`.
    pub async fn upload(
        &self,
        version: &str,
        kind: UploadKind,
        payload: &[u8],
        listener: &dyn ProgressListener,
    ) -> UploadResult {
        let chunk_size = self.config.chunk_size_for(kind);
        self.upload_with_chunk_size(version, kind, payload, chunk_size, listener)
            .await
    }

    /// Uploads a serialized recipe document.
    pub async fn upload_recipes(
        &self,
        version: &str,
        payload: &[u8],
        listener: &dyn ProgressListener,
    ) -> UploadResult {
        self.upload(version, UploadKind::Recipes, payload, listener)
            .await
    }

    /// Uploads `payload` in chunks of `chunk_size` bytes.
    ///
    /// Never fails: every error ends up in [`UploadResult::Error`].
    pub async fn upload_with_chunk_size(
        &self,
        version: &str,
        kind: UploadKind,
        payload: &[u8],
        chunk_size: usize,
        listener: &dyn ProgressListener,
    ) -> UploadResult {
        let endpoints = self.config.endpoints(version);
        match self
            .run_session(&endpoints, kind, payload, chunk_size, listener)
            .await
        {
            Ok(summary) => UploadResult::Success {
                session_id: summary.session_id,
                chunks_uploaded: summary.tally.chunks_uploaded,
                bytes_uploaded: summary.tally.bytes_uploaded,
            },
            Err(e) => {
                error!(version, %kind, error = %e, "upload failed");
                UploadResult::from_error(&e)
            }
        }
    }

    async fn run_session(
        &self,
        endpoints: &Endpoints,
        kind: UploadKind,
        payload: &[u8],
        chunk_size: usize,
        listener: &dyn ProgressListener,
    ) -> Result<SessionSummary, UploadError> {
        let mut session = UploadSession::new(
            &self.transport,
            endpoints,
            kind,
            payload,
            chunk_size,
            self.config.compress_chunks,
            listener,
        )?;
        session.run().await
    }

    /// Uploads only when the server does not have this upload yet.
    ///
    /// `produce` builds the payload and is not called when the upload is
    /// skipped.
    pub async fn upload_if_missing<F, E>(
        &self,
        version: &str,
        kind: UploadKind,
        produce: F,
        listener: &dyn ProgressListener,
    ) -> UploadOutcome
    where
        F: FnOnce() -> Result<Vec<u8>, E>,
        E: Display,
    {
        if self.exists(version, kind).await {
            info!(version, %kind, "upload already on server, skipping");
            return UploadOutcome::Skipped;
        }

        let payload = match produce() {
            Ok(payload) => payload,
            Err(e) => {
                let err = UploadError::Payload(e.to_string());
                error!(version, %kind, error = %err, "upload failed");
                return UploadOutcome::Uploaded(UploadResult::from_error(&err));
            }
        };
        UploadOutcome::Uploaded(self.upload(version, kind, &payload, listener).await)
    }

    /// Runs [`upload`](Self::upload) to completion on a private runtime.
    ///
    /// For callers without a tokio runtime. Inside a runtime it returns an
    /// error result instead of blocking the executor.
    pub fn upload_blocking(
        &self,
        version: &str,
        kind: UploadKind,
        payload: &[u8],
        listener: &dyn ProgressListener,
    ) -> UploadResult {
        match self.blocking_client() {
            Ok((runtime, client)) => {
                runtime.block_on(client.upload(version, kind, payload, listener))
            }
            Err(e) => {
                error!(version, %kind, error = %e, "upload failed");
                UploadResult::from_error(&e)
            }
        }
    }

    // The pooled connections of a reqwest client belong to the runtime
    // that opened them, so the private runtime gets its own client.
    fn blocking_client(&self) -> Result<(tokio::runtime::Runtime, UploadClient), UploadError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(UploadError::Runtime(
                "upload_blocking called from inside an async runtime".into(),
            ));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let client = UploadClient {
            transport: HttpTransport::new(&self.config)?,
            config: self.config.clone(),
        };
        Ok((runtime, client))
    }

    /// Spawns the upload on the current tokio runtime.
    pub fn spawn_upload(
        &self,
        version: String,
        kind: UploadKind,
        payload: Vec<u8>,
        listener: Arc<dyn ProgressListener>,
    ) -> JoinHandle<UploadResult> {
        let client = self.clone();
        tokio::spawn(async move {
            client
                .upload(&version, kind, &payload, listener.as_ref())
                .await
        })
    }
}
