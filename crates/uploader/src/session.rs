//! One resumable upload session against the chunked upload API.
//!
//! A session runs four phases in order and stops at the first failure:
//! start, resume status, chunk loop, finalize. Nothing is retried here; a
//! failed session is resumed by calling upload again with the same payload.

use std::collections::BTreeSet;

use packsync_protocol::{
    Endpoints, StartUploadRequest, StartUploadResponse, UploadKind, UploadStatusResponse,
};
use packsync_transfer::{
    CHUNKS_END, Chunk, ChunkPlan, SETUP_END, SpeedCalculator, TOTAL, chunk_progress, digest, gzip,
};
use tracing::{debug, info, warn};

use crate::error::UploadError;
use crate::progress::ProgressListener;
use crate::transport::HttpTransport;

/// Where a session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    SessionStarted,
    StatusKnown,
    /// Working on the chunk with this index.
    Uploading(u32),
    Completed,
    Failed,
}

/// Running totals of the chunk loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkTally {
    /// Chunks stored on the server, skipped ones included.
    pub chunks_uploaded: u32,
    /// Uncompressed bytes of `chunks_uploaded`.
    pub bytes_uploaded: u64,
    /// Chunks actually transmitted by this session.
    pub chunks_sent: u32,
    /// Chunks the server already had.
    pub chunks_skipped: u32,
}

impl ChunkTally {
    fn sent(self, len: usize) -> Self {
        Self {
            chunks_uploaded: self.chunks_uploaded + 1,
            bytes_uploaded: self.bytes_uploaded + len as u64,
            chunks_sent: self.chunks_sent + 1,
            ..self
        }
    }

    fn skipped(self, len: usize) -> Self {
        Self {
            chunks_uploaded: self.chunks_uploaded + 1,
            bytes_uploaded: self.bytes_uploaded + len as u64,
            chunks_skipped: self.chunks_skipped + 1,
            ..self
        }
    }
}

/// Outcome of a completed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: String,
    pub total_chunks: u32,
    pub tally: ChunkTally,
}

/// Drives one upload of `payload`.
pub struct UploadSession<'a> {
    transport: &'a HttpTransport,
    endpoints: &'a Endpoints,
    kind: UploadKind,
    payload: &'a [u8],
    plan: ChunkPlan,
    compress: bool,
    listener: &'a dyn ProgressListener,
    state: SessionState,
    session_id: Option<String>,
    last_progress: u64,
    speed: SpeedCalculator,
}

impl<'a> UploadSession<'a> {
    /// Plans the session. Fails without touching the network when
    /// `chunk_size` is zero.
    pub fn new(
        transport: &'a HttpTransport,
        endpoints: &'a Endpoints,
        kind: UploadKind,
        payload: &'a [u8],
        chunk_size: usize,
        compress: bool,
        listener: &'a dyn ProgressListener,
    ) -> Result<Self, UploadError> {
        let plan = ChunkPlan::new(payload.len(), chunk_size)?;
        Ok(Self {
            transport,
            endpoints,
            kind,
            payload,
            plan,
            compress,
            listener,
            state: SessionState::Init,
            session_id: None,
            last_progress: 0,
            speed: SpeedCalculator::default(),
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Session id handed out by the server, once known.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn plan(&self) -> &ChunkPlan {
        &self.plan
    }

    /// Runs every phase; leaves the session `Completed` or `Failed`.
    pub async fn run(&mut self) -> Result<SessionSummary, UploadError> {
        match self.drive().await {
            Ok(summary) => {
                self.state = SessionState::Completed;
                Ok(summary)
            }
            Err(e) => {
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }

    /// The pipeline:
    /// 1. Start session (0–2)
    /// 2. Query resume status (2–5)
    /// 3. Upload missing chunks (5–95)
    /// 4. Finalize (95–100)
    async fn drive(&mut self) -> Result<SessionSummary, UploadError> {
        let total_chunks = self.plan.total_chunks();

        // 1. Start session
        self.emit(0, "Preparing upload");
        let session_id = self.start().await?;
        self.session_id = Some(session_id.clone());
        self.state = SessionState::SessionStarted;
        info!(
            session_id = %session_id,
            kind = %self.kind,
            total_size = self.plan.total_size(),
            total_chunks,
            "upload session started"
        );

        // 2. Resume status
        self.emit(2, "Checking upload status");
        let received = self.received_chunks(&session_id).await?;
        self.state = SessionState::StatusKnown;
        if !received.is_empty() {
            info!(
                session_id = %session_id,
                already_received = received.len(),
                "resuming upload"
            );
        }

        // 3. Chunk loop
        let remaining = total_chunks as usize - received.len();
        self.emit(
            SETUP_END,
            &format!("Uploading {remaining} of {total_chunks} chunks"),
        );

        let mut tally = ChunkTally::default();
        for chunk in self.plan.chunks(self.payload) {
            self.state = SessionState::Uploading(chunk.index);
            if received.contains(&chunk.index) {
                debug!(session_id = %session_id, chunk = chunk.index, "chunk already on server");
                tally = tally.skipped(chunk.len());
            } else {
                self.send_chunk(&session_id, &chunk).await?;
                tally = tally.sent(chunk.len());
                self.log_throughput(&session_id, &chunk, tally.bytes_uploaded);
            }
            self.emit(
                chunk_progress(chunk.index + 1, total_chunks),
                &format!("Uploaded chunk {}/{}", chunk.index + 1, total_chunks),
            );
        }

        // 4. Finalize
        self.emit(CHUNKS_END, "Finalizing upload");
        self.transport
            .post_empty(&self.endpoints.complete(&session_id))
            .await?
            .error_for_status()?;
        self.emit(TOTAL, "Upload complete");

        info!(
            session_id = %session_id,
            sent = tally.chunks_sent,
            skipped = tally.chunks_skipped,
            bytes = tally.bytes_uploaded,
            "upload session completed"
        );

        Ok(SessionSummary {
            session_id,
            total_chunks,
            tally,
        })
    }

    /// Opens the session, committing to the hash of the whole payload.
    async fn start(&self) -> Result<String, UploadError> {
        let req = StartUploadRequest {
            kind: self.kind,
            total_size: self.plan.total_size() as u64,
            chunk_size: self.plan.chunk_size() as u64,
            total_chunks: self.plan.total_chunks(),
            final_hash: digest(self.payload),
        };

        let resp = self
            .transport
            .post_json(&self.endpoints.start(), &req)
            .await?
            .error_for_status()?;
        let start: StartUploadResponse = serde_json::from_str(&resp.body)?;

        if start.session_id.is_empty() {
            return Err(UploadError::Protocol(
                "server returned an empty session id".into(),
            ));
        }
        Ok(start.session_id)
    }

    /// Indices the server already holds; out-of-range ones are dropped.
    async fn received_chunks(&self, session_id: &str) -> Result<BTreeSet<u32>, UploadError> {
        let resp = self
            .transport
            .get(&self.endpoints.status(session_id))
            .await?
            .error_for_status()?;
        let status: UploadStatusResponse = serde_json::from_str(&resp.body)?;

        let total = self.plan.total_chunks();
        let (valid, ignored): (BTreeSet<u32>, BTreeSet<u32>) = status
            .chunks_received
            .into_iter()
            .partition(|&index| index < total);
        if !ignored.is_empty() {
            warn!(
                session_id,
                ?ignored,
                total_chunks = total,
                "server reported chunk indices outside the payload"
            );
        }
        Ok(valid)
    }

    async fn send_chunk(
        &mut self,
        session_id: &str,
        chunk: &Chunk<'_>,
    ) -> Result<(), UploadError> {
        let chunk_hash = chunk.hash();
        let body = if self.compress {
            gzip(chunk.data)?
        } else {
            chunk.data.to_vec()
        };
        let wire_len = body.len();

        self.transport
            .post_chunk(
                &self.endpoints.chunk(session_id, chunk.index),
                body,
                &chunk_hash,
                self.compress,
            )
            .await?
            .error_for_status()?;

        self.speed.add_sample(chunk.len() as u64);
        debug!(
            session_id,
            chunk = chunk.index,
            size = chunk.len(),
            wire_size = wire_len,
            "chunk uploaded"
        );
        Ok(())
    }

    fn log_throughput(&self, session_id: &str, chunk: &Chunk<'_>, bytes_done: u64) {
        let remaining = (self.plan.total_size() as u64).saturating_sub(bytes_done);
        let bytes_per_second = self.speed.bytes_per_second();
        if bytes_per_second > 0.0 {
            debug!(
                session_id,
                chunk = chunk.index,
                bytes_per_second = bytes_per_second as u64,
                eta_secs = self.speed.eta(remaining).map(|d| d.as_secs()),
                "throughput"
            );
        }
    }

    /// Reports progress; never moves backwards.
    fn emit(&mut self, current: u64, message: &str) {
        self.last_progress = self.last_progress.max(current);
        self.listener.on_progress(self.last_progress, TOTAL, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::mock_server::{MockResponse, MockServer, upload_service};
    use crate::progress::NoProgress;
    use std::sync::Mutex;

    fn setup(url: &str) -> (HttpTransport, Endpoints) {
        let cfg = ClientConfig::new(url, "atm9", "tok");
        (HttpTransport::new(&cfg).unwrap(), cfg.endpoints("1.0.0"))
    }

    #[test]
    fn tally_counts_sent_and_skipped() {
        let tally = ChunkTally::default().skipped(10).sent(4).sent(6);
        assert_eq!(
            tally,
            ChunkTally {
                chunks_uploaded: 3,
                bytes_uploaded: 20,
                chunks_sent: 2,
                chunks_skipped: 1,
            }
        );
    }

    #[test]
    fn zero_chunk_size_fails_before_network() {
        let cfg = ClientConfig::new("http://127.0.0.1:9", "atm9", "tok");
        let transport = HttpTransport::new(&cfg).unwrap();
        let endpoints = cfg.endpoints("1");
        let result = UploadSession::new(
            &transport,
            &endpoints,
            UploadKind::Recipes,
            b"data",
            0,
            false,
            &NoProgress,
        );
        assert!(matches!(result, Err(UploadError::Transfer(_))));
    }

    #[tokio::test]
    async fn runs_all_phases_in_order() {
        let server = MockServer::start(upload_service("s-1", vec![])).await;
        let (transport, endpoints) = setup(&server.url);
        let payload = vec![7u8; 2500];

        let mut session = UploadSession::new(
            &transport,
            &endpoints,
            UploadKind::Recipes,
            &payload,
            1000,
            false,
            &NoProgress,
        )
        .unwrap();
        assert_eq!(session.state(), SessionState::Init);

        let summary = session.run().await.unwrap();
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.session_id(), Some("s-1"));
        assert_eq!(summary.total_chunks, 3);
        assert_eq!(summary.tally.chunks_sent, 3);
        assert_eq!(summary.tally.bytes_uploaded, 2500);

        let paths: Vec<String> = server.requests().into_iter().map(|r| r.path).collect();
        let base = "/modpacks/atm9/versions/1.0.0/upload";
        assert_eq!(
            paths,
            vec![
                format!("{base}/start"),
                format!("{base}/s-1/status"),
                format!("{base}/s-1/chunk/0"),
                format!("{base}/s-1/chunk/1"),
                format!("{base}/s-1/chunk/2"),
                format!("{base}/s-1/complete"),
            ]
        );
    }

    #[tokio::test]
    async fn start_request_commits_to_payload() {
        let server = MockServer::start(upload_service("s-1", vec![])).await;
        let (transport, endpoints) = setup(&server.url);
        let payload = b"recipe data".to_vec();

        UploadSession::new(
            &transport,
            &endpoints,
            UploadKind::Recipes,
            &payload,
            4,
            false,
            &NoProgress,
        )
        .unwrap()
        .run()
        .await
        .unwrap();

        let start = &server.requests_to("/upload/start")[0];
        let body: serde_json::Value = serde_json::from_slice(&start.body).unwrap();
        assert_eq!(body["type"], "recipes");
        assert_eq!(body["totalSize"], 11);
        assert_eq!(body["chunkSize"], 4);
        assert_eq!(body["totalChunks"], 3);
        assert_eq!(body["finalHash"], digest(&payload));

        let chunk = &server.requests_to("/chunk/2")[0];
        assert_eq!(chunk.body, b"ata");
        assert_eq!(chunk.header("x-chunk-hash"), Some(digest(b"ata").as_str()));
        assert!(chunk.header("content-encoding").is_none());
    }

    #[tokio::test]
    async fn failed_start_stops_the_session() {
        let server = MockServer::start(|_| MockResponse::json(401, "bad token")).await;
        let (transport, endpoints) = setup(&server.url);

        let mut session = UploadSession::new(
            &transport,
            &endpoints,
            UploadKind::Icons,
            b"zip",
            1024,
            true,
            &NoProgress,
        )
        .unwrap();
        let err = session.run().await.unwrap_err();

        assert!(matches!(err, UploadError::Http { status: 401, .. }));
        assert_eq!(session.state(), SessionState::Failed);
        assert!(session.session_id().is_none());
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn empty_session_id_is_a_protocol_error() {
        let server = MockServer::start(|_| MockResponse::ok(r#"{"sessionId":""}"#)).await;
        let (transport, endpoints) = setup(&server.url);

        let err = UploadSession::new(
            &transport,
            &endpoints,
            UploadKind::Recipes,
            b"x",
            1,
            false,
            &NoProgress,
        )
        .unwrap()
        .run()
        .await
        .unwrap_err();
        assert!(matches!(err, UploadError::Protocol(_)));
    }

    #[tokio::test]
    async fn out_of_range_status_indices_are_ignored() {
        let server = MockServer::start(upload_service("s-9", vec![1, 7, 40])).await;
        let (transport, endpoints) = setup(&server.url);
        let payload = vec![1u8; 30];

        let summary = UploadSession::new(
            &transport,
            &endpoints,
            UploadKind::Recipes,
            &payload,
            10,
            false,
            &NoProgress,
        )
        .unwrap()
        .run()
        .await
        .unwrap();

        assert_eq!(summary.tally.chunks_skipped, 1);
        assert_eq!(summary.tally.chunks_sent, 2);
        assert_eq!(summary.tally.chunks_uploaded, 3);
        assert_eq!(server.requests_to("/chunk/").len(), 2);
    }

    #[tokio::test]
    async fn chunk_failure_aborts_before_finalize() {
        let server = MockServer::start(|req: &crate::mock_server::RecordedRequest| {
            if req.path.ends_with("/chunk/1") {
                MockResponse::json(500, "disk full")
            } else {
                upload_service("s-2", vec![])(req)
            }
        })
        .await;
        let (transport, endpoints) = setup(&server.url);
        let payload = vec![0u8; 40];

        let mut session = UploadSession::new(
            &transport,
            &endpoints,
            UploadKind::Recipes,
            &payload,
            10,
            false,
            &NoProgress,
        )
        .unwrap();
        let err = session.run().await.unwrap_err();

        assert!(matches!(err, UploadError::Http { status: 500, ref body } if body == "disk full"));
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(server.requests_to("/chunk/").len(), 2);
        assert!(server.requests_to("/complete").is_empty());
    }

    #[tokio::test]
    async fn progress_is_monotonic_and_bounded() {
        let server = MockServer::start(upload_service("s-3", vec![0, 3])).await;
        let (transport, endpoints) = setup(&server.url);
        let payload = vec![9u8; 45];
        let seen = Mutex::new(Vec::new());
        let listener = |current: u64, total: u64, _msg: &str| {
            assert_eq!(total, 100);
            seen.lock().unwrap().push(current);
        };

        UploadSession::new(
            &transport,
            &endpoints,
            UploadKind::Recipes,
            &payload,
            10,
            true,
            &listener,
        )
        .unwrap()
        .run()
        .await
        .unwrap();

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.first(), Some(&0));
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{seen:?}");
        assert!(seen.contains(&SETUP_END));
        assert!(seen.contains(&CHUNKS_END));
    }

    #[tokio::test]
    async fn empty_payload_still_finalizes() {
        let server = MockServer::start(upload_service("s-0", vec![])).await;
        let (transport, endpoints) = setup(&server.url);

        let summary = UploadSession::new(
            &transport,
            &endpoints,
            UploadKind::Recipes,
            &[],
            1024,
            true,
            &NoProgress,
        )
        .unwrap()
        .run()
        .await
        .unwrap();

        assert_eq!(summary.total_chunks, 0);
        assert_eq!(summary.tally, ChunkTally::default());
        assert!(server.requests_to("/chunk/").is_empty());
        assert_eq!(server.requests_to("/complete").len(), 1);
    }
}
