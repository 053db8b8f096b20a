//! Minimal HTTP/1.1 server for exercising the client in tests.
//!
//! Every connection serves one request and closes. Requests are recorded
//! before the response is written, so a client that got its reply always
//! sees its request in [`MockServer::requests`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path and query, exactly as sent.
    pub path: String,
    /// Header names are lowercased.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub enum MockResponse {
    Reply { status: u16, body: String },
    /// Read the request, never answer.
    Hang,
    /// Send a 200 head declaring `declared_len` bytes, then only `partial`.
    StallBody { declared_len: usize, partial: String },
}

impl MockResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::json(200, body)
    }

    pub fn json(status: u16, body: impl Into<String>) -> Self {
        MockResponse::Reply {
            status,
            body: body.into(),
        }
    }
}

type Router = Arc<dyn Fn(&RecordedRequest) -> MockResponse + Send + Sync>;

pub struct MockServer {
    /// `http://127.0.0.1:<port>`
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    accept_task: JoinHandle<()>,
}

impl MockServer {
    /// Binds an ephemeral port and serves `router` until dropped.
    pub async fn start<F>(router: F) -> Self
    where
        F: Fn(&RecordedRequest) -> MockResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let router: Router = Arc::new(router);

        let recorded = requests.clone();
        let accept_task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let router = router.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, router, recorded).await;
                });
            }
        });

        Self {
            url: format!("http://127.0.0.1:{port}"),
            requests,
            accept_task,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Recorded requests whose path contains `fragment`.
    pub fn requests_to(&self, fragment: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.contains(fragment))
            .collect()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

async fn serve(
    stream: TcpStream,
    router: Router,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let mut line = String::new();
    reader.read_line(&mut line).await?;
    let mut parts = line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = HashMap::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            break;
        }
        if let Some((name, value)) = trimmed.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let len = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;

    let request = RecordedRequest {
        method,
        path,
        headers,
        body,
    };
    let response = router(&request);
    recorded.lock().unwrap().push(request);

    match response {
        MockResponse::Reply { status, body } => {
            let head = format!(
                "HTTP/1.1 {status} Mock\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\r\n",
                body.len()
            );
            writer.write_all(head.as_bytes()).await?;
            writer.write_all(body.as_bytes()).await?;
            writer.shutdown().await?;
        }
        MockResponse::Hang => {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        MockResponse::StallBody {
            declared_len,
            partial,
        } => {
            let head = format!(
                "HTTP/1.1 200 OK\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {declared_len}\r\n\r\n"
            );
            writer.write_all(head.as_bytes()).await?;
            writer.write_all(partial.as_bytes()).await?;
            writer.flush().await?;
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
    }
    Ok(())
}

/// URL of a local port with nothing listening on it.
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// Router that plays a well-behaved upload service.
///
/// Hands out `session_id`, reports `received` as already stored and
/// accepts every chunk and the finalize call.
pub fn upload_service(
    session_id: &'static str,
    received: Vec<u32>,
) -> impl Fn(&RecordedRequest) -> MockResponse + Send + Sync + 'static {
    move |req: &RecordedRequest| {
        let path = req.path.as_str();
        if path.contains("/upload/check") {
            MockResponse::ok(r#"{"exists":false}"#)
        } else if path.ends_with("/upload/start") {
            MockResponse::ok(format!(r#"{{"sessionId":"{session_id}"}}"#))
        } else if path.ends_with("/status") {
            let list: Vec<String> = received.iter().map(u32::to_string).collect();
            MockResponse::ok(format!(r#"{{"chunksReceived":[{}]}}"#, list.join(",")))
        } else if path.contains("/chunk/") || path.ends_with("/complete") {
            MockResponse::ok("{}")
        } else {
            MockResponse::json(404, "not found")
        }
    }
}
