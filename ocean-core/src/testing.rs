//! In-crate fakes shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use crate::error::{OceanError, Result};
use crate::form::FormRequest;
use crate::notify::{Notifier, Toast};
use crate::transport::{ChunkAck, ChunkRequest, ProgressFn, RawResponse, Transport};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Alert(String),
    Toast(Toast),
    Navigate(String),
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub notices: Vec<Notice>,
}

impl Notifier for RecordingNotifier {
    fn alert(&mut self, text: &str) {
        self.notices.push(Notice::Alert(text.to_string()));
    }

    fn toast(&mut self, toast: Toast) {
        self.notices.push(Notice::Toast(toast));
    }

    fn navigate(&mut self, url: &str) {
        self.notices.push(Notice::Navigate(url.to_string()));
    }
}

#[derive(Default)]
struct Inner {
    chunks: Vec<ChunkRequest>,
    /// Chunk indices that fail this many more times before succeeding.
    chunk_failures: Vec<(u64, u32)>,
    issued_id: Option<String>,
    /// Hand out a different id on every chunk.
    rotate_ids: bool,
    submitted: Vec<FormRequest>,
    submit_responses: VecDeque<RawResponse>,
    submit_delay: Option<Duration>,
    submit_fails: bool,
    pings: usize,
}

/// Records every request. Chunk uploads behave like the real endpoint: the
/// first chunk is issued a fresh id, later chunks get their id echoed back.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
    pub fn with_file_id(id: &str) -> Self {
        let t = Self::default();
        t.inner.lock().unwrap().issued_id = Some(id.to_string());
        t
    }

    pub fn rotating_ids() -> Self {
        let t = Self::default();
        t.inner.lock().unwrap().rotate_ids = true;
        t
    }

    pub fn fail_chunk(&self, index: u64, times: u32) {
        self.inner.lock().unwrap().chunk_failures.push((index, times));
    }

    pub fn push_submit_response(&self, status: u16, body: &[u8]) {
        self.inner.lock().unwrap().submit_responses.push_back(RawResponse {
            status,
            final_url: Some("http://ocean.test/ocean/done".into()),
            body: body.to_vec(),
        });
    }

    pub fn set_submit_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().submit_delay = Some(delay);
    }

    pub fn set_submit_fails(&self) {
        self.inner.lock().unwrap().submit_fails = true;
    }

    pub fn chunks(&self) -> Vec<ChunkRequest> {
        self.inner.lock().unwrap().chunks.clone()
    }

    pub fn submitted(&self) -> Vec<FormRequest> {
        self.inner.lock().unwrap().submitted.clone()
    }

    pub fn pings(&self) -> usize {
        self.inner.lock().unwrap().pings
    }

    fn next_submit(&self, req: &FormRequest) -> (Option<Duration>, Result<RawResponse>) {
        let mut g = self.inner.lock().unwrap();
        g.submitted.push(req.clone());
        let delay = g.submit_delay;
        if g.submit_fails {
            return (delay, Err(OceanError::Format("connection reset".into())));
        }
        let resp = g.submit_responses.pop_front().unwrap_or(RawResponse {
            status: 200,
            final_url: Some("http://ocean.test/ocean/done".into()),
            body: br#"{"messages":[],"errors":[],"redirect":null}"#.to_vec(),
        });
        (delay, Ok(resp))
    }
}

impl Transport for MockTransport {
    async fn post_chunk(&self, req: ChunkRequest) -> Result<ChunkAck> {
        let mut g = self.inner.lock().unwrap();
        if let Some(slot) = g
            .chunk_failures
            .iter_mut()
            .find(|(i, left)| *i == req.chunk_index && *left > 0)
        {
            slot.1 -= 1;
            return Err(OceanError::Status {
                status: 502,
                body: "bad gateway".into(),
            });
        }
        let file_id = match &req.file_id {
            _ if g.rotate_ids => format!("id-{}", req.chunk_index),
            Some(id) => id.clone(),
            None => g.issued_id.clone().unwrap_or_else(|| "file-1".into()),
        };
        let filename = req.file_name.clone();
        g.chunks.push(req);
        Ok(ChunkAck { file_id, filename })
    }

    async fn submit(&self, req: &FormRequest) -> Result<RawResponse> {
        let (delay, res) = self.next_submit(req);
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        res
    }

    async fn submit_with_progress(
        &self,
        req: &FormRequest,
        progress: ProgressFn,
    ) -> Result<RawResponse> {
        let total = req.payload.file_bytes();
        let (delay, res) = self.next_submit(req);
        // Like a real body stream, text-only forms report nothing.
        if total > 0 {
            progress(total / 2, total);
        }
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        if total > 0 {
            progress(total, total);
        }
        res
    }

    async fn ping(&self) -> Result<()> {
        self.inner.lock().unwrap().pings += 1;
        Ok(())
    }
}

/// Minimal HTTP/1.1 server on a loopback port. Every request gets `status`
/// with `body`; the raw request text is forwarded on the channel. Returns
/// the base URL to point a transport at.
pub async fn http_stub(
    status: u16,
    body: &'static str,
) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Ok((mut sock, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let raw = read_request(&mut sock).await;
                let resp = format!(
                    "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\n\
                     content-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = sock.write_all(resp.as_bytes()).await;
                let _ = sock.shutdown().await;
                let _ = tx.send(raw);
            });
        }
    });
    (base, rx)
}

async fn read_request(sock: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 8192];
    while !request_complete(&buf) {
        let n = sock.read(&mut tmp).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn request_complete(buf: &[u8]) -> bool {
    let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
    let body = &buf[head_end + 4..];
    let content_length = head
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok());
    match content_length {
        Some(len) => body.len() >= len,
        None if head.contains("transfer-encoding: chunked") => body.ends_with(b"0\r\n\r\n"),
        None => true,
    }
}
