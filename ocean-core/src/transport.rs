use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;
use tracing::debug;

use crate::config::{ClientConfig, PING_PATH, UPLOAD_CHUNK_PATH};
use crate::error::{OceanError, Result};
use crate::form::{FormPart, FormPayload, FormRequest, Method};

/// Granularity of byte-progress reports for streamed file parts.
const PROGRESS_SLICE: usize = 64 * 1024;

/// Called with `(loaded, total)` file bytes as a body is streamed out.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// One `POST /ocean/upload_chunk` request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkRequest {
    pub file_name: String,
    pub chunk: Vec<u8>,
    pub chunk_index: u64,
    pub num_chunks: u64,
    /// Absent on the first chunk; afterwards the id the server handed back.
    pub file_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkAck {
    pub file_id: String,
    pub filename: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// URL the response was served from, after redirects.
    pub final_url: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    async fn read(resp: reqwest::Response) -> Result<Self> {
        let status = resp.status().as_u16();
        let final_url = Some(resp.url().to_string());
        let body = resp.bytes().await?.to_vec();
        Ok(Self {
            status,
            final_url,
            body,
        })
    }
}

pub trait Transport: Send + Sync {
    fn post_chunk(&self, req: ChunkRequest) -> impl Future<Output = Result<ChunkAck>> + Send;

    fn submit(&self, req: &FormRequest) -> impl Future<Output = Result<RawResponse>> + Send;

    fn submit_with_progress(
        &self,
        req: &FormRequest,
        progress: ProgressFn,
    ) -> impl Future<Output = Result<RawResponse>> + Send;

    /// Liveness no-op; the response body is ignored.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(cfg: &ClientConfig) -> Result<Self> {
        Self::with_client(Client::new(), cfg)
    }

    pub fn with_client(client: Client, cfg: &ClientConfig) -> Result<Self> {
        let base = Url::parse(cfg.base_url.trim())
            .map_err(|e| OceanError::Config(format!("invalid base URL {}: {e}", cfg.base_url)))?;
        Ok(Self { client, base })
    }

    /// Absolute URLs pass through; anything else is joined onto the base.
    pub fn resolve(&self, target: &str) -> Result<Url> {
        if let Ok(abs) = Url::parse(target) {
            return Ok(abs);
        }
        self.base
            .join(target)
            .map_err(|e| OceanError::Config(format!("cannot resolve {target}: {e}")))
    }
}

fn reqwest_method(m: Method) -> reqwest::Method {
    match m {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn multipart_form(parts: &[FormPart], progress: Option<&ProgressFn>, total: u64) -> Form {
    let sent = Arc::new(AtomicU64::new(0));
    parts.iter().fold(Form::new(), |form, part| match part {
        FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
        FormPart::File {
            name,
            file_name,
            bytes,
        } => {
            let p = match progress {
                Some(cb) => progress_part(bytes, Arc::clone(&sent), total, Arc::clone(cb)),
                None => Part::bytes(bytes.clone()),
            };
            form.part(name.clone(), p.file_name(file_name.clone()))
        }
    })
}

fn progress_part(bytes: &[u8], sent: Arc<AtomicU64>, total: u64, progress: ProgressFn) -> Part {
    let len = bytes.len() as u64;
    let slices: Vec<Vec<u8>> = bytes.chunks(PROGRESS_SLICE).map(<[u8]>::to_vec).collect();
    let stream = tokio_stream::iter(slices).map(move |slice| {
        let n = slice.len() as u64;
        let loaded = sent.fetch_add(n, Ordering::Relaxed) + n;
        progress(loaded, total);
        Ok::<_, std::io::Error>(slice)
    });
    Part::stream_with_length(reqwest::Body::wrap_stream(stream), len)
}

impl Transport for HttpTransport {
    async fn post_chunk(&self, req: ChunkRequest) -> Result<ChunkAck> {
        let url = self.resolve(UPLOAD_CHUNK_PATH)?;
        debug!(
            chunk_index = req.chunk_index,
            num_chunks = req.num_chunks,
            bytes = req.chunk.len(),
            "POST {url}"
        );

        let mut form = Form::new()
            .text("filename", req.file_name)
            .part("chunk", Part::bytes(req.chunk).file_name("blob"))
            .text("chunk_index", req.chunk_index.to_string())
            .text("num_chunks", req.num_chunks.to_string());
        if let Some(id) = req.file_id {
            form = form.text("file_id", id);
        }

        let resp = self.client.post(url).multipart(form).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OceanError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json::<ChunkAck>().await?)
    }

    async fn submit(&self, req: &FormRequest) -> Result<RawResponse> {
        let url = self.resolve(&req.url)?;
        let builder = self.client.request(reqwest_method(req.method), url);
        let builder = match &req.payload {
            FormPayload::UrlEncoded(pairs) if req.method == Method::Get => builder.query(pairs),
            FormPayload::UrlEncoded(pairs) => builder.form(pairs),
            FormPayload::Multipart(parts) => builder.multipart(multipart_form(parts, None, 0)),
        };
        RawResponse::read(builder.send().await?).await
    }

    async fn submit_with_progress(
        &self,
        req: &FormRequest,
        progress: ProgressFn,
    ) -> Result<RawResponse> {
        let FormPayload::Multipart(parts) = &req.payload else {
            return self.submit(req).await;
        };
        let url = self.resolve(&req.url)?;
        let total = req.payload.file_bytes();
        let form = multipart_form(parts, Some(&progress), total);
        let resp = self
            .client
            .request(reqwest_method(req.method), url)
            .multipart(form)
            .send()
            .await?;
        RawResponse::read(resp).await
    }

    async fn ping(&self) -> Result<()> {
        let url = self.resolve(PING_PATH)?;
        self.client.get(url).send().await?;
        Ok(())
    }
}
