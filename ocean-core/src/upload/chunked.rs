use std::path::Path;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::error::{OceanError, Result};
use crate::transport::{ChunkAck, ChunkRequest, Transport};
use crate::upload::session::UploadSession;

const RETRY_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadReceipt {
    pub file_id: String,
    /// Name as reported by the server on the final acknowledgment.
    pub file_name: String,
    pub bytes: u64,
    pub chunks: u64,
    /// blake3 of the bytes actually transmitted, hex encoded.
    pub digest: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum UploadEvent {
    Started {
        file_name: String,
        total_size: u64,
        chunk_count: u64,
    },
    ChunkAcknowledged {
        index: u64,
        chunk_count: u64,
        progress: f64,
    },
    Completed(UploadReceipt),
    Failed {
        index: u64,
        reason: String,
    },
}

/// Sends a file to `/ocean/upload_chunk` one chunk at a time.
pub struct ChunkUploader<T> {
    transport: T,
    chunk_size: u64,
    retries: u32,
    backoff: Duration,
}

impl<T: Transport> ChunkUploader<T> {
    pub fn new(transport: T, cfg: &ClientConfig) -> Self {
        Self {
            transport,
            chunk_size: cfg.chunk_size,
            retries: cfg.chunk_retries,
            backoff: RETRY_BACKOFF,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub async fn upload_path<F>(&self, path: &Path, on_event: F) -> Result<UploadReceipt>
    where
        F: FnMut(&UploadEvent),
    {
        let file = File::open(path).await?;
        let size = file.metadata().await?.len();
        if size == 0 {
            return Err(OceanError::EmptyFile(path.to_path_buf()));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        self.upload_reader(&name, size, file, on_event).await
    }

    /// Uploads exactly `size` bytes from `reader` under `file_name`.
    pub async fn upload_reader<R, F>(
        &self,
        file_name: &str,
        size: u64,
        mut reader: R,
        mut on_event: F,
    ) -> Result<UploadReceipt>
    where
        R: AsyncRead + Unpin,
        F: FnMut(&UploadEvent),
    {
        let mut session = UploadSession::new(file_name, size, self.chunk_size)?;
        if session.chunk_count == 0 {
            return Err(OceanError::EmptyFile(file_name.into()));
        }
        info!(
            file = file_name,
            bytes = size,
            chunks = session.chunk_count,
            "starting chunked upload"
        );
        on_event(&UploadEvent::Started {
            file_name: file_name.to_string(),
            total_size: size,
            chunk_count: session.chunk_count,
        });

        let mut hasher = blake3::Hasher::new();
        let mut last_ack: Option<ChunkAck> = None;

        while !session.is_complete() {
            let index = session.current_chunk_index();
            let ack = match self.send_next(&mut session, &mut reader, &mut hasher).await {
                Ok(ack) => ack,
                Err(err) => {
                    error!(file = file_name, chunk = index, error = %err, "chunk upload failed");
                    on_event(&UploadEvent::Failed {
                        index,
                        reason: err.to_string(),
                    });
                    return Err(OceanError::ChunkFailed {
                        index,
                        count: session.chunk_count,
                        reason: err.to_string(),
                    });
                }
            };
            debug!(
                chunk = index,
                progress = session.progress_percent(),
                "chunk acknowledged"
            );
            on_event(&UploadEvent::ChunkAcknowledged {
                index,
                chunk_count: session.chunk_count,
                progress: session.progress_percent(),
            });
            last_ack = Some(ack);
        }

        let ack = last_ack
            .ok_or_else(|| OceanError::Format("upload produced no acknowledgment".into()))?;
        let receipt = UploadReceipt {
            file_id: ack.file_id,
            file_name: ack.filename,
            bytes: size,
            chunks: session.chunk_count,
            digest: hex::encode(hasher.finalize().as_bytes()),
        };
        info!(file_id = %receipt.file_id, digest = %receipt.digest, "upload complete");
        on_event(&UploadEvent::Completed(receipt.clone()));
        Ok(receipt)
    }

    /// Reads, sends and records the current chunk of `session`.
    async fn send_next<R>(
        &self,
        session: &mut UploadSession,
        reader: &mut R,
        hasher: &mut blake3::Hasher,
    ) -> Result<ChunkAck>
    where
        R: AsyncRead + Unpin,
    {
        let index = session.current_chunk_index();
        let range = session.chunk_range(index);
        let mut chunk = vec![0u8; (range.end - range.start) as usize];
        reader.read_exact(&mut chunk).await?;
        hasher.update(&chunk);

        let req = ChunkRequest {
            file_name: session.file_name.clone(),
            chunk,
            chunk_index: index,
            num_chunks: session.chunk_count,
            file_id: session.server_file_id().map(str::to_string),
        };
        let ack = self.send_with_retry(req).await?;
        session.acknowledge(&ack.file_id)?;
        Ok(ack)
    }

    async fn send_with_retry(&self, req: ChunkRequest) -> Result<ChunkAck> {
        let mut attempt = 0u32;
        loop {
            match self.transport.post_chunk(req.clone()).await {
                Ok(ack) => return Ok(ack),
                Err(err) if attempt < self.retries => {
                    let wait = self.backoff.saturating_mul(1 << attempt.min(16));
                    warn!(
                        chunk = req.chunk_index,
                        attempt = attempt + 1,
                        error = %err,
                        "chunk failed, retrying in {wait:?}"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
