use std::ops::Range;

use crate::error::{OceanError, Result};

/// State of one chunked upload, from file selection to final acknowledgment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadSession {
    pub file_name: String,
    pub total_size: u64,
    pub chunk_size: u64,
    pub chunk_count: u64,
    current: u64,
    server_file_id: Option<String>,
}

impl UploadSession {
    pub fn new(file_name: impl Into<String>, total_size: u64, chunk_size: u64) -> Result<Self> {
        if chunk_size == 0 {
            return Err(OceanError::Config("chunk size must be non-zero".into()));
        }
        Ok(Self {
            file_name: file_name.into(),
            total_size,
            chunk_size,
            chunk_count: total_size.div_ceil(chunk_size),
            current: 0,
            server_file_id: None,
        })
    }

    /// Index of the next chunk to send; equals `chunk_count` once done.
    pub fn current_chunk_index(&self) -> u64 {
        self.current
    }

    pub fn server_file_id(&self) -> Option<&str> {
        self.server_file_id.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.chunk_count
    }

    /// Byte range of chunk `index` within the file.
    pub fn chunk_range(&self, index: u64) -> Range<u64> {
        let start = index.saturating_mul(self.chunk_size).min(self.total_size);
        let end = start.saturating_add(self.chunk_size).min(self.total_size);
        start..end
    }

    /// Records the acknowledgment of the current chunk. The first ack fixes
    /// the server file id; later acks cannot change it.
    pub fn acknowledge(&mut self, file_id: &str) -> Result<()> {
        if self.is_complete() {
            return Err(OceanError::Format(format!(
                "acknowledgment past final chunk ({} of {})",
                self.current, self.chunk_count
            )));
        }
        match &self.server_file_id {
            None => self.server_file_id = Some(file_id.to_string()),
            Some(known) if known != file_id => {
                return Err(OceanError::Format(format!(
                    "server changed file id mid-upload: {known} -> {file_id}"
                )));
            }
            Some(_) => {}
        }
        self.current += 1;
        Ok(())
    }

    /// Per-chunk progress after the latest acknowledgment, 0..=100.
    pub fn progress_percent(&self) -> f64 {
        if self.chunk_count == 0 {
            return 100.0;
        }
        self.current as f64 / self.chunk_count as f64 * 100.0
    }
}
