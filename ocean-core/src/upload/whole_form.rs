use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::form::FormRequest;
use crate::notify::Notifier;
use crate::transport::{ProgressFn, Transport};
use crate::upload::keepalive::KeepAlive;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormOutcome {
    pub status: u16,
    pub final_url: Option<String>,
    /// Whether a navigation to `final_url` was issued.
    pub navigated: bool,
}

/// Whole-form upload in a single request with byte-level progress and a
/// keep-alive ping running for as long as the request is in flight.
pub struct FormUploader<T> {
    transport: T,
    ping_interval: Duration,
}

impl<T> FormUploader<T>
where
    T: Transport + Clone + 'static,
{
    pub fn new(transport: T, cfg: &ClientConfig) -> Self {
        Self {
            transport,
            ping_interval: cfg.ping_interval,
        }
    }

    /// `on_progress` receives whole percentages of file bytes sent. A form
    /// without file bytes reports 100 once the request completes.
    pub async fn submit<F, N>(
        &self,
        req: &FormRequest,
        on_progress: F,
        notifier: &mut N,
    ) -> Result<FormOutcome>
    where
        F: Fn(u8) + Send + Sync + 'static,
        N: Notifier + ?Sized,
    {
        let on_progress = Arc::new(on_progress);
        let sink = Arc::clone(&on_progress);
        let progress: ProgressFn = Arc::new(move |loaded, total| sink(percent(loaded, total)));

        info!(method = %req.method, url = %req.url, "uploading form");
        let result = {
            let _keepalive = KeepAlive::start(self.transport.clone(), self.ping_interval);
            self.transport.submit_with_progress(req, progress).await
        };

        let raw = match result {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "form upload failed");
                notifier.alert(&format!("An error occurred: {err}"));
                return Err(err);
            }
        };
        if req.payload.file_bytes() == 0 {
            on_progress(100);
        }

        let mut navigated = false;
        if raw.status == 200 {
            if let Some(url) = raw.final_url.as_deref() {
                notifier.navigate(url);
                navigated = true;
            }
        } else {
            warn!(status = raw.status, "form upload finished without 200");
        }
        Ok(FormOutcome {
            status: raw.status,
            final_url: raw.final_url,
            navigated,
        })
    }
}

fn percent(loaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    ((loaded as f64 / total as f64) * 100.0).round().clamp(0.0, 100.0) as u8
}
