use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::transport::Transport;

/// Background `/ocean/ping` loop tied to the lifetime of the guard.
///
/// The first ping fires one `period` after start. Dropping the guard aborts
/// the loop, so every exit path of the owning request cancels it once.
pub struct KeepAlive {
    handle: JoinHandle<()>,
}

impl KeepAlive {
    pub fn start<T>(transport: T, period: Duration) -> Self
    where
        T: Transport + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match transport.ping().await {
                    Ok(()) => debug!("keep-alive ping sent"),
                    Err(err) => debug!(error = %err, "keep-alive ping failed"),
                }
            }
        });
        Self { handle }
    }
}

impl Drop for KeepAlive {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
