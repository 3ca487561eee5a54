use tokio::time::{Duration, sleep};
use tracing::info;

use crate::AppState;

const SWEEP_INTERVAL_MINUTES: u64 = 15;

/// Periodically drops expired sessions so the in-memory store cannot grow
/// unbounded over the process lifetime.
pub fn spawn(state: AppState) {
    tokio::spawn(async move {
        let interval = Duration::from_secs(SWEEP_INTERVAL_MINUTES * 60);
        loop {
            let removed = state.sessions().purge_expired().await;
            if removed > 0 {
                info!(removed, "swept expired sessions");
            }
            sleep(interval).await;
        }
    });
}
