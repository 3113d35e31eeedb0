// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background renewal of the store lock while a session holds it.

use std::sync::Arc;
use std::time::Duration;

use quire_core::SyncServer;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How long before expiry the lock is renewed.
pub const RENEWAL_MARGIN: Duration = Duration::from_secs(20);

const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Returns how often to renew a lock declaring `duration`.
///
/// Durations too short for the usual margin renew at half the duration.
pub fn renewal_interval(duration: Duration) -> Duration {
    let interval = match duration.checked_sub(RENEWAL_MARGIN) {
        Some(interval) if !interval.is_zero() => interval,
        _ => duration / 2,
    };
    interval.max(MIN_INTERVAL)
}

/// Renews the lock periodically until dropped.
///
/// Renewal touches the store, so each attempt runs on the blocking pool.
///
/// The task stops on its own once the server reports the transaction is
/// gone or the lock was taken over.
pub struct LockRenewal {
    handle: JoinHandle<()>,
}

impl LockRenewal {
    pub fn spawn(runtime: &Handle, server: Arc<dyn SyncServer>, duration: Duration) -> Self {
        let interval = renewal_interval(duration);
        let handle = runtime.spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let renewing = Arc::clone(&server);
                match tokio::task::spawn_blocking(move || renewing.renew_sync_lock()).await {
                    Ok(Ok(claim)) => debug!(renew_count = claim.renew_count, "sync lock renewed"),
                    Ok(Err(e @ (quire_core::Error::NoTransaction | quire_core::Error::LockLost(_)))) => {
                        warn!(error = %e, "stopping sync lock renewal");
                        break;
                    }
                    Ok(Err(e)) => warn!(error = %e, "failed to renew sync lock"),
                    Err(e) => {
                        warn!(error = %e, "sync lock renewal panicked");
                        break;
                    }
                }
            }
        });
        LockRenewal { handle }
    }

    /// Returns true once the renewal task has stopped.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for LockRenewal {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
#[path = "renewal_tests.rs"]
mod tests;
