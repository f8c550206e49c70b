//! Background policy refresh worker.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{PolicyCache, TRACING_TARGET};
use crate::{DEFAULT_REFRESH_INTERVAL_SECS, PolicySource};

/// Periodically refreshes a [`PolicyCache`] from a [`PolicySource`].
///
/// Every cycle fetches the policy and publishes a new snapshot; failures are
/// logged and the loop carries on after the same fixed interval. The loop
/// only ends when its cancellation token fires.
pub struct PolicyRefresher {
    cache: PolicyCache,
    source: Arc<dyn PolicySource>,
    app_name: String,
    interval: Duration,
}

impl PolicyRefresher {
    /// Creates a refresher with the default 30 second interval.
    pub fn new(
        cache: PolicyCache,
        source: Arc<dyn PolicySource>,
        app_name: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            source,
            app_name: app_name.into(),
            interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
        }
    }

    /// Sets the interval between refresh cycles.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Spawns the refresh loop on the current tokio runtime.
    ///
    /// The first cycle starts immediately.
    pub fn spawn(self) -> RefresherHandle {
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(self.run(cancel_token.clone()));

        RefresherHandle {
            handle,
            cancel_token,
        }
    }

    /// Runs the refresh loop until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            target: TRACING_TARGET,
            app_name = %self.app_name,
            source = self.source.name(),
            interval_secs = self.interval.as_secs(),
            "Starting policy refresher"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                refreshed = self.cache.refresh(self.source.as_ref(), &self.app_name) => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        app_name = %self.app_name,
                        refreshed,
                        "Policy refresh cycle finished"
                    );
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!(
            target: TRACING_TARGET,
            app_name = %self.app_name,
            "Policy refresher stopped"
        );
    }
}

impl std::fmt::Debug for PolicyRefresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyRefresher")
            .field("app_name", &self.app_name)
            .field("source", &self.source.name())
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

/// Handle to a spawned [`PolicyRefresher`].
///
/// Dropping the handle leaves the loop running for the lifetime of the
/// runtime; call [`shutdown`](Self::shutdown) to stop it.
#[derive(Debug)]
pub struct RefresherHandle {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl RefresherHandle {
    /// Requests the refresh loop to stop.
    ///
    /// An in-flight fetch is abandoned; the snapshot is never half-written.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    /// Returns `true` while the loop is running.
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stops the loop and waits for it to exit.
    pub async fn join(self) {
        self.cancel_token.cancel();
        if let Err(err) = self.handle.await {
            tracing::error!(
                target: TRACING_TARGET,
                error = %err,
                "Policy refresher task failed"
            );
        }
    }
}
