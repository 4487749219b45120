//! Server lifecycle: the shutdown signal and the `/shutdown` sequence.

use std::sync::Arc;

use futures_util::future::join_all;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, warn};
use zipzop_proto::Command;

use crate::config::ShutdownConfig;
use crate::handlers::Dispatcher;
use crate::state::{SessionRegistry, Termination};
use crate::telemetry::spans;

/// Owns the shutdown broadcast channel.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    shutdown_tx: broadcast::Sender<()>,
}

impl Lifecycle {
    pub fn new() -> Self {
        // Capacity 16 leaves room for several subscribers that are slow to poll.
        let (shutdown_tx, _) = broadcast::channel(16);
        Self { shutdown_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Tell every subscriber to stop. Returns how many were listening.
    pub fn signal_shutdown(&self) -> usize {
        self.shutdown_tx.send(()).unwrap_or(0)
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// What the shutdown sequence did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Sessions drained from the registry.
    pub sessions: usize,
    /// Sessions whose worker had to be aborted after the grace period.
    pub aborted: usize,
}

/// How the administrative loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOutcome {
    /// `/shutdown` was issued and the sequence completed.
    Shutdown(ShutdownReport),
    /// Admin input ended; the acceptor ran until it stopped on its own.
    InputClosed,
}

/// Reads admin commands and runs the shutdown sequence.
pub struct ShutdownOrchestrator {
    registry: Arc<SessionRegistry>,
    dispatcher: Dispatcher,
    lifecycle: Lifecycle,
    config: ShutdownConfig,
}

impl ShutdownOrchestrator {
    pub fn new(
        registry: Arc<SessionRegistry>,
        dispatcher: Dispatcher,
        lifecycle: Lifecycle,
        config: ShutdownConfig,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            lifecycle,
            config,
        }
    }

    /// Read `admin` line by line until `/shutdown`, then shut down.
    ///
    /// End of input is not a shutdown: the server keeps serving and this
    /// waits for the acceptor instead.
    pub async fn run<R>(self, admin: R, acceptor: JoinHandle<()>) -> AdminOutcome
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = admin.lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match Command::parse(&line) {
                    Command::Shutdown => {
                        info!("Shutdown requested");
                        return AdminOutcome::Shutdown(self.shutdown(acceptor).await);
                    }
                    _ => {
                        if !line.trim().is_empty() {
                            warn!(%line, "Unknown admin command");
                        }
                    }
                },
                Ok(None) => {
                    info!("Admin input closed, serving until killed");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Admin input failed, serving until killed");
                    break;
                }
            }
        }

        if let Err(e) = acceptor.await {
            error!(error = %e, "Acceptor task failed");
        }
        AdminOutcome::InputClosed
    }

    /// Count down, stop accepting, drain the registry and close every session.
    ///
    /// Sessions are closed concurrently, so stalled peers cost one grace
    /// period in total.
    pub async fn shutdown(&self, acceptor: JoinHandle<()>) -> ShutdownReport {
        self.countdown().await;

        self.lifecycle.signal_shutdown();
        if let Err(e) = acceptor.await {
            error!(error = %e, "Acceptor task failed");
        }

        let sessions = self.registry.remove_all();
        let count = sessions.len();
        let grace = self.config.grace();

        async move {
            info!("Closing sessions");
            let outcomes = join_all(sessions.into_iter().map(|s| s.terminate(grace))).await;
            let report = ShutdownReport {
                sessions: count,
                aborted: outcomes
                    .iter()
                    .filter(|t| **t == Termination::Aborted)
                    .count(),
            };
            info!(aborted = report.aborted, "Shutdown complete");
            report
        }
        .instrument(spans::shutdown(count))
        .await
    }

    async fn countdown(&self) {
        let mut ticker = tokio::time::interval(self.config.tick());
        for remaining in (1..=self.config.countdown).rev() {
            ticker.tick().await;
            let unit = if remaining == 1 { "second" } else { "seconds" };
            let notice = format!("Server shutting down in {remaining} {unit}");
            match self.dispatcher.broadcast_from_server(&notice) {
                Ok(report) => info!(remaining, delivered = report.delivered, "Countdown"),
                Err(e) => warn!(error = %e, "Could not broadcast countdown"),
            }
        }
        // Let the last notice sit for one full tick.
        if self.config.countdown > 0 {
            ticker.tick().await;
        }
    }
}
