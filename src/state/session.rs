//! A connected chat participant as the server sees it.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use zipzop_proto::EncodedFrame;

use crate::error::DeliveryError;
use crate::network::SessionExit;

use super::SessionId;

/// Registry entry for one connection.
///
/// The session's worker task owns the socket. Everything else reaches the
/// peer through the bounded outbound queue held here. Dropping the session
/// closes that queue, which tells the worker to flush and exit.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    name: String,
    addr: SocketAddr,
    connected_at: Instant,
    outbound: mpsc::Sender<EncodedFrame>,
    worker: Option<JoinHandle<SessionExit>>,
}

/// How [`Session::terminate`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The worker flushed its queue and exited.
    Closed,
    /// The worker did not exit within the grace period and was aborted.
    Aborted,
    /// No worker was attached; closing the queue was all there was to do.
    Detached,
}

impl Session {
    pub fn new(
        id: SessionId,
        name: impl Into<String>,
        addr: SocketAddr,
        outbound: mpsc::Sender<EncodedFrame>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            addr,
            connected_at: Instant::now(),
            outbound,
            worker: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Name declared by the peer. Not unique.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn connected_at(&self) -> Instant {
        self.connected_at
    }

    /// Queue a frame without waiting.
    pub fn deliver(&self, frame: &EncodedFrame) -> Result<(), DeliveryError> {
        self.outbound.try_send(frame.clone()).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::QueueFull,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    pub(crate) fn set_worker(&mut self, handle: JoinHandle<SessionExit>) {
        self.worker = Some(handle);
    }

    pub fn has_worker(&self) -> bool {
        self.worker.is_some()
    }

    /// Close the session and wait up to `grace` for its worker to finish.
    ///
    /// Frames already queued are still written before the worker closes the
    /// transport.
    pub async fn terminate(self, grace: Duration) -> Termination {
        let Self {
            id,
            outbound,
            worker,
            ..
        } = self;
        drop(outbound);

        let Some(mut handle) = worker else {
            return Termination::Detached;
        };

        match tokio::time::timeout(grace, &mut handle).await {
            Ok(Ok(exit)) => {
                debug!(session = %id, ?exit, "Session worker finished");
                Termination::Closed
            }
            Ok(Err(e)) => {
                warn!(session = %id, error = %e, "Session worker failed");
                Termination::Closed
            }
            Err(_) => {
                warn!(
                    session = %id,
                    grace_ms = grace.as_millis() as u64,
                    "Session worker did not stop in time, aborting"
                );
                handle.abort();
                Termination::Aborted
            }
        }
    }
}
