//! Session Handler: the per-connection loop after introduction.
//!
//! ```text
//! Active ──(EOF / read error / write error / queue closed)──▶ Terminating ──▶ Closed
//! ```
//!
//! While Active the handler waits on two things at once: frames from the
//! peer, which become broadcasts, and frames queued for the peer, which are
//! written to the socket. Leaving Active is always terminal.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};
use zipzop_proto::{EncodedFrame, Frame, FrameCodec};

use super::error_handling::{ReadErrorAction, classify_read_error};
use crate::handlers::Dispatcher;
use crate::state::{SessionId, SessionRegistry};

/// Why a session left the Active state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExit {
    /// The peer closed the connection.
    PeerClosed,
    /// Reading failed; carries the error label.
    ReadFailed(&'static str),
    /// Writing failed; carries the error label.
    WriteFailed(&'static str),
    /// The session was removed from the registry by someone else.
    Evicted,
}

enum SelectResult {
    Inbound(Frame),
    Outbound(EncodedFrame),
    Exit(SessionExit),
}

/// Drives one registered session until it closes.
pub struct SessionHandler<S> {
    id: SessionId,
    name: String,
    transport: Framed<S, FrameCodec>,
    outbound: mpsc::Receiver<EncodedFrame>,
    registry: Arc<SessionRegistry>,
    dispatcher: Dispatcher,
    announce_departure: bool,
}

impl<S> SessionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        id: SessionId,
        name: String,
        transport: Framed<S, FrameCodec>,
        outbound: mpsc::Receiver<EncodedFrame>,
        registry: Arc<SessionRegistry>,
        dispatcher: Dispatcher,
        announce_departure: bool,
    ) -> Self {
        Self {
            id,
            name,
            transport,
            outbound,
            registry,
            dispatcher,
            announce_departure,
        }
    }

    /// Run Active, then Terminating, and report why the session closed.
    pub async fn run(mut self) -> SessionExit {
        let exit = self.event_loop().await;
        self.terminate(exit).await;
        exit
    }

    async fn event_loop(&mut self) -> SessionExit {
        loop {
            let result = tokio::select! {
                inbound = self.transport.next() => match inbound {
                    Some(Ok(frame)) => SelectResult::Inbound(frame),
                    Some(Err(e)) => {
                        let label = e.error_code();
                        match classify_read_error(&e) {
                            ReadErrorAction::PeerGone => {
                                debug!(error = %e, "Peer dropped mid-frame");
                            }
                            ReadErrorAction::ProtocolViolation => {
                                warn!(error = %e, "Malformed input, closing session");
                            }
                            ReadErrorAction::IoError => {
                                warn!(error = %e, "Read error, closing session");
                            }
                        }
                        SelectResult::Exit(SessionExit::ReadFailed(label))
                    }
                    None => SelectResult::Exit(SessionExit::PeerClosed),
                },
                outbound = self.outbound.recv() => match outbound {
                    Some(frame) => SelectResult::Outbound(frame),
                    None => SelectResult::Exit(SessionExit::Evicted),
                },
            };

            match result {
                SelectResult::Inbound(frame) => self.on_frame(frame),
                SelectResult::Outbound(frame) => {
                    if let Err(e) = self.transport.send(frame).await {
                        warn!(error = %e, "Write error, closing session");
                        return SessionExit::WriteFailed(e.error_code());
                    }
                }
                SelectResult::Exit(exit) => return exit,
            }
        }
    }

    /// Broadcast a line from the peer under its registered name.
    fn on_frame(&self, frame: Frame) {
        if frame.sender != self.name {
            debug!(claimed = %frame.sender, "Ignoring sender field from peer");
        }
        if let Err(e) = self
            .dispatcher
            .broadcast_from_client(self.id, &self.name, &frame.content)
        {
            warn!(error = %e, "Could not broadcast line");
        }
    }

    /// Terminating: leave the registry, announce, close the transport.
    async fn terminate(&mut self, exit: SessionExit) {
        let removed = self.registry.remove(self.id);

        if removed.is_some() {
            info!(?exit, "Session left");
            drop(removed);
            if self.announce_departure {
                let notice = format!("{} has left", self.name);
                if let Err(e) = self.dispatcher.broadcast_from_server(&notice) {
                    warn!(error = %e, "Could not announce departure");
                }
            }
        } else {
            info!(?exit, "Session closed by server");
        }

        if let Err(e) = SinkExt::<EncodedFrame>::close(&mut self.transport).await {
            debug!(error = %e, "Error closing transport");
        }
    }
}
