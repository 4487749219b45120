//! Connection setup for a freshly accepted peer.
//!
//! Reads the introduction, registers a session and hands the socket to a
//! [`SessionHandler`] task. A connection that fails the introduction never
//! becomes a session.

mod error_handling;
mod event_loop;
mod handshake;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{Instrument, debug, info, warn};
use zipzop_proto::{FrameCodec, IntroductionCodec, transport};

use crate::config::{BroadcastConfig, LimitsConfig};
use crate::error::HandshakeError;
use crate::handlers::Dispatcher;
use crate::state::{Session, SessionId, SessionRegistry};
use crate::telemetry::spans;

pub use event_loop::{SessionExit, SessionHandler};

/// A single accepted stream before and during registration.
pub struct Connection<S> {
    stream: S,
    addr: SocketAddr,
    registry: Arc<SessionRegistry>,
    dispatcher: Dispatcher,
    limits: LimitsConfig,
    notices: BroadcastConfig,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(
        stream: S,
        addr: SocketAddr,
        registry: Arc<SessionRegistry>,
        dispatcher: Dispatcher,
        limits: LimitsConfig,
        notices: BroadcastConfig,
    ) -> Self {
        Self {
            stream,
            addr,
            registry,
            dispatcher,
            limits,
            notices,
        }
    }

    /// Introduce, register and start the session.
    ///
    /// Returns once the Session Handler is running; the handler outlives
    /// this call.
    pub async fn run(self) -> Result<SessionId, HandshakeError> {
        let Self {
            stream,
            addr,
            registry,
            dispatcher,
            limits,
            notices,
        } = self;

        let mut framed = Framed::new(stream, IntroductionCodec::new(limits.max_name_len));
        let name = handshake::read_introduction(&mut framed, limits.handshake_timeout()).await?;
        let framed = transport::into_frames(framed, FrameCodec::with_max_len(limits.max_frame_len));

        let (tx, rx) = mpsc::channel(limits.outbound_queue);
        let id = registry.register(|id| Session::new(id, name.clone(), addr, tx))?;
        info!(session = %id, %name, "Session registered");

        let handler = SessionHandler::new(
            id,
            name.clone(),
            framed,
            rx,
            Arc::clone(&registry),
            dispatcher.clone(),
            notices.departures,
        );
        let worker = tokio::spawn(handler.run().instrument(spans::session(id, &name)));

        if registry.attach_worker(id, worker).is_err() {
            // Already gone (peer hung up or shutdown drained it); the
            // handler finishes on its own.
            debug!(session = %id, "Session left before its worker was attached");
            return Ok(id);
        }

        if notices.arrivals {
            let notice = format!("{name} has joined");
            if let Err(e) = dispatcher.broadcast_from_server(&notice) {
                warn!(error = %e, "Could not announce arrival");
            }
        }

        Ok(id)
    }
}
