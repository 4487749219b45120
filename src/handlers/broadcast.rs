//! Broadcast fan-out.

use std::sync::Arc;

use tracing::{debug, warn};
use zipzop_proto::{DEFAULT_MAX_FRAME_LEN, EncodedFrame, ProtocolError};

use crate::config::Config;
use crate::state::{SessionId, SessionRegistry};

/// Outcome of one broadcast pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Sessions the frame was queued for.
    pub delivered: usize,
    /// Sessions skipped because their queue was full or closed.
    pub dropped: usize,
}

/// Sends frames to every session in the registry.
///
/// Cheap to clone; clones share the registry. A frame longer than
/// `max_frame_len` is never queued, since every reader would reject it.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<SessionRegistry>,
    server_name: Arc<str>,
    echo_to_sender: bool,
    max_frame_len: usize,
}

impl Dispatcher {
    pub fn new(registry: Arc<SessionRegistry>, server_name: &str, echo_to_sender: bool) -> Self {
        Self {
            registry,
            server_name: Arc::from(server_name),
            echo_to_sender,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }

    pub fn from_config(registry: Arc<SessionRegistry>, config: &Config) -> Self {
        Self::new(
            registry,
            &config.server.name,
            config.broadcast.echo_to_sender,
        )
        .with_max_frame_len(config.limits.max_frame_len)
    }

    /// Set the largest encoded frame that may be broadcast.
    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    /// Identity used as the sender of server notices.
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Broadcast a line said by `sender_name` from session `origin`.
    ///
    /// The origin only receives its own line when echo is enabled.
    pub fn broadcast_from_client(
        &self,
        origin: SessionId,
        sender_name: &str,
        text: &str,
    ) -> Result<BroadcastReport, ProtocolError> {
        let frame = self.encode(sender_name, text)?;
        let skip = (!self.echo_to_sender).then_some(origin);
        Ok(self.fan_out(&frame, skip))
    }

    /// Broadcast a notice with the server identity as sender.
    pub fn broadcast_from_server(&self, text: &str) -> Result<BroadcastReport, ProtocolError> {
        let frame = self.encode(&self.server_name, text)?;
        Ok(self.fan_out(&frame, None))
    }

    /// Encode once and check the result against the frame limit.
    ///
    /// Re-encoding under the registered name can grow a line the peer sent
    /// within the limit, so the check happens here and not only on input.
    fn encode(&self, sender: &str, text: &str) -> Result<EncodedFrame, ProtocolError> {
        let frame = zipzop_proto::encode(sender, text)?;
        if frame.len() > self.max_frame_len {
            return Err(ProtocolError::FrameTooLong {
                actual: frame.len(),
                limit: self.max_frame_len,
            });
        }
        Ok(frame)
    }

    /// Queue `frame` for every registered session except `skip`.
    fn fan_out(&self, frame: &EncodedFrame, skip: Option<SessionId>) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        self.registry.for_each(|session| {
            if Some(session.id()) == skip {
                return;
            }
            match session.deliver(frame) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.dropped += 1;
                    warn!(
                        session = %session.id(),
                        name = session.name(),
                        error = e.error_code(),
                        "Dropped broadcast for session"
                    );
                }
            }
        });

        debug!(
            bytes = frame.len(),
            delivered = report.delivered,
            dropped = report.dropped,
            "Broadcast"
        );
        report
    }
}
