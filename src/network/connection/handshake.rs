//! Name introduction that precedes framed traffic.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use zipzop_proto::IntroductionCodec;

use crate::error::HandshakeError;

/// Wait for the peer's declared name.
///
/// Bytes after the name terminator stay buffered in `framed`.
pub(super) async fn read_introduction<S>(
    framed: &mut Framed<S, IntroductionCodec>,
    timeout: Duration,
) -> Result<String, HandshakeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match tokio::time::timeout(timeout, framed.next()).await {
        Err(_) => Err(HandshakeError::Timeout(timeout.as_secs())),
        Ok(None) => Err(HandshakeError::Closed),
        Ok(Some(Err(e))) => Err(e.into()),
        Ok(Some(Ok(name))) => Ok(name),
    }
}
