//! Speak: local input lines out to the room.

use futures_util::{Sink, SinkExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};
use zipzop_proto::{Command, DEFAULT_MAX_FRAME_LEN, Frame, ProtocolError, TERMINATOR};

use super::ClientExit;
use crate::error::ClientError;

/// Send every input line as a frame until `/exit` or end of input.
pub async fn speak<W, I>(mut sink: W, name: &str, input: I) -> Result<ClientExit, ClientError>
where
    W: Sink<Frame, Error = ProtocolError> + Unpin,
    I: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if Command::parse(&line) == Command::Exit {
            debug!("Leaving the room");
            return Ok(ClientExit::UserExit);
        }
        if line.contains(char::from(TERMINATOR)) {
            warn!("Dropping line containing NUL");
            continue;
        }
        let frame = Frame::new(name, line);
        if frame.encoded_len() > DEFAULT_MAX_FRAME_LEN {
            warn!(
                bytes = frame.encoded_len(),
                limit = DEFAULT_MAX_FRAME_LEN,
                "Dropping line too long to send"
            );
            continue;
        }
        sink.send(frame).await?;
    }

    debug!("Input closed");
    Ok(ClientExit::InputClosed)
}
