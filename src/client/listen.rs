//! Listen: frames from the room out to the console.

use futures_util::{Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;
use zipzop_proto::{Frame, ProtocolError};

use super::ClientExit;
use crate::error::ClientError;

/// Print `sender: content` for every frame until the server goes away.
pub async fn listen<R, O>(mut stream: R, mut output: O) -> Result<ClientExit, ClientError>
where
    R: Stream<Item = Result<Frame, ProtocolError>> + Unpin,
    O: AsyncWrite + Unpin,
{
    while let Some(frame) = stream.next().await {
        let frame = frame?;
        output.write_all(format!("{frame}\n").as_bytes()).await?;
        output.flush().await?;
    }

    debug!("Server closed the connection");
    Ok(ClientExit::ServerClosed)
}
