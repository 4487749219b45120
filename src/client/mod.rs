//! The terminal client.
//!
//! After the introduction the connection is split in two. *Speak* forwards
//! local lines to the server; *Listen* prints whatever the server sends.
//! Whichever loop finishes first ends the session and the other is dropped.

mod listen;
mod speak;

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncBufRead, AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, lookup_host};
use tokio_util::codec::Framed;
use tracing::{debug, info};
use zipzop_proto::{Frame, FrameCodec, IntroductionCodec, transport};

use crate::error::{ClientError, StartupError};

pub use listen::listen;
pub use speak::speak;

/// Why the client stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientExit {
    /// The user typed `/exit`.
    UserExit,
    /// Local input ended.
    InputClosed,
    /// The server closed the connection.
    ServerClosed,
}

/// Resolve `server:port` and connect to the first address that answers.
pub async fn connect(server: &str, port: u16) -> Result<TcpStream, StartupError> {
    let address = format!("{server}:{port}");
    let addrs: Vec<SocketAddr> = lookup_host(address.as_str())
        .await
        .map_err(|source| StartupError::Resolve {
            address: address.clone(),
            source,
        })?
        .collect();

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                info!(%addr, "Connected");
                return Ok(stream);
            }
            Err(e) => {
                debug!(%addr, error = %e, "Connect attempt failed");
                last_err = Some(e);
            }
        }
    }

    Err(StartupError::Connect {
        address,
        source: last_err.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved")
        }),
    })
}

/// Send the introduction and switch the stream to chat frames.
pub async fn join<S>(stream: S, name: &str) -> Result<Framed<S, FrameCodec>, ClientError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut framed = Framed::new(stream, IntroductionCodec::default());
    framed.send(name.to_owned()).await?;
    Ok(transport::into_frames(framed, FrameCodec::new()))
}

/// Run Speak and Listen until either one finishes.
pub async fn run<S, I, O>(
    transport: Framed<S, FrameCodec>,
    name: &str,
    input: I,
    output: O,
) -> Result<ClientExit, ClientError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let (sink, stream) = transport.split::<Frame>();

    tokio::select! {
        spoken = speak(sink, name, input) => spoken,
        heard = listen(stream, output) => heard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_join_sends_name_then_frames() {
        let (local, mut server) = tokio::io::duplex(1024);
        let mut transport = join(local, "alice").await.unwrap();
        transport.send(Frame::new("alice", "hi")).await.unwrap();
        drop(transport);

        let mut wire = Vec::new();
        server.read_to_end(&mut wire).await.unwrap();
        assert_eq!(wire, b"alice\0hi\0alice\0");
    }

    #[tokio::test]
    async fn test_server_close_ends_session() {
        let (local, server) = tokio::io::duplex(1024);
        let transport = join(local, "alice").await.unwrap();

        // Keep stdin open so only Listen can finish.
        let (_stdin_tx, stdin_rx) = tokio::io::duplex(64);
        let stdin = tokio::io::BufReader::new(stdin_rx);
        let mut console = Vec::new();

        let mut server = server;
        let mut intro = [0u8; 6];
        server.read_exact(&mut intro).await.unwrap();
        server.write_all(b"welcome\0server\0").await.unwrap();
        drop(server);

        let exit = run(transport, "alice", stdin, &mut console).await.unwrap();
        assert_eq!(exit, ClientExit::ServerClosed);
        assert_eq!(console, b"server: welcome\n");
    }

    #[tokio::test]
    async fn test_exit_ends_session() {
        let (local, _server) = tokio::io::duplex(1024);
        let transport = join(local, "alice").await.unwrap();
        let mut console = Vec::new();

        let exit = run(transport, "alice", &b"/exit\n"[..], &mut console)
            .await
            .unwrap();
        assert_eq!(exit, ClientExit::UserExit);
        assert!(console.is_empty());
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind then drop to find a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = connect("127.0.0.1", port).await.unwrap_err();
        assert_eq!(err.exit_code(), 5);
    }
}
