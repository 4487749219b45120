//! Test chat client.
//!
//! Speaks the wire protocol directly so tests can assert on exact frames.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Framed;
use zipzop_proto::{Frame, FrameCodec};

/// A test chat client.
pub struct TestClient {
    framed: Framed<TcpStream, FrameCodec>,
    name: String,
}

impl TestClient {
    /// Connect and introduce as `name`.
    pub async fn connect(address: SocketAddr, name: &str) -> anyhow::Result<Self> {
        let mut stream = TcpStream::connect(address).await?;
        stream.write_all(name.as_bytes()).await?;
        stream.write_all(b"\0").await?;

        Ok(Self {
            framed: Framed::new(stream, FrameCodec::new()),
            name: name.to_string(),
        })
    }

    /// Send one chat line.
    pub async fn send(&mut self, text: &str) -> anyhow::Result<()> {
        self.framed.send(Frame::new(self.name.as_str(), text)).await?;
        Ok(())
    }

    /// Receive a single frame from the server.
    pub async fn recv(&mut self) -> anyhow::Result<Frame> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive a frame with a timeout.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<Frame> {
        match timeout(dur, self.framed.next()).await? {
            Some(frame) => Ok(frame?),
            None => anyhow::bail!("connection closed"),
        }
    }

    /// Receive frames until the given predicate returns true.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<Frame>>
    where
        F: FnMut(&Frame) -> bool,
    {
        let mut frames = Vec::new();
        loop {
            let frame = self.recv().await?;
            let done = predicate(&frame);
            frames.push(frame);
            if done {
                break;
            }
        }
        Ok(frames)
    }

    /// Read everything left until the server closes the connection.
    pub async fn drain_until_closed(&mut self) -> anyhow::Result<Vec<Frame>> {
        let mut frames = Vec::new();
        loop {
            match timeout(Duration::from_secs(5), self.framed.next()).await? {
                Some(frame) => frames.push(frame?),
                None => return Ok(frames),
            }
        }
    }

    /// Close the connection from the client side.
    pub async fn quit(mut self) -> anyhow::Result<()> {
        SinkExt::<Frame>::close(&mut self.framed).await?;
        Ok(())
    }
}
