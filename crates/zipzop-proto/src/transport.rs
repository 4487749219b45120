//! Codec hand-off between the introduction and the frame stream.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Framed, FramedParts};

use crate::codec::FrameCodec;
use crate::intro::IntroductionCodec;

/// Switch a connection from the introduction codec to the frame codec.
///
/// Bytes that were read but not yet decoded (frames sent in the same segment
/// as the name) and bytes not yet written carry over.
pub fn into_frames<T>(
    framed: Framed<T, IntroductionCodec>,
    codec: FrameCodec,
) -> Framed<T, FrameCodec>
where
    T: AsyncRead + AsyncWrite,
{
    let parts = framed.into_parts();
    tracing::trace!(buffered = parts.read_buf.len(), "switching to frame codec");

    let mut next = FramedParts::new::<crate::frame::Frame>(parts.io, codec);
    next.read_buf = parts.read_buf;
    next.write_buf = parts.write_buf;
    Framed::from_parts(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    use futures_util::{SinkExt, StreamExt};
    use tokio::io::AsyncWriteExt;

    use crate::frame::Frame;

    #[tokio::test]
    async fn test_into_frames_preserves_buffer() {
        let (client, server) = tokio::io::duplex(256);

        let writer = async move {
            let mut client = client;
            // One write so the name and the first frame share a read.
            client.write_all(b"alice\0hi\0alice\0").await.unwrap();
            client
        };

        let reader = async move {
            let mut framed = Framed::new(server, IntroductionCodec::default());
            let name = framed.next().await.unwrap().unwrap();
            assert_eq!(name, "alice");

            let mut framed = into_frames(framed, FrameCodec::new());
            let frame = framed.next().await.unwrap().unwrap();
            assert_eq!(frame, Frame::new("alice", "hi"));
        };

        let (_client, ()) = tokio::join!(writer, reader);
    }

    #[tokio::test]
    async fn test_into_frames_client_side() {
        let (client, server) = tokio::io::duplex(256);

        let mut framed = Framed::new(client, IntroductionCodec::default());
        framed.send("bob".to_string()).await.unwrap();
        let mut framed = into_frames(framed, FrameCodec::new());
        framed.send(Frame::new("bob", "yo")).await.unwrap();
        drop(framed);

        let mut server = server;
        let mut received = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut server, &mut received)
            .await
            .unwrap();
        assert_eq!(received, b"bob\0yo\0bob\0");
    }
}
