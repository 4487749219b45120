//! Broadcast behavior seen by real TCP clients.

mod common;

use common::TestServer;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use zipzop_proto::{DEFAULT_MAX_FRAME_LEN, Frame};

#[tokio::test]
async fn test_line_reaches_every_session() {
    let server = TestServer::spawn().await.expect("Failed to spawn server");

    let mut alice = server.connect("alice").await.expect("Failed to connect alice");
    let mut bob = server.connect("bob").await.expect("Failed to connect bob");
    let mut carol = server.connect("carol").await.expect("Failed to connect carol");
    server.wait_for_sessions(3).await.expect("Sessions never registered");

    alice.send("hi").await.expect("Failed to send");

    for client in [&mut alice, &mut bob, &mut carol] {
        let frames = client
            .recv_until(|f| f.content == "hi")
            .await
            .expect("Broadcast never arrived");
        assert_eq!(frames.last(), Some(&Frame::new("alice", "hi")));
    }
}

#[tokio::test]
async fn test_arrivals_and_departures_are_announced() {
    let server = TestServer::spawn().await.expect("Failed to spawn server");

    let mut alice = server.connect("alice").await.expect("Failed to connect alice");
    alice
        .recv_until(|f| f.content == "alice has joined")
        .await
        .expect("No arrival notice for alice");

    let bob = server.connect("bob").await.expect("Failed to connect bob");
    let joined = alice.recv().await.expect("No arrival notice for bob");
    assert_eq!(joined, Frame::new("server", "bob has joined"));

    bob.quit().await.expect("Failed to quit");
    let left = alice.recv().await.expect("No departure notice");
    assert_eq!(left, Frame::new("server", "bob has left"));
    server.wait_for_sessions(1).await.expect("bob was not removed");
}

#[tokio::test]
async fn test_notices_use_configured_server_name() {
    let server = TestServer::spawn_with(|config| config.server.name = "zipzop".to_string())
        .await
        .expect("Failed to spawn server");

    let mut alice = server.connect("alice").await.expect("Failed to connect");
    let joined = alice.recv().await.expect("No arrival notice");
    assert_eq!(joined, Frame::new("zipzop", "alice has joined"));
}

#[tokio::test]
async fn test_echo_can_be_disabled() {
    let server = TestServer::spawn_with(|config| {
        config.broadcast.echo_to_sender = false;
        config.broadcast.arrivals = false;
    })
    .await
    .expect("Failed to spawn server");

    let mut alice = server.connect("alice").await.expect("Failed to connect alice");
    let mut bob = server.connect("bob").await.expect("Failed to connect bob");
    server.wait_for_sessions(2).await.expect("Sessions never registered");

    alice.send("first").await.expect("Failed to send");
    assert_eq!(
        bob.recv().await.expect("bob missed the line"),
        Frame::new("alice", "first")
    );

    bob.send("second").await.expect("Failed to send");
    // alice's own line never comes back, so bob's is the next frame.
    assert_eq!(
        alice.recv().await.expect("alice missed the reply"),
        Frame::new("bob", "second")
    );
}

#[tokio::test]
async fn test_lines_from_one_sender_stay_in_order() {
    let server = TestServer::spawn_with(|config| config.broadcast.arrivals = false)
        .await
        .expect("Failed to spawn server");

    let mut alice = server.connect("alice").await.expect("Failed to connect alice");
    let mut bob = server.connect("bob").await.expect("Failed to connect bob");
    server.wait_for_sessions(2).await.expect("Sessions never registered");

    for i in 0..20 {
        alice.send(&format!("line {i}")).await.expect("Failed to send");
    }

    let frames = bob
        .recv_until(|f| f.content == "line 19")
        .await
        .expect("Lines went missing");
    let contents: Vec<_> = frames.into_iter().map(|f| f.content).collect();
    let expected: Vec<_> = (0..20).map(|i| format!("line {i}")).collect();
    assert_eq!(contents, expected);
}

#[tokio::test]
async fn test_line_too_long_after_renaming_is_not_broadcast() {
    let server = TestServer::spawn_with(|config| config.broadcast.arrivals = false)
        .await
        .expect("Failed to spawn server");
    let mut bob = server.connect("bob").await.expect("Failed to connect bob");
    server.wait_for_sessions(1).await.expect("bob never registered");

    // A legal inbound frame with an empty sender. Re-sent as "mallory" it
    // would no longer fit any reader's frame limit.
    let mut mallory = TcpStream::connect(server.address())
        .await
        .expect("Failed to connect mallory");
    let mut wire = b"mallory\0".to_vec();
    wire.extend(std::iter::repeat_n(b'x', DEFAULT_MAX_FRAME_LEN - 2));
    wire.extend_from_slice(b"\0\0");
    wire.extend_from_slice(b"still fine\0mallory\0");
    mallory.write_all(&wire).await.expect("Failed to write");

    let next = bob.recv().await.expect("bob's stream was poisoned");
    assert_eq!(next, Frame::new("mallory", "still fine"));

    bob.send("hello").await.expect("Failed to send");
    let echoed = bob.recv().await.expect("bob lost his session");
    assert_eq!(echoed, Frame::new("bob", "hello"));
    assert_eq!(server.registry().names(), vec!["bob", "mallory"]);
}
