//! Sessions leaving on their own while others keep chatting.

mod common;

use common::TestServer;
use zipzop::lifecycle::{AdminOutcome, ShutdownReport};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_disconnects_remove_each_session_once() {
    let server = TestServer::spawn_with(|config| {
        config.broadcast.arrivals = false;
        config.broadcast.departures = false;
    })
    .await
    .expect("Failed to spawn server");

    let mut clients = Vec::new();
    for i in 0..20 {
        let client = server
            .connect(&format!("user{i}"))
            .await
            .expect("Failed to connect");
        clients.push(client);
    }
    server.wait_for_sessions(20).await.expect("Sessions never registered");

    let leaving: Vec<_> = clients.split_off(10);
    let quits: Vec<_> = leaving
        .into_iter()
        .map(|client| tokio::spawn(client.quit()))
        .collect();
    for quit in quits {
        quit.await.expect("Quit task panicked").expect("Failed to quit");
    }

    server.wait_for_sessions(10).await.expect("Leavers were not removed");

    let outcome = server.shutdown().await.expect("Shutdown did not finish");
    assert_eq!(
        outcome,
        AdminOutcome::Shutdown(ShutdownReport {
            sessions: 10,
            aborted: 0
        })
    );
}

#[tokio::test]
async fn test_departure_reaches_remaining_sessions() {
    let server = TestServer::spawn_with(|config| config.broadcast.arrivals = false)
        .await
        .expect("Failed to spawn server");

    let mut alice = server.connect("alice").await.expect("Failed to connect alice");
    let bob = server.connect("bob").await.expect("Failed to connect bob");
    server.wait_for_sessions(2).await.expect("Sessions never registered");

    drop(bob);
    let left = alice.recv().await.expect("No departure notice");
    assert_eq!(left.content, "bob has left");

    alice.send("anyone?").await.expect("Failed to send");
    let echoed = alice.recv().await.expect("alice lost her session");
    assert_eq!(echoed.content, "anyone?");
    assert_eq!(server.registry().names(), vec!["alice"]);
}

#[tokio::test]
async fn test_peer_leaving_mid_shutdown_is_counted_once() {
    let server = TestServer::spawn_with(|config| {
        config.broadcast.arrivals = false;
        config.shutdown.tick_ms = 100;
    })
    .await
    .expect("Failed to spawn server");

    let mut alice = server.connect("alice").await.expect("Failed to connect alice");
    let bob = server.connect("bob").await.expect("Failed to connect bob");
    server.wait_for_sessions(2).await.expect("Sessions never registered");

    let shutdown = tokio::spawn(server.shutdown());
    alice
        .recv_until(|f| f.content.starts_with("Server shutting down"))
        .await
        .expect("No countdown");
    bob.quit().await.expect("Failed to quit");

    let outcome = shutdown
        .await
        .expect("Shutdown task panicked")
        .expect("Shutdown did not finish");
    assert_eq!(
        outcome,
        AdminOutcome::Shutdown(ShutdownReport {
            sessions: 1,
            aborted: 0
        })
    );
}
