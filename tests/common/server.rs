//! Test server management.
//!
//! Runs a zipzop server inside the test runtime on an ephemeral port. Admin
//! input is a pipe the test writes `/shutdown` into.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncWriteExt, BufReader, DuplexStream};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use zipzop::Server;
use zipzop::config::Config;
use zipzop::lifecycle::AdminOutcome;
use zipzop::state::SessionRegistry;

/// A test server instance.
pub struct TestServer {
    address: SocketAddr,
    registry: Arc<SessionRegistry>,
    admin: DuplexStream,
    task: Option<JoinHandle<AdminOutcome>>,
}

impl TestServer {
    /// Spawn a server with fast test timings.
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn a server after adjusting the test config.
    pub async fn spawn_with<F>(customize: F) -> anyhow::Result<Self>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = Config::default();
        config.listen.address = "127.0.0.1:0".to_string();
        config.shutdown.countdown = 3;
        config.shutdown.tick_ms = 20;
        config.shutdown.grace_ms = 500;
        config.limits.handshake_timeout_secs = 2;
        customize(&mut config);

        let server = Server::bind(config).await?;
        let address = server.local_addr()?;
        let registry = server.registry();

        let (admin, admin_rx) = tokio::io::duplex(256);
        let task = tokio::spawn(server.run(BufReader::new(admin_rx)));

        Ok(Self {
            address,
            registry,
            admin,
            task: Some(task),
        })
    }

    /// Get the server address.
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Create a new test client connected to this server.
    pub async fn connect(&self, name: &str) -> anyhow::Result<super::client::TestClient> {
        let client = super::client::TestClient::connect(self.address, name).await?;
        Ok(client)
    }

    /// Type one line on the server's admin console.
    pub async fn admin(&mut self, line: &str) -> anyhow::Result<()> {
        self.admin.write_all(line.as_bytes()).await?;
        self.admin.write_all(b"\n").await?;
        self.admin.flush().await?;
        Ok(())
    }

    /// Wait until exactly `count` sessions are registered.
    pub async fn wait_for_sessions(&self, count: usize) -> anyhow::Result<()> {
        for _ in 0..100 {
            if self.registry.len() == count {
                return Ok(());
            }
            sleep(Duration::from_millis(10)).await;
        }
        anyhow::bail!(
            "expected {count} sessions, found {}",
            self.registry.len()
        )
    }

    /// Issue `/shutdown` and wait for the sequence to finish.
    pub async fn shutdown(mut self) -> anyhow::Result<AdminOutcome> {
        self.admin("/shutdown").await?;
        let task = self
            .task
            .take()
            .ok_or_else(|| anyhow::anyhow!("server already stopped"))?;
        let outcome = tokio::time::timeout(Duration::from_secs(10), task).await??;
        Ok(outcome)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
