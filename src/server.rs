//! Server assembly: one registry, one acceptor, one admin loop.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncBufRead;
use tracing::info;

use crate::config::{Config, validate};
use crate::error::StartupError;
use crate::handlers::Dispatcher;
use crate::lifecycle::{AdminOutcome, Lifecycle, ShutdownOrchestrator};
use crate::network::{Gateway, bind_listener};
use crate::state::SessionRegistry;

/// A bound, not yet running chat server.
pub struct Server {
    config: Config,
    gateway: Gateway,
    registry: Arc<SessionRegistry>,
    dispatcher: Dispatcher,
    lifecycle: Lifecycle,
}

impl Server {
    /// Validate the config, then resolve, bind and listen.
    pub async fn bind(config: Config) -> Result<Self, StartupError> {
        validate(&config).map_err(StartupError::Invalid)?;
        let listener = bind_listener(&config.listen).await?;

        let registry = Arc::new(SessionRegistry::new());
        let dispatcher = Dispatcher::from_config(Arc::clone(&registry), &config);
        let lifecycle = Lifecycle::new();
        let gateway = Gateway::new(
            listener,
            &config,
            Arc::clone(&registry),
            dispatcher.clone(),
            lifecycle.subscribe(),
        );

        Ok(Self {
            config,
            gateway,
            registry,
            dispatcher,
            lifecycle,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.gateway.local_addr()
    }

    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Serve until `/shutdown` arrives on `admin` and the room is closed.
    pub async fn run<R>(self, admin: R) -> AdminOutcome
    where
        R: AsyncBufRead + Unpin,
    {
        if let Ok(addr) = self.gateway.local_addr() {
            info!(%addr, server = %self.config.server.name, "Listening");
        }

        let acceptor = tokio::spawn(self.gateway.run());
        let orchestrator = ShutdownOrchestrator::new(
            self.registry,
            self.dispatcher,
            self.lifecycle,
            self.config.shutdown,
        );
        orchestrator.run(admin, acceptor).await
    }
}
