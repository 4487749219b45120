//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds the listening socket and spawns a Connection task for
//! each incoming client until the shutdown signal fires.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpSocket, lookup_host};
use tokio::sync::broadcast;
use tracing::{Instrument, error, info, instrument, warn};

use crate::config::{BroadcastConfig, Config, LimitsConfig, ListenConfig};
use crate::error::StartupError;
use crate::handlers::Dispatcher;
use crate::network::Connection;
use crate::state::SessionRegistry;
use crate::telemetry::spans;

/// Resolve the configured address and listen on the first usable result.
///
/// Mirrors getaddrinfo + socket/bind/listen: every resolved address is tried
/// in order, with `SO_REUSEADDR` set.
pub async fn bind_listener(config: &ListenConfig) -> Result<TcpListener, StartupError> {
    let addrs: Vec<SocketAddr> = lookup_host(config.address.as_str())
        .await
        .map_err(|source| StartupError::Resolve {
            address: config.address.clone(),
            source,
        })?
        .collect();

    let mut last_err = None;
    for addr in addrs {
        match bind_one(addr, config.backlog) {
            Ok(listener) => return Ok(listener),
            Err(e) => {
                warn!(%addr, error = %e, "Could not use resolved address");
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| StartupError::Resolve {
        address: config.address.clone(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved"),
    }))
}

fn bind_one(addr: SocketAddr, backlog: u32) -> Result<TcpListener, StartupError> {
    let bind_err = |source: std::io::Error| StartupError::Bind { addr, source };

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(bind_err)?;
    socket.set_reuseaddr(true).map_err(bind_err)?;
    socket.bind(addr).map_err(bind_err)?;
    socket
        .listen(backlog)
        .map_err(|source| StartupError::Listen { addr, source })
}

/// The Gateway accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    registry: Arc<SessionRegistry>,
    dispatcher: Dispatcher,
    limits: LimitsConfig,
    notices: BroadcastConfig,
    shutdown_rx: broadcast::Receiver<()>,
}

impl Gateway {
    pub fn new(
        listener: TcpListener,
        config: &Config,
        registry: Arc<SessionRegistry>,
        dispatcher: Dispatcher,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            listener,
            registry,
            dispatcher,
            limits: config.limits.clone(),
            notices: config.broadcast.clone(),
            shutdown_rx,
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the shutdown signal fires.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.recv() => {
                    info!("Shutdown signal received, no longer accepting");
                    break;
                }

                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        info!(%addr, "Connection accepted");
                        if let Err(e) = stream.set_nodelay(true) {
                            warn!(%addr, error = %e, "Could not set TCP_NODELAY");
                        }

                        let connection = Connection::new(
                            stream,
                            addr,
                            Arc::clone(&self.registry),
                            self.dispatcher.clone(),
                            self.limits.clone(),
                            self.notices.clone(),
                        );
                        tokio::spawn(
                            async move {
                                if let Err(e) = connection.run().await {
                                    warn!(
                                        %addr,
                                        error = %e,
                                        code = e.error_code(),
                                        "Connection rejected"
                                    );
                                }
                            }
                            .instrument(spans::connection(&addr)),
                        );
                    }
                    Err(e) => {
                        error!(error = %e, "Accept failed");
                    }
                },
            }
        }
    }
}
