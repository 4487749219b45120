//! Integration test common infrastructure.
//!
//! Provides an in-process test server with scripted admin input and a
//! client that speaks the wire protocol directly.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::TestServer;
