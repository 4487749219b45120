//! zipzop - a small real-time chatroom.
//!
//! The server keeps one room. Every line a client sends is broadcast to
//! everyone present, prefixed with the sender's name. An operator ends the
//! room by typing `/shutdown` on the server's stdin, which starts a
//! countdown visible to every client.
//!
//! The `zipzopd` binary runs a [`Server`]; the `zipzop` binary is the
//! terminal client built from [`client`].

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod network;
pub mod server;
pub mod state;
pub mod telemetry;

pub use server::Server;
