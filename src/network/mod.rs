//! Network module.
//!
//! Contains the Gateway (TCP listener) and the per-connection Session Handler.

mod connection;
mod gateway;

pub use connection::{Connection, SessionExit, SessionHandler};
pub use gateway::{Gateway, bind_listener};
