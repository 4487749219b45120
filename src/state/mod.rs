//! State management module.
//!
//! Contains the session registry (shared server state) and its entries.

mod registry;
mod session;
mod uid;

pub use registry::SessionRegistry;
pub use session::{Session, Termination};
pub use uid::{SessionId, SessionIdGenerator};
