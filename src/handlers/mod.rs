//! Message handlers.
//!
//! The only server-side action a chat line triggers is a broadcast to the
//! room; [`Dispatcher`] implements it for client lines and server notices.

mod broadcast;

pub use broadcast::{BroadcastReport, Dispatcher};
