//! # zipzop-proto
//!
//! Wire format of the zipzop chatroom.
//!
//! ## Features
//!
//! - Frame encoding and decoding (`content\0sender\0`)
//! - Stream reassembly with a per-connection buffer and a frame size limit
//! - The name introduction that opens every connection
//! - Console command classification (`/shutdown`, `/exit`)
//!
//! ## Quick Start
//!
//! ```rust
//! use zipzop_proto::{decode, encode, Frame};
//!
//! let wire = encode("alice", "hi").unwrap();
//! assert_eq!(wire.as_bytes(), b"hi\0alice\0");
//!
//! let frame = decode(wire.as_bytes()).unwrap();
//! assert_eq!(frame, Frame::new("alice", "hi"));
//! println!("{}", frame); // alice: hi
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

#[cfg(feature = "tokio")]
pub mod codec;
pub mod command;
pub mod error;
pub mod frame;
#[cfg(feature = "tokio")]
pub mod intro;
#[cfg(feature = "tokio")]
pub mod transport;

#[cfg(feature = "tokio")]
pub use self::codec::{FrameCodec, DEFAULT_MAX_FRAME_LEN};
pub use self::command::Command;
pub use self::error::{Field, ProtocolError, Result};
pub use self::frame::{decode, encode, EncodedFrame, Frame, TERMINATOR};
#[cfg(feature = "tokio")]
pub use self::intro::{validate_name, IntroductionCodec, DEFAULT_MAX_NAME_LEN};
