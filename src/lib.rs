//! Wirebuf - Fixed-Capacity Binary Message Buffers
//!
//! A cursor buffer for building and parsing length-prefixed binary messages
//! exchanged between processes over sockets or IPC channels.
//!
//! # Features
//!
//! - **Fixed capacity**: storage is allocated once, fallibly, and never grows
//! - **Sequential access**: one forward-only cursor for both writing and reading
//! - **Atomic operations**: a failed write or read changes nothing
//! - **Explicit errors**: reads return `Result`, never an in-band sentinel
//! - **Injected diagnostics**: every failure is reported on a [`LogChannel`]
//!
//! # Wire Format
//!
//! Host byte order, no padding:
//!
//! ```text
//! u8      1 byte
//! u32     4 bytes
//! string  u32 length prefix, then that many raw bytes
//! ```
//!
//! # Example
//!
//! ```rust
//! use wirebuf::{Buffer, LogChannel};
//!
//! let mut out = Buffer::create(12).unwrap();
//! out.write_u8(7).unwrap();
//! out.write_u32(1000).unwrap();
//! out.write_string(b"abc").unwrap();
//! assert!(out.is_full());
//!
//! let mut input = Buffer::from_bytes(out.into_bytes(), LogChannel::silent()).unwrap();
//! assert_eq!(input.read_u8().unwrap(), 7);
//! assert_eq!(input.read_u32().unwrap(), 1000);
//! assert_eq!(input.read_string().unwrap(), b"abc");
//! assert_eq!(input.cursor(), 12);
//! ```

pub mod buffer;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod layout;

pub use buffer::{Buffer, LENGTH_PREFIX};
pub use config::{ConfigError, ConfigResult, WirebufConfig};
pub use diagnostics::{LogChannel, LogRecord, LogSink, MemorySink, Severity};
pub use error::{BufferError, BufferResult};
pub use layout::{Decoded, Field, FieldKind, LayoutError};
