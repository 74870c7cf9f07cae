//! Owned TCP sockets and exact-length I/O.
//!
//! This is the lowest layer of tcpframe:
//! - [`TcpConnection`]: a connected stream with a readiness wait
//! - [`TcpListenerSocket`]: a bound listener with an explicit backlog
//! - [`read_exactly`] / [`write_exactly`]: loops that move an exact byte
//!   count over a stream that may deliver partially
//!
//! Everything else builds on top of these.

pub mod error;
pub mod io;
pub mod listener;
pub mod signal;
pub mod stream;
pub mod traits;

pub use error::{Result, TransportError};
pub use io::{read_exactly, write_exactly};
pub use listener::TcpListenerSocket;
pub use signal::ignore_sigpipe;
pub use stream::TcpConnection;
pub use traits::{Wait, WaitReadable};
