//! Client and server roles over framed TCP streams.
//!
//! [`TcpClient`] owns one outbound connection. [`TcpServer`] owns one
//! listening socket and at most one accepted client at a time. Both are
//! blocking and single-threaded; run one instance per thread for
//! concurrent peers.

pub mod client;
pub mod error;
pub mod server;

pub use client::{ClientConfig, TcpClient};
pub use error::{PeerError, Result};
pub use server::{ServerConfig, TcpServer};

pub use tcpframe_frame::{Frame, FrameConfig, Wait};
