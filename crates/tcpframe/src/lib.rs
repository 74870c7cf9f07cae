//! Length-prefixed message framing over TCP.
//!
//! tcpframe turns a TCP byte stream into discrete messages: a 4-byte
//! big-endian length followed by the payload.
//!
//! # Crate Structure
//!
//! - [`transport`]: Owned TCP sockets, readiness waits, exact-length I/O
//! - [`frame`]: Frame codec and blocking frame read/write
//! - [`peer`]: Single-connection client and server roles (behind `peer` feature)

/// Re-export transport types.
pub mod transport {
    pub use tcpframe_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use tcpframe_frame::*;
}

/// Re-export client and server roles (requires `peer` feature).
#[cfg(feature = "peer")]
pub mod peer {
    pub use tcpframe_peer::*;
}
