//! Length-prefixed message framing over TCP streams.
//!
//! Every message is framed with a 4-byte big-endian payload length followed
//! by exactly that many payload bytes. There is no magic, version or
//! checksum: framing only.
//!
//! No partial reads, no buffer management in user code.

#[cfg(feature = "async")]
pub mod async_codec;
pub mod codec;
pub mod error;
pub mod reader;
pub mod stream;
pub mod writer;

#[cfg(feature = "async")]
pub use async_codec::LengthPrefixCodec;
pub use codec::{
    decode_frame, decode_length, encode_frame, text_payload, Frame, FrameConfig,
    DEFAULT_MAX_PAYLOAD, HEADER_SIZE,
};
pub use error::{FrameError, Result};
pub use reader::read_frame;
pub use stream::FramedStream;
pub use writer::{write_frame, write_text};

pub use tcpframe_transport::Wait;
