use std::io::{Read, Write};

use bytes::BytesMut;
use tcpframe_transport::{TcpConnection, Wait, WaitReadable};

use crate::codec::{text_payload, Frame, FrameConfig};
use crate::error::Result;
use crate::reader::read_frame;
use crate::writer::write_frame_buffered;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Reads and writes complete frames over one stream.
///
/// Handles partial reads and writes internally. Callers always deal in
/// whole frames.
pub struct FramedStream<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T> FramedStream<T> {
    /// Wrap a stream with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Wrap a stream with explicit configuration.
    ///
    /// `config.io_timeout` is not applied here; see
    /// [`FramedStream::with_config_tcp`].
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the wrapper and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent frames.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl<T: Read + WaitReadable> FramedStream<T> {
    /// Read the next complete frame, waiting for it as `wait` allows.
    pub fn read_frame(&mut self, wait: Wait) -> Result<Frame> {
        read_frame(&mut self.inner, wait, self.config.max_payload_size)
    }
}

impl<T: Write> FramedStream<T> {
    /// Send `payload` as one frame. Zero-length payloads are allowed.
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        write_frame_buffered(
            &mut self.inner,
            payload,
            self.config.max_payload_size,
            &mut self.buf,
        )
    }

    /// Send `text` as one frame, stopping at its first NUL.
    pub fn send_text(&mut self, text: &str) -> Result<()> {
        self.send(text_payload(text))
    }
}

impl FramedStream<TcpConnection> {
    /// Wrap a TCP connection and apply `config.io_timeout` to its socket.
    pub fn with_config_tcp(inner: TcpConnection, config: FrameConfig) -> Result<Self> {
        inner.set_read_timeout(config.io_timeout)?;
        inner.set_write_timeout(config.io_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for FramedStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramedStream")
            .field("inner", &self.inner)
            .field("config", &self.config)
            .finish()
    }
}
