//! Exact-length I/O loops.
//!
//! A single `recv`/`send` may transfer fewer bytes than requested. These
//! loops keep issuing calls until the whole buffer has moved or the stream
//! fails. Every failure is terminal for the transfer: `Interrupted` and
//! `WouldBlock` are reported, not retried, and the bytes already moved are
//! not rolled back, so the caller must treat the stream as unusable.

use std::io::{Read, Write};

use crate::error::{Result, TransportError};

/// Fill `buf` completely from `reader`.
///
/// Returns [`TransportError::ConnectionClosed`] if the reader reports
/// end-of-stream before `buf` is full. An empty `buf` succeeds without
/// touching the reader.
pub fn read_exactly<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Err(TransportError::ConnectionClosed),
            Ok(n) => filled += n,
            Err(err) => return Err(TransportError::Io(err)),
        }
    }
    Ok(())
}

/// Write all of `buf` to `writer`.
///
/// A write call that accepts zero bytes is treated as a closed connection.
pub fn write_exactly<W: Write + ?Sized>(writer: &mut W, buf: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < buf.len() {
        match writer.write(&buf[offset..]) {
            Ok(0) => return Err(TransportError::ConnectionClosed),
            Ok(n) => offset += n,
            Err(err) => return Err(TransportError::Io(err)),
        }
    }
    Ok(())
}
