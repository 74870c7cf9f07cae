use std::io::Read;

use bytes::BytesMut;
use tcpframe_transport::{read_exactly, Wait, WaitReadable};
use tracing::{trace, warn};

use crate::codec::{decode_length, Frame, HEADER_SIZE};
use crate::error::{FrameError, Result};

/// Read one complete frame from `stream` (blocking).
///
/// `wait` only governs the time until the length prefix starts arriving.
/// Once the prefix is in, the payload is read to completion with no further
/// readiness wait, so a peer that stalls mid-frame blocks this call unless
/// the stream itself carries a read timeout.
///
/// The declared length is checked against `max_payload` before any payload
/// buffer is allocated.
pub fn read_frame<T>(stream: &mut T, wait: Wait, max_payload: usize) -> Result<Frame>
where
    T: Read + WaitReadable + ?Sized,
{
    if let Some(timeout) = wait.readiness_timeout() {
        trace!(?timeout, "waiting for frame");
        if !stream.wait_readable(timeout)? {
            return Err(FrameError::Timeout(timeout.unwrap_or_default()));
        }
    }

    let mut header = [0u8; HEADER_SIZE];
    read_exactly(stream, &mut header)?;

    let len = decode_length(header);
    if len > max_payload {
        warn!(len, max_payload, "peer declared oversized frame");
        return Err(FrameError::PayloadTooLarge {
            size: len,
            max: max_payload,
        });
    }

    let mut payload = BytesMut::zeroed(len);
    read_exactly(stream, &mut payload)?;
    trace!(len, "frame received");

    Ok(Frame {
        payload: payload.freeze(),
    })
}
