use std::io::Write;

use bytes::BytesMut;
use tcpframe_transport::write_exactly;
use tracing::trace;

use crate::codec::{encode_frame, text_payload, HEADER_SIZE};
use crate::error::{FrameError, Result};

/// Encode `payload` as one frame and write it completely (blocking).
///
/// Any length is accepted up to `max_payload`, including zero.
pub fn write_frame<T: Write + ?Sized>(
    stream: &mut T,
    payload: &[u8],
    max_payload: usize,
) -> Result<()> {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    write_frame_buffered(stream, payload, max_payload, &mut buf)
}

/// Write `text` as one frame, stopping at its first NUL if it has one.
pub fn write_text<T: Write + ?Sized>(
    stream: &mut T,
    text: &str,
    max_payload: usize,
) -> Result<()> {
    write_frame(stream, text_payload(text), max_payload)
}

/// Same as [`write_frame`], reusing `buf` as the staging buffer.
pub(crate) fn write_frame_buffered<T: Write + ?Sized>(
    stream: &mut T,
    payload: &[u8],
    max_payload: usize,
    buf: &mut BytesMut,
) -> Result<()> {
    if payload.len() > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: max_payload,
        });
    }

    buf.clear();
    encode_frame(payload, buf)?;
    write_exactly(stream, &buf[..])?;
    stream.flush()?;
    trace!(len = payload.len(), "frame sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, ErrorKind};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::codec::{decode_frame, DEFAULT_MAX_PAYLOAD};

    fn decode_all(bytes: &[u8]) -> Vec<Vec<u8>> {
        let mut wire = BytesMut::from(bytes);
        let mut out = Vec::new();
        while let Some(frame) = decode_frame(&mut wire, usize::MAX).unwrap() {
            out.push(frame.payload.to_vec());
        }
        assert!(wire.is_empty(), "trailing bytes after last frame");
        out
    }

    #[test]
    fn write_single_frame() {
        let mut sink = Cursor::new(Vec::<u8>::new());
        write_frame(&mut sink, b"hello", DEFAULT_MAX_PAYLOAD).unwrap();
        assert_eq!(decode_all(sink.get_ref()), vec![b"hello".to_vec()]);
    }

    #[test]
    fn write_multiple_frames() {
        let mut sink = Cursor::new(Vec::<u8>::new());
        write_frame(&mut sink, b"one", DEFAULT_MAX_PAYLOAD).unwrap();
        write_frame(&mut sink, b"two", DEFAULT_MAX_PAYLOAD).unwrap();
        write_frame(&mut sink, b"three", DEFAULT_MAX_PAYLOAD).unwrap();

        assert_eq!(
            decode_all(sink.get_ref()),
            vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]
        );
    }

    #[test]
    fn zero_length_binary_frame_is_expressible() {
        let mut sink = Cursor::new(Vec::<u8>::new());
        write_frame(&mut sink, b"", DEFAULT_MAX_PAYLOAD).unwrap();
        assert_eq!(sink.get_ref().as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn text_mode_uses_string_length() {
        let mut sink = Cursor::new(Vec::<u8>::new());
        write_text(&mut sink, "ping", DEFAULT_MAX_PAYLOAD).unwrap();
        assert_eq!(sink.get_ref().as_slice(), b"\x00\x00\x00\x04ping");
    }

    #[test]
    fn text_mode_stops_at_nul() {
        let mut sink = Cursor::new(Vec::<u8>::new());
        write_text(&mut sink, "abc\0def", DEFAULT_MAX_PAYLOAD).unwrap();
        assert_eq!(decode_all(sink.get_ref()), vec![b"abc".to_vec()]);
    }

    #[test]
    fn payload_too_large_rejected() {
        let mut sink = Cursor::new(Vec::<u8>::new());
        let err = write_frame(&mut sink, b"oversized", 4).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 9, max: 4 }));
        assert!(sink.get_ref().is_empty());
    }

    #[test]
    fn flush_propagates() {
        let mut sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);

        write_frame(&mut sink, b"x", DEFAULT_MAX_PAYLOAD).unwrap();

        assert!(flag.load(Ordering::SeqCst));
        assert_eq!(sink.data.len(), HEADER_SIZE + 1);
    }

    #[test]
    fn short_writes_are_completed() {
        let mut sink = OneByteWriter::default();
        write_frame(&mut sink, b"chunks", DEFAULT_MAX_PAYLOAD).unwrap();
        assert_eq!(decode_all(&sink.data), vec![b"chunks".to_vec()]);
    }

    #[test]
    fn connection_closed_when_write_returns_zero() {
        let err = write_frame(&mut ZeroWriter, b"x", DEFAULT_MAX_PAYLOAD).unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn broken_pipe_surfaces_as_closed() {
        let err = write_frame(&mut BrokenPipeWriter, b"x", DEFAULT_MAX_PAYLOAD).unwrap_err();
        assert!(err.is_connection_closed());
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct OneByteWriter {
        data: Vec<u8>,
    }

    impl Write for OneByteWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            match buf.first() {
                Some(b) => {
                    self.data.push(*b);
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct BrokenPipeWriter;

    impl Write for BrokenPipeWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
