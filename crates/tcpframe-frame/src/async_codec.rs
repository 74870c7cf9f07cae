//! `tokio_util` codec for the same wire format, for callers that drive
//! sockets from an event loop instead of blocking calls.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{
    decode_frame, decode_length, encode_frame, Frame, DEFAULT_MAX_PAYLOAD, HEADER_SIZE,
};
use crate::error::{FrameError, Result};

/// Length-prefixed frame codec.
#[derive(Debug, Clone)]
pub struct LengthPrefixCodec {
    max_payload_size: usize,
}

impl LengthPrefixCodec {
    pub fn new() -> Self {
        Self::with_max_payload(DEFAULT_MAX_PAYLOAD)
    }

    pub fn with_max_payload(max_payload_size: usize) -> Self {
        Self { max_payload_size }
    }

    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }
}

impl Default for LengthPrefixCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LengthPrefixCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        let frame = decode_frame(src, self.max_payload_size)?;
        if frame.is_none() && src.len() >= HEADER_SIZE {
            let mut header = [0u8; HEADER_SIZE];
            header.copy_from_slice(&src[..HEADER_SIZE]);
            let total = HEADER_SIZE + decode_length(header);
            src.reserve(total.saturating_sub(src.len()));
        }
        Ok(frame)
    }
}

impl Encoder<Bytes> for LengthPrefixCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<()> {
        Encoder::<&[u8]>::encode(self, &item[..], dst)
    }
}

impl Encoder<&[u8]> for LengthPrefixCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<()> {
        if item.len() > self.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: item.len(),
                max: self.max_payload_size,
            });
        }
        encode_frame(item, dst)
    }
}

impl Encoder<Frame> for LengthPrefixCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<()> {
        Encoder::<Bytes>::encode(self, item.payload, dst)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::{SinkExt, StreamExt};
    use tokio_util::codec::{FramedRead, FramedWrite};

    use super::*;

    #[tokio::test]
    async fn roundtrip_over_duplex() {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let mut writer = FramedWrite::new(client, LengthPrefixCodec::new());
        let mut reader = FramedRead::new(server, LengthPrefixCodec::new());

        writer.send(Bytes::from_static(b"ping")).await.unwrap();
        writer.send(Frame::new(Bytes::new())).await.unwrap();
        writer.send(Bytes::from(vec![0x5A; 1000])).await.unwrap();
        drop(writer);

        let first = reader.next().await.unwrap().unwrap();
        assert_eq!(first.payload.as_ref(), b"ping");
        let second = reader.next().await.unwrap().unwrap();
        assert!(second.is_empty());
        let third = reader.next().await.unwrap().unwrap();
        assert_eq!(third.len(), 1000);
        assert!(reader.next().await.is_none());
    }

    #[test]
    fn decode_reserves_for_announced_payload() {
        let mut codec = LengthPrefixCodec::new();
        let mut src = BytesMut::from(&[0u8, 0, 0x10, 0][..]);
        assert!(codec.decode(&mut src).unwrap().is_none());
        assert!(src.capacity() >= HEADER_SIZE + 0x1000);
    }

    #[test]
    fn decode_rejects_oversized_header() {
        let mut codec = LengthPrefixCodec::with_max_payload(8);
        let mut src = BytesMut::from(&[0u8, 0, 0, 9][..]);
        let err = codec.decode(&mut src).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 9, max: 8 }));
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let mut codec = LengthPrefixCodec::with_max_payload(2);
        let mut dst = BytesMut::new();
        let err = Encoder::<&[u8]>::encode(&mut codec, b"abc", &mut dst).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { .. }));
        assert!(dst.is_empty());
    }
}
