//! On-disk frame format for journal entries.
//!
//! Each frame consists of:
//! - Checksum (4 bytes): CRC32 of kind and payload
//! - Length (2 bytes): Length of the payload
//! - Kind (1 byte): Whole entry or a fragment of one
//! - Payload (variable)

use crate::error::{Error, Result};
use bytes::{Buf, BufMut, BytesMut};
use crc32fast::Hasher;

/// Maximum payload carried by a single frame
pub const MAX_FRAME_PAYLOAD: usize = 32 * 1024;

/// Size of the frame header (checksum + length + kind)
pub const HEADER_SIZE: usize = 7;

/// Whether a frame holds a whole entry or one piece of a larger one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameKind {
    /// The entire entry
    Full = 1,
    /// First fragment of a split entry
    First = 2,
    /// Middle fragment of a split entry
    Middle = 3,
    /// Last fragment of a split entry
    Last = 4,
}

impl FrameKind {
    /// Convert from the on-disk tag.
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(FrameKind::Full),
            2 => Ok(FrameKind::First),
            3 => Ok(FrameKind::Middle),
            4 => Ok(FrameKind::Last),
            _ => Err(Error::corruption(format!("Invalid frame kind: {}", value))),
        }
    }

    /// Kind of the frame carrying bytes `[offset, offset + len)` of a
    /// `total`-byte entry.
    pub fn for_chunk(offset: usize, len: usize, total: usize) -> Self {
        if total <= MAX_FRAME_PAYLOAD {
            FrameKind::Full
        } else if offset == 0 {
            FrameKind::First
        } else if offset + len >= total {
            FrameKind::Last
        } else {
            FrameKind::Middle
        }
    }
}

/// One checksummed frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Kind of the frame
    pub kind: FrameKind,
    /// Payload bytes
    pub payload: Vec<u8>,
}

impl Frame {
    /// Create a new frame
    pub fn new(kind: FrameKind, payload: Vec<u8>) -> Self {
        debug_assert!(payload.len() <= MAX_FRAME_PAYLOAD);
        Self { kind, payload }
    }

    /// Encode the frame, header first.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(self.encoded_size());
        buf.put_u32_le(Self::checksum(self.kind, &self.payload));
        buf.put_u16_le(self.payload.len() as u16);
        buf.put_u8(self.kind as u8);
        buf.put_slice(&self.payload);
        buf.to_vec()
    }

    /// Decode a frame from a buffer holding at least one whole frame.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::corruption(format!("Frame too short: {} bytes", data.len())));
        }

        let stored = data.get_u32_le();
        let length = data.get_u16_le() as usize;
        let kind = FrameKind::from_u8(data.get_u8())?;

        if data.len() < length {
            return Err(Error::corruption(format!(
                "Incomplete frame: expected {} bytes, got {}",
                length,
                data.len()
            )));
        }

        let payload = data[..length].to_vec();
        let actual = Self::checksum(kind, &payload);
        if stored != actual {
            return Err(Error::ChecksumMismatch { expected: stored, actual });
        }

        Ok(Frame { kind, payload })
    }

    /// Payload length declared by an encoded header.
    pub fn declared_len(header: &[u8; HEADER_SIZE]) -> usize {
        u16::from_le_bytes([header[4], header[5]]) as usize
    }

    fn checksum(kind: FrameKind, payload: &[u8]) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(&[kind as u8]);
        hasher.update(payload);
        hasher.finalize()
    }

    /// Get the total size of the encoded frame
    pub fn encoded_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_encode_decode() {
        let frame = Frame::new(FrameKind::Full, b"www.example.com".to_vec());
        let encoded = frame.encode();
        assert_eq!(encoded.len(), frame.encoded_size());

        let decoded = Frame::decode(&encoded).unwrap();
        assert_eq!(decoded.kind, FrameKind::Full);
        assert_eq!(decoded.payload, b"www.example.com");
    }

    #[test]
    fn test_flipped_payload_byte_is_detected() {
        let mut encoded = Frame::new(FrameKind::Full, b"test data".to_vec()).encode();
        encoded[HEADER_SIZE] ^= 0xFF;

        assert!(matches!(Frame::decode(&encoded), Err(Error::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_truncated_frame_is_corruption() {
        let encoded = Frame::new(FrameKind::Full, b"truncated".to_vec()).encode();

        assert!(matches!(Frame::decode(&encoded[..4]), Err(Error::Corruption(_))));
        assert!(matches!(Frame::decode(&encoded[..HEADER_SIZE + 2]), Err(Error::Corruption(_))));
    }

    #[test]
    fn test_invalid_kind() {
        assert!(FrameKind::from_u8(0).is_err());
        assert!(FrameKind::from_u8(5).is_err());
    }

    #[test]
    fn test_kind_for_chunk() {
        assert_eq!(FrameKind::for_chunk(0, 10, 10), FrameKind::Full);

        let total = MAX_FRAME_PAYLOAD * 2 + 1;
        assert_eq!(FrameKind::for_chunk(0, MAX_FRAME_PAYLOAD, total), FrameKind::First);
        assert_eq!(
            FrameKind::for_chunk(MAX_FRAME_PAYLOAD, MAX_FRAME_PAYLOAD, total),
            FrameKind::Middle
        );
        assert_eq!(FrameKind::for_chunk(MAX_FRAME_PAYLOAD * 2, 1, total), FrameKind::Last);
    }

    #[test]
    fn test_declared_len() {
        let encoded = Frame::new(FrameKind::Last, vec![7; 300]).encode();
        let mut header = [0u8; HEADER_SIZE];
        header.copy_from_slice(&encoded[..HEADER_SIZE]);
        assert_eq!(Frame::declared_len(&header), 300);
    }
}
