//! Frame codec: header parsing, integrity checking, incremental decode.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::PROTOCOL_VERSION;
use crate::crc32::crc32;
use crate::error::WireError;

/// First four bytes of every frame: `LOCK` in ASCII.
pub const FRAME_MAGIC: u32 = 0x4C4F_434B;

/// Encoded size of a frame header in bytes.
pub const FRAME_HEADER_SIZE: usize = 14;

/// Upper bound on a frame payload. Anything larger is rejected at both
/// encode and decode time.
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Parsed frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: u16,
    pub payload_len: u32,
    pub checksum: u32,
}

impl FrameHeader {
    /// Decodes a header from the front of `buf`, advancing it past the
    /// header on success.
    ///
    /// Returns `Ok(None)` if fewer than [`FRAME_HEADER_SIZE`] bytes are
    /// available. Magic, version, and the payload size cap are validated
    /// here; the checksum is only carried (it can't be verified without
    /// the payload).
    ///
    /// # Errors
    ///
    /// [`WireError::InvalidMagic`], [`WireError::UnsupportedVersion`], or
    /// [`WireError::PayloadTooLarge`].
    pub fn decode(buf: &mut &[u8]) -> Result<Option<FrameHeader>, WireError> {
        if buf.len() < FRAME_HEADER_SIZE {
            return Ok(None);
        }

        let magic = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        if magic != FRAME_MAGIC {
            return Err(WireError::InvalidMagic(magic));
        }

        let version = u16::from_be_bytes([buf[4], buf[5]]);
        if version != PROTOCOL_VERSION {
            return Err(WireError::UnsupportedVersion {
                expected: PROTOCOL_VERSION,
                actual: version,
            });
        }

        let payload_len = u32::from_be_bytes([buf[6], buf[7], buf[8], buf[9]]);
        if payload_len as usize > MAX_PAYLOAD_SIZE {
            return Err(WireError::PayloadTooLarge {
                size: payload_len as usize,
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let checksum = u32::from_be_bytes([buf[10], buf[11], buf[12], buf[13]]);

        *buf = &buf[FRAME_HEADER_SIZE..];
        Ok(Some(FrameHeader {
            version,
            payload_len,
            checksum,
        }))
    }
}

/// One integrity-checked unit on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    payload: Bytes,
}

impl Frame {
    /// Wraps a payload in a frame. The payload size cap is enforced by
    /// the message layer before construction.
    pub fn new(payload: Bytes) -> Self {
        Self { payload }
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Appends the encoded frame to `buf`.
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.reserve(FRAME_HEADER_SIZE + self.payload.len());
        buf.put_u32(FRAME_MAGIC);
        buf.put_u16(PROTOCOL_VERSION);
        buf.put_u32(self.payload.len() as u32);
        buf.put_u32(crc32(&self.payload));
        buf.extend_from_slice(&self.payload);
    }

    /// Encodes into a freshly allocated buffer.
    pub fn encode_to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(FRAME_HEADER_SIZE + self.payload.len());
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Attempts to decode one frame from the front of `buf`.
    ///
    /// Returns `Ok(None)` and leaves `buf` untouched while the frame is
    /// incomplete; consumes the frame's bytes otherwise. Trailing bytes
    /// (the start of the next frame) stay in the buffer.
    ///
    /// # Errors
    ///
    /// Header validation errors from [`FrameHeader::decode`], or
    /// [`WireError::ChecksumMismatch`] if the payload is corrupt.
    pub fn decode(buf: &mut BytesMut) -> Result<Option<Frame>, WireError> {
        let mut header_bytes = &buf[..];
        let Some(header) = FrameHeader::decode(&mut header_bytes)? else {
            return Ok(None);
        };

        let payload_len = header.payload_len as usize;
        if buf.len() < FRAME_HEADER_SIZE + payload_len {
            return Ok(None);
        }

        buf.advance(FRAME_HEADER_SIZE);
        let payload = buf.split_to(payload_len).freeze();

        let actual = crc32(&payload);
        if actual != header.checksum {
            return Err(WireError::ChecksumMismatch {
                expected: header.checksum,
                actual,
            });
        }

        Ok(Some(Frame { payload }))
    }
}

// ============================================================================
// Tests
// ============================================================================
