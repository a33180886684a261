//! Wire protocol error types.

/// Errors surfaced by frame and message codecs.
///
/// A truncated buffer is not an error (decode reports "not yet" via
/// `Ok(None)`); these variants all indicate a malformed or corrupted
/// peer, and the connection that produced them should be dropped.
#[derive(thiserror::Error, Debug)]
pub enum WireError {
    /// The frame did not start with the protocol magic number.
    #[error("invalid frame magic {0:#010x}")]
    InvalidMagic(u32),

    /// The peer speaks a different protocol version.
    #[error("unsupported protocol version {actual} (expected {expected})")]
    UnsupportedVersion { expected: u16, actual: u16 },

    /// The header announced a payload beyond the frame size cap.
    #[error("frame payload of {size} bytes exceeds the {max} byte cap")]
    PayloadTooLarge { size: usize, max: usize },

    /// The payload does not hash to the checksum in the header.
    #[error("frame checksum mismatch: header {expected:#010x}, payload {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// A message failed to serialize into a frame payload.
    #[error("failed to serialize message: {0}")]
    Serialize(postcard::Error),

    /// A frame payload failed to deserialize into a message.
    #[error("failed to deserialize message: {0}")]
    Deserialize(postcard::Error),
}
