//! # lockstep-wire: Binary wire protocol for `Lockstep`
//!
//! Requests and responses travel as length-prefixed frames:
//!
//! ```text
//! +-------+---------+-------------+-------+=============+
//! | magic | version | payload len | crc32 |   payload   |
//! |  u32  |   u16   |     u32     |  u32  |  postcard   |
//! +-------+---------+-------------+-------+=============+
//! ```
//!
//! All header integers are big-endian. The payload is a postcard-encoded
//! [`Request`] or [`Response`] and is capped at 16 MiB. The checksum covers
//! the payload only; a mismatch means corruption in transit and fails the
//! decode.
//!
//! Decoding is incremental: [`Frame::decode`] returns `Ok(None)` until a
//! complete frame is buffered, so callers can feed it straight from a
//! socket read loop.

mod crc32;
mod error;
mod frame;
mod message;

pub use error::WireError;
pub use frame::{FRAME_HEADER_SIZE, FRAME_MAGIC, Frame, FrameHeader, MAX_PAYLOAD_SIZE};
pub use message::{
    DoStepRequest, EnterInitializationModeRequest, ErrorCode, GetFloat64Request, Request,
    RequestId, RequestPayload, Response, ResponsePayload, SetFloat64Request,
};

/// Version carried in every frame header. Bumped on incompatible changes.
pub const PROTOCOL_VERSION: u16 = 1;
