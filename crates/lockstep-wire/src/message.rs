//! Protocol messages: requests, responses, and their frame codecs.
//!
//! Every message is a postcard-serialized payload carried inside a
//! [`Frame`]. Requests and responses are correlated by [`RequestId`],
//! assigned by the client and echoed back verbatim by the server.

use bytes::Bytes;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use lockstep_types::{InstanceHandle, ValueReference};

use crate::error::WireError;
use crate::frame::{Frame, MAX_PAYLOAD_SIZE};

// ============================================================================
// Request Identity
// ============================================================================

/// Client-assigned correlation id echoed back in the matching response.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Requests
// ============================================================================

/// A client request: correlation id plus operation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub payload: RequestPayload,
}

impl Request {
    pub fn new(id: RequestId, payload: RequestPayload) -> Self {
        Self { id, payload }
    }

    /// Serializes the request into a frame ready for the wire.
    ///
    /// # Errors
    ///
    /// [`WireError::Serialize`] if encoding fails,
    /// [`WireError::PayloadTooLarge`] if the encoded payload exceeds the cap.
    pub fn to_frame(&self) -> Result<Frame, WireError> {
        encode_message(self)
    }

    /// Deserializes a request from a decoded frame's payload.
    ///
    /// # Errors
    ///
    /// [`WireError::Deserialize`] if the payload is not a valid request.
    pub fn from_frame(frame: &Frame) -> Result<Self, WireError> {
        decode_message(frame)
    }
}

/// One simulation protocol operation.
///
/// Operations that act on an existing instance carry its handle; the
/// variants are named after the calls they expose to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RequestPayload {
    /// Create a fresh model instance; answered with
    /// [`ResponsePayload::InstanceCreated`].
    Instantiate,
    /// Move an instance into initialization mode, carrying the
    /// experiment parameters.
    EnterInitializationMode(EnterInitializationModeRequest),
    /// Leave initialization mode; the instance becomes steppable.
    ExitInitializationMode(InstanceHandle),
    /// Advance an instance by one communication interval.
    DoStep(DoStepRequest),
    /// Read variable values by reference.
    GetFloat64(GetFloat64Request),
    /// Write variable values by reference.
    SetFloat64(SetFloat64Request),
    /// Return an instance to its freshly-instantiated state.
    Reset(InstanceHandle),
    /// End the instance's simulation run.
    Terminate(InstanceHandle),
    /// Release a terminated instance's handle.
    FreeInstance(InstanceHandle),
}

impl RequestPayload {
    /// Protocol-level name of the operation, for logs and error text.
    pub fn operation(&self) -> &'static str {
        match self {
            RequestPayload::Instantiate => "instantiate",
            RequestPayload::EnterInitializationMode(_) => "enterInitializationMode",
            RequestPayload::ExitInitializationMode(_) => "exitInitializationMode",
            RequestPayload::DoStep(_) => "doStep",
            RequestPayload::GetFloat64(_) => "getFloat64",
            RequestPayload::SetFloat64(_) => "setFloat64",
            RequestPayload::Reset(_) => "reset",
            RequestPayload::Terminate(_) => "terminate",
            RequestPayload::FreeInstance(_) => "freeInstance",
        }
    }
}

/// Experiment parameters for entering initialization mode.
///
/// Optional values travel as a `defined` flag plus a value field so the
/// encoding stays fixed-shape; the value field is meaningless when its
/// flag is false.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnterInitializationModeRequest {
    pub handle: InstanceHandle,
    pub tolerance_defined: bool,
    pub tolerance: f64,
    pub start_time: f64,
    pub stop_time_defined: bool,
    pub stop_time: f64,
}

/// Parameters for one co-simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoStepRequest {
    pub handle: InstanceHandle,
    /// The caller's notion of current simulation time, logged for
    /// diagnostics; the instance keeps its own clock.
    pub current_communication_point: f64,
    pub communication_step_size: f64,
}

/// Read a batch of variables in one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetFloat64Request {
    pub handle: InstanceHandle,
    pub value_references: Vec<ValueReference>,
}

/// Write a batch of variables in one call. `values` pairs positionally
/// with `value_references`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetFloat64Request {
    pub handle: InstanceHandle,
    pub value_references: Vec<ValueReference>,
    pub values: Vec<f64>,
}

// ============================================================================
// Responses
// ============================================================================

/// A server response, correlated to its request by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: RequestId,
    pub payload: ResponsePayload,
}

impl Response {
    pub fn new(id: RequestId, payload: ResponsePayload) -> Self {
        Self { id, payload }
    }

    /// Builds an error response.
    pub fn error(id: RequestId, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            id,
            payload: ResponsePayload::Error {
                code,
                message: message.into(),
            },
        }
    }

    /// Serializes the response into a frame ready for the wire.
    ///
    /// # Errors
    ///
    /// [`WireError::Serialize`] if encoding fails,
    /// [`WireError::PayloadTooLarge`] if the encoded payload exceeds the cap.
    pub fn to_frame(&self) -> Result<Frame, WireError> {
        encode_message(self)
    }

    /// Deserializes a response from a decoded frame's payload.
    ///
    /// # Errors
    ///
    /// [`WireError::Deserialize`] if the payload is not a valid response.
    pub fn from_frame(frame: &Frame) -> Result<Self, WireError> {
        decode_message(frame)
    }
}

/// Successful results and the single error shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResponsePayload {
    /// Answer to [`RequestPayload::Instantiate`].
    InstanceCreated(InstanceHandle),
    /// Answer to operations with no return value.
    Ack,
    /// Answer to [`RequestPayload::GetFloat64`], in request order.
    Float64Values(Vec<f64>),
    /// The operation failed; `message` is human-readable detail.
    Error { code: ErrorCode, message: String },
}

/// Machine-readable classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// The handle names no live instance.
    InstanceNotFound,
    /// The operation is not legal in the instance's current phase.
    ProtocolViolation,
    /// A value reference resolves to no variable.
    UnresolvedValueReference,
    /// The request itself is malformed (e.g. mismatched batch lengths).
    InvalidRequest,
    /// Unexpected server-side failure.
    Internal,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCode::InstanceNotFound => "instance_not_found",
            ErrorCode::ProtocolViolation => "protocol_violation",
            ErrorCode::UnresolvedValueReference => "unresolved_value_reference",
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::Internal => "internal",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// Codec Helpers
// ============================================================================

fn encode_message<T: Serialize>(message: &T) -> Result<Frame, WireError> {
    let payload = postcard::to_allocvec(message).map_err(WireError::Serialize)?;
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(WireError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD_SIZE,
        });
    }
    Ok(Frame::new(Bytes::from(payload)))
}

fn decode_message<T: DeserializeOwned>(frame: &Frame) -> Result<T, WireError> {
    postcard::from_bytes(frame.payload()).map_err(WireError::Deserialize)
}

// ============================================================================
// Tests
// ============================================================================
