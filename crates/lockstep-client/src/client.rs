//! Synchronous client over a blocking TCP stream.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use bytes::BytesMut;

use lockstep_types::{InstanceHandle, ValueReference};
use lockstep_wire::{
    DoStepRequest, EnterInitializationModeRequest, Frame, GetFloat64Request, Request, RequestId,
    RequestPayload, Response, ResponsePayload, SetFloat64Request,
};

use crate::error::{ClientError, ClientResult};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Read timeout for responses. `None` blocks indefinitely.
    pub read_timeout: Option<Duration>,
    /// Write timeout for requests. `None` blocks indefinitely.
    pub write_timeout: Option<Duration>,
    /// Initial receive buffer capacity.
    pub buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            read_timeout: Some(Duration::from_secs(30)),
            write_timeout: Some(Duration::from_secs(30)),
            buffer_size: 64 * 1024,
        }
    }
}

/// Synchronous connection to a simulation server.
///
/// One request is in flight at a time; responses are correlated by id
/// and a mismatch fails the call.
pub struct Client {
    stream: TcpStream,
    recv_buf: BytesMut,
    next_request_id: u64,
}

impl Client {
    /// Connects to a server.
    ///
    /// # Errors
    ///
    /// [`ClientError::Io`] if the connection cannot be established.
    pub fn connect(addr: impl ToSocketAddrs, config: ClientConfig) -> ClientResult<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;
        stream.set_nodelay(true)?;

        tracing::debug!(peer = %stream.peer_addr()?, "connected");

        Ok(Self {
            stream,
            recv_buf: BytesMut::with_capacity(config.buffer_size),
            next_request_id: 0,
        })
    }

    /// Creates a fresh model instance on the server.
    pub fn instantiate(&mut self) -> ClientResult<InstanceHandle> {
        match self.call(RequestPayload::Instantiate)? {
            ResponsePayload::InstanceCreated(handle) => Ok(handle),
            _ => Err(ClientError::UnexpectedResponse {
                operation: "instantiate",
            }),
        }
    }

    /// Moves an instance into initialization mode.
    pub fn enter_initialization_mode(
        &mut self,
        handle: InstanceHandle,
        tolerance: Option<f64>,
        start_time: f64,
        stop_time: Option<f64>,
    ) -> ClientResult<()> {
        let payload = RequestPayload::EnterInitializationMode(EnterInitializationModeRequest {
            handle,
            tolerance_defined: tolerance.is_some(),
            tolerance: tolerance.unwrap_or_default(),
            start_time,
            stop_time_defined: stop_time.is_some(),
            stop_time: stop_time.unwrap_or_default(),
        });
        self.expect_ack(payload, "enterInitializationMode")
    }

    /// Leaves initialization mode; the instance becomes steppable.
    pub fn exit_initialization_mode(&mut self, handle: InstanceHandle) -> ClientResult<()> {
        self.expect_ack(
            RequestPayload::ExitInitializationMode(handle),
            "exitInitializationMode",
        )
    }

    /// Advances an instance by one communication interval.
    pub fn do_step(
        &mut self,
        handle: InstanceHandle,
        current_communication_point: f64,
        communication_step_size: f64,
    ) -> ClientResult<()> {
        let payload = RequestPayload::DoStep(DoStepRequest {
            handle,
            current_communication_point,
            communication_step_size,
        });
        self.expect_ack(payload, "doStep")
    }

    /// Reads variable values by reference, in request order.
    pub fn get_float64(
        &mut self,
        handle: InstanceHandle,
        references: &[ValueReference],
    ) -> ClientResult<Vec<f64>> {
        let payload = RequestPayload::GetFloat64(GetFloat64Request {
            handle,
            value_references: references.to_vec(),
        });
        match self.call(payload)? {
            ResponsePayload::Float64Values(values) => Ok(values),
            _ => Err(ClientError::UnexpectedResponse {
                operation: "getFloat64",
            }),
        }
    }

    /// Writes variable values by reference.
    pub fn set_float64(
        &mut self,
        handle: InstanceHandle,
        references: &[ValueReference],
        values: &[f64],
    ) -> ClientResult<()> {
        let payload = RequestPayload::SetFloat64(SetFloat64Request {
            handle,
            value_references: references.to_vec(),
            values: values.to_vec(),
        });
        self.expect_ack(payload, "setFloat64")
    }

    /// Returns an instance to its freshly-instantiated state.
    pub fn reset(&mut self, handle: InstanceHandle) -> ClientResult<()> {
        self.expect_ack(RequestPayload::Reset(handle), "reset")
    }

    /// Ends an instance's simulation run.
    pub fn terminate(&mut self, handle: InstanceHandle) -> ClientResult<()> {
        self.expect_ack(RequestPayload::Terminate(handle), "terminate")
    }

    /// Releases a terminated instance's handle.
    pub fn free_instance(&mut self, handle: InstanceHandle) -> ClientResult<()> {
        self.expect_ack(RequestPayload::FreeInstance(handle), "freeInstance")
    }

    fn expect_ack(&mut self, payload: RequestPayload, operation: &'static str) -> ClientResult<()> {
        match self.call(payload)? {
            ResponsePayload::Ack => Ok(()),
            _ => Err(ClientError::UnexpectedResponse { operation }),
        }
    }

    /// Sends one request and waits for its response.
    fn call(&mut self, payload: RequestPayload) -> ClientResult<ResponsePayload> {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;

        let request = Request::new(id, payload);
        let encoded = request.to_frame()?.encode_to_bytes();
        self.stream.write_all(&encoded)?;

        let response = self.read_response()?;
        if response.id != id {
            return Err(ClientError::RequestIdMismatch {
                expected: id,
                actual: response.id,
            });
        }

        match response.payload {
            ResponsePayload::Error { code, message } => Err(ClientError::Server { code, message }),
            payload => Ok(payload),
        }
    }

    /// Reads from the stream until one full response frame is available.
    fn read_response(&mut self) -> ClientResult<Response> {
        let mut temp_buf = [0u8; 4096];

        loop {
            if let Some(frame) = Frame::decode(&mut self.recv_buf)? {
                return Ok(Response::from_frame(&frame)?);
            }

            // A blocking read past its timeout reports WouldBlock or
            // TimedOut depending on the platform.
            let n = match self.stream.read(&mut temp_buf) {
                Ok(n) => n,
                Err(e)
                    if e.kind() == io::ErrorKind::WouldBlock
                        || e.kind() == io::ErrorKind::TimedOut =>
                {
                    return Err(ClientError::Timeout);
                }
                Err(e) => return Err(e.into()),
            };
            if n == 0 {
                return Err(ClientError::ConnectionClosed);
            }
            self.recv_buf.extend_from_slice(&temp_buf[..n]);
        }
    }
}
