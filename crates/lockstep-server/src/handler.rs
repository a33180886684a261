//! Request handler that routes protocol operations to the simulator.

use lockstep_kernel::{InitializationArgs, KernelError, Simulator};
use lockstep_model::ModelError;
use lockstep_wire::{ErrorCode, Request, RequestPayload, Response, ResponsePayload};
use tracing::instrument;

use crate::error::{ServerError, ServerResult};

/// Handles requests by routing them to the appropriate simulator operations.
pub struct RequestHandler {
    simulator: Simulator,
}

impl RequestHandler {
    /// Creates a new request handler around a simulator.
    pub fn new(simulator: Simulator) -> Self {
        Self { simulator }
    }

    /// Returns a reference to the underlying simulator.
    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    /// Handles a request and returns a response.
    ///
    /// Failures never escape as errors; they become
    /// [`ResponsePayload::Error`] so the connection stays usable.
    #[instrument(skip_all, fields(request_id))]
    pub fn handle(&self, request: Request) -> Response {
        let request_id = request.id;
        tracing::Span::current().record("request_id", request_id.as_u64());

        match self.handle_inner(request) {
            Ok(payload) => Response::new(request_id, payload),
            Err(e) => {
                let (code, message) = error_to_wire(&e);
                Response::error(request_id, code, message)
            }
        }
    }

    #[instrument(skip_all, fields(op))]
    fn handle_inner(&self, request: Request) -> ServerResult<ResponsePayload> {
        tracing::Span::current().record("op", request.payload.operation());

        match request.payload {
            RequestPayload::Instantiate => {
                let handle = self.simulator.instantiate();
                Ok(ResponsePayload::InstanceCreated(handle))
            }

            RequestPayload::EnterInitializationMode(req) => {
                let args = InitializationArgs {
                    tolerance: req.tolerance_defined.then_some(req.tolerance),
                    start_time: req.start_time,
                    stop_time: req.stop_time_defined.then_some(req.stop_time),
                };
                self.simulator.enter_initialization_mode(req.handle, args)?;
                Ok(ResponsePayload::Ack)
            }

            RequestPayload::ExitInitializationMode(handle) => {
                self.simulator.exit_initialization_mode(handle)?;
                Ok(ResponsePayload::Ack)
            }

            RequestPayload::DoStep(req) => {
                tracing::debug!(
                    current_communication_point = req.current_communication_point,
                    communication_step_size = req.communication_step_size,
                    "advancing instance"
                );
                self.simulator
                    .do_step(req.handle, req.communication_step_size)?;
                Ok(ResponsePayload::Ack)
            }

            RequestPayload::GetFloat64(req) => {
                let values = self.simulator.read(req.handle, &req.value_references)?;
                Ok(ResponsePayload::Float64Values(values))
            }

            RequestPayload::SetFloat64(req) => {
                self.simulator
                    .write(req.handle, &req.value_references, &req.values)?;
                Ok(ResponsePayload::Ack)
            }

            RequestPayload::Reset(handle) => {
                self.simulator.reset(handle)?;
                Ok(ResponsePayload::Ack)
            }

            RequestPayload::Terminate(handle) => {
                self.simulator.terminate(handle)?;
                Ok(ResponsePayload::Ack)
            }

            RequestPayload::FreeInstance(handle) => {
                self.simulator.free_instance(handle)?;
                Ok(ResponsePayload::Ack)
            }
        }
    }
}

/// Maps a server error to a wire error code and message.
fn error_to_wire(error: &ServerError) -> (ErrorCode, String) {
    match error {
        ServerError::Kernel(e) => match e {
            KernelError::InstanceNotFound(_) => (ErrorCode::InstanceNotFound, e.to_string()),
            KernelError::ProtocolViolation { .. } => (ErrorCode::ProtocolViolation, e.to_string()),
            KernelError::Model(me) => match me {
                ModelError::UnresolvedValueReference(_) => {
                    (ErrorCode::UnresolvedValueReference, me.to_string())
                }
                ModelError::ValueCountMismatch { .. } => {
                    (ErrorCode::InvalidRequest, me.to_string())
                }
            },
        },
        ServerError::Wire(e) => (ErrorCode::InvalidRequest, e.to_string()),
        _ => (ErrorCode::Internal, error.to_string()),
    }
}
