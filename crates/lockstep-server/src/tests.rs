//! Handler-level tests driving the protocol surface end to end,
//! without sockets.

use lockstep_kernel::Simulator;
use lockstep_model::{BouncingBall, Model};
use lockstep_types::{InstanceHandle, ValueReference};
use lockstep_wire::{
    DoStepRequest, EnterInitializationModeRequest, ErrorCode, GetFloat64Request, Request,
    RequestId, RequestPayload, ResponsePayload, SetFloat64Request,
};

use crate::handler::RequestHandler;
use crate::{Server, ServerConfig};

fn bouncing_ball() -> Box<dyn Model> {
    Box::new(BouncingBall::default())
}

fn handler() -> RequestHandler {
    RequestHandler::new(Simulator::new(bouncing_ball))
}

fn refs(raw: &[u32]) -> Vec<ValueReference> {
    raw.iter().copied().map(ValueReference::new).collect()
}

/// Sends one request and returns the payload, asserting id echo.
fn send(handler: &RequestHandler, id: u64, payload: RequestPayload) -> ResponsePayload {
    let response = handler.handle(Request::new(RequestId::new(id), payload));
    assert_eq!(response.id, RequestId::new(id));
    response.payload
}

fn instantiate(handler: &RequestHandler) -> InstanceHandle {
    match send(handler, 1, RequestPayload::Instantiate) {
        ResponsePayload::InstanceCreated(handle) => handle,
        other => panic!("expected instance, got {other:?}"),
    }
}

fn initialized_instance(handler: &RequestHandler) -> InstanceHandle {
    let handle = instantiate(handler);
    let payload = RequestPayload::EnterInitializationMode(EnterInitializationModeRequest {
        handle,
        tolerance_defined: true,
        tolerance: 1e-6,
        start_time: 0.0,
        stop_time_defined: false,
        stop_time: 0.0,
    });
    assert!(matches!(send(handler, 2, payload), ResponsePayload::Ack));
    assert!(matches!(
        send(handler, 3, RequestPayload::ExitInitializationMode(handle)),
        ResponsePayload::Ack
    ));
    handle
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

fn assert_error_code(payload: ResponsePayload, expected: ErrorCode) {
    match payload {
        ResponsePayload::Error { code, .. } => assert_eq!(code, expected),
        other => panic!("expected error {expected}, got {other:?}"),
    }
}

#[test]
fn instantiate_returns_distinct_handles() {
    let handler = handler();
    let first = instantiate(&handler);
    let second = instantiate(&handler);
    assert_ne!(first, second);
}

#[test]
fn full_lifecycle_succeeds() {
    let handler = handler();
    let handle = initialized_instance(&handler);

    let step = RequestPayload::DoStep(DoStepRequest {
        handle,
        current_communication_point: 0.0,
        communication_step_size: 0.01,
    });
    assert!(matches!(send(&handler, 4, step), ResponsePayload::Ack));

    let get = RequestPayload::GetFloat64(GetFloat64Request {
        handle,
        value_references: refs(&[0, 1, 2]),
    });
    match send(&handler, 5, get) {
        ResponsePayload::Float64Values(values) => {
            assert_close(values[0], 0.01);
            assert_close(values[1], 1.000_981);
            assert_close(values[2], -0.0981);
        }
        other => panic!("expected values, got {other:?}"),
    }

    assert!(matches!(
        send(&handler, 6, RequestPayload::Terminate(handle)),
        ResponsePayload::Ack
    ));
    assert!(matches!(
        send(&handler, 7, RequestPayload::FreeInstance(handle)),
        ResponsePayload::Ack
    ));
}

#[test]
fn do_step_before_initialization_is_a_protocol_violation() {
    let handler = handler();
    let handle = instantiate(&handler);

    let step = RequestPayload::DoStep(DoStepRequest {
        handle,
        current_communication_point: 0.0,
        communication_step_size: 0.01,
    });
    assert_error_code(send(&handler, 2, step), ErrorCode::ProtocolViolation);
}

#[test]
fn unknown_handle_maps_to_instance_not_found() {
    let handler = handler();
    let payload = RequestPayload::Terminate(InstanceHandle::new(42));
    assert_error_code(send(&handler, 1, payload), ErrorCode::InstanceNotFound);
}

#[test]
fn unresolved_reference_has_its_own_error_code() {
    let handler = handler();
    let handle = instantiate(&handler);

    let get = RequestPayload::GetFloat64(GetFloat64Request {
        handle,
        value_references: refs(&[99]),
    });
    assert_error_code(send(&handler, 2, get), ErrorCode::UnresolvedValueReference);
}

#[test]
fn mismatched_set_lengths_are_an_invalid_request() {
    let handler = handler();
    let handle = instantiate(&handler);

    let set = RequestPayload::SetFloat64(SetFloat64Request {
        handle,
        value_references: refs(&[1, 2]),
        values: vec![0.5],
    });
    assert_error_code(send(&handler, 2, set), ErrorCode::InvalidRequest);
}

#[test]
fn writes_during_initialization_are_applied() {
    let handler = handler();
    let handle = instantiate(&handler);

    let enter = RequestPayload::EnterInitializationMode(EnterInitializationModeRequest {
        handle,
        tolerance_defined: false,
        tolerance: 0.0,
        start_time: 0.0,
        stop_time_defined: false,
        stop_time: 0.0,
    });
    assert!(matches!(send(&handler, 2, enter), ResponsePayload::Ack));

    let set = RequestPayload::SetFloat64(SetFloat64Request {
        handle,
        value_references: refs(&[1]),
        values: vec![2.0],
    });
    assert!(matches!(send(&handler, 3, set), ResponsePayload::Ack));

    let get = RequestPayload::GetFloat64(GetFloat64Request {
        handle,
        value_references: refs(&[1]),
    });
    match send(&handler, 4, get) {
        ResponsePayload::Float64Values(values) => assert_close(values[0], 2.0),
        other => panic!("expected values, got {other:?}"),
    }
}

#[test]
fn free_requires_a_terminated_instance() {
    let handler = handler();
    let handle = initialized_instance(&handler);

    assert_error_code(
        send(&handler, 4, RequestPayload::FreeInstance(handle)),
        ErrorCode::ProtocolViolation,
    );
}

#[test]
fn reset_after_terminate_revives_the_instance() {
    let handler = handler();
    let handle = initialized_instance(&handler);

    assert!(matches!(
        send(&handler, 4, RequestPayload::Terminate(handle)),
        ResponsePayload::Ack
    ));
    assert!(matches!(
        send(&handler, 5, RequestPayload::Reset(handle)),
        ResponsePayload::Ack
    ));

    // Back in the freshly-instantiated state: reads work, stepping does not.
    let get = RequestPayload::GetFloat64(GetFloat64Request {
        handle,
        value_references: refs(&[1]),
    });
    match send(&handler, 6, get) {
        ResponsePayload::Float64Values(values) => assert_close(values[0], 1.0),
        other => panic!("expected values, got {other:?}"),
    }

    let step = RequestPayload::DoStep(DoStepRequest {
        handle,
        current_communication_point: 0.0,
        communication_step_size: 0.01,
    });
    assert_error_code(send(&handler, 7, step), ErrorCode::ProtocolViolation);
}

#[test]
fn server_binds_and_shuts_down() {
    let config = ServerConfig::new("127.0.0.1:0".parse::<std::net::SocketAddr>().unwrap());
    let server = Server::new(config, Simulator::new(bouncing_ball)).unwrap();

    let addr = server.local_addr().unwrap();
    assert_ne!(addr.port(), 0);

    let shutdown = server.shutdown_handle();
    let thread = std::thread::spawn(move || server.run());

    shutdown.shutdown();
    thread.join().unwrap().unwrap();
}
