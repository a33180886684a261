//! End-to-end lifecycle tests against an in-process server over TCP.

use std::net::SocketAddr;
use std::thread;

use lockstep_client::{Client, ClientConfig, ClientError, ErrorCode, ValueReference};
use lockstep_kernel::Simulator;
use lockstep_model::{BouncingBall, Model};
use lockstep_server::{Server, ServerConfig, ServerResult, ShutdownHandle};

fn bouncing_ball() -> Box<dyn Model> {
    Box::new(BouncingBall::default())
}

/// Runs a server on an ephemeral port for the duration of a test.
struct TestServer {
    addr: SocketAddr,
    shutdown: ShutdownHandle,
    thread: Option<thread::JoinHandle<ServerResult<()>>>,
}

impl TestServer {
    fn start() -> Self {
        let config = ServerConfig::new("127.0.0.1:0".parse::<SocketAddr>().unwrap());
        let server = Server::new(config, Simulator::new(bouncing_ball)).unwrap();

        let addr = server.local_addr().unwrap();
        let shutdown = server.shutdown_handle();
        let thread = thread::spawn(move || server.run());

        Self {
            addr,
            shutdown,
            thread: Some(thread),
        }
    }

    fn client(&self) -> Client {
        Client::connect(self.addr, ClientConfig::default()).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.shutdown();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn refs(raw: &[u32]) -> Vec<ValueReference> {
    raw.iter().copied().map(ValueReference::new).collect()
}

#[test]
fn full_lifecycle_over_tcp() {
    let server = TestServer::start();
    let mut client = server.client();

    let handle = client.instantiate().unwrap();
    client
        .enter_initialization_mode(handle, Some(1e-6), 0.0, Some(3.0))
        .unwrap();
    client.exit_initialization_mode(handle).unwrap();

    client.do_step(handle, 0.0, 0.01).unwrap();

    let values = client.get_float64(handle, &refs(&[0, 1, 2])).unwrap();
    assert!((values[0] - 0.01).abs() < 1e-9, "time: {}", values[0]);
    assert!((values[1] - 1.000_981).abs() < 1e-9, "height: {}", values[1]);
    assert!((values[2] + 0.0981).abs() < 1e-9, "velocity: {}", values[2]);

    client.terminate(handle).unwrap();
    client.free_instance(handle).unwrap();
}

#[test]
fn ball_never_penetrates_the_floor() {
    let server = TestServer::start();
    let mut client = server.client();

    let handle = client.instantiate().unwrap();
    client
        .enter_initialization_mode(handle, None, 0.0, None)
        .unwrap();
    // Launch the ball toward the floor; in this model positive velocity
    // decreases height.
    client.set_float64(handle, &refs(&[2]), &[5.0]).unwrap();
    client.exit_initialization_mode(handle).unwrap();

    let mut min_height = f64::MAX;
    let mut time = 0.0;
    for _ in 0..100 {
        client.do_step(handle, time, 0.01).unwrap();
        time += 0.01;

        let values = client.get_float64(handle, &refs(&[1])).unwrap();
        let height = values[0];
        assert!(height >= 0.0, "height went negative: {height}");
        min_height = min_height.min(height);
    }

    // The descent reaches the floor within the run; the boundary rule
    // reflects the overstep instead of letting the ball sink through.
    assert!(
        min_height < 0.05,
        "ball never reached the floor: min height {min_height}"
    );

    client.terminate(handle).unwrap();
    client.free_instance(handle).unwrap();
}

#[test]
fn protocol_violation_surfaces_as_server_error() {
    let server = TestServer::start();
    let mut client = server.client();

    let handle = client.instantiate().unwrap();
    let err = client.do_step(handle, 0.0, 0.01).unwrap_err();

    match err {
        ClientError::Server { code, message } => {
            assert_eq!(code, ErrorCode::ProtocolViolation);
            assert!(message.contains("doStep"), "message: {message}");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[test]
fn instances_are_shared_across_connections() {
    let server = TestServer::start();
    let mut first = server.client();
    let mut second = server.client();

    let handle = first.instantiate().unwrap();
    let other = second.instantiate().unwrap();
    assert_ne!(handle, other);

    // Both connections talk to the same registry.
    first
        .enter_initialization_mode(handle, None, 0.0, None)
        .unwrap();
    first.set_float64(handle, &refs(&[1]), &[5.0]).unwrap();

    let seen = second.get_float64(handle, &refs(&[1])).unwrap();
    assert!((seen[0] - 5.0).abs() < 1e-12);
}

#[test]
fn freed_handles_are_reused_across_connections() {
    let server = TestServer::start();
    let mut client = server.client();

    let first = client.instantiate().unwrap();
    client
        .enter_initialization_mode(first, None, 0.0, None)
        .unwrap();
    client.exit_initialization_mode(first).unwrap();
    client.terminate(first).unwrap();
    client.free_instance(first).unwrap();

    let mut other = server.client();
    let second = other.instantiate().unwrap();
    assert_eq!(first, second);
}
