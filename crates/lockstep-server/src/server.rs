//! TCP server event loop.

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use mio::event::Event;
use mio::net::TcpListener;
use mio::{Events, Interest, Poll, Token};

use lockstep_kernel::Simulator;

use crate::config::ServerConfig;
use crate::connection::Connection;
use crate::error::{ServerError, ServerResult};
use crate::handler::RequestHandler;

/// Token reserved for the listening socket.
const SERVER: Token = Token(0);

/// Poll wakeup interval; bounds shutdown and idle-sweep latency.
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Requests a running server to stop from another thread.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    shutdown: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Signals the server loop to exit after its current poll cycle.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

/// Single-threaded TCP server driving the simulator.
///
/// All connections are multiplexed onto one poll loop; request handling
/// happens inline between poll cycles.
pub struct Server {
    config: ServerConfig,
    listener: TcpListener,
    poll: Poll,
    connections: HashMap<Token, Connection>,
    next_token: usize,
    handler: RequestHandler,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Binds the listening socket and prepares the event loop.
    ///
    /// # Errors
    ///
    /// [`ServerError::BindFailed`] if the address is unavailable.
    pub fn new(config: ServerConfig, simulator: Simulator) -> ServerResult<Self> {
        let mut listener =
            TcpListener::bind(config.bind_addr).map_err(|source| ServerError::BindFailed {
                addr: config.bind_addr,
                source,
            })?;

        let poll = Poll::new()?;
        poll.registry()
            .register(&mut listener, SERVER, Interest::READABLE)?;

        Ok(Self {
            config,
            listener,
            poll,
            connections: HashMap::new(),
            next_token: SERVER.0 + 1,
            handler: RequestHandler::new(simulator),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// The address the server is actually listening on. Useful when the
    /// configured port was 0.
    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Returns a handle that can stop the server from another thread.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            shutdown: Arc::clone(&self.shutdown),
        }
    }

    /// Runs the event loop until shutdown is requested.
    pub fn run(mut self) -> ServerResult<()> {
        let mut events = Events::with_capacity(1024);
        tracing::info!(addr = %self.local_addr()?, "server listening");

        while !self.shutdown.load(Ordering::SeqCst) {
            if let Err(e) = self.poll.poll(&mut events, Some(POLL_TIMEOUT)) {
                if e.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(e.into());
            }

            for event in events.iter() {
                match event.token() {
                    SERVER => self.accept_connections()?,
                    token => self.handle_connection_event(token, event),
                }
            }

            self.sweep_idle_connections();
        }

        tracing::info!("server shutting down");
        Ok(())
    }

    /// Accepts pending connections until the listener would block.
    fn accept_connections(&mut self) -> ServerResult<()> {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    if self.connections.len() >= self.config.max_connections {
                        tracing::warn!(
                            %peer,
                            limit = self.config.max_connections,
                            "connection limit reached, rejecting"
                        );
                        drop(stream);
                        continue;
                    }

                    let token = Token(self.next_token);
                    self.next_token += 1;

                    let mut conn = Connection::new(
                        token,
                        stream,
                        self.config.read_buffer_size,
                        self.config.write_buffer_size,
                    );
                    let interest = conn.interest();
                    self.poll
                        .registry()
                        .register(&mut conn.stream, token, interest)?;

                    tracing::debug!(%peer, token = token.0, "accepted connection");
                    self.connections.insert(token, conn);
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Services one readiness event for an established connection.
    fn handle_connection_event(&mut self, token: Token, event: &Event) {
        let Some(conn) = self.connections.get_mut(&token) else {
            return;
        };

        let mut close = false;

        if event.is_readable() {
            match conn.read() {
                Ok(true) => {
                    conn.touch();

                    // Drain every complete request before the next poll.
                    while !close {
                        match conn.try_decode_request() {
                            Ok(Some(request)) => {
                                let response = self.handler.handle(request);
                                if let Err(e) = conn.queue_response(&response) {
                                    tracing::warn!(
                                        token = token.0,
                                        error = %e,
                                        "failed to queue response"
                                    );
                                    close = true;
                                }
                            }
                            Ok(None) => break,
                            Err(e) => {
                                // Framing is unrecoverable once corrupt.
                                tracing::warn!(
                                    token = token.0,
                                    error = %e,
                                    "malformed request, closing connection"
                                );
                                close = true;
                            }
                        }
                    }
                }
                Ok(false) => {
                    // Peer closed; flush queued responses first.
                    if conn.write_buf.is_empty() {
                        close = true;
                    } else {
                        conn.closing = true;
                    }
                }
                Err(e) => {
                    tracing::warn!(token = token.0, error = %e, "read failed");
                    close = true;
                }
            }
        }

        if !close && (event.is_writable() || !conn.write_buf.is_empty()) {
            match conn.write() {
                Ok(true) => {
                    if conn.closing {
                        close = true;
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(token = token.0, error = %e, "write failed");
                    close = true;
                }
            }
        }

        if close {
            self.close_connection(token);
        } else {
            let interest = conn.interest();
            if let Err(e) = self
                .poll
                .registry()
                .reregister(&mut conn.stream, token, interest)
            {
                tracing::warn!(token = token.0, error = %e, "reregister failed");
                self.close_connection(token);
            }
        }
    }

    /// Closes connections that have been idle past the configured timeout.
    fn sweep_idle_connections(&mut self) {
        let Some(timeout) = self.config.idle_timeout else {
            return;
        };

        let idle: Vec<Token> = self
            .connections
            .iter()
            .filter(|(_, conn)| conn.is_idle(timeout))
            .map(|(token, _)| *token)
            .collect();

        for token in idle {
            tracing::debug!(token = token.0, "closing idle connection");
            self.close_connection(token);
        }
    }

    fn close_connection(&mut self, token: Token) {
        if let Some(mut conn) = self.connections.remove(&token) {
            if let Err(e) = self.poll.registry().deregister(&mut conn.stream) {
                tracing::debug!(token = token.0, error = %e, "deregister failed");
            }
        }
    }
}
