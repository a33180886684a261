//! # lockstep-server: `Lockstep` server daemon
//!
//! This crate provides the TCP server that exposes the simulation kernel
//! over the network using the binary wire protocol defined in
//! `lockstep-wire`.
//!
//! ## Architecture
//!
//! The server uses `mio` for non-blocking I/O with a poll-based event
//! loop. This follows the project's design principle of explicit control
//! flow without async runtimes.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     lockstep-server                      │
//! │  ┌──────────┐   ┌─────────────┐   ┌──────────────────┐   │
//! │  │ Listener │ → │ Connections │ → │  RequestHandler  │   │
//! │  │  (TCP)   │   │ (mio poll)  │   │  (→ Simulator)   │   │
//! │  └──────────┘   └─────────────┘   └──────────────────┘   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use lockstep_kernel::Simulator;
//! use lockstep_model::BouncingBall;
//! use lockstep_server::{Server, ServerConfig};
//!
//! let simulator = Simulator::new(|| Box::new(BouncingBall::default()));
//! let config = ServerConfig::default();
//! let server = Server::new(config, simulator)?;
//! server.run()?;
//! ```

mod config;
mod connection;
mod error;
mod handler;
mod server;
#[cfg(test)]
mod tests;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::RequestHandler;
pub use server::{Server, ShutdownHandle};
