//! # lockstep-client: RPC client for `Lockstep`
//!
//! This crate provides a synchronous RPC client for communicating with
//! a `Lockstep` server using the binary wire protocol defined in
//! `lockstep-wire`.
//!
//! ## Usage
//!
//! ```ignore
//! use lockstep_client::{Client, ClientConfig};
//! use lockstep_types::ValueReference;
//!
//! // Connect to server
//! let mut client = Client::connect("127.0.0.1:50051", ClientConfig::default())?;
//!
//! // Create and initialize an instance
//! let handle = client.instantiate()?;
//! client.enter_initialization_mode(handle, None, 0.0, Some(3.0))?;
//! client.exit_initialization_mode(handle)?;
//!
//! // Advance the simulation and sample the height
//! client.do_step(handle, 0.0, 0.01)?;
//! let values = client.get_float64(handle, &[ValueReference::new(1)])?;
//!
//! // Tear down
//! client.terminate(handle)?;
//! client.free_instance(handle)?;
//! ```
//!
//! ## Configuration
//!
//! The client can be configured with timeouts and buffer sizes:
//!
//! ```ignore
//! use lockstep_client::ClientConfig;
//! use std::time::Duration;
//!
//! let config = ClientConfig {
//!     read_timeout: Some(Duration::from_secs(60)),
//!     write_timeout: Some(Duration::from_secs(30)),
//!     buffer_size: 128 * 1024,
//! };
//! ```

mod client;
mod error;

pub use client::{Client, ClientConfig};
pub use error::{ClientError, ClientResult};

// Re-export useful types from dependencies
pub use lockstep_types::{InstanceHandle, ValueReference};
pub use lockstep_wire::ErrorCode;
