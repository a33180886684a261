//! # lockstep-kernel: Lifecycle and registry core of `Lockstep`
//!
//! The kernel is the deterministic heart of the system: it decides which
//! protocol calls are legal for an instance in its current lifecycle phase,
//! owns the live instances, and dispatches the legal calls to the model.
//!
//! ## Key Principles
//!
//! - **No IO**: the kernel never touches disk or network; the server and
//!   CLI layers own all transport concerns
//! - **Pure transitions**: `next_phase(phase, operation) -> phase` is a
//!   total function over the lifecycle table, trivially testable
//! - **No ambient state**: the registry is an explicit, constructor-injected
//!   object, so multiple isolated simulators can coexist in one process
//!
//! ## Architecture
//!
//! - [`lifecycle`]: lifecycle phases and the legal-transition table
//! - [`instance`]: one live model plus its phase and stored configuration
//! - [`registry`]: concurrency-safe handle allocation and instance lookup
//! - [`simulator`]: the facade tying it together, one method per protocol
//!   operation
//!
//! ## Example
//!
//! ```ignore
//! use lockstep_kernel::Simulator;
//! use lockstep_model::BouncingBall;
//!
//! let simulator = Simulator::new(|| Box::new(BouncingBall::new()));
//! let handle = simulator.instantiate();
//! simulator.enter_initialization_mode(handle, Default::default())?;
//! simulator.exit_initialization_mode(handle)?;
//! simulator.do_step(handle, 0.01)?;
//! let values = simulator.read(handle, &[ValueReference::new(1)])?;
//! ```

pub mod instance;
pub mod lifecycle;
pub mod registry;
pub mod simulator;

mod error;


pub use error::KernelError;
pub use instance::{InitializationArgs, Instance};
pub use lifecycle::{Operation, Phase, next_phase};
pub use registry::{ModelFactory, Registry};
pub use simulator::{Simulator, StepPolicy};
