//! Lifecycle phases and the legal-transition table.
//!
//! Every instance moves through the same phase machine:
//!
//! ```text
//! Instantiated --enterInitializationMode--> Initializing
//! Initializing --exitInitializationMode--> Initialized
//! Initialized  --doStep--> Initialized          (repeatable)
//! Initialized  --terminate--> Terminated
//! Terminated   --freeInstance--> (removed from the registry)
//! ```
//!
//! Value reads and writes are legal in every phase before Terminated (a
//! controller probes start values right after instantiation), and `reset`
//! returns any phase, Terminated included, to Instantiated. `freeInstance`
//! is strict: it requires Terminated.

use std::fmt::{self, Display};

use crate::error::KernelError;

/// Lifecycle phase of one instance.
///
/// Mutated only by [`next_phase`] in response to protocol calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Freshly created; start values may be probed and adjusted.
    Instantiated,
    /// Between enter and exit of initialization mode.
    Initializing,
    /// Ready to advance in time.
    Initialized,
    /// Finished; only reset or free are meaningful now.
    Terminated,
}

impl Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Instantiated => "Instantiated",
            Phase::Initializing => "Initializing",
            Phase::Initialized => "Initialized",
            Phase::Terminated => "Terminated",
        };
        write!(f, "{name}")
    }
}

/// A protocol operation subject to the phase machine.
///
/// `instantiate` is absent: it creates an instance rather than acting on
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    EnterInitializationMode,
    ExitInitializationMode,
    DoStep,
    Read,
    Write,
    Reset,
    Terminate,
    FreeInstance,
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::EnterInitializationMode => "enterInitializationMode",
            Operation::ExitInitializationMode => "exitInitializationMode",
            Operation::DoStep => "doStep",
            Operation::Read => "getFloat64",
            Operation::Write => "setFloat64",
            Operation::Reset => "reset",
            Operation::Terminate => "terminate",
            Operation::FreeInstance => "freeInstance",
        };
        write!(f, "{name}")
    }
}

/// Returns the phase an instance ends up in after `operation`, or a
/// `ProtocolViolation` if the operation is illegal in `current`.
///
/// Pure function; the caller is responsible for storing the new phase (and,
/// for `freeInstance`, for removing the instance).
pub fn next_phase(current: Phase, operation: Operation) -> Result<Phase, KernelError> {
    let next = match (current, operation) {
        (Phase::Instantiated, Operation::EnterInitializationMode) => Phase::Initializing,
        (Phase::Initializing, Operation::ExitInitializationMode) => Phase::Initialized,
        (Phase::Initialized, Operation::DoStep) => Phase::Initialized,
        (Phase::Initialized, Operation::Terminate) => Phase::Terminated,

        // Reads and writes are self-loops in every live phase.
        (
            phase @ (Phase::Instantiated | Phase::Initializing | Phase::Initialized),
            Operation::Read | Operation::Write,
        ) => phase,

        // Reset is legal from anywhere, Terminated included.
        (_, Operation::Reset) => Phase::Instantiated,

        // Strict free policy: the instance must be terminated first.
        (Phase::Terminated, Operation::FreeInstance) => Phase::Terminated,

        (phase, operation) => {
            return Err(KernelError::ProtocolViolation { operation, phase });
        }
    };
    Ok(next)
}
