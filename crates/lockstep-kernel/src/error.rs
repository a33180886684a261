//! Kernel error types.

use lockstep_model::ModelError;
use lockstep_types::InstanceHandle;

use crate::lifecycle::{Operation, Phase};

/// Errors a kernel operation can surface to a caller.
///
/// None of these is fatal to the process; each is scoped to the offending
/// call and the kernel keeps serving other instances.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    /// The handle is absent from the registry: never allocated, or already
    /// freed.
    #[error("instance {0} not found")]
    InstanceNotFound(InstanceHandle),

    /// The operation is illegal in the instance's current lifecycle phase.
    #[error("{operation} is not legal in phase {phase}")]
    ProtocolViolation { operation: Operation, phase: Phase },

    /// The model rejected a value access.
    #[error(transparent)]
    Model(#[from] ModelError),
}
