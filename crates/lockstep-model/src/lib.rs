//! # lockstep-model: Simulation model contract for `Lockstep`
//!
//! A [`Model`] is the unit a co-simulation controller advances and probes:
//! it steps forward in time by discrete intervals and exposes its state
//! variables through small integer value references. The registry and the
//! protocol layer never know which concrete model they are holding; they
//! only see this trait.
//!
//! The crate ships one concrete implementation, [`BouncingBall`], which is
//! the reference model the rest of the system is tested against. It is
//! deliberately simple; the point of the system is the lifecycle and
//! protocol machinery around it, not the physics.

mod bouncing_ball;
mod error;

pub use bouncing_ball::BouncingBall;
pub use error::ModelError;

use lockstep_types::ValueReference;

/// A simulation model advanced in lock step by an external controller.
///
/// Models must be deterministic for a given call sequence. All value access
/// is **atomic**: a read or write that names one unresolvable reference
/// fails as a whole, returning no partial result and leaving the model
/// unmodified.
pub trait Model: Send {
    /// Advances internal state by one discrete interval of `dt` time units.
    ///
    /// Implementations must not fail; numerical edge cases (boundary
    /// impacts, saturation) are part of the model's own dynamics.
    fn step(&mut self, dt: f64);

    /// Reads the current value of each referenced variable, in input order.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnresolvedValueReference`] if any reference is
    /// not in the model's value-reference table. No partial list is
    /// returned.
    fn read(&self, references: &[ValueReference]) -> Result<Vec<f64>, ModelError>;

    /// Writes a value to each referenced variable, pairwise.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnresolvedValueReference`] if any reference is
    /// unknown (the model is left unmodified), or
    /// [`ModelError::ValueCountMismatch`] if the two slices differ in
    /// length.
    fn write(&mut self, references: &[ValueReference], values: &[f64]) -> Result<(), ModelError>;

    /// Restores the model to its freshly-constructed default state.
    fn reset(&mut self);
}
