//! One live model instance: the model itself, its lifecycle phase, and the
//! configuration accepted for it.

use std::fmt;

use lockstep_model::Model;
use lockstep_types::ValueReference;

use crate::error::KernelError;
use crate::lifecycle::{Operation, Phase, next_phase};

/// Arguments accepted by `enterInitializationMode`.
///
/// Stored on the instance and logged, but not interpreted: they do not
/// alter model numerics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InitializationArgs {
    /// Solver tolerance, when the controller defined one.
    pub tolerance: Option<f64>,
    /// Simulation start time.
    pub start_time: f64,
    /// Simulation stop time, when the controller defined one.
    pub stop_time: Option<f64>,
}

/// A live model plus its lifecycle phase.
///
/// Owned exclusively by the registry for its lifetime. All mutation goes
/// through the phase-checked methods below; an illegal call fails with
/// `ProtocolViolation` and changes nothing.
pub struct Instance {
    phase: Phase,
    model: Box<dyn Model>,
    init_args: Option<InitializationArgs>,
}

impl Instance {
    /// Wraps a freshly constructed model in phase `Instantiated`.
    pub fn new(model: Box<dyn Model>) -> Self {
        Self {
            phase: Phase::Instantiated,
            model,
            init_args: None,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Arguments stored by the last `enterInitializationMode`, if any.
    pub fn initialization_args(&self) -> Option<InitializationArgs> {
        self.init_args
    }

    pub fn enter_initialization_mode(
        &mut self,
        args: InitializationArgs,
    ) -> Result<(), KernelError> {
        self.phase = next_phase(self.phase, Operation::EnterInitializationMode)?;
        self.init_args = Some(args);
        Ok(())
    }

    pub fn exit_initialization_mode(&mut self) -> Result<(), KernelError> {
        self.phase = next_phase(self.phase, Operation::ExitInitializationMode)?;
        Ok(())
    }

    /// Advances the model by `dt` time units.
    pub fn do_step(&mut self, dt: f64) -> Result<(), KernelError> {
        self.phase = next_phase(self.phase, Operation::DoStep)?;
        self.model.step(dt);
        Ok(())
    }

    /// Reads the referenced variables, atomically.
    pub fn read(&self, references: &[ValueReference]) -> Result<Vec<f64>, KernelError> {
        next_phase(self.phase, Operation::Read)?;
        Ok(self.model.read(references)?)
    }

    /// Writes the referenced variables, atomically.
    pub fn write(
        &mut self,
        references: &[ValueReference],
        values: &[f64],
    ) -> Result<(), KernelError> {
        next_phase(self.phase, Operation::Write)?;
        self.model.write(references, values)?;
        Ok(())
    }

    /// Returns the instance to `Instantiated` with default model state.
    pub fn reset(&mut self) -> Result<(), KernelError> {
        self.phase = next_phase(self.phase, Operation::Reset)?;
        self.model.reset();
        self.init_args = None;
        Ok(())
    }

    pub fn terminate(&mut self) -> Result<(), KernelError> {
        self.phase = next_phase(self.phase, Operation::Terminate)?;
        Ok(())
    }

    /// Checks that the instance may be freed (strict policy: Terminated
    /// only). Removal itself is the registry's job.
    pub fn check_free(&self) -> Result<(), KernelError> {
        next_phase(self.phase, Operation::FreeInstance)?;
        Ok(())
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("phase", &self.phase)
            .field("init_args", &self.init_args)
            .finish_non_exhaustive()
    }
}
