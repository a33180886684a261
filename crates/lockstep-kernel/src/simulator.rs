//! The simulator facade: one method per protocol operation.
//!
//! This is the surface the request handler (and any in-process embedder)
//! drives. Each method resolves the handle through the registry, takes the
//! per-instance lock, and delegates to the phase-checked [`Instance`]
//! methods. The facade holds no state of its own beyond the registry and
//! the step policy, so it is freely shareable behind an `Arc`.

use std::sync::{Arc, Mutex, MutexGuard};

use lockstep_model::Model;
use lockstep_types::{InstanceHandle, ValueReference};

use crate::error::KernelError;
use crate::instance::{InitializationArgs, Instance};
use crate::lifecycle::Phase;
use crate::registry::Registry;

/// How `doStep` chooses the interval to advance by.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StepPolicy {
    /// Honor the caller-supplied communication step size.
    #[default]
    CallerSupplied,
    /// Advance by a fixed internal interval, ignoring the caller's value.
    Fixed(f64),
}

impl StepPolicy {
    fn effective_dt(self, communication_step_size: f64) -> f64 {
        match self {
            StepPolicy::CallerSupplied => communication_step_size,
            StepPolicy::Fixed(dt) => dt,
        }
    }
}

/// An isolated co-simulation service: registry plus step policy.
///
/// Multiple simulators can coexist in one process; nothing here is
/// ambient.
pub struct Simulator {
    registry: Registry,
    step_policy: StepPolicy,
}

impl Simulator {
    /// Creates a simulator whose instances are built by `factory`.
    pub fn new(factory: impl Fn() -> Box<dyn Model> + Send + Sync + 'static) -> Self {
        Self {
            registry: Registry::new(factory),
            step_policy: StepPolicy::default(),
        }
    }

    /// Sets the step policy. Builder-style, for construction sites.
    pub fn with_step_policy(mut self, policy: StepPolicy) -> Self {
        self.step_policy = policy;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Creates a new instance and returns its handle.
    pub fn instantiate(&self) -> InstanceHandle {
        self.registry.create()
    }

    /// Accepts (stores, does not interpret) initialization arguments.
    pub fn enter_initialization_mode(
        &self,
        handle: InstanceHandle,
        args: InitializationArgs,
    ) -> Result<(), KernelError> {
        let instance = self.registry.get(handle)?;
        lock(&instance).enter_initialization_mode(args)
    }

    pub fn exit_initialization_mode(&self, handle: InstanceHandle) -> Result<(), KernelError> {
        let instance = self.registry.get(handle)?;
        lock(&instance).exit_initialization_mode()
    }

    /// Advances the instance by one step.
    ///
    /// The effective interval is `communication_step_size` under the
    /// default policy, or the configured fixed interval under
    /// [`StepPolicy::Fixed`].
    pub fn do_step(
        &self,
        handle: InstanceHandle,
        communication_step_size: f64,
    ) -> Result<(), KernelError> {
        let dt = self.step_policy.effective_dt(communication_step_size);
        let instance = self.registry.get(handle)?;
        lock(&instance).do_step(dt)
    }

    /// Reads the referenced variables, atomically and in input order.
    pub fn read(
        &self,
        handle: InstanceHandle,
        references: &[ValueReference],
    ) -> Result<Vec<f64>, KernelError> {
        let instance = self.registry.get(handle)?;
        let guard = lock(&instance);
        guard.read(references)
    }

    /// Writes the referenced variables, atomically.
    pub fn write(
        &self,
        handle: InstanceHandle,
        references: &[ValueReference],
        values: &[f64],
    ) -> Result<(), KernelError> {
        let instance = self.registry.get(handle)?;
        lock(&instance).write(references, values)
    }

    /// Returns the instance to `Instantiated` with default model state.
    pub fn reset(&self, handle: InstanceHandle) -> Result<(), KernelError> {
        let instance = self.registry.get(handle)?;
        lock(&instance).reset()
    }

    pub fn terminate(&self, handle: InstanceHandle) -> Result<(), KernelError> {
        let instance = self.registry.get(handle)?;
        lock(&instance).terminate()
    }

    /// Frees a terminated instance and releases its handle for reuse.
    pub fn free_instance(&self, handle: InstanceHandle) -> Result<(), KernelError> {
        let instance = self.registry.get(handle)?;
        lock(&instance).check_free()?;
        self.registry.remove(handle)
    }

    /// Current lifecycle phase of an instance.
    pub fn phase(&self, handle: InstanceHandle) -> Result<Phase, KernelError> {
        let instance = self.registry.get(handle)?;
        let phase = lock(&instance).phase();
        Ok(phase)
    }
}

fn lock(instance: &Arc<Mutex<Instance>>) -> MutexGuard<'_, Instance> {
    instance.lock().expect("instance lock poisoned")
}
