//! Concurrency-safe instance registry.
//!
//! Process-wide state with an explicit lifecycle: empty at construction,
//! populated by `create`, emptied by `remove`. All three operations
//! serialize through one lock over the handle map and are linearizable
//! with respect to each other; the map is never observable in a
//! partially-updated state.
//!
//! Each stored instance is additionally wrapped in its own lock, so
//! per-instance operations from concurrent callers serialize instead of
//! racing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use lockstep_model::Model;
use lockstep_types::InstanceHandle;

use crate::error::KernelError;
use crate::instance::Instance;

/// Constructs the default model stored by [`Registry::create`].
///
/// Injected at construction so the kernel stays model-agnostic; the server
/// and CLI wire in the bouncing ball.
pub type ModelFactory = Box<dyn Fn() -> Box<dyn Model> + Send + Sync>;

/// Maps opaque instance handles to live instances.
///
/// Handles are allocated as the smallest non-negative integer not
/// currently in use, so a freed handle is reused by a later `create`.
pub struct Registry {
    factory: ModelFactory,
    instances: Mutex<HashMap<InstanceHandle, Arc<Mutex<Instance>>>>,
}

impl Registry {
    pub fn new(factory: impl Fn() -> Box<dyn Model> + Send + Sync + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Allocates the lowest unused handle and stores a freshly constructed
    /// default model under it, in phase `Instantiated`.
    ///
    /// Two concurrent creates never receive the same handle.
    pub fn create(&self) -> InstanceHandle {
        let mut instances = self.instances.lock().expect("registry lock poisoned");
        let handle = Self::lowest_unused_handle(&instances);
        let instance = Instance::new((self.factory)());
        instances.insert(handle, Arc::new(Mutex::new(instance)));
        handle
    }

    /// Looks up a live instance.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::InstanceNotFound`] if the handle was never
    /// allocated or has been freed.
    pub fn get(&self, handle: InstanceHandle) -> Result<Arc<Mutex<Instance>>, KernelError> {
        let instances = self.instances.lock().expect("registry lock poisoned");
        instances
            .get(&handle)
            .cloned()
            .ok_or(KernelError::InstanceNotFound(handle))
    }

    /// Deletes the entry for `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::InstanceNotFound`] if the handle is absent.
    pub fn remove(&self, handle: InstanceHandle) -> Result<(), KernelError> {
        let mut instances = self.instances.lock().expect("registry lock poisoned");
        instances
            .remove(&handle)
            .map(|_| ())
            .ok_or(KernelError::InstanceNotFound(handle))
    }

    /// Number of currently-live instances.
    pub fn len(&self) -> usize {
        self.instances.lock().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lowest_unused_handle(
        instances: &HashMap<InstanceHandle, Arc<Mutex<Instance>>>,
    ) -> InstanceHandle {
        let mut candidate = 0u32;
        while instances.contains_key(&InstanceHandle::new(candidate)) {
            candidate += 1;
        }
        InstanceHandle::new(candidate)
    }
}
