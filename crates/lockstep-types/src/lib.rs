//! # lockstep-types: Core types for `Lockstep`
//!
//! This crate contains shared types used across the `Lockstep` system:
//! - Instance identity ([`InstanceHandle`])
//! - Variable identity ([`ValueReference`])
//!
//! Both are small `Copy` newtypes that cross the wire inside protocol
//! payloads, so they derive `Serialize`/`Deserialize`.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

// ============================================================================
// Instance identity
// ============================================================================

/// Opaque identifier naming one live model instance within the registry.
///
/// Handles are non-negative, unique among currently-live instances, and
/// assigned by the registry as the smallest value not currently in use.
/// A freed handle may be reused by a later instantiation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct InstanceHandle(u32);

impl InstanceHandle {
    pub fn new(handle: u32) -> Self {
        Self(handle)
    }

    /// Returns the handle as a `u32`.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl Display for InstanceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for InstanceHandle {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<InstanceHandle> for u32 {
    fn from(handle: InstanceHandle) -> Self {
        handle.0
    }
}

// ============================================================================
// Variable identity
// ============================================================================

/// Small integer identifier a protocol client uses to name a model state
/// variable without knowing its internal representation.
///
/// The mapping from reference to variable is fixed at model construction
/// time and may be non-injective: one variable can be exposed under more
/// than one reference number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct ValueReference(u32);

impl ValueReference {
    pub fn new(reference: u32) -> Self {
        Self(reference)
    }

    /// Returns the reference as a `u32`.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl Display for ValueReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ValueReference {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<ValueReference> for u32 {
    fn from(reference: ValueReference) -> Self {
        reference.0
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn handle_roundtrips_through_u32() {
        let handle = InstanceHandle::new(7);
        assert_eq!(u32::from(handle), 7);
        assert_eq!(InstanceHandle::from(7u32), handle);
        assert_eq!(handle.to_string(), "7");
    }

    #[test_case(0; "zero")]
    #[test_case(3; "aliased velocity")]
    #[test_case(u32::MAX; "max")]
    fn reference_roundtrips_through_u32(raw: u32) {
        let reference = ValueReference::new(raw);
        assert_eq!(reference.as_u32(), raw);
        assert_eq!(ValueReference::from(raw), reference);
    }

    #[test]
    fn handles_order_by_value() {
        assert!(InstanceHandle::new(0) < InstanceHandle::new(1));
        assert_eq!(InstanceHandle::default(), InstanceHandle::new(0));
    }
}
