//! Model error types.

use lockstep_types::ValueReference;

/// Errors surfaced by model value access.
///
/// Stepping never fails; only reads and writes do, and only for
/// resolution problems. Both failure modes are scoped to the offending
/// call and leave the model unmodified.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelError {
    /// A reference is absent from the model's value-reference table.
    #[error("value reference {0} does not resolve to a model variable")]
    UnresolvedValueReference(ValueReference),

    /// A write supplied a different number of values than references.
    #[error("write supplied {references} references but {values} values")]
    ValueCountMismatch { references: usize, values: usize },
}
