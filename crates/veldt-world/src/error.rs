//! Error types for world-state operations.

/// Errors that can occur inside the world crate.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A lookup named an entity that does not exist.
    #[error("unknown entity: {detail}")]
    UnknownEntity {
        /// What was looked up.
        detail: String,
    },

    /// A post-tick invariant does not hold. Always an implementation bug.
    #[error("invariant violated: {detail}")]
    InvariantViolated {
        /// The first violated invariant.
        detail: String,
    },
}
