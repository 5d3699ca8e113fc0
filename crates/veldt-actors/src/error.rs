//! Error types for actor processing.

use veldt_types::ActorId;

/// Errors that can occur while executing actor logic.
///
/// Validation failures are not errors -- they are `Rejected` results carried
/// as contract strings. This enum covers genuine implementation faults the
/// tick logs and survives.
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    /// An executed action referenced an actor that vanished mid-tick.
    #[error("actor {actor} vanished mid-execution")]
    ActorVanished {
        /// The missing actor.
        actor: ActorId,
    },

    /// An execution-time pre-check failed (e.g. inventory no longer covers
    /// a crafting recipe). The action is skipped without partial mutation.
    #[error("execution pre-check failed for actor {actor}: {detail}")]
    PreCheckFailed {
        /// The acting actor.
        actor: ActorId,
        /// What no longer held.
        detail: String,
    },
}
