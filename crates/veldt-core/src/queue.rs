//! The action queue and the control queue: the only structures written by
//! concurrent producers.
//!
//! Connection tasks never touch the world. They append to these queues;
//! the tick loop drains both at the start of each tick. The action queue
//! keeps at most one pending action per actor (last write wins within a
//! tick), and its drain order is the actor-id order of the underlying
//! `BTreeMap`, which is the deterministic processing order the validator
//! sees.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use tokio::sync::oneshot;
use veldt_types::{ActorId, ClientMessage, Position, QueuedAction, Role};

/// Per-actor pending-action buffer with last-write-wins semantics.
#[derive(Debug, Default)]
pub struct ActionQueue {
    /// actor -> the single pending action.
    slots: Mutex<BTreeMap<ActorId, QueuedAction>>,
}

impl ActionQueue {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(BTreeMap::new()),
        }
    }

    /// Parse and type-narrow a raw action payload, then enqueue it.
    ///
    /// Malformed payloads (unknown action names, missing params, wrong
    /// types) are silently dropped here -- the inbound channel is
    /// untrusted and gets no error response. Returns whether the payload
    /// was accepted.
    pub fn enqueue_payload(&self, actor: ActorId, payload: &serde_json::Value) -> bool {
        match serde_json::from_value::<ClientMessage>(payload.clone()) {
            Ok(ClientMessage::Action { action, tick }) => {
                self.enqueue(QueuedAction {
                    actor,
                    action,
                    client_tick: tick,
                });
                true
            }
            Ok(_) | Err(_) => {
                tracing::trace!(actor = %actor, "Dropped malformed action payload");
                false
            }
        }
    }

    /// Enqueue a parsed action, replacing any pending one for the actor.
    pub fn enqueue(&self, action: QueuedAction) {
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        slots.insert(action.actor, action);
    }

    /// Take every pending action, in actor-id order, clearing the queue.
    pub fn drain(&self) -> Vec<QueuedAction> {
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let drained = std::mem::take(&mut *slots);
        drained.into_values().collect()
    }

    /// The number of actors with a pending action.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the queue has no pending actions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Control queue
// ---------------------------------------------------------------------------

/// The engine's answer to a reserve or join request.
#[derive(Debug)]
pub enum ControlReply {
    /// The name is free; an actor id is reserved for it pending role
    /// selection.
    Reserved {
        /// The reserved actor id.
        actor_id: ActorId,
    },
    /// A new actor was created.
    Joined {
        /// The new actor's id.
        actor_id: ActorId,
        /// The role that was bound.
        role: Role,
        /// Where the actor spawned.
        spawn_position: Position,
    },
    /// An existing disconnected actor was resumed: same role, same
    /// inventory, same position and health.
    Resumed {
        /// The resumed actor's id.
        actor_id: ActorId,
        /// The actor's permanent role.
        role: Role,
        /// Where the actor currently stands.
        position: Position,
    },
    /// The name is held by a connected actor.
    NameTaken,
}

/// A request from the gateway that must mutate the world.
///
/// The single-writer rule means connection tasks cannot create or resume
/// actors themselves; they enqueue these and await the reply the tick
/// loop sends back.
#[derive(Debug)]
pub enum ControlRequest {
    /// Authenticate a name: resume it if it exists disconnected, refuse
    /// it if connected, or reserve an id for a brand-new actor.
    Reserve {
        /// Requested display name.
        name: String,
        /// Reply channel back to the session task.
        reply: oneshot::Sender<ControlReply>,
    },
    /// Create the reserved actor once a role is chosen.
    Join {
        /// The id handed out by the reserve step.
        actor_id: ActorId,
        /// Requested display name.
        name: String,
        /// Chosen role.
        role: Role,
        /// Reply channel back to the session task.
        reply: oneshot::Sender<ControlReply>,
    },
    /// Flip an actor's connected flag off.
    Disconnect {
        /// The disconnecting actor.
        actor_id: ActorId,
    },
}

/// FIFO queue of control requests, drained once per tick.
#[derive(Debug, Default)]
pub struct ControlQueue {
    requests: Mutex<Vec<ControlRequest>>,
}

impl ControlQueue {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Append a request.
    pub fn push(&self, request: ControlRequest) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
    }

    /// Take every pending request in arrival order.
    pub fn drain(&self) -> Vec<ControlRequest> {
        std::mem::take(
            &mut *self
                .requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}
