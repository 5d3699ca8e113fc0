//! The action tagged union proposed by actors over the wire.
//!
//! Inbound payloads carry an `action` discriminator and a `params` object;
//! the enum below is adjacently tagged on exactly those two fields, so a
//! single `serde_json::from_value` both parses and type-narrows the payload.
//! Unknown action names or malformed params fail that parse and are silently
//! dropped at the ingress layer, never at the validator.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::ChatMode;
use crate::ids::{ActorId, BehemothId, ResourceId};
use crate::structs::{ItemBundle, ItemId};

/// An action proposed by an actor.
///
/// Target ids that may name an actor, NPC, or behemoth (attack, inspect)
/// are raw `u64`s; the validator resolves them against the entity maps.
/// Ids are allocated from one world-wide counter, so a raw id is unambiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "action", content = "params", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Action {
    /// Walk toward a destination.
    #[serde(rename_all = "camelCase")]
    Move {
        /// Destination x coordinate.
        x: f64,
        /// Destination y coordinate.
        y: f64,
    },
    /// Attach to a resource node and start gathering.
    #[serde(rename_all = "camelCase")]
    Gather {
        /// The resource node to gather.
        target_id: ResourceId,
    },
    /// Start a crafting job (merchants only).
    #[serde(rename_all = "camelCase")]
    Craft {
        /// The recipe to craft.
        recipe_id: String,
    },
    /// Attach a combat pair against a target.
    #[serde(rename_all = "camelCase")]
    Attack {
        /// The target entity (actor, NPC, or behemoth).
        target_id: u64,
    },
    /// Send a chat message.
    #[serde(rename_all = "camelCase")]
    Talk {
        /// Delivery mode.
        mode: ChatMode,
        /// Message body.
        message: String,
        /// Whisper target (required for whispers).
        target_id: Option<ActorId>,
    },
    /// Look at an entity; the result comes back as an actor-only event.
    #[serde(rename_all = "camelCase")]
    Inspect {
        /// The entity to inspect.
        target_id: u64,
    },
    /// Propose a trade to another actor.
    #[serde(rename_all = "camelCase")]
    Trade {
        /// The counterparty.
        target_id: ActorId,
        /// What the proposer offers.
        offer: ItemBundle,
        /// What the proposer asks for.
        request: ItemBundle,
    },
    /// Plant a seed at a position (merchants only).
    #[serde(rename_all = "camelCase")]
    Plant {
        /// The seed item to consume.
        seed_id: ItemId,
        /// Planting x coordinate.
        x: f64,
        /// Planting y coordinate.
        y: f64,
    },
    /// Water the sapling at a position (merchants only).
    #[serde(rename_all = "camelCase")]
    Water {
        /// Sapling x coordinate.
        x: f64,
        /// Sapling y coordinate.
        y: f64,
    },
    /// Feed a behemoth an inventory item.
    #[serde(rename_all = "camelCase")]
    Feed {
        /// The behemoth to feed.
        behemoth_id: BehemothId,
        /// The item to consume.
        item_id: ItemId,
    },
    /// Climb an unconscious behemoth (merchants only).
    #[serde(rename_all = "camelCase")]
    Climb {
        /// The behemoth to climb.
        behemoth_id: BehemothId,
    },
    /// Found a new alliance.
    #[serde(rename_all = "camelCase")]
    FormAlliance {
        /// Proposed alliance name.
        name: String,
    },
    /// Join an existing alliance.
    #[serde(rename_all = "camelCase")]
    JoinAlliance {
        /// Alliance to join.
        name: String,
    },
    /// Leave the current alliance.
    LeaveAlliance,
    /// Do nothing this tick. Always approved.
    Idle,
}

impl Action {
    /// The wire name of this action, as used in `action_rejected` envelopes
    /// and tick-result summaries.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::Gather { .. } => "gather",
            Self::Craft { .. } => "craft",
            Self::Attack { .. } => "attack",
            Self::Talk { .. } => "talk",
            Self::Inspect { .. } => "inspect",
            Self::Trade { .. } => "trade",
            Self::Plant { .. } => "plant",
            Self::Water { .. } => "water",
            Self::Feed { .. } => "feed",
            Self::Climb { .. } => "climb",
            Self::FormAlliance { .. } => "form_alliance",
            Self::JoinAlliance { .. } => "join_alliance",
            Self::LeaveAlliance => "leave_alliance",
            Self::Idle => "idle",
        }
    }
}

/// An action with its originating actor, as drained from the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct QueuedAction {
    /// The proposing actor.
    pub actor: ActorId,
    /// The proposed action.
    pub action: Action,
    /// The client-reported tick the action was aimed at.
    pub client_tick: u64,
}

/// A validation failure routed back to the originating actor only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RejectedAction {
    /// The actor whose action was rejected.
    pub actor: ActorId,
    /// The wire name of the rejected action.
    pub action: String,
    /// A short human-readable reason; part of the external contract.
    pub reason: String,
}
