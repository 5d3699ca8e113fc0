//! Enumeration types shared across the Veldt workspace.
//!
//! Every state machine in the engine (actor status, NPC behavior, behemoth
//! lifecycle, resource state, trade lifecycle) is a tagged variant here with
//! its transition function living in the owning processor crate.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// The three playable roles.
///
/// Role selection is permanent for the lifetime of an actor, across
/// reconnects. Role gates what an actor may gather, attack, and craft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Role {
    /// Gatherer, crafter, planter, and behemoth climber. Never fights.
    Merchant,
    /// Combat role. Mines gold veins, hunts monsters and behemoths.
    Fighter,
    /// Player-monster. Permadeath, evolves by kills and eats.
    Monster,
}

// ---------------------------------------------------------------------------
// Actor status
// ---------------------------------------------------------------------------

/// What an actor is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActorStatus {
    /// No continuous effect in progress.
    Idle,
    /// Walking toward a destination.
    Moving,
    /// Attached to a resource node and accruing gather progress.
    Gathering,
    /// Waiting on a crafting job to complete.
    Crafting,
    /// Member of at least one active combat pair.
    Fighting,
    /// Dead. Merchants and fighters hold this until their respawn tick;
    /// monsters hold it forever.
    Dead,
    /// Riding an unconscious behemoth.
    Climbing,
    /// Waiting on a pending trade.
    Trading,
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// The kind of a resource node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ResourceKind {
    /// Mature tree yielding wood logs.
    Tree,
    /// Planted seed growing into a tree.
    Sapling,
    /// Gold deposit minable by fighters.
    GoldVein,
}

/// The lifecycle state of a resource node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ResourceState {
    /// Ready to be gathered.
    Available,
    /// An actor is attached and gathering.
    BeingGathered,
    /// Remaining hit zero; node is inert.
    Depleted,
    /// Sapling only: growth timer is running.
    Growing,
}

// ---------------------------------------------------------------------------
// NPC behavior
// ---------------------------------------------------------------------------

/// The behavior state of a server-driven NPC monster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum NpcBehavior {
    /// Random-walking around the patrol origin.
    Patrol,
    /// Closing distance on an aggro target.
    Chase,
    /// In range; combat pairs resolve the damage.
    Attack,
    /// Retreating (reserved; current templates never flee).
    Flee,
    /// Standing still.
    Idle,
}

// ---------------------------------------------------------------------------
// Behemoth lifecycle
// ---------------------------------------------------------------------------

/// The lifecycle state of a behemoth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BehemothStatus {
    /// Following its waypoint route.
    Roaming,
    /// Knocked out; climbers may mine ore until it wakes.
    Unconscious,
    /// Transitional state during the wake tick.
    Waking,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// Delivery mode of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ChatMode {
    /// Sender and one named target only.
    Whisper,
    /// Everyone within the local chat radius of the sender.
    Local,
    /// Every connected actor.
    Broadcast,
}

// ---------------------------------------------------------------------------
// Trades
// ---------------------------------------------------------------------------

/// The lifecycle state of a trade.
///
/// The wire protocol exposes no accept/reject action, so live trades only
/// ever move from `Pending` to `Expired`; the other variants exist for the
/// persisted schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TradeStatus {
    /// Waiting for resolution.
    Pending,
    /// Accepted by the counterparty.
    Accepted,
    /// Rejected by the counterparty.
    Rejected,
    /// Timed out without resolution.
    Expired,
}

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

/// The slot an equippable item occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EquipSlot {
    /// Adds to effective attack.
    Weapon,
    /// Adds to effective defense.
    Armor,
    /// Carried utility item; no combat modifier.
    Tool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Merchant).unwrap(), "\"merchant\"");
        let parsed: Role = serde_json::from_str("\"monster\"").unwrap();
        assert_eq!(parsed, Role::Monster);
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ActorStatus::Gathering).unwrap(),
            "\"gathering\""
        );
    }

    #[test]
    fn resource_kind_round_trips() {
        let kind: ResourceKind = serde_json::from_str("\"gold_vein\"").unwrap();
        assert_eq!(kind, ResourceKind::GoldVein);
    }
}
