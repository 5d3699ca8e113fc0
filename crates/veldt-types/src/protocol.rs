//! Wire protocol envelopes and per-actor view types.
//!
//! All traffic is JSON over one persistent bidirectional channel. Client and
//! server envelopes are internally tagged on `type`; field names follow the
//! camelCase convention of the TypeScript agent clients.
//!
//! The view types enforce fog of war at the type level: nothing private
//! (gold, inventory, equipment) appears anywhere but [`SelfView`]. If a
//! field is not in a view struct, no client can ever see it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::actions::Action;
use crate::enums::{
    ActorStatus, BehemothStatus, ChatMode, NpcBehavior, ResourceKind, ResourceState, Role,
};
use crate::events::WorldEvent;
use crate::geometry::Position;
use crate::ids::{ActorId, BehemothId, MessageId, NpcId, ResourceId, StructureId};
use crate::structs::{Equipment, ItemId};

// ---------------------------------------------------------------------------
// Client -> Server
// ---------------------------------------------------------------------------

/// A message from a client connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ClientMessage {
    /// Claim a display name, optionally presenting a resume token.
    Auth {
        /// Requested display name.
        name: String,
        /// Session token from a previous `auth_success`, if resuming.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    /// Choose a role after a `role_prompt`.
    SelectRole {
        /// The chosen role.
        role: Role,
    },
    /// Propose an action for the current tick.
    Action {
        /// The action discriminator and parameters.
        #[serde(flatten)]
        action: Action,
        /// The tick the client believes is current.
        tick: u64,
    },
    /// Liveness probe.
    Ping,
}

// ---------------------------------------------------------------------------
// Server -> Client
// ---------------------------------------------------------------------------

/// A message to a client connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ServerMessage {
    /// Sent on connect: the client must authenticate.
    AuthPrompt,
    /// Authentication accepted.
    #[serde(rename_all = "camelCase")]
    AuthSuccess {
        /// The actor id now bound to this connection.
        agent_id: ActorId,
        /// Session token to present on future reconnects. Issued once,
        /// on the first auth for the name.
        #[serde(skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    /// Authentication refused.
    AuthError {
        /// Short human-readable reason.
        reason: String,
    },
    /// New actor: pick a role.
    #[serde(rename_all = "camelCase")]
    RolePrompt {
        /// Roles available to this actor.
        available_roles: Vec<Role>,
    },
    /// Role bound (new actor) or restated (resumed actor).
    #[serde(rename_all = "camelCase")]
    RoleConfirmed {
        /// The permanent role.
        role: Role,
        /// The actor id.
        agent_id: ActorId,
        /// Where the actor stands.
        spawn_position: Position,
    },
    /// The per-tick personalized world view.
    TickUpdate {
        /// The fog-of-war-filtered payload.
        data: Box<TickUpdateData>,
    },
    /// An action failed validation.
    ActionRejected {
        /// The wire name of the rejected action.
        action: String,
        /// Short human-readable reason; part of the external contract.
        reason: String,
    },
    /// Liveness reply.
    #[serde(rename_all = "camelCase")]
    Pong {
        /// The server's current tick.
        server_tick: u64,
    },
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// The actor's full private view of itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SelfView {
    /// Actor id.
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// Permanent role.
    pub role: Role,
    /// Current position.
    pub position: Position,
    /// Movement target, if moving.
    pub destination: Option<Position>,
    /// Current activity.
    pub status: ActorStatus,
    /// Current health.
    pub health: u32,
    /// Health ceiling.
    pub max_health: u32,
    /// Base attack.
    pub attack: u32,
    /// Base defense.
    pub defense: u32,
    /// Movement speed, units per tick.
    pub speed: f64,
    /// Fog-of-war radius.
    pub vision_radius: f64,
    /// Gold on hand.
    pub gold: u64,
    /// Inventory contents.
    pub inventory: BTreeMap<ItemId, u32>,
    /// Equipment slots.
    pub equipment: Equipment,
    /// Alliance membership.
    pub alliance: Option<String>,
    /// Lifetime kills.
    pub kills: u32,
    /// Lifetime monster eats.
    pub monster_eats: u32,
    /// Evolution stage.
    pub evolution_stage: u32,
    /// Ticks until the next action may execute (0 when ready).
    pub action_cooldown: u64,
    /// Liveness flag.
    pub is_alive: bool,
}

/// Another actor as seen through fog of war.
///
/// Never carries gold, inventory, or equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PublicActorView {
    /// Actor id.
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: Role,
    /// Position.
    pub position: Position,
    /// Current activity.
    pub status: ActorStatus,
    /// Current health.
    pub health: u32,
    /// Health ceiling.
    pub max_health: u32,
    /// Alliance membership.
    pub alliance: Option<String>,
    /// Evolution stage.
    pub evolution_stage: u32,
}

/// A visible resource node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ResourceView {
    /// Resource id.
    pub id: ResourceId,
    /// Node kind.
    pub kind: ResourceKind,
    /// Position.
    pub position: Position,
    /// Units remaining.
    pub remaining: u32,
    /// Capacity ceiling.
    pub max_capacity: u32,
    /// Lifecycle state.
    pub state: ResourceState,
}

/// A visible NPC monster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct NpcView {
    /// NPC id.
    pub id: NpcId,
    /// Template name.
    pub template: String,
    /// Position.
    pub position: Position,
    /// Current health.
    pub health: u32,
    /// Health ceiling.
    pub max_health: u32,
    /// Behavior state.
    pub behavior: NpcBehavior,
    /// Always `true`; lets clients tell NPCs from actors at a glance.
    pub is_npc: bool,
}

/// A visible behemoth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct BehemothView {
    /// Behemoth id.
    pub id: BehemothId,
    /// Type name.
    pub kind: String,
    /// Position.
    pub position: Position,
    /// Current health.
    pub health: u32,
    /// Health ceiling.
    pub max_health: u32,
    /// Lifecycle state.
    pub status: BehemothStatus,
    /// Whether any ore is currently minable.
    pub ore_available: bool,
    /// Ticks until the behemoth wakes (0 when awake).
    pub unconscious_ticks_remaining: u64,
}

/// A visible structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StructureView {
    /// Structure id.
    pub id: StructureId,
    /// Structure type name.
    pub kind: String,
    /// Position.
    pub position: Position,
    /// Owning actor.
    pub owner: ActorId,
    /// Alliance registration.
    pub alliance: Option<String>,
}

/// A chat message as delivered to a recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct MessageView {
    /// Message id.
    pub id: MessageId,
    /// Tick the message was sent.
    pub tick: u64,
    /// Sending actor.
    pub sender_id: ActorId,
    /// Sender display name.
    pub sender_name: String,
    /// Delivery mode.
    pub mode: ChatMode,
    /// Message body.
    pub content: String,
}

/// Everything inside the actor's vision radius, partitioned by kind.
///
/// The actor itself never appears in `actors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct NearbyView {
    /// Other actors, public view only.
    pub actors: Vec<PublicActorView>,
    /// Resource nodes.
    pub resources: Vec<ResourceView>,
    /// NPC monsters.
    pub npcs: Vec<NpcView>,
    /// Behemoths.
    pub behemoths: Vec<BehemothView>,
    /// Structures.
    pub structures: Vec<StructureView>,
}

/// The complete per-actor tick payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TickUpdateData {
    /// The tick this payload describes.
    pub tick: u64,
    /// The actor's private view of itself.
    #[serde(rename = "self")]
    pub self_view: SelfView,
    /// Everything within vision.
    pub nearby: NearbyView,
    /// Chat messages addressed to this actor.
    pub messages: Vec<MessageView>,
    /// World events touching this actor or entities within vision.
    pub events: Vec<WorldEvent>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn auth_parses_with_and_without_token() {
        let raw = serde_json::json!({"type": "auth", "name": "Wren"});
        let parsed: ClientMessage = serde_json::from_value(raw).unwrap();
        assert_eq!(
            parsed,
            ClientMessage::Auth {
                name: "Wren".to_owned(),
                token: None
            }
        );

        let raw = serde_json::json!({"type": "auth", "name": "Wren", "token": "t-1"});
        let parsed: ClientMessage = serde_json::from_value(raw).unwrap();
        assert!(matches!(parsed, ClientMessage::Auth { token: Some(_), .. }));
    }

    #[test]
    fn action_envelope_flattens_the_union() {
        let raw = serde_json::json!({
            "type": "action",
            "action": "move",
            "params": {"x": 1.0, "y": 2.0},
            "tick": 17
        });
        let parsed: ClientMessage = serde_json::from_value(raw).unwrap();
        match parsed {
            ClientMessage::Action { action, tick } => {
                assert_eq!(tick, 17);
                assert_eq!(action.name(), "move");
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn pong_uses_camel_case() {
        let msg = ServerMessage::Pong { server_tick: 42 };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json.get("type").and_then(|v| v.as_str()), Some("pong"));
        assert_eq!(
            json.get("serverTick").and_then(serde_json::Value::as_u64),
            Some(42)
        );
    }

    #[test]
    fn tick_update_serializes_self_under_reserved_key() {
        let data = TickUpdateData {
            tick: 3,
            self_view: SelfView {
                id: ActorId::from_raw(1),
                name: "Wren".to_owned(),
                role: Role::Merchant,
                position: Position::new(500.0, 500.0),
                destination: None,
                status: ActorStatus::Idle,
                health: 80,
                max_health: 80,
                attack: 5,
                defense: 3,
                speed: 5.0,
                vision_radius: 100.0,
                gold: 0,
                inventory: BTreeMap::new(),
                equipment: Equipment::default(),
                alliance: None,
                kills: 0,
                monster_eats: 0,
                evolution_stage: 1,
                action_cooldown: 0,
                is_alive: true,
            },
            nearby: NearbyView::default(),
            messages: Vec::new(),
            events: Vec::new(),
        };
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("self").is_some());
        assert!(json.get("selfView").is_none());
    }
}
