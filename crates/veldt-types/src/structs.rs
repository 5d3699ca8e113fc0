//! Core entity structs for the Veldt world.
//!
//! Everything in this module is owned by the world state and mutated only by
//! the tick pipeline. The structs are deliberately plain data: transition
//! logic lives in the processor crates, not here.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    ActorStatus, BehemothStatus, ChatMode, NpcBehavior, ResourceKind, ResourceState, Role,
    TradeStatus,
};
use crate::geometry::Position;
use crate::ids::{ActorId, BehemothId, CraftJobId, MessageId, NpcId, ResourceId, StructureId, TradeId};

/// An inventory item identifier (e.g. `wood`, `tree_seed`, `iron_ore`).
pub type ItemId = String;

// ---------------------------------------------------------------------------
// Combat stats
// ---------------------------------------------------------------------------

/// The combat block shared by actors, NPCs, and behemoths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CombatStats {
    /// Current health. `health == 0` iff the entity is down.
    pub health: u32,
    /// Health ceiling. `health <= max_health` always holds.
    pub max_health: u32,
    /// Base attack before equipment.
    pub attack: u32,
    /// Base defense before equipment.
    pub defense: u32,
    /// Movement speed in world units per tick.
    pub speed: f64,
    /// Fog-of-war radius in world units.
    pub vision_radius: f64,
}

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

/// The three equipment slots of an actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Equipment {
    /// Equipped weapon item, if any.
    pub weapon: Option<ItemId>,
    /// Equipped armor item, if any.
    pub armor: Option<ItemId>,
    /// Carried tool item, if any.
    pub tool: Option<ItemId>,
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// A persistent player entity.
///
/// Actors survive disconnects: the connection merely flips [`Actor::connected`],
/// and a later auth with the same name resumes this record with its role,
/// inventory, position, and health intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Actor {
    /// Unique identifier, stable across reconnects.
    pub id: ActorId,
    /// Display name, unique among connected actors.
    pub name: String,
    /// Permanent role.
    pub role: Role,
    /// Current position.
    pub position: Position,
    /// Movement target. Set iff `status == Moving`.
    pub destination: Option<Position>,
    /// Current activity.
    pub status: ActorStatus,
    /// Combat block.
    pub stats: CombatStats,
    /// Gold on hand.
    pub gold: u64,
    /// Inventory, ordered by item id for deterministic iteration.
    pub inventory: BTreeMap<ItemId, u32>,
    /// Equipment slots.
    pub equipment: Equipment,
    /// Alliance membership, if any.
    pub alliance: Option<String>,
    /// Lifetime kill count (drives monster evolution).
    pub kills: u32,
    /// Lifetime monster-eat count (drives monster evolution).
    pub monster_eats: u32,
    /// Evolution stage, 1..=4. Always 1 for non-monsters.
    pub evolution_stage: u32,
    /// Earliest tick at which the next action may execute.
    pub action_cooldown_until_tick: u64,
    /// Respawn tick. Set iff dead and role is merchant or fighter.
    pub respawn_tick: Option<u64>,
    /// Tick of the last executed action.
    pub last_action_tick: u64,
    /// Tick at which the actor first connected.
    pub connected_at_tick: u64,
    /// Liveness flag. `false` iff `status == Dead`.
    pub is_alive: bool,
    /// Whether a connection currently serves this actor.
    pub connected: bool,
}

impl Actor {
    /// Whether this actor is a human-role actor (merchant or fighter).
    ///
    /// NPC aggro and the population spawner only consider human roles.
    pub fn is_human_role(&self) -> bool {
        matches!(self.role, Role::Merchant | Role::Fighter)
    }
}

// ---------------------------------------------------------------------------
// Resource node
// ---------------------------------------------------------------------------

/// A gatherable resource node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceNode {
    /// Unique identifier.
    pub id: ResourceId,
    /// Node kind.
    pub kind: ResourceKind,
    /// Fixed position.
    pub position: Position,
    /// Units remaining. `0 <= remaining <= max_capacity`.
    pub remaining: u32,
    /// Capacity ceiling.
    pub max_capacity: u32,
    /// Lifecycle state. `Depleted` iff `remaining == 0` for trees and veins.
    pub state: ResourceState,
    /// Sapling only: tick growth started.
    pub growth_start_tick: Option<u64>,
    /// Sapling only: tick the sapling becomes a tree.
    pub growth_complete_tick: Option<u64>,
}

// ---------------------------------------------------------------------------
// NPC monster
// ---------------------------------------------------------------------------

/// A server-driven monster with scripted behavior and no connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NpcMonster {
    /// Unique identifier.
    pub id: NpcId,
    /// Template name (e.g. `wolf`).
    pub template: String,
    /// Current position.
    pub position: Position,
    /// Combat block.
    pub stats: CombatStats,
    /// Behavior state.
    pub behavior: NpcBehavior,
    /// Center of the patrol area.
    pub patrol_origin: Position,
    /// Patrol radius around the origin.
    pub patrol_radius: f64,
    /// Chase/attack target. Set iff behavior is `Chase` or `Attack`.
    pub target: Option<ActorId>,
    /// Gold awarded to the killer.
    pub gold_drop: u64,
}

// ---------------------------------------------------------------------------
// Behemoth
// ---------------------------------------------------------------------------

/// A large neutral creature on a fixed route with a feed/knockout/mine cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Behemoth {
    /// Unique identifier.
    pub id: BehemothId,
    /// Type name (e.g. `ironhide`); determines the ore kind.
    pub kind: String,
    /// Item id of the ore this behemoth grows.
    pub ore_item: ItemId,
    /// Current position.
    pub position: Position,
    /// Combat block. Behemoths never move faster than their route speed,
    /// so `speed` here is the route speed.
    pub stats: CombatStats,
    /// Lifecycle state.
    pub status: BehemothStatus,
    /// Ore currently minable by climbers.
    pub ore_amount: u32,
    /// Ore ceiling for this type.
    pub ore_max: u32,
    /// Total feed received since the last wake.
    pub fed_amount: u32,
    /// Tick the ore-growth timer elapses. Armed once when `fed_amount`
    /// first reaches the feed threshold; never re-armed.
    pub ore_growth_ready_at: Option<u64>,
    /// Tick the behemoth wakes. Set iff `status == Unconscious`.
    pub unconscious_until_tick: Option<u64>,
    /// Waypoint route. Empty route means stationary.
    pub route: Vec<Position>,
    /// Index of the waypoint currently being approached.
    pub current_waypoint: usize,
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

/// A built structure on the world plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Structure {
    /// Unique identifier.
    pub id: StructureId,
    /// Structure type name.
    pub kind: String,
    /// Fixed position.
    pub position: Position,
    /// Owning actor.
    pub owner: ActorId,
    /// Alliance the structure is registered to, if any.
    pub alliance: Option<String>,
}

// ---------------------------------------------------------------------------
// Alliance
// ---------------------------------------------------------------------------

/// A named group of actors. The name is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Alliance {
    /// Unique alliance name.
    pub name: String,
    /// The actor who formed the alliance.
    pub founder: ActorId,
    /// Member set. Never empty: the last leaver dissolves the alliance.
    pub members: BTreeSet<ActorId>,
    /// Tick the alliance was formed.
    pub created_at_tick: u64,
}

// ---------------------------------------------------------------------------
// Trades
// ---------------------------------------------------------------------------

/// A bundle of gold and items, used for trade offers and recipe inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ItemBundle {
    /// Gold component.
    pub gold: u64,
    /// Item components, ordered by item id.
    pub items: BTreeMap<ItemId, u32>,
}

impl ItemBundle {
    /// Whether the bundle contains nothing at all.
    pub fn is_empty(&self) -> bool {
        self.gold == 0 && self.items.values().all(|quantity| *quantity == 0)
    }
}

/// A proposed exchange between two actors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Trade {
    /// Unique identifier.
    pub id: TradeId,
    /// The proposing actor (gives `offered`).
    pub seller: ActorId,
    /// The counterparty (asked for `requested`).
    pub buyer: ActorId,
    /// What the seller offers. Never escrowed.
    pub offered: ItemBundle,
    /// What the seller asks for.
    pub requested: ItemBundle,
    /// Lifecycle state.
    pub status: TradeStatus,
    /// Tick the trade was proposed.
    pub created_at_tick: u64,
    /// Tick the trade left `Pending`, if it has.
    pub resolved_at_tick: Option<u64>,
}

// ---------------------------------------------------------------------------
// Crafting
// ---------------------------------------------------------------------------

/// An in-flight crafting job. Inputs are consumed when the job starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CraftingJob {
    /// Unique identifier.
    pub id: CraftJobId,
    /// The crafting actor.
    pub actor: ActorId,
    /// Recipe being crafted.
    pub recipe: String,
    /// Tick the job started.
    pub start_tick: u64,
    /// Tick the output is produced.
    pub complete_tick: u64,
}

/// A crafting recipe: consumed inputs, craft time, and the produced item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Recipe {
    /// Recipe identifier (doubles as the output item id).
    pub id: String,
    /// Inputs consumed when the job starts.
    pub inputs: ItemBundle,
    /// Ticks from start to completion.
    pub craft_ticks: u64,
    /// Equipment slot the output occupies, if equippable.
    pub slot: Option<crate::enums::EquipSlot>,
    /// Attack or defense bonus granted while equipped.
    pub bonus: u32,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// Who receives a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ChatRecipients {
    /// Every connected actor.
    All,
    /// An explicit recipient set.
    Ids(BTreeSet<ActorId>),
}

impl ChatRecipients {
    /// Whether the given actor is a recipient.
    pub fn includes(&self, actor: ActorId) -> bool {
        match self {
            Self::All => true,
            Self::Ids(ids) => ids.contains(&actor),
        }
    }
}

/// A chat message, alive for exactly one tick.
///
/// Messages are appended to the world's tick buffer during the batch phase
/// and cleared after broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChatMessage {
    /// Unique identifier.
    pub id: MessageId,
    /// Tick the message was sent.
    pub tick: u64,
    /// The sending actor.
    pub sender_id: ActorId,
    /// The sender's display name at send time.
    pub sender_name: String,
    /// Delivery mode.
    pub mode: ChatMode,
    /// Message body.
    pub content: String,
    /// Whisper target, if any.
    pub target_id: Option<ActorId>,
    /// The sender's position at send time (fixes the local radius).
    pub sender_position: Position,
    /// Resolved recipient set.
    pub recipients: ChatRecipients,
}

// ---------------------------------------------------------------------------
// Combat pairs
// ---------------------------------------------------------------------------

/// Any entity that can appear on either end of a combat pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Combatant {
    /// A player actor.
    Actor(ActorId),
    /// An NPC monster.
    Npc(NpcId),
    /// A behemoth (target only; behemoths never initiate).
    Behemoth(BehemothId),
}

/// A persistent attacker/target attachment, resolved each tick until
/// deactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CombatPair {
    /// The attacking combatant.
    pub attacker: Combatant,
    /// The defending combatant.
    pub target: Combatant,
    /// Tick the pair was attached.
    pub start_tick: u64,
    /// Whether the pair still resolves. Inactive pairs are swept at tick end.
    pub active: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn chat_recipients_all_includes_everyone() {
        let recipients = ChatRecipients::All;
        assert!(recipients.includes(ActorId::from_raw(99)));
    }

    #[test]
    fn chat_recipients_ids_are_exact() {
        let mut ids = BTreeSet::new();
        ids.insert(ActorId::from_raw(1));
        let recipients = ChatRecipients::Ids(ids);
        assert!(recipients.includes(ActorId::from_raw(1)));
        assert!(!recipients.includes(ActorId::from_raw(2)));
    }

    #[test]
    fn empty_bundle_is_empty() {
        assert!(ItemBundle::default().is_empty());
        let bundle = ItemBundle {
            gold: 5,
            items: BTreeMap::new(),
        };
        assert!(!bundle.is_empty());
    }

    #[test]
    fn human_role_excludes_monsters() {
        let mut actor = test_actor();
        assert!(actor.is_human_role());
        actor.role = Role::Monster;
        assert!(!actor.is_human_role());
    }

    fn test_actor() -> Actor {
        Actor {
            id: ActorId::from_raw(1),
            name: "Tamsin".to_owned(),
            role: Role::Fighter,
            position: Position::new(500.0, 500.0),
            destination: None,
            status: ActorStatus::Idle,
            stats: CombatStats {
                health: 100,
                max_health: 100,
                attack: 15,
                defense: 10,
                speed: 5.0,
                vision_radius: 100.0,
            },
            gold: 0,
            inventory: BTreeMap::new(),
            equipment: Equipment::default(),
            alliance: None,
            kills: 0,
            monster_eats: 0,
            evolution_stage: 1,
            action_cooldown_until_tick: 0,
            respawn_tick: None,
            last_action_tick: 0,
            connected_at_tick: 0,
            is_alive: true,
            connected: true,
        }
    }
}
