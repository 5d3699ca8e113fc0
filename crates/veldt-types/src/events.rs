//! World events emitted by the tick pipeline.
//!
//! Events are appended to the world's tick buffer as processors run, carried
//! on the tick result, filtered per actor by the broadcaster, written to the
//! event log by persistence, and cleared at tick end. One tagged enum with a
//! typed payload per event kind keeps the filtering and the log schema in
//! one place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{ActorId, BehemothId, EntityRef, EventId, NpcId, ResourceId, TradeId};
use crate::structs::{Combatant, ItemId};

/// A single world event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldEvent {
    /// Unique identifier.
    pub id: EventId,
    /// Tick the event occurred on.
    pub tick: u64,
    /// The typed payload.
    #[serde(flatten)]
    pub kind: WorldEventKind,
}

/// The payload of a world event, tagged by `event` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "event", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum WorldEventKind {
    /// One hit of combat damage landed.
    CombatHit {
        /// The attacking combatant.
        attacker: Combatant,
        /// The defending combatant.
        target: Combatant,
        /// Damage dealt, at least 1.
        damage: u32,
        /// The defender's health after the hit.
        target_health: u32,
    },
    /// A combatant died.
    Death {
        /// The deceased.
        victim: Combatant,
        /// The killer, if attributable.
        killer: Option<Combatant>,
        /// Gold dropped to the killer.
        dropped_gold: u64,
        /// Items dropped to the killer.
        dropped_items: BTreeMap<ItemId, u32>,
    },
    /// A gather cycle paid out.
    ResourceGathered {
        /// The gathering actor.
        actor: ActorId,
        /// The node gathered from.
        resource: ResourceId,
        /// The item credited (`wood`, or empty for gold payouts).
        item: ItemId,
        /// Units credited this cycle.
        amount: u32,
    },
    /// A node hit zero remaining.
    ResourceDepleted {
        /// The depleted node.
        resource: ResourceId,
    },
    /// A sapling finished growing into a tree.
    TreeGrown {
        /// The grown node.
        resource: ResourceId,
    },
    /// A dead merchant or fighter returned to the spawn point.
    Respawn {
        /// The respawned actor.
        actor: ActorId,
    },
    /// A behemoth was knocked out.
    BehemothKnockout {
        /// The knocked-out behemoth.
        behemoth: BehemothId,
    },
    /// A behemoth woke up, throwing off its climbers.
    BehemothWake {
        /// The waking behemoth.
        behemoth: BehemothId,
        /// Actors thrown off during the wake.
        thrown_off: Vec<ActorId>,
    },
    /// A climber extracted ore from an unconscious behemoth.
    BehemothMined {
        /// The mined behemoth.
        behemoth: BehemothId,
        /// The mining actor.
        actor: ActorId,
        /// The ore item credited.
        item: ItemId,
        /// Units credited.
        amount: u32,
    },
    /// The population spawner placed a new NPC.
    NpcSpawn {
        /// The new NPC.
        npc: NpcId,
        /// Its template name.
        template: String,
    },
    /// A monster actor consumed a kill.
    MonsterEat {
        /// The eating monster actor.
        eater: ActorId,
        /// What was eaten.
        eaten: Combatant,
    },
    /// A monster actor advanced an evolution stage.
    Evolution {
        /// The evolving actor.
        actor: ActorId,
        /// Stage before.
        from_stage: u32,
        /// Stage after.
        to_stage: u32,
    },
    /// A crafting job finished.
    CraftComplete {
        /// The crafting actor.
        actor: ActorId,
        /// The completed recipe id.
        recipe: String,
        /// The produced item.
        item: ItemId,
    },
    /// A pending trade timed out.
    TradeExpired {
        /// The expired trade.
        trade: TradeId,
        /// The proposing actor.
        seller: ActorId,
        /// The counterparty.
        buyer: ActorId,
    },
    /// An alliance was founded.
    AllianceFormed {
        /// The alliance name.
        name: String,
        /// The founding actor.
        founder: ActorId,
    },
    /// An actor joined an alliance.
    AllianceJoined {
        /// The alliance name.
        name: String,
        /// The joining actor.
        actor: ActorId,
    },
    /// An actor left an alliance.
    AllianceLeft {
        /// The alliance name.
        name: String,
        /// The leaving actor.
        actor: ActorId,
        /// Whether the departure dissolved the alliance.
        dissolved: bool,
    },
    /// An inspect result, visible only to the inspecting actor.
    Inspect {
        /// The inspecting actor.
        actor: ActorId,
        /// The inspected entity.
        target: EntityRef,
        /// Public details of the inspected entity.
        details: serde_json::Value,
    },
}

impl From<Combatant> for EntityRef {
    fn from(combatant: Combatant) -> Self {
        match combatant {
            Combatant::Actor(id) => Self::Actor(id),
            Combatant::Npc(id) => Self::Npc(id),
            Combatant::Behemoth(id) => Self::Behemoth(id),
        }
    }
}

impl WorldEventKind {
    /// Every entity the event names, for the broadcaster's vision filter.
    pub fn participants(&self) -> Vec<EntityRef> {
        match self {
            Self::CombatHit {
                attacker, target, ..
            } => vec![EntityRef::from(*attacker), EntityRef::from(*target)],
            Self::Death { victim, killer, .. } => {
                let mut refs = vec![EntityRef::from(*victim)];
                if let Some(killer) = killer {
                    refs.push(EntityRef::from(*killer));
                }
                refs
            }
            Self::ResourceGathered {
                actor, resource, ..
            } => vec![EntityRef::Actor(*actor), EntityRef::Resource(*resource)],
            Self::ResourceDepleted { resource } | Self::TreeGrown { resource } => {
                vec![EntityRef::Resource(*resource)]
            }
            Self::Respawn { actor } => vec![EntityRef::Actor(*actor)],
            Self::BehemothKnockout { behemoth } => vec![EntityRef::Behemoth(*behemoth)],
            Self::BehemothWake {
                behemoth,
                thrown_off,
            } => {
                let mut refs = vec![EntityRef::Behemoth(*behemoth)];
                refs.extend(thrown_off.iter().map(|id| EntityRef::Actor(*id)));
                refs
            }
            Self::BehemothMined {
                behemoth, actor, ..
            } => vec![EntityRef::Behemoth(*behemoth), EntityRef::Actor(*actor)],
            Self::NpcSpawn { npc, .. } => vec![EntityRef::Npc(*npc)],
            Self::MonsterEat { eater, eaten } => {
                vec![EntityRef::Actor(*eater), EntityRef::from(*eaten)]
            }
            Self::Evolution { actor, .. } | Self::CraftComplete { actor, .. } => {
                vec![EntityRef::Actor(*actor)]
            }
            Self::TradeExpired { seller, buyer, .. } => {
                vec![EntityRef::Actor(*seller), EntityRef::Actor(*buyer)]
            }
            Self::AllianceFormed { founder, .. } => vec![EntityRef::Actor(*founder)],
            Self::AllianceJoined { actor, .. } | Self::AllianceLeft { actor, .. } => {
                vec![EntityRef::Actor(*actor)]
            }
            Self::Inspect { actor, target, .. } => {
                vec![EntityRef::Actor(*actor), *target]
            }
        }
    }

    /// If set, the event is delivered to exactly this actor and nobody else.
    pub const fn private_to(&self) -> Option<ActorId> {
        match self {
            Self::Inspect { actor, .. } => Some(*actor),
            _ => None,
        }
    }
}
