//! Per-actor fog-of-war view assembly.
//!
//! After all mutation for a tick is complete, the broadcaster reads the
//! world once per connected actor and builds a personalized payload: the
//! actor's full private view, everything within its vision radius as
//! public views, the chat addressed to it, and the events that touch it
//! or its surroundings. Nothing private ever crosses into another actor's
//! payload -- the view types in `veldt-types` make that structural.

use std::collections::BTreeMap;

use veldt_types::{
    Actor, ActorId, BehemothView, EntityRef, MessageView, NearbyView, NpcView, Position,
    PublicActorView, ResourceView, SelfView, StructureView, TickUpdateData, WorldEvent,
};
use veldt_world::WorldState;

/// Build the payload for every connected actor.
pub fn build_all(world: &WorldState) -> BTreeMap<ActorId, TickUpdateData> {
    world
        .actors
        .values()
        .filter(|actor| actor.connected)
        .map(|actor| (actor.id, build_update(world, actor)))
        .collect()
}

/// Build one actor's personalized tick payload.
pub fn build_update(world: &WorldState, actor: &Actor) -> TickUpdateData {
    TickUpdateData {
        tick: world.tick,
        self_view: self_view(world, actor),
        nearby: nearby_view(world, actor),
        messages: messages_for(world, actor.id),
        events: events_for(world, actor),
    }
}

/// The actor's own private view.
fn self_view(world: &WorldState, actor: &Actor) -> SelfView {
    SelfView {
        id: actor.id,
        name: actor.name.clone(),
        role: actor.role,
        position: actor.position,
        destination: actor.destination,
        status: actor.status,
        health: actor.stats.health,
        max_health: actor.stats.max_health,
        attack: actor.stats.attack,
        defense: actor.stats.defense,
        speed: actor.stats.speed,
        vision_radius: actor.stats.vision_radius,
        gold: actor.gold,
        inventory: actor.inventory.clone(),
        equipment: actor.equipment.clone(),
        alliance: actor.alliance.clone(),
        kills: actor.kills,
        monster_eats: actor.monster_eats,
        evolution_stage: actor.evolution_stage,
        action_cooldown: actor
            .action_cooldown_until_tick
            .saturating_sub(world.tick),
        is_alive: actor.is_alive,
    }
}

/// Everything within vision, partitioned by entity kind.
///
/// The querying actor itself is never included.
fn nearby_view(world: &WorldState, actor: &Actor) -> NearbyView {
    let mut nearby = NearbyView::default();
    let mut found = world
        .spatial
        .in_radius(&actor.position, actor.stats.vision_radius);
    // Radius results are unordered; sort for payload determinism.
    found.sort_unstable();

    for entity in found {
        match entity {
            EntityRef::Actor(id) => {
                if id == actor.id {
                    continue;
                }
                if let Some(other) = world.actors.get(&id) {
                    nearby.actors.push(PublicActorView {
                        id: other.id,
                        name: other.name.clone(),
                        role: other.role,
                        position: other.position,
                        status: other.status,
                        health: other.stats.health,
                        max_health: other.stats.max_health,
                        alliance: other.alliance.clone(),
                        evolution_stage: other.evolution_stage,
                    });
                }
            }
            EntityRef::Resource(id) => {
                if let Some(node) = world.resources.get(&id) {
                    nearby.resources.push(ResourceView {
                        id: node.id,
                        kind: node.kind,
                        position: node.position,
                        remaining: node.remaining,
                        max_capacity: node.max_capacity,
                        state: node.state,
                    });
                }
            }
            EntityRef::Npc(id) => {
                if let Some(npc) = world.npcs.get(&id) {
                    nearby.npcs.push(NpcView {
                        id: npc.id,
                        template: npc.template.clone(),
                        position: npc.position,
                        health: npc.stats.health,
                        max_health: npc.stats.max_health,
                        behavior: npc.behavior,
                        is_npc: true,
                    });
                }
            }
            EntityRef::Behemoth(id) => {
                if let Some(behemoth) = world.behemoths.get(&id) {
                    nearby.behemoths.push(BehemothView {
                        id: behemoth.id,
                        kind: behemoth.kind.clone(),
                        position: behemoth.position,
                        health: behemoth.stats.health,
                        max_health: behemoth.stats.max_health,
                        status: behemoth.status,
                        ore_available: behemoth.ore_amount > 0,
                        unconscious_ticks_remaining: behemoth
                            .unconscious_until_tick
                            .map_or(0, |until| until.saturating_sub(world.tick)),
                    });
                }
            }
            EntityRef::Structure(id) => {
                if let Some(structure) = world.structures.get(&id) {
                    nearby.structures.push(StructureView {
                        id: structure.id,
                        kind: structure.kind.clone(),
                        position: structure.position,
                        owner: structure.owner,
                        alliance: structure.alliance.clone(),
                    });
                }
            }
        }
    }
    nearby
}

/// The tick's chat messages addressed to this actor.
fn messages_for(world: &WorldState, actor_id: ActorId) -> Vec<MessageView> {
    world
        .tick_messages
        .iter()
        .filter(|message| message.recipients.includes(actor_id))
        .map(|message| MessageView {
            id: message.id,
            tick: message.tick,
            sender_id: message.sender_id,
            sender_name: message.sender_name.clone(),
            mode: message.mode,
            content: message.content.clone(),
        })
        .collect()
}

/// The tick's events that touch this actor or entities within its vision.
fn events_for(world: &WorldState, actor: &Actor) -> Vec<WorldEvent> {
    world
        .tick_events
        .iter()
        .filter(|event| event_visible(world, actor, event))
        .cloned()
        .collect()
}

/// Visibility rule: private events go to their actor alone; otherwise the
/// actor must be a participant or have a participant within vision.
fn event_visible(world: &WorldState, actor: &Actor, event: &WorldEvent) -> bool {
    if let Some(owner) = event.kind.private_to() {
        return owner == actor.id;
    }
    let participants = event.kind.participants();
    if participants.contains(&EntityRef::Actor(actor.id)) {
        return true;
    }
    participants.iter().any(|participant| {
        entity_position(world, *participant).is_some_and(|position| {
            position.distance_to(&actor.position) <= actor.stats.vision_radius
        })
    })
}

/// The current position of any entity, if it still exists.
fn entity_position(world: &WorldState, entity: EntityRef) -> Option<Position> {
    match entity {
        EntityRef::Actor(id) => world.actors.get(&id).map(|a| a.position),
        EntityRef::Resource(id) => world.resources.get(&id).map(|r| r.position),
        EntityRef::Npc(id) => world.npcs.get(&id).map(|n| n.position),
        EntityRef::Behemoth(id) => world.behemoths.get(&id).map(|b| b.position),
        EntityRef::Structure(id) => world.structures.get(&id).map(|s| s.position),
    }
}
