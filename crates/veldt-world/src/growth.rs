//! Resource lifecycle processing: sapling growth and attachment hygiene.
//!
//! Runs once per tick, after combat resolution. Saplings whose growth timer
//! has elapsed become full trees; gather attachments whose actor or node no
//! longer qualifies are swept so neither side stays wedged.

use veldt_types::{ActorStatus, EntityRef, ResourceKind, ResourceState, WorldEventKind};

use crate::world::WorldState;

/// Advance resource lifecycles for one tick.
pub fn resource_tick(world: &mut WorldState) {
    grow_saplings(world);
    sweep_stale_attachments(world);
}

/// Transform every sapling whose growth timer has elapsed into a tree.
fn grow_saplings(world: &mut WorldState) {
    let tick = world.tick;
    let ready: Vec<veldt_types::ResourceId> = world
        .resources
        .values()
        .filter(|node| {
            node.kind == ResourceKind::Sapling
                && node
                    .growth_complete_tick
                    .is_some_and(|complete| complete <= tick)
        })
        .map(|node| node.id)
        .collect();

    for id in ready {
        if let Some(node) = world.resources.get_mut(&id) {
            node.kind = ResourceKind::Tree;
            node.remaining = node.max_capacity;
            node.state = ResourceState::Available;
            node.growth_start_tick = None;
            node.growth_complete_tick = None;
        }
        world.mark_dirty(EntityRef::Resource(id));
        world.emit(WorldEventKind::TreeGrown { resource: id });
        tracing::debug!(tick, resource = %id, "Sapling grew into a tree");
    }
}

/// Cancel gather attachments whose actor or node no longer matches, and
/// release nodes left in `BeingGathered` with no live gatherer.
fn sweep_stale_attachments(world: &mut WorldState) {
    let stale: Vec<veldt_types::ActorId> = world
        .gathering
        .iter()
        .filter(|(actor_id, attachment)| {
            let actor_ok = world
                .actors
                .get(actor_id)
                .is_some_and(|actor| actor.is_alive && actor.status == ActorStatus::Gathering);
            let node_ok = world
                .resources
                .get(&attachment.resource)
                .is_some_and(|node| node.state == ResourceState::BeingGathered);
            !(actor_ok && node_ok)
        })
        .map(|(actor_id, _)| *actor_id)
        .collect();

    for actor_id in stale {
        let Some(attachment) = world.gathering.remove(&actor_id) else {
            continue;
        };
        // Return a still-stocked node to the world.
        if let Some(node) = world.resources.get_mut(&attachment.resource)
            && node.state == ResourceState::BeingGathered
        {
            node.state = if node.remaining == 0 {
                ResourceState::Depleted
            } else {
                ResourceState::Available
            };
            world.mark_dirty(EntityRef::Resource(attachment.resource));
        }
        // Stand the actor back up if the attachment died under it.
        if let Some(actor) = world.actors.get_mut(&actor_id)
            && actor.is_alive
            && actor.status == ActorStatus::Gathering
        {
            actor.status = ActorStatus::Idle;
            world.mark_dirty(EntityRef::Actor(actor_id));
        }
    }
}
