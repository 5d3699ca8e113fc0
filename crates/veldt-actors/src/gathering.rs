//! Continuous gathering: cadence-based payouts and depletion.
//!
//! Trees pay 1 log every third tick since the gather began; gold veins pay
//! up to 5 gold every second tick. Depletion returns the actor to idle and,
//! for trees, rolls the 30% seed drop with a draw keyed by
//! `(resource_id, tick)` so the roll is independent of everything else the
//! PRNG did this tick.

use veldt_types::{
    ActorId, ActorStatus, EntityRef, ResourceKind, ResourceState, WorldEventKind,
};
use veldt_world::constants::{
    GOLD_GATHER_TICKS, GOLD_PER_CYCLE, ITEM_TREE_SEED, ITEM_WOOD, SEED_DROP_PERCENT,
    TREE_GATHER_TICKS,
};
use veldt_world::{WorldState, keyed_draw};

/// Advance all gather attachments for one tick.
pub fn gathering_tick(world: &mut WorldState) {
    let tick = world.tick;
    let attachments: Vec<(ActorId, veldt_types::ResourceId, u64)> = world
        .gathering
        .iter()
        .map(|(actor, attachment)| (*actor, attachment.resource, attachment.start_tick))
        .collect();

    for (actor_id, resource_id, start_tick) in attachments {
        let Some(node) = world.resources.get(&resource_id) else {
            continue;
        };
        if node.state != ResourceState::BeingGathered {
            continue;
        }
        let interval = match node.kind {
            ResourceKind::Tree => TREE_GATHER_TICKS,
            ResourceKind::GoldVein => GOLD_GATHER_TICKS,
            // Saplings are never gatherable; the sweep will detach.
            ResourceKind::Sapling => continue,
        };
        let elapsed = tick.saturating_sub(start_tick);
        if elapsed == 0 || elapsed.checked_rem(interval) != Some(0) {
            continue;
        }

        match node.kind {
            ResourceKind::Tree => payout_tree(world, actor_id, resource_id),
            ResourceKind::GoldVein => payout_vein(world, actor_id, resource_id),
            ResourceKind::Sapling => {}
        }
    }
}

/// One tree cycle: a single log, then the depletion check.
fn payout_tree(world: &mut WorldState, actor_id: ActorId, resource_id: veldt_types::ResourceId) {
    let Some(node) = world.resources.get_mut(&resource_id) else {
        return;
    };
    node.remaining = node.remaining.saturating_sub(1);
    let depleted = node.remaining == 0;
    world.mark_dirty(EntityRef::Resource(resource_id));
    world.credit_item(actor_id, ITEM_WOOD, 1);
    world.emit(WorldEventKind::ResourceGathered {
        actor: actor_id,
        resource: resource_id,
        item: ITEM_WOOD.to_owned(),
        amount: 1,
    });

    if depleted {
        // Trees roll a seed drop on depletion, keyed so replays agree.
        let roll = keyed_draw(world.seed, resource_id.into_inner(), world.tick)
            .checked_rem(100)
            .unwrap_or(0);
        if roll < SEED_DROP_PERCENT {
            world.credit_item(actor_id, ITEM_TREE_SEED, 1);
        }
        finish_depletion(world, actor_id, resource_id);
    }
}

/// One vein cycle: up to five gold, then the depletion check.
fn payout_vein(world: &mut WorldState, actor_id: ActorId, resource_id: veldt_types::ResourceId) {
    let Some(node) = world.resources.get_mut(&resource_id) else {
        return;
    };
    let take = GOLD_PER_CYCLE.min(node.remaining);
    if take == 0 {
        finish_depletion(world, actor_id, resource_id);
        return;
    }
    node.remaining = node.remaining.saturating_sub(take);
    let depleted = node.remaining == 0;
    world.mark_dirty(EntityRef::Resource(resource_id));

    if let Some(actor) = world.actors.get_mut(&actor_id) {
        actor.gold = actor.gold.saturating_add(u64::from(take));
        world.mark_dirty(EntityRef::Actor(actor_id));
    }
    world.emit(WorldEventKind::ResourceGathered {
        actor: actor_id,
        resource: resource_id,
        item: "gold".to_owned(),
        amount: take,
    });

    if depleted {
        finish_depletion(world, actor_id, resource_id);
    }
}

/// Mark the node depleted, detach the gatherer, and stand them back up.
fn finish_depletion(
    world: &mut WorldState,
    actor_id: ActorId,
    resource_id: veldt_types::ResourceId,
) {
    if let Some(node) = world.resources.get_mut(&resource_id) {
        node.state = ResourceState::Depleted;
        world.mark_dirty(EntityRef::Resource(resource_id));
    }
    world.emit(WorldEventKind::ResourceDepleted {
        resource: resource_id,
    });
    world.gathering.remove(&actor_id);
    if let Some(actor) = world.actors.get_mut(&actor_id)
        && actor.is_alive
        && actor.status == ActorStatus::Gathering
    {
        actor.status = ActorStatus::Idle;
        world.mark_dirty(EntityRef::Actor(actor_id));
    }
}
