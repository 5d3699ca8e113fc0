//! Continuous movement: step every moving actor toward its destination.

use veldt_types::{ActorId, ActorStatus, EntityRef, Position};
use veldt_world::WorldState;

/// Advance movement for one tick.
///
/// Each actor with a destination steps by `min(speed, remaining)`. Arrival
/// clears the destination and returns the actor to idle.
pub fn movement_tick(world: &mut WorldState) {
    let movers: Vec<(ActorId, Position, Position, f64)> = world
        .actors
        .values()
        .filter(|actor| actor.is_alive && actor.status == ActorStatus::Moving)
        .filter_map(|actor| {
            actor
                .destination
                .map(|destination| (actor.id, actor.position, destination, actor.stats.speed))
        })
        .collect();

    for (id, position, destination, speed) in movers {
        let (next, arrived) = position.step_toward(&destination, speed);
        world.move_actor(id, next);
        if arrived
            && let Some(actor) = world.actors.get_mut(&id)
        {
            actor.destination = None;
            actor.status = ActorStatus::Idle;
            world.mark_dirty(EntityRef::Actor(id));
        }
    }
}
