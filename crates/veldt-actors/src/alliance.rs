//! Alliance membership maintenance.
//!
//! Alliances are keyed by name. The founder is just the first member; an
//! alliance lives exactly as long as it has members, and the last leaver
//! dissolves it.

use std::collections::BTreeSet;

use veldt_types::{ActorId, Alliance, EntityRef, WorldEventKind};
use veldt_world::WorldState;

/// Found a new alliance with the actor as sole member.
pub fn form(world: &mut WorldState, actor_id: ActorId, name: &str) {
    let tick = world.tick;
    // Validation already checked the name; re-check against same-tick races.
    if world.alliances.contains_key(name) {
        return;
    }
    let mut members = BTreeSet::new();
    members.insert(actor_id);
    world.alliances.insert(name.to_owned(), Alliance {
        name: name.to_owned(),
        founder: actor_id,
        members,
        created_at_tick: tick,
    });
    if let Some(actor) = world.actors.get_mut(&actor_id) {
        actor.alliance = Some(name.to_owned());
        world.mark_dirty(EntityRef::Actor(actor_id));
    }
    world.emit(WorldEventKind::AllianceFormed {
        name: name.to_owned(),
        founder: actor_id,
    });
}

/// Join an existing alliance.
pub fn join(world: &mut WorldState, actor_id: ActorId, name: &str) {
    let Some(alliance) = world.alliances.get_mut(name) else {
        return;
    };
    alliance.members.insert(actor_id);
    if let Some(actor) = world.actors.get_mut(&actor_id) {
        actor.alliance = Some(name.to_owned());
        world.mark_dirty(EntityRef::Actor(actor_id));
    }
    world.emit(WorldEventKind::AllianceJoined {
        name: name.to_owned(),
        actor: actor_id,
    });
}

/// Leave the current alliance, dissolving it if emptied.
pub fn leave(world: &mut WorldState, actor_id: ActorId) {
    let Some(name) = world
        .actors
        .get(&actor_id)
        .and_then(|actor| actor.alliance.clone())
    else {
        return;
    };

    let dissolved = match world.alliances.get_mut(&name) {
        Some(alliance) => {
            alliance.members.remove(&actor_id);
            alliance.members.is_empty()
        }
        None => false,
    };
    if dissolved {
        world.alliances.remove(&name);
    }

    if let Some(actor) = world.actors.get_mut(&actor_id) {
        actor.alliance = None;
        world.mark_dirty(EntityRef::Actor(actor_id));
    }
    world.emit(WorldEventKind::AllianceLeft {
        name,
        actor: actor_id,
        dissolved,
    });
}
