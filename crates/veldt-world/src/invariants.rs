//! Post-tick invariant checks.
//!
//! These are the machine-checkable clauses of the engine's contract. The
//! integration suites run [`check`] after every tick; production code never
//! calls it on the hot path.

use veldt_types::{ActorStatus, BehemothStatus, EntityRef, ResourceKind, ResourceState, Role};

use crate::error::WorldError;
use crate::world::WorldState;

/// Collect every violated invariant as a human-readable description.
pub fn violations(world: &WorldState) -> Vec<String> {
    let mut found = Vec::new();

    for actor in world.actors.values() {
        if actor.stats.health > actor.stats.max_health {
            found.push(format!(
                "actor {} health {} exceeds max {}",
                actor.id, actor.stats.health, actor.stats.max_health
            ));
        }
        let dead = actor.status == ActorStatus::Dead;
        if dead == actor.is_alive {
            found.push(format!(
                "actor {} status {:?} disagrees with is_alive {}",
                actor.id, actor.status, actor.is_alive
            ));
        }
        if dead && actor.stats.health != 0 {
            found.push(format!(
                "dead actor {} has health {}",
                actor.id, actor.stats.health
            ));
        }
        if !dead && actor.stats.health == 0 {
            found.push(format!("living actor {} has zero health", actor.id));
        }
        match actor.role {
            Role::Monster => {
                if actor.respawn_tick.is_some() {
                    found.push(format!("monster actor {} has a respawn tick", actor.id));
                }
            }
            Role::Merchant | Role::Fighter => {
                if dead != actor.respawn_tick.is_some() {
                    found.push(format!(
                        "actor {} dead={dead} but respawn_tick={:?}",
                        actor.id, actor.respawn_tick
                    ));
                }
            }
        }
        if actor.alliance.as_ref().is_some_and(|name| {
            !world
                .alliances
                .get(name)
                .is_some_and(|alliance| alliance.members.contains(&actor.id))
        }) {
            found.push(format!(
                "actor {} claims alliance membership its alliance does not record",
                actor.id
            ));
        }
    }

    for node in world.resources.values() {
        if node.remaining > node.max_capacity {
            found.push(format!(
                "resource {} remaining {} exceeds capacity {}",
                node.id, node.remaining, node.max_capacity
            ));
        }
        if matches!(node.kind, ResourceKind::Tree | ResourceKind::GoldVein) {
            let depleted = node.state == ResourceState::Depleted;
            if depleted != (node.remaining == 0) {
                found.push(format!(
                    "resource {} state {:?} disagrees with remaining {}",
                    node.id, node.state, node.remaining
                ));
            }
        }
        if node.kind == ResourceKind::Sapling
            && (node.state != ResourceState::Growing
                || node.growth_start_tick.is_none()
                || node.growth_complete_tick.is_none())
        {
            found.push(format!("sapling {} missing growth bookkeeping", node.id));
        }
    }

    for behemoth in world.behemoths.values() {
        let knocked_out = behemoth.status == BehemothStatus::Unconscious;
        let timer_set = behemoth.unconscious_until_tick.is_some();
        let at_zero = behemoth.stats.health == 0;
        if knocked_out != (timer_set && at_zero) {
            found.push(format!(
                "behemoth {} status {:?}, health {}, wake timer {:?}",
                behemoth.id, behemoth.status, behemoth.stats.health, behemoth.unconscious_until_tick
            ));
        }
    }

    for alliance in world.alliances.values() {
        if alliance.members.is_empty() {
            found.push(format!("alliance {} has no members", alliance.name));
        }
        for member in &alliance.members {
            if !world
                .actors
                .get(member)
                .is_some_and(|actor| actor.alliance.as_deref() == Some(alliance.name.as_str()))
            {
                found.push(format!(
                    "alliance {} records member {member} who does not point back",
                    alliance.name
                ));
            }
        }
    }

    // Spatial index agreement: every indexed ref matches its entity, and
    // every positioned entity is indexed.
    for (entity, indexed) in world.spatial.iter() {
        let actual = match entity {
            EntityRef::Actor(id) => world.actors.get(id).map(|a| a.position),
            EntityRef::Resource(id) => world.resources.get(id).map(|r| r.position),
            EntityRef::Npc(id) => world.npcs.get(id).map(|n| n.position),
            EntityRef::Behemoth(id) => world.behemoths.get(id).map(|b| b.position),
            EntityRef::Structure(id) => world.structures.get(id).map(|s| s.position),
        };
        match actual {
            None => found.push(format!("spatial index holds vanished entity {entity:?}")),
            Some(position) if position.distance_to(indexed) > 1e-9 => {
                found.push(format!(
                    "spatial index position for {entity:?} drifted from entity position"
                ));
            }
            Some(_) => {}
        }
    }

    found
}

/// Return an error naming the first violated invariant, if any.
pub fn check(world: &WorldState) -> Result<(), WorldError> {
    match violations(world).into_iter().next() {
        None => Ok(()),
        Some(detail) => Err(WorldError::InvariantViolated { detail }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::seeder::seed_world;

    use super::*;

    #[test]
    fn freshly_seeded_world_is_clean() {
        let mut world = WorldState::new(42);
        seed_world(&mut world);
        assert_eq!(violations(&world), Vec::<String>::new());
        assert!(check(&world).is_ok());
    }

    #[test]
    fn overfull_resource_is_flagged() {
        let mut world = WorldState::new(42);
        seed_world(&mut world);
        if let Some(node) = world.resources.values_mut().next() {
            node.remaining = node.max_capacity.saturating_add(1);
        }
        assert!(check(&world).is_err());
    }

    #[test]
    fn stale_spatial_entry_is_flagged() {
        let mut world = WorldState::new(42);
        seed_world(&mut world);
        let id = *world.npcs.keys().next().unwrap();
        // Remove from the map without touching the index.
        world.npcs.remove(&id);
        assert!(
            violations(&world)
                .iter()
                .any(|v| v.contains("vanished"))
        );
    }
}
