//! Combat pairs and the per-tick damage resolver.
//!
//! An attack action (or an NPC entering attack behavior) attaches a combat
//! pair; the resolver then deals damage every tick until either side dies,
//! the pair separates beyond attack range, or one reference vanishes.
//! Resolution order within a tick: all attacker hits first for a pair, then
//! the defender's counter. Pairs resolve in attachment order.

use veldt_types::structs::Combatant;
use veldt_types::{ActorStatus, CombatPair, EntityRef, Role, WorldEventKind};
use veldt_world::WorldState;
use veldt_world::constants::ATTACK_RANGE;

use crate::{crafting, death};

/// Attach an active combat pair, deduplicating per combatant pair.
///
/// Deduplication ignores orientation: once A and B are attached, B
/// "attacking back" does not add a second pair (the existing pair's
/// counter-attack already covers the return damage).
///
/// An actor attacker is also flipped to fighting status.
pub fn attach_pair(world: &mut WorldState, attacker: Combatant, target: Combatant) {
    let duplicate = world.combat_pairs.iter().any(|pair| {
        pair.active
            && ((pair.attacker == attacker && pair.target == target)
                || (pair.attacker == target && pair.target == attacker))
    });
    if !duplicate {
        let start_tick = world.tick;
        world.combat_pairs.push(CombatPair {
            attacker,
            target,
            start_tick,
            active: true,
        });
    }
    if let Combatant::Actor(actor_id) = attacker
        && let Some(actor) = world.actors.get_mut(&actor_id)
        && actor.is_alive
    {
        actor.status = ActorStatus::Fighting;
        world.mark_dirty(EntityRef::Actor(actor_id));
    }
}

/// Attack stat after equipment.
pub fn effective_attack(world: &WorldState, combatant: Combatant) -> u32 {
    match combatant {
        Combatant::Actor(id) => world.actors.get(&id).map_or(0, |actor| {
            let bonus = actor
                .equipment
                .weapon
                .as_deref()
                .and_then(crafting::weapon_bonus)
                .unwrap_or(0);
            actor.stats.attack.saturating_add(bonus)
        }),
        Combatant::Npc(id) => world.npcs.get(&id).map_or(0, |npc| npc.stats.attack),
        Combatant::Behemoth(id) => world
            .behemoths
            .get(&id)
            .map_or(0, |behemoth| behemoth.stats.attack),
    }
}

/// Defense stat after equipment.
pub fn effective_defense(world: &WorldState, combatant: Combatant) -> u32 {
    match combatant {
        Combatant::Actor(id) => world.actors.get(&id).map_or(0, |actor| {
            let bonus = actor
                .equipment
                .armor
                .as_deref()
                .and_then(crafting::armor_bonus)
                .unwrap_or(0);
            actor.stats.defense.saturating_add(bonus)
        }),
        Combatant::Npc(id) => world.npcs.get(&id).map_or(0, |npc| npc.stats.defense),
        Combatant::Behemoth(id) => world
            .behemoths
            .get(&id)
            .map_or(0, |behemoth| behemoth.stats.defense),
    }
}

/// Whether a combatant still exists and can fight.
fn is_alive(world: &WorldState, combatant: Combatant) -> bool {
    match combatant {
        Combatant::Actor(id) => world.actors.get(&id).is_some_and(|actor| actor.is_alive),
        // Dead NPCs are removed from the map outright.
        Combatant::Npc(id) => world.npcs.contains_key(&id),
        Combatant::Behemoth(id) => world
            .behemoths
            .get(&id)
            .is_some_and(|behemoth| behemoth.stats.health > 0),
    }
}

/// Subtract damage from a combatant. Returns health after the hit, or
/// `None` if the combatant vanished.
fn apply_damage(world: &mut WorldState, combatant: Combatant, damage: u32) -> Option<u32> {
    match combatant {
        Combatant::Actor(id) => {
            let actor = world.actors.get_mut(&id)?;
            actor.stats.health = actor.stats.health.saturating_sub(damage);
            let health = actor.stats.health;
            world.mark_dirty(EntityRef::Actor(id));
            Some(health)
        }
        Combatant::Npc(id) => {
            let npc = world.npcs.get_mut(&id)?;
            npc.stats.health = npc.stats.health.saturating_sub(damage);
            let health = npc.stats.health;
            world.mark_dirty(EntityRef::Npc(id));
            Some(health)
        }
        Combatant::Behemoth(id) => {
            let behemoth = world.behemoths.get_mut(&id)?;
            behemoth.stats.health = behemoth.stats.health.saturating_sub(damage);
            let health = behemoth.stats.health;
            world.mark_dirty(EntityRef::Behemoth(id));
            Some(health)
        }
    }
}

/// Deactivate a pair and stand its surviving actor endpoints back up.
fn deactivate(world: &mut WorldState, index: usize) {
    let Some(pair) = world.combat_pairs.get_mut(index) else {
        return;
    };
    pair.active = false;
    let endpoints = [pair.attacker, pair.target];
    for endpoint in endpoints {
        if let Combatant::Actor(actor_id) = endpoint
            && let Some(actor) = world.actors.get_mut(&actor_id)
            && actor.is_alive
            && actor.status == ActorStatus::Fighting
        {
            actor.status = ActorStatus::Idle;
            world.mark_dirty(EntityRef::Actor(actor_id));
        }
    }
}

/// Whether the defender strikes back. Merchants never counter; behemoths
/// are handled by their own processor and never counter here.
fn counters(world: &WorldState, defender: Combatant) -> bool {
    match defender {
        Combatant::Actor(id) => world
            .actors
            .get(&id)
            .is_some_and(|actor| actor.role == Role::Fighter),
        Combatant::Npc(_) => true,
        Combatant::Behemoth(_) => false,
    }
}

/// Resolve every active combat pair for one tick.
pub fn combat_tick(world: &mut WorldState) {
    let pair_count = world.combat_pairs.len();
    for index in 0..pair_count {
        let Some(pair) = world.combat_pairs.get(index).copied() else {
            continue;
        };
        if !pair.active {
            continue;
        }

        // Rule 1: either side dead or vanished.
        if !is_alive(world, pair.attacker) || !is_alive(world, pair.target) {
            deactivate(world, index);
            continue;
        }

        // Rule 2: separated beyond attack range.
        let distance = match (
            world.combatant_position(pair.attacker),
            world.combatant_position(pair.target),
        ) {
            (Some(a), Some(b)) => a.distance_to(&b),
            _ => {
                deactivate(world, index);
                continue;
            }
        };
        if distance > ATTACK_RANGE {
            deactivate(world, index);
            continue;
        }

        // Rule 3: attacker hit.
        let damage = effective_attack(world, pair.attacker)
            .saturating_sub(effective_defense(world, pair.target))
            .max(1);
        let Some(target_health) = apply_damage(world, pair.target, damage) else {
            deactivate(world, index);
            continue;
        };
        world.emit(WorldEventKind::CombatHit {
            attacker: pair.attacker,
            target: pair.target,
            damage,
            target_health,
        });

        // Rule 4: defender death (behemoth knockouts belong to the
        // behemoth processor).
        if target_health == 0 && !matches!(pair.target, Combatant::Behemoth(_)) {
            death::process_death(world, pair.target, Some(pair.attacker));
            deactivate(world, index);
            continue;
        }

        // Rule 5: counter-attack.
        if counters(world, pair.target) {
            let counter_damage = effective_attack(world, pair.target)
                .saturating_sub(effective_defense(world, pair.attacker))
                .max(1);
            let Some(attacker_health) = apply_damage(world, pair.attacker, counter_damage)
            else {
                continue;
            };
            world.emit(WorldEventKind::CombatHit {
                attacker: pair.target,
                target: pair.attacker,
                damage: counter_damage,
                target_health: attacker_health,
            });
            if attacker_health == 0 && !matches!(pair.attacker, Combatant::Behemoth(_)) {
                death::process_death(world, pair.attacker, Some(pair.target));
                deactivate(world, index);
            }
        }
    }
}

/// Drop deactivated pairs. Runs after resolution each tick.
pub fn sweep_inactive(world: &mut WorldState) {
    world.combat_pairs.retain(|pair| pair.active);
}

/// Deactivate any pair touching a combatant (used when an NPC disengages).
pub fn detach_combatant(world: &mut WorldState, combatant: Combatant) {
    let indices: Vec<usize> = world
        .combat_pairs
        .iter()
        .enumerate()
        .filter(|(_, pair)| {
            pair.active && (pair.attacker == combatant || pair.target == combatant)
        })
        .map(|(index, _)| index)
        .collect();
    for index in indices {
        deactivate(world, index);
    }
}
