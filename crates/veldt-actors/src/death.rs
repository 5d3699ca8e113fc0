//! The death protocol and respawn handling.
//!
//! Deaths route through [`process_death`] no matter what dealt the final
//! hit: combat resolution, a counter-attack, or a behemoth throw-off.
//! Monsters die for good; merchants and fighters lose a fifth of their
//! holdings and return to the spawn point after the respawn delay.

use std::collections::BTreeMap;

use veldt_types::structs::Combatant;
use veldt_types::{ActorId, ActorStatus, EntityRef, Role, WorldEventKind};
use veldt_world::WorldState;
use veldt_world::constants::{DEATH_DROP_PERCENT, RESPAWN_DELAY_TICKS, SPAWN_POINT};

use crate::evolution;

/// Apply the death protocol to a combatant that reached zero health.
pub fn process_death(world: &mut WorldState, victim: Combatant, killer: Option<Combatant>) {
    match victim {
        Combatant::Npc(id) => process_npc_death(world, id, killer),
        Combatant::Actor(id) => process_actor_death(world, id, killer),
        Combatant::Behemoth(id) => {
            // Behemoths are never killed, only knocked out; reaching this
            // arm is an implementation bug worth a log line.
            tracing::warn!(behemoth = %id, "death protocol invoked for a behemoth");
        }
    }
}

/// NPC death: award the gold drop, remove the NPC, feed monster killers.
fn process_npc_death(world: &mut WorldState, id: veldt_types::NpcId, killer: Option<Combatant>) {
    let Some(npc) = world.remove_npc(id) else {
        return;
    };
    let dropped_gold = npc.gold_drop;

    if let Some(Combatant::Actor(killer_id)) = killer
        && let Some(killer_actor) = world.actors.get_mut(&killer_id)
    {
        killer_actor.gold = killer_actor.gold.saturating_add(dropped_gold);
        world.mark_dirty(EntityRef::Actor(killer_id));
    }

    world.emit(WorldEventKind::Death {
        victim: Combatant::Npc(id),
        killer,
        dropped_gold,
        dropped_items: BTreeMap::new(),
    });

    if let Some(Combatant::Actor(killer_id)) = killer {
        credit_monster_kill(world, killer_id, Some((npc.stats.max_health, npc.stats.attack, npc.stats.defense, Combatant::Npc(id))));
    }
}

/// Actor death: permadeath for monsters, drop-and-respawn for humans.
fn process_actor_death(world: &mut WorldState, id: ActorId, killer: Option<Combatant>) {
    let tick = world.tick;
    let Some(victim) = world.actors.get(&id) else {
        return;
    };
    let role = victim.role;
    let victim_stats = victim.stats;

    let (dropped_gold, dropped_items) = match role {
        // Monsters drop everything they carried.
        Role::Monster => (victim.gold, BTreeMap::new()),
        // Humans drop a fifth of their gold and of each stack (floored).
        Role::Merchant | Role::Fighter => {
            let gold = victim
                .gold
                .saturating_mul(u64::from(DEATH_DROP_PERCENT))
                .checked_div(100)
                .unwrap_or(0);
            let items: BTreeMap<String, u32> = victim
                .inventory
                .iter()
                .filter_map(|(item, quantity)| {
                    let dropped = quantity
                        .saturating_mul(DEATH_DROP_PERCENT)
                        .checked_div(100)
                        .unwrap_or(0);
                    (dropped > 0).then(|| (item.clone(), dropped))
                })
                .collect();
            (gold, items)
        }
    };

    // Mutate the victim.
    if let Some(victim) = world.actors.get_mut(&id) {
        victim.gold = victim.gold.saturating_sub(dropped_gold);
        for (item, dropped) in &dropped_items {
            if let Some(held) = victim.inventory.get_mut(item) {
                *held = held.saturating_sub(*dropped);
                if *held == 0 {
                    victim.inventory.remove(item);
                }
            }
        }
        victim.status = ActorStatus::Dead;
        victim.is_alive = false;
        victim.stats.health = 0;
        victim.destination = None;
        victim.respawn_tick = match role {
            Role::Monster => None,
            Role::Merchant | Role::Fighter => Some(tick.saturating_add(RESPAWN_DELAY_TICKS)),
        };
        world.mark_dirty(EntityRef::Actor(id));
    }

    // Humans wait out their respawn at the spawn point.
    if matches!(role, Role::Merchant | Role::Fighter) {
        world.move_actor(id, SPAWN_POINT);
    }

    // Dying lets go of any behemoth.
    for climber_set in world.climbers.values_mut() {
        climber_set.remove(&id);
    }

    // Drops land in the killer's hands; NPC killers have none.
    if let Some(Combatant::Actor(killer_id)) = killer
        && let Some(killer_actor) = world.actors.get_mut(&killer_id)
    {
        killer_actor.gold = killer_actor.gold.saturating_add(dropped_gold);
        for (item, dropped) in &dropped_items {
            let entry = killer_actor.inventory.entry(item.clone()).or_insert(0);
            *entry = entry.saturating_add(*dropped);
        }
        world.mark_dirty(EntityRef::Actor(killer_id));
    }

    world.emit(WorldEventKind::Death {
        victim: Combatant::Actor(id),
        killer,
        dropped_gold,
        dropped_items,
    });

    if let Some(Combatant::Actor(killer_id)) = killer {
        let eaten = (role == Role::Monster).then_some((
            victim_stats.max_health,
            victim_stats.attack,
            victim_stats.defense,
            Combatant::Actor(id),
        ));
        credit_monster_kill(world, killer_id, eaten);
    }
}

/// Kill bookkeeping for monster killers: kill counter, optional eat, and
/// the evolution check. Non-monster killers take the drops and nothing else.
fn credit_monster_kill(
    world: &mut WorldState,
    killer_id: ActorId,
    eaten: Option<(u32, u32, u32, Combatant)>,
) {
    let is_monster = world
        .actors
        .get(&killer_id)
        .is_some_and(|killer| killer.role == Role::Monster && killer.is_alive);
    if !is_monster {
        return;
    }
    if let Some(killer) = world.actors.get_mut(&killer_id) {
        killer.kills = killer.kills.saturating_add(1);
        world.mark_dirty(EntityRef::Actor(killer_id));
    }
    if let Some((max_health, attack, defense, victim)) = eaten {
        evolution::monster_eat(world, killer_id, max_health, attack, defense, victim);
    }
    evolution::evolution_check(world, killer_id);
}

/// Respawn every dead human whose timer has elapsed.
pub fn respawn_tick(world: &mut WorldState) {
    let tick = world.tick;
    let due: Vec<ActorId> = world
        .actors
        .values()
        .filter(|actor| actor.respawn_tick.is_some_and(|at| at <= tick))
        .map(|actor| actor.id)
        .collect();

    for id in due {
        if let Some(actor) = world.actors.get_mut(&id) {
            actor.stats.health = actor.stats.max_health;
            actor.status = ActorStatus::Idle;
            actor.is_alive = true;
            actor.respawn_tick = None;
            actor.destination = None;
        }
        world.move_actor(id, SPAWN_POINT);
        world.emit(WorldEventKind::Respawn { actor: id });
        tracing::debug!(tick, actor = %id, "Actor respawned");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use veldt_types::Position;

    use crate::testutil::{empty_world, give_item, spawn_actor, spawn_wolf};

    use super::*;

    #[test]
    fn human_death_drops_a_fifth_and_schedules_respawn() {
        let mut world = empty_world();
        world.tick = 100;
        let victim = spawn_actor(&mut world, "Wren", Role::Merchant, Position::new(100.0, 100.0));
        let killer = spawn_actor(&mut world, "Gnash", Role::Monster, Position::new(100.0, 100.0));
        if let Some(actor) = world.actors.get_mut(&victim) {
            actor.gold = 55;
            actor.stats.health = 0;
        }
        give_item(&mut world, victim, "wood", 9);

        process_death(
            &mut world,
            Combatant::Actor(victim),
            Some(Combatant::Actor(killer)),
        );

        let dead = world.actors.get(&victim).unwrap();
        assert_eq!(dead.status, ActorStatus::Dead);
        assert!(!dead.is_alive);
        assert_eq!(dead.respawn_tick, Some(130));
        assert_eq!(dead.position, SPAWN_POINT);
        // floor(55 * 0.2) = 11 gold, floor(9 * 0.2) = 1 wood.
        assert_eq!(dead.gold, 44);
        assert_eq!(dead.inventory.get("wood"), Some(&8));

        let killer_state = world.actors.get(&killer).unwrap();
        assert_eq!(killer_state.gold, 11);
        assert_eq!(killer_state.inventory.get("wood"), Some(&1));
        assert_eq!(killer_state.kills, 1);
    }

    #[test]
    fn monster_death_is_permanent() {
        let mut world = empty_world();
        world.tick = 100;
        let victim = spawn_actor(&mut world, "Gnash", Role::Monster, Position::new(100.0, 100.0));
        if let Some(actor) = world.actors.get_mut(&victim) {
            actor.gold = 40;
            actor.stats.health = 0;
        }
        let killer = spawn_actor(&mut world, "Tam", Role::Fighter, Position::new(100.0, 100.0));

        process_death(
            &mut world,
            Combatant::Actor(victim),
            Some(Combatant::Actor(killer)),
        );

        let dead = world.actors.get(&victim).unwrap();
        assert!(dead.respawn_tick.is_none());
        assert_eq!(dead.gold, 0);
        assert_eq!(world.actors.get(&killer).unwrap().gold, 40);
        // Fighter killers take the drops but no kill counter.
        assert_eq!(world.actors.get(&killer).unwrap().kills, 0);

        // The respawn sweep never revives a monster.
        world.tick = 1000;
        respawn_tick(&mut world);
        assert!(!world.actors.get(&victim).unwrap().is_alive);
    }

    #[test]
    fn npc_death_awards_gold_and_removes_the_npc() {
        let mut world = empty_world();
        let killer = spawn_actor(&mut world, "Tam", Role::Fighter, Position::new(100.0, 100.0));
        let wolf = spawn_wolf(&mut world, Position::new(100.0, 100.0));

        process_death(
            &mut world,
            Combatant::Npc(wolf),
            Some(Combatant::Actor(killer)),
        );

        assert!(!world.npcs.contains_key(&wolf));
        assert_eq!(world.actors.get(&killer).unwrap().gold, 10);
        assert!(
            world
                .tick_events
                .iter()
                .any(|e| matches!(e.kind, WorldEventKind::Death { .. }))
        );
    }

    #[test]
    fn respawn_restores_health_at_the_spawn_point() {
        let mut world = empty_world();
        world.tick = 100;
        let victim = spawn_actor(&mut world, "Wren", Role::Merchant, Position::new(100.0, 100.0));
        if let Some(actor) = world.actors.get_mut(&victim) {
            actor.stats.health = 0;
        }
        process_death(&mut world, Combatant::Actor(victim), None);

        world.tick = 129;
        respawn_tick(&mut world);
        assert!(!world.actors.get(&victim).unwrap().is_alive);

        world.tick = 130;
        respawn_tick(&mut world);
        let revived = world.actors.get(&victim).unwrap();
        assert!(revived.is_alive);
        assert_eq!(revived.status, ActorStatus::Idle);
        assert_eq!(revived.stats.health, revived.stats.max_health);
        assert!(revived.respawn_tick.is_none());
        assert!(
            world
                .tick_events
                .iter()
                .any(|e| matches!(e.kind, WorldEventKind::Respawn { .. }))
        );
    }
}
