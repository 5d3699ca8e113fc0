//! NPC monster AI and population control.
//!
//! Each NPC runs a small behavior machine every tick: patrol around its
//! origin, chase a human-role actor that strays into aggro range, and hold
//! an attack attachment while in striking distance (the combat resolver
//! deals the damage). The spawner keeps the NPC count tracking the human
//! population at a fixed ratio.

use veldt_types::structs::{CombatStats, Combatant};
use veldt_types::{
    ActorId, EntityRef, NpcBehavior, NpcId, NpcMonster, Position, WorldEventKind,
};
use veldt_world::constants::{
    ATTACK_RANGE, NPC_AGGRO_RANGE, NPC_CHASE_RANGE, NPC_MAX_SPAWN_PER_CHECK, NPC_PATROL_RADIUS,
    NPC_POPULATION_RATIO, NPC_TEMPLATES,
};
use veldt_world::seeder::random_danger_position;
use veldt_world::WorldState;

use crate::combat;

/// Advance every NPC's behavior machine for one tick.
pub fn npc_tick(world: &mut WorldState) {
    let ids: Vec<NpcId> = world.npcs.keys().copied().collect();
    for id in ids {
        let Some(npc) = world.npcs.get(&id) else {
            continue;
        };
        match npc.behavior {
            NpcBehavior::Patrol => patrol(world, id),
            NpcBehavior::Chase => chase(world, id),
            NpcBehavior::Attack => attack(world, id),
            NpcBehavior::Flee | NpcBehavior::Idle => {}
        }
    }
}

/// Patrol: watch for prey, otherwise random-walk inside the patrol radius.
///
/// The aggro scan runs before the walk so a freshly spotted target is
/// engaged from where the NPC stands, not from wherever the walk lands.
fn patrol(world: &mut WorldState, id: NpcId) {
    let Some(npc) = world.npcs.get(&id) else {
        return;
    };
    let position = npc.position;
    let origin = npc.patrol_origin;
    let radius = npc.patrol_radius;
    let speed = npc.stats.speed;

    // Aggro scan: nearest living human-role actor within range.
    if let Some(target) = nearest_human(world, &position, NPC_AGGRO_RANGE) {
        if let Some(npc) = world.npcs.get_mut(&id) {
            npc.behavior = NpcBehavior::Chase;
            npc.target = Some(target);
            world.mark_dirty(EntityRef::Npc(id));
            tracing::debug!(npc = %id, target = %target, "NPC acquired target");
        }
        return;
    }

    // Random heading; drift back toward the origin at the boundary.
    let heading = world.rng.next_range_f64(0.0, core::f64::consts::TAU);
    let candidate =
        Position::new(position.x + heading.cos() * speed, position.y + heading.sin() * speed)
            .clamped();
    let next = if candidate.distance_to(&origin) > radius {
        position.step_toward(&origin, speed).0
    } else {
        candidate
    };
    world.move_npc(id, next);
}

/// Chase: close distance; give up past the leash; strike when in range.
fn chase(world: &mut WorldState, id: NpcId) {
    let Some(npc) = world.npcs.get(&id) else {
        return;
    };
    let position = npc.position;
    let speed = npc.stats.speed;
    let target_id = npc.target;

    let target_position = target_id.and_then(|target| {
        world
            .actors
            .get(&target)
            .filter(|actor| actor.is_alive)
            .map(|actor| actor.position)
    });

    let Some(target_position) = target_position else {
        revert_to_patrol(world, id);
        return;
    };
    let distance = position.distance_to(&target_position);
    if distance > NPC_CHASE_RANGE {
        revert_to_patrol(world, id);
        return;
    }
    if distance <= ATTACK_RANGE {
        if let Some(npc) = world.npcs.get_mut(&id) {
            npc.behavior = NpcBehavior::Attack;
            world.mark_dirty(EntityRef::Npc(id));
        }
        if let Some(target) = target_id {
            combat::attach_pair(world, Combatant::Npc(id), Combatant::Actor(target));
        }
        return;
    }
    let next = position.step_toward(&target_position, speed).0;
    world.move_npc(id, next);
}

/// Attack: hold the attachment while in range; otherwise fall back.
fn attack(world: &mut WorldState, id: NpcId) {
    let Some(npc) = world.npcs.get(&id) else {
        return;
    };
    let position = npc.position;
    let target_id = npc.target;

    let target_position = target_id.and_then(|target| {
        world
            .actors
            .get(&target)
            .filter(|actor| actor.is_alive)
            .map(|actor| actor.position)
    });

    let Some(target_position) = target_position else {
        revert_to_patrol(world, id);
        return;
    };
    if position.distance_to(&target_position) > ATTACK_RANGE {
        if let Some(npc) = world.npcs.get_mut(&id) {
            npc.behavior = NpcBehavior::Chase;
            world.mark_dirty(EntityRef::Npc(id));
        }
        return;
    }
    // Staying in attack: the combat pair does the damage. Re-attaching is
    // a no-op while a pair is active.
    if let Some(target) = target_id {
        combat::attach_pair(world, Combatant::Npc(id), Combatant::Actor(target));
    }
}

/// Drop the target and return to patrol, releasing any combat attachment.
fn revert_to_patrol(world: &mut WorldState, id: NpcId) {
    combat::detach_combatant(world, Combatant::Npc(id));
    if let Some(npc) = world.npcs.get_mut(&id) {
        npc.behavior = NpcBehavior::Patrol;
        npc.target = None;
        world.mark_dirty(EntityRef::Npc(id));
    }
}

/// The nearest living human-role actor within `radius`, ties broken by id.
fn nearest_human(world: &WorldState, center: &Position, radius: f64) -> Option<ActorId> {
    let mut best: Option<(f64, ActorId)> = None;
    for entity in world.spatial.in_radius(center, radius) {
        let EntityRef::Actor(actor_id) = entity else {
            continue;
        };
        let Some(actor) = world.actors.get(&actor_id) else {
            continue;
        };
        if !actor.is_alive || !actor.is_human_role() {
            continue;
        }
        let distance = actor.position.distance_to(center);
        let closer = match best {
            None => true,
            Some((best_distance, best_id)) => {
                distance < best_distance
                    || ((distance - best_distance).abs() < f64::EPSILON && actor_id < best_id)
            }
        };
        if closer {
            best = Some((distance, actor_id));
        }
    }
    best.map(|(_, id)| id)
}

/// Population control: top the NPC count up toward the human ratio.
///
/// Runs every spawn-check interval. Spawns land in the danger zone with
/// deterministic PRNG placement and rotate templates by draw.
pub fn npc_spawn_check(world: &mut WorldState) {
    let humans = world.alive_connected_humans();
    let npc_count = u32::try_from(world.npcs.len()).unwrap_or(u32::MAX);
    let target = population_target(humans);
    if npc_count >= target {
        return;
    }
    let missing = target.saturating_sub(npc_count);
    let to_spawn = missing.min(NPC_MAX_SPAWN_PER_CHECK);

    let template_count = u64::try_from(NPC_TEMPLATES.len()).unwrap_or(1);
    for _ in 0..to_spawn {
        let template_index =
            usize::try_from(world.rng.next_below(template_count)).unwrap_or(0);
        let Some(template) = NPC_TEMPLATES.get(template_index) else {
            continue;
        };
        let position = random_danger_position(world);
        let id = NpcId::from_raw(world.allocate_id());
        world.insert_npc(NpcMonster {
            id,
            template: template.name.to_owned(),
            position,
            stats: CombatStats {
                health: template.health,
                max_health: template.health,
                attack: template.attack,
                defense: template.defense,
                speed: template.speed,
                vision_radius: NPC_AGGRO_RANGE,
            },
            behavior: NpcBehavior::Patrol,
            patrol_origin: position,
            patrol_radius: NPC_PATROL_RADIUS,
            target: None,
            gold_drop: template.gold_drop,
        });
        world.emit(WorldEventKind::NpcSpawn {
            npc: id,
            template: template.name.to_owned(),
        });
        tracing::debug!(npc = %id, template = template.name, "NPC spawned");
    }
}

/// The NPC population target for a given human count.
// The product of a u32 population and the small ratio stays well below
// 2^32, so the truncating cast is exact.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn population_target(humans: u32) -> u32 {
    (f64::from(humans) * NPC_POPULATION_RATIO).floor() as u32
}
