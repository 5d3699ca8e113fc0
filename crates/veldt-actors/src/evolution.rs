//! Monster evolution stages and the monster-eat mechanic.
//!
//! Monster actors climb four stages on kill and eat thresholds. Stage
//! multipliers apply as a ratio against the previous stage's multipliers,
//! so flat bonuses accrued by eating survive every transition.

use veldt_types::structs::Combatant;
use veldt_types::{ActorId, EntityRef, Role, WorldEventKind};
use veldt_world::WorldState;

/// The highest reachable evolution stage.
pub const MAX_STAGE: u32 = 4;

/// Kill threshold to reach a stage (index = stage).
const KILL_THRESHOLDS: [u32; 5] = [0, 0, 5, 15, 30];

/// Eat threshold to reach a stage (index = stage).
const EAT_THRESHOLDS: [u32; 5] = [0, 0, 3, 10, 20];

/// Attack multiplier per stage (index = stage).
const ATTACK_MULT: [f64; 5] = [1.0, 1.0, 1.5, 2.0, 3.0];

/// Max-health multiplier per stage (index = stage).
const HEALTH_MULT: [f64; 5] = [1.0, 1.0, 1.25, 1.5, 2.0];

/// Scale a stat by `numerator / denominator`, flooring the result.
// The product of a u32 and a small stage ratio stays far below 2^32,
// so the truncating cast is exact.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale(value: u32, numerator: f64, denominator: f64) -> u32 {
    ((f64::from(value) * numerator / denominator).floor()) as u32
}

/// Apply the monster-eat bonus: a tenth of the eaten combatant's stats.
///
/// Health rises by the same amount the ceiling gained, clamped to the new
/// ceiling.
pub fn monster_eat(
    world: &mut WorldState,
    eater_id: ActorId,
    eaten_max_health: u32,
    eaten_attack: u32,
    eaten_defense: u32,
    eaten: Combatant,
) {
    let Some(eater) = world.actors.get_mut(&eater_id) else {
        return;
    };
    if eater.role != Role::Monster {
        return;
    }
    let health_gain = eaten_max_health.checked_div(10).unwrap_or(0);
    let attack_gain = eaten_attack.checked_div(10).unwrap_or(0);
    let defense_gain = eaten_defense.checked_div(10).unwrap_or(0);

    eater.stats.max_health = eater.stats.max_health.saturating_add(health_gain);
    eater.stats.health = eater
        .stats
        .health
        .saturating_add(health_gain)
        .min(eater.stats.max_health);
    eater.stats.attack = eater.stats.attack.saturating_add(attack_gain);
    eater.stats.defense = eater.stats.defense.saturating_add(defense_gain);
    eater.monster_eats = eater.monster_eats.saturating_add(1);

    world.mark_dirty(EntityRef::Actor(eater_id));
    world.emit(WorldEventKind::MonsterEat {
        eater: eater_id,
        eaten,
    });
}

/// Advance at most one evolution stage if the counters now qualify.
///
/// The transition multiplies current attack and max health by the ratio of
/// the next stage's multipliers over the current stage's, then heals to the
/// new ceiling.
pub fn evolution_check(world: &mut WorldState, actor_id: ActorId) {
    let Some(actor) = world.actors.get_mut(&actor_id) else {
        return;
    };
    if actor.role != Role::Monster || !actor.is_alive {
        return;
    }
    let stage = actor.evolution_stage;
    if stage >= MAX_STAGE {
        return;
    }
    let next = stage.saturating_add(1);
    let next_index = next as usize;
    let stage_index = stage as usize;

    let kill_threshold = KILL_THRESHOLDS.get(next_index).copied().unwrap_or(u32::MAX);
    let eat_threshold = EAT_THRESHOLDS.get(next_index).copied().unwrap_or(u32::MAX);
    if actor.kills < kill_threshold && actor.monster_eats < eat_threshold {
        return;
    }

    let attack_ratio = (
        ATTACK_MULT.get(next_index).copied().unwrap_or(1.0),
        ATTACK_MULT.get(stage_index).copied().unwrap_or(1.0),
    );
    let health_ratio = (
        HEALTH_MULT.get(next_index).copied().unwrap_or(1.0),
        HEALTH_MULT.get(stage_index).copied().unwrap_or(1.0),
    );

    actor.stats.attack = scale(actor.stats.attack, attack_ratio.0, attack_ratio.1);
    actor.stats.max_health = scale(actor.stats.max_health, health_ratio.0, health_ratio.1);
    actor.stats.health = actor.stats.max_health;
    actor.evolution_stage = next;

    world.mark_dirty(EntityRef::Actor(actor_id));
    world.emit(WorldEventKind::Evolution {
        actor: actor_id,
        from_stage: stage,
        to_stage: next,
    });
    tracing::info!(actor = %actor_id, from = stage, to = next, "Monster evolved");
}
