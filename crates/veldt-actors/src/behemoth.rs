//! The behemoth lifecycle: roam, feed, knockout, climb, mine, wake.
//!
//! Behemoths walk fixed waypoint routes and never initiate combat. Feeding
//! one past its threshold arms a one-shot ore-growth timer; knocking one
//! out opens a mining window for climbing merchants; waking up throws every
//! climber off and resets the cycle.

use veldt_types::{ActorId, BehemothId, BehemothStatus, EntityRef, WorldEventKind};
use veldt_world::WorldState;
use veldt_world::constants::{
    BEHEMOTH_FEED_THRESHOLD, BEHEMOTH_ORE_GROWTH_TICKS, BEHEMOTH_THROW_OFF_PERCENT,
    BEHEMOTH_UNCONSCIOUS_TICKS,
};

/// Register one feed action against a behemoth.
///
/// The ore timer arms exactly once, when `fed_amount` first reaches the
/// threshold. Feeding past the threshold keeps counting (the eventual ore
/// yield uses the final amount) but never re-arms the timer.
pub fn feed(world: &mut WorldState, behemoth_id: BehemothId) {
    let tick = world.tick;
    let Some(behemoth) = world.behemoths.get_mut(&behemoth_id) else {
        return;
    };
    behemoth.fed_amount = behemoth.fed_amount.saturating_add(1);
    if behemoth.fed_amount == BEHEMOTH_FEED_THRESHOLD && behemoth.ore_growth_ready_at.is_none() {
        behemoth.ore_growth_ready_at = Some(tick.saturating_add(BEHEMOTH_ORE_GROWTH_TICKS));
    }
    world.mark_dirty(EntityRef::Behemoth(behemoth_id));
}

/// Advance every behemoth for one tick.
///
/// Returns the throw-offs the executor must apply: each wake tosses its
/// climbers for half the behemoth's max health in damage.
pub fn behemoth_tick(world: &mut WorldState) -> Vec<(ActorId, u32)> {
    let mut throw_offs = Vec::new();
    let ids: Vec<BehemothId> = world.behemoths.keys().copied().collect();
    for id in ids {
        apply_ore_growth(world, id);
        let Some(behemoth) = world.behemoths.get(&id) else {
            continue;
        };
        match behemoth.status {
            BehemothStatus::Roaming => roam(world, id),
            BehemothStatus::Unconscious => {
                mine_ore(world, id);
                wake_if_due(world, id, &mut throw_offs);
            }
            // Waking is a transitional marker; a restore that lands here
            // just resumes roaming.
            BehemothStatus::Waking => {
                if let Some(behemoth) = world.behemoths.get_mut(&id) {
                    behemoth.status = BehemothStatus::Roaming;
                    world.mark_dirty(EntityRef::Behemoth(id));
                }
            }
        }
    }
    throw_offs
}

/// Apply the one-shot ore growth when its timer elapses.
fn apply_ore_growth(world: &mut WorldState, id: BehemothId) {
    let tick = world.tick;
    let Some(behemoth) = world.behemoths.get_mut(&id) else {
        return;
    };
    let due = behemoth.ore_growth_ready_at.is_some_and(|at| tick >= at);
    if !due {
        return;
    }
    let bonus = behemoth
        .fed_amount
        .checked_div(BEHEMOTH_FEED_THRESHOLD)
        .unwrap_or(0)
        .saturating_mul(5);
    let ore = 5_u32.saturating_add(bonus).min(behemoth.ore_max);
    behemoth.ore_amount = ore;
    behemoth.ore_growth_ready_at = None;
    world.mark_dirty(EntityRef::Behemoth(id));
    tracing::debug!(behemoth = %id, ore, "Behemoth ore grown");
}

/// Roaming: knock out at zero health, otherwise follow the route.
fn roam(world: &mut WorldState, id: BehemothId) {
    let tick = world.tick;
    let Some(behemoth) = world.behemoths.get(&id) else {
        return;
    };

    if behemoth.stats.health == 0 {
        if let Some(behemoth) = world.behemoths.get_mut(&id) {
            behemoth.status = BehemothStatus::Unconscious;
            behemoth.unconscious_until_tick =
                Some(tick.saturating_add(BEHEMOTH_UNCONSCIOUS_TICKS));
            world.mark_dirty(EntityRef::Behemoth(id));
        }
        world.emit(WorldEventKind::BehemothKnockout { behemoth: id });
        tracing::info!(behemoth = %id, "Behemoth knocked out");
        return;
    }

    if behemoth.route.is_empty() {
        return;
    }
    let waypoint_index = behemoth
        .current_waypoint
        .checked_rem(behemoth.route.len())
        .unwrap_or(0);
    let Some(waypoint) = behemoth.route.get(waypoint_index).copied() else {
        return;
    };
    let speed = behemoth.stats.speed;
    let (next, arrived) = behemoth.position.step_toward(&waypoint, speed);
    world.move_behemoth(id, next);
    if arrived
        && let Some(behemoth) = world.behemoths.get_mut(&id)
    {
        let len = behemoth.route.len();
        behemoth.current_waypoint = waypoint_index
            .saturating_add(1)
            .checked_rem(len)
            .unwrap_or(0);
        world.mark_dirty(EntityRef::Behemoth(id));
    }
}

/// Each registered climber extracts one ore per tick while any remains.
fn mine_ore(world: &mut WorldState, id: BehemothId) {
    let climbers: Vec<ActorId> = world
        .climbers
        .get(&id)
        .map(|set| set.iter().copied().collect())
        .unwrap_or_default();
    for climber in climbers {
        let extracted = {
            let Some(behemoth) = world.behemoths.get_mut(&id) else {
                return;
            };
            if behemoth.ore_amount == 0 {
                break;
            }
            behemoth.ore_amount = behemoth.ore_amount.saturating_sub(1);
            behemoth.ore_item.clone()
        };
        world.mark_dirty(EntityRef::Behemoth(id));
        world.credit_item(climber, &extracted, 1);
        world.emit(WorldEventKind::BehemothMined {
            behemoth: id,
            actor: climber,
            item: extracted,
            amount: 1,
        });
    }
}

/// Wake the behemoth when its timer elapses, collecting throw-offs.
fn wake_if_due(world: &mut WorldState, id: BehemothId, throw_offs: &mut Vec<(ActorId, u32)>) {
    let tick = world.tick;
    let due = world
        .behemoths
        .get(&id)
        .is_some_and(|behemoth| behemoth.unconscious_until_tick.is_some_and(|at| tick >= at));
    if !due {
        return;
    }

    let thrown: Vec<ActorId> = world
        .climbers
        .remove(&id)
        .map(|set| set.into_iter().collect())
        .unwrap_or_default();

    let damage = {
        let Some(behemoth) = world.behemoths.get_mut(&id) else {
            return;
        };
        behemoth.status = BehemothStatus::Roaming;
        behemoth.stats.health = behemoth.stats.max_health;
        behemoth.ore_amount = 0;
        behemoth.fed_amount = 0;
        behemoth.unconscious_until_tick = None;
        behemoth
            .stats
            .max_health
            .saturating_mul(BEHEMOTH_THROW_OFF_PERCENT)
            .checked_div(100)
            .unwrap_or(0)
    };
    world.mark_dirty(EntityRef::Behemoth(id));

    world.emit(WorldEventKind::BehemothWake {
        behemoth: id,
        thrown_off: thrown.clone(),
    });
    tracing::info!(behemoth = %id, thrown = thrown.len(), "Behemoth woke up");

    throw_offs.extend(thrown.into_iter().map(|actor| (actor, damage)));
}
