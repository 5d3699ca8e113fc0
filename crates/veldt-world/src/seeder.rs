//! Deterministic initial world placement.
//!
//! Seeding draws exclusively from the world's own PRNG, so a given seed
//! always produces the same forest, the same veins, the same NPC packs, and
//! the same behemoth routes. Trees and veins scatter anywhere in bounds;
//! NPCs and behemoth routes stay out past the danger-zone boundary.

use veldt_types::structs::CombatStats;
use veldt_types::{
    Behemoth, BehemothId, BehemothStatus, NpcBehavior, NpcId, NpcMonster, Position, ResourceId,
    ResourceKind, ResourceNode, ResourceState,
};

use crate::constants::{
    BEHEMOTH_SPEED, BEHEMOTH_TEMPLATES, DANGER_ZONE_MIN_DIST, GOLD_VEIN_CAPACITY,
    NPC_PATROL_RADIUS, NPC_TEMPLATES, SEED_BEHEMOTH_COUNT, SEED_GOLD_VEIN_COUNT, SEED_NPC_COUNT,
    SEED_TREE_COUNT, SPAWN_POINT, TREE_CAPACITY,
};
use crate::world::WorldState;

/// Populate an empty world with its starting resources, NPCs, and behemoths.
pub fn seed_world(world: &mut WorldState) {
    tracing::info!(seed = world.seed, "Seeding world");
    seed_resources(world);
    seed_npcs(world);
    seed_behemoths(world);
    tracing::info!(
        resources = world.resources.len(),
        npcs = world.npcs.len(),
        behemoths = world.behemoths.len(),
        "World seeded"
    );
}

/// Scatter trees and gold veins across the whole plane.
fn seed_resources(world: &mut WorldState) {
    for _ in 0..SEED_TREE_COUNT {
        let position = random_position(world);
        let id = ResourceId::from_raw(world.allocate_id());
        world.insert_resource(ResourceNode {
            id,
            kind: ResourceKind::Tree,
            position,
            remaining: TREE_CAPACITY,
            max_capacity: TREE_CAPACITY,
            state: ResourceState::Available,
            growth_start_tick: None,
            growth_complete_tick: None,
        });
    }

    for _ in 0..SEED_GOLD_VEIN_COUNT {
        let position = random_position(world);
        let id = ResourceId::from_raw(world.allocate_id());
        world.insert_resource(ResourceNode {
            id,
            kind: ResourceKind::GoldVein,
            position,
            remaining: GOLD_VEIN_CAPACITY,
            max_capacity: GOLD_VEIN_CAPACITY,
            state: ResourceState::Available,
            growth_start_tick: None,
            growth_complete_tick: None,
        });
    }
}

/// Place the starting NPC packs in the danger zone, rotating templates.
fn seed_npcs(world: &mut WorldState) {
    for index in 0..SEED_NPC_COUNT {
        let template_index = (index as usize).checked_rem(NPC_TEMPLATES.len()).unwrap_or(0);
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
                vision_radius: crate::constants::NPC_AGGRO_RANGE,
            },
            behavior: NpcBehavior::Patrol,
            patrol_origin: position,
            patrol_radius: NPC_PATROL_RADIUS,
            target: None,
            gold_drop: template.gold_drop,
        });
    }
}

/// Place one behemoth per template on a rectangular patrol route.
fn seed_behemoths(world: &mut WorldState) {
    for index in 0..SEED_BEHEMOTH_COUNT {
        let template_index = (index as usize)
            .checked_rem(BEHEMOTH_TEMPLATES.len())
            .unwrap_or(0);
        let Some(template) = BEHEMOTH_TEMPLATES.get(template_index) else {
            continue;
        };
        let center = random_danger_position(world);
        let half = world.rng.next_range_f64(40.0, 120.0);
        let route: Vec<Position> = [
            (-half, -half),
            (half, -half),
            (half, half),
            (-half, half),
        ]
        .iter()
        .map(|(dx, dy)| Position::new(center.x + dx, center.y + dy).clamped())
        .collect();

        let start = route.first().copied().unwrap_or(center);
        let id = BehemothId::from_raw(world.allocate_id());
        world.insert_behemoth(Behemoth {
            id,
            kind: template.name.to_owned(),
            ore_item: template.ore_item.to_owned(),
            position: start,
            stats: CombatStats {
                health: template.health,
                max_health: template.health,
                attack: template.attack,
                defense: template.defense,
                speed: BEHEMOTH_SPEED,
                vision_radius: 0.0,
            },
            status: BehemothStatus::Roaming,
            ore_amount: 0,
            ore_max: template.ore_max,
            fed_amount: 0,
            ore_growth_ready_at: None,
            unconscious_until_tick: None,
            route,
            current_waypoint: 0,
        });
    }
}

/// Draw a uniform in-bounds position.
fn random_position(world: &mut WorldState) -> Position {
    let x = world.rng.next_range_f64(0.0, veldt_types::WORLD_SIZE);
    let y = world.rng.next_range_f64(0.0, veldt_types::WORLD_SIZE);
    Position::new(x, y)
}

/// Draw a position at least [`DANGER_ZONE_MIN_DIST`] from the spawn point.
///
/// Rejection sampling terminates fast: well over half the plane qualifies.
pub fn random_danger_position(world: &mut WorldState) -> Position {
    loop {
        let candidate = random_position(world);
        if candidate.distance_to(&SPAWN_POINT) >= DANGER_ZONE_MIN_DIST {
            return candidate;
        }
    }
}
