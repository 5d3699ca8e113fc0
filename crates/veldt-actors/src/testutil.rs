//! Shared constructors for the crate's test modules.

use std::collections::BTreeMap;

use veldt_types::structs::{CombatStats, Equipment};
use veldt_types::{
    Actor, ActorId, ActorStatus, Behemoth, BehemothId, BehemothStatus, NpcBehavior, NpcId,
    NpcMonster, Position, ResourceId, ResourceKind, ResourceNode, ResourceState, Role,
};
use veldt_world::WorldState;
use veldt_world::constants::{
    BEHEMOTH_SPEED, NPC_PATROL_RADIUS, TREE_CAPACITY, role_base_stats,
};

/// A fresh world with a fixed seed and no seeded entities.
pub fn empty_world() -> WorldState {
    WorldState::new(42)
}

/// Insert an actor of the given role at a position; returns its id.
pub fn spawn_actor(world: &mut WorldState, name: &str, role: Role, position: Position) -> ActorId {
    let id = ActorId::from_raw(world.allocate_id());
    world.insert_actor(Actor {
        id,
        name: name.to_owned(),
        role,
        position,
        destination: None,
        status: ActorStatus::Idle,
        stats: role_base_stats(role),
        gold: 0,
        inventory: BTreeMap::new(),
        equipment: Equipment::default(),
        alliance: None,
        kills: 0,
        monster_eats: 0,
        evolution_stage: 1,
        action_cooldown_until_tick: 0,
        respawn_tick: None,
        last_action_tick: 0,
        connected_at_tick: 0,
        is_alive: true,
        connected: true,
    });
    id
}

/// Insert the scenario-1 wolf (30 hp, 10 atk, 8 def, 10 gold) at a position.
pub fn spawn_wolf(world: &mut WorldState, position: Position) -> NpcId {
    let id = NpcId::from_raw(world.allocate_id());
    world.insert_npc(NpcMonster {
        id,
        template: "wolf".to_owned(),
        position,
        stats: CombatStats {
            health: 30,
            max_health: 30,
            attack: 10,
            defense: 8,
            speed: 4.0,
            vision_radius: 30.0,
        },
        behavior: NpcBehavior::Patrol,
        patrol_origin: position,
        patrol_radius: NPC_PATROL_RADIUS,
        target: None,
        gold_drop: 10,
    });
    id
}

/// Insert an ironhide behemoth (50 hp) with an empty route at a position.
pub fn spawn_behemoth(world: &mut WorldState, position: Position) -> BehemothId {
    let id = BehemothId::from_raw(world.allocate_id());
    world.insert_behemoth(Behemoth {
        id,
        kind: "ironhide".to_owned(),
        ore_item: "iron_ore".to_owned(),
        position,
        stats: CombatStats {
            health: 50,
            max_health: 50,
            attack: 18,
            defense: 12,
            speed: BEHEMOTH_SPEED,
            vision_radius: 0.0,
        },
        status: BehemothStatus::Roaming,
        ore_amount: 0,
        ore_max: 20,
        fed_amount: 0,
        ore_growth_ready_at: None,
        unconscious_until_tick: None,
        route: Vec::new(),
        current_waypoint: 0,
    });
    id
}

/// Insert an available tree at a position.
pub fn spawn_tree(world: &mut WorldState, position: Position) -> ResourceId {
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
    id
}

/// Insert an available gold vein at a position.
pub fn spawn_vein(world: &mut WorldState, position: Position) -> ResourceId {
    let id = ResourceId::from_raw(world.allocate_id());
    world.insert_resource(ResourceNode {
        id,
        kind: ResourceKind::GoldVein,
        position,
        remaining: 50,
        max_capacity: 50,
        state: ResourceState::Available,
        growth_start_tick: None,
        growth_complete_tick: None,
    });
    id
}

/// Give an actor some of an item.
pub fn give_item(world: &mut WorldState, actor: ActorId, item: &str, amount: u32) {
    world.credit_item(actor, item, amount);
}
