//! Contract constants and balance tables.
//!
//! Everything in this module is part of the external contract: client test
//! suites and the persisted schema both assume these exact values.

use veldt_types::structs::CombatStats;
use veldt_types::{Position, Role};

// ---------------------------------------------------------------------------
// World geometry
// ---------------------------------------------------------------------------

/// Edge length of a spatial index cell, in world units.
pub const CHUNK_SIZE: f64 = 32.0;

/// Where new actors appear and where the dead respawn.
pub const SPAWN_POINT: Position = Position::new(500.0, 500.0);

/// Radius around the spawn point that NPC spawning avoids.
pub const SAFE_ZONE_RADIUS: f64 = 100.0;

/// Minimum distance from spawn for NPC and behemoth placement.
pub const DANGER_ZONE_MIN_DIST: f64 = 300.0;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Wall-clock milliseconds per tick.
pub const TICK_INTERVAL_MS: u64 = 1000;

/// Wall-clock budget beyond which a tick logs a warning.
pub const SLOW_TICK_WARN_MS: u64 = 500;

/// Full-snapshot cadence, in ticks.
pub const SNAPSHOT_CADENCE_TICKS: u64 = 60;

/// Cooldown applied after every executed non-idle action.
pub const ACTION_COOLDOWN_TICKS: u64 = 1;

// ---------------------------------------------------------------------------
// Interaction ranges
// ---------------------------------------------------------------------------

/// Maximum distance for gathering.
pub const GATHER_RANGE: f64 = 5.0;

/// Maximum distance for attacking (and for a pair to stay attached).
pub const ATTACK_RANGE: f64 = 5.0;

/// Maximum distance for proposing a trade.
pub const TRADE_RANGE: f64 = 10.0;

/// Maximum distance for climbing a behemoth.
pub const CLIMB_RANGE: f64 = 10.0;

/// Maximum distance for feeding a behemoth.
pub const FEED_RANGE: f64 = 10.0;

/// Radius of local chat around the sender.
pub const LOCAL_CHAT_RADIUS: f64 = 100.0;

// ---------------------------------------------------------------------------
// Death and respawn
// ---------------------------------------------------------------------------

/// Ticks between death and respawn for merchants and fighters.
pub const RESPAWN_DELAY_TICKS: u64 = 30;

/// Percentage of gold and of each inventory stack lost on death.
pub const DEATH_DROP_PERCENT: u32 = 20;

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Ticks per gather cycle on a tree.
pub const TREE_GATHER_TICKS: u64 = 3;

/// Ticks per gather cycle on a gold vein.
pub const GOLD_GATHER_TICKS: u64 = 2;

/// Gold paid out per vein gather cycle (capped by remaining).
pub const GOLD_PER_CYCLE: u32 = 5;

/// Percent chance a depleted tree drops a seed.
pub const SEED_DROP_PERCENT: u64 = 30;

/// Ticks for a sapling to grow into a tree.
pub const SAPLING_GROWTH_TICKS: u64 = 300;

/// Ticks shaved off a sapling's growth per watering.
pub const WATER_BONUS_TICKS: u64 = 50;

/// Logs in a freshly grown or seeded tree.
pub const TREE_CAPACITY: u32 = 10;

/// Gold in a freshly seeded vein.
pub const GOLD_VEIN_CAPACITY: u32 = 50;

/// Item id for wood logs.
pub const ITEM_WOOD: &str = "wood";

/// Item id for tree seeds.
pub const ITEM_TREE_SEED: &str = "tree_seed";

// ---------------------------------------------------------------------------
// Behemoths
// ---------------------------------------------------------------------------

/// Ticks a knocked-out behemoth stays unconscious.
pub const BEHEMOTH_UNCONSCIOUS_TICKS: u64 = 60;

/// Total feed needed to arm the ore-growth timer.
pub const BEHEMOTH_FEED_THRESHOLD: u32 = 10;

/// Ticks from feed threshold to ore availability.
pub const BEHEMOTH_ORE_GROWTH_TICKS: u64 = 120;

/// Route speed of a roaming behemoth, units per tick.
pub const BEHEMOTH_SPEED: f64 = 2.0;

/// Percent of max health dealt to each thrown-off climber.
pub const BEHEMOTH_THROW_OFF_PERCENT: u32 = 50;

// ---------------------------------------------------------------------------
// NPC monsters
// ---------------------------------------------------------------------------

/// Distance at which a patrolling NPC acquires a human-role target.
pub const NPC_AGGRO_RANGE: f64 = 30.0;

/// Distance beyond which a chasing NPC gives up.
pub const NPC_CHASE_RANGE: f64 = 60.0;

/// Target NPC count per alive connected human-role actor.
pub const NPC_POPULATION_RATIO: f64 = 1.5;

/// Ticks between population-control checks.
pub const NPC_SPAWN_CHECK_TICKS: u64 = 60;

/// Maximum NPCs spawned per population check.
pub const NPC_MAX_SPAWN_PER_CHECK: u32 = 3;

/// Patrol radius around an NPC's origin.
pub const NPC_PATROL_RADIUS: f64 = 40.0;

// ---------------------------------------------------------------------------
// Trades
// ---------------------------------------------------------------------------

/// Ticks before a pending trade expires.
pub const TRADE_EXPIRE_TICKS: u64 = 30;

// ---------------------------------------------------------------------------
// Seeder counts
// ---------------------------------------------------------------------------

/// Trees placed by the world seeder.
pub const SEED_TREE_COUNT: u32 = 120;

/// Gold veins placed by the world seeder.
pub const SEED_GOLD_VEIN_COUNT: u32 = 40;

/// NPCs placed by the world seeder.
pub const SEED_NPC_COUNT: u32 = 15;

/// Behemoths placed by the world seeder.
pub const SEED_BEHEMOTH_COUNT: u32 = 3;

// ---------------------------------------------------------------------------
// Role base stats
// ---------------------------------------------------------------------------

/// Base combat block for a freshly created actor of the given role.
pub const fn role_base_stats(role: Role) -> CombatStats {
    match role {
        Role::Merchant => CombatStats {
            health: 80,
            max_health: 80,
            attack: 5,
            defense: 3,
            speed: 5.0,
            vision_radius: 100.0,
        },
        Role::Fighter => CombatStats {
            health: 100,
            max_health: 100,
            attack: 15,
            defense: 10,
            speed: 5.0,
            vision_radius: 100.0,
        },
        Role::Monster => CombatStats {
            health: 120,
            max_health: 120,
            attack: 12,
            defense: 8,
            speed: 6.0,
            vision_radius: 120.0,
        },
    }
}

// ---------------------------------------------------------------------------
// NPC templates
// ---------------------------------------------------------------------------

/// Stat block and drop for one NPC template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NpcTemplate {
    /// Template name.
    pub name: &'static str,
    /// Health and max health.
    pub health: u32,
    /// Base attack.
    pub attack: u32,
    /// Base defense.
    pub defense: u32,
    /// Movement speed, units per tick.
    pub speed: f64,
    /// Gold awarded to the killer.
    pub gold_drop: u64,
}

/// The NPC templates the spawner rotates through.
pub const NPC_TEMPLATES: [NpcTemplate; 3] = [
    NpcTemplate {
        name: "wolf",
        health: 30,
        attack: 10,
        defense: 8,
        speed: 4.0,
        gold_drop: 10,
    },
    NpcTemplate {
        name: "goblin",
        health: 25,
        attack: 8,
        defense: 5,
        speed: 3.0,
        gold_drop: 8,
    },
    NpcTemplate {
        name: "bandit",
        health: 45,
        attack: 14,
        defense: 10,
        speed: 4.0,
        gold_drop: 20,
    },
];

// ---------------------------------------------------------------------------
// Behemoth templates
// ---------------------------------------------------------------------------

/// Stat block and ore kind for one behemoth type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehemothTemplate {
    /// Type name.
    pub name: &'static str,
    /// Health and max health.
    pub health: u32,
    /// Base attack.
    pub attack: u32,
    /// Base defense.
    pub defense: u32,
    /// Item id of the ore grown by this type.
    pub ore_item: &'static str,
    /// Ore ceiling.
    pub ore_max: u32,
}

/// The behemoth types placed by the seeder.
pub const BEHEMOTH_TEMPLATES: [BehemothTemplate; 3] = [
    BehemothTemplate {
        name: "ironhide",
        health: 50,
        attack: 18,
        defense: 12,
        ore_item: "iron_ore",
        ore_max: 20,
    },
    BehemothTemplate {
        name: "cragmaw",
        health: 70,
        attack: 22,
        defense: 14,
        ore_item: "crystal_ore",
        ore_max: 25,
    },
    BehemothTemplate {
        name: "ashback",
        health: 90,
        attack: 26,
        defense: 16,
        ore_item: "obsidian_ore",
        ore_max: 30,
    },
];
