//! End-to-end scenario tests driving the full tick pipeline.
//!
//! Each scenario feeds actions through `run_tick` exactly as the runner
//! would and checks the world afterwards. The invariant sweep runs after
//! every tick, so any step that leaves the world inconsistent fails the
//! scenario at the tick that broke it.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::BTreeMap;

use veldt_core::{TickResult, broadcast, run_tick};
use veldt_types::structs::{CombatStats, Combatant, Equipment};
use veldt_types::{
    Action, Actor, ActorId, ActorStatus, Behemoth, BehemothId, BehemothStatus, ChatMode,
    NpcBehavior, NpcId, NpcMonster, Position, QueuedAction, ResourceKind, ResourceState, Role,
    WorldEventKind,
};
use veldt_world::WorldState;
use veldt_world::constants::role_base_stats;
use veldt_world::invariants;

/// Run one tick with the given actions, assert the invariants, clear the
/// tick buffers, and hand back the result.
fn step(world: &mut WorldState, actions: Vec<QueuedAction>) -> TickResult {
    let result = run_tick(world, Vec::new(), actions);
    let violations = invariants::violations(world);
    assert!(
        violations.is_empty(),
        "invariants violated at tick {}: {violations:?}",
        result.tick
    );
    world.clear_tick_buffers();
    result
}

/// One actor proposing one action this tick.
fn act(actor: ActorId, action: Action) -> QueuedAction {
    QueuedAction {
        actor,
        action,
        client_tick: 0,
    }
}

fn spawn_actor(world: &mut WorldState, name: &str, role: Role, position: Position) -> ActorId {
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

/// A wolf that holds its ground (patrol radius 0) so range math in the
/// combat scenarios stays exact.
fn spawn_wolf(world: &mut WorldState, position: Position) -> NpcId {
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
        patrol_radius: 0.0,
        target: None,
        gold_drop: 10,
    });
    id
}

fn spawn_ironhide(world: &mut WorldState, position: Position) -> BehemothId {
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
            speed: 2.0,
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

// ---------------------------------------------------------------------------
// Scenario 1: fighter versus NPC
// ---------------------------------------------------------------------------

#[test]
fn fighter_versus_npc() {
    let mut world = WorldState::new(42);
    let fighter = spawn_actor(&mut world, "Tam", Role::Fighter, Position::new(100.0, 100.0));
    let wolf = spawn_wolf(&mut world, Position::new(103.0, 100.0));

    // Tick 1: the attack attaches the pair and the resolver lands the
    // first hit. 7 out, 1 back.
    let _ = step(&mut world, vec![act(fighter, Action::Attack {
        target_id: wolf.into_inner(),
    })]);
    assert_eq!(world.npcs.get(&wolf).unwrap().stats.health, 23);
    assert_eq!(world.actors.get(&fighter).unwrap().stats.health, 99);

    // Ticks 2-4: the exchange repeats; the wolf's own attack behavior
    // never adds a second pair.
    for _ in 0..3 {
        let _ = step(&mut world, Vec::new());
        assert_eq!(world.combat_pairs.len(), 1);
    }
    assert_eq!(world.npcs.get(&wolf).unwrap().stats.health, 2);

    // Tick 5: the wolf dies. Gold lands, the pair deactivates, the
    // fighter stands down at 96 health.
    let result = step(&mut world, Vec::new());
    assert!(!world.npcs.contains_key(&wolf));
    let fighter_state = world.actors.get(&fighter).unwrap();
    assert_eq!(fighter_state.gold, 10);
    assert_eq!(fighter_state.stats.health, 96);
    assert_eq!(fighter_state.status, ActorStatus::Idle);
    assert!(world.combat_pairs.is_empty());
    assert!(result.events.iter().any(|event| matches!(
        event.kind,
        WorldEventKind::Death {
            victim: Combatant::Npc(id),
            dropped_gold: 10,
            ..
        } if id == wolf
    )));
}

// ---------------------------------------------------------------------------
// Scenario 2: plant, water, grow
// ---------------------------------------------------------------------------

#[test]
fn merchant_plants_waters_and_grows_a_tree() {
    let mut world = WorldState::new(42);
    world.tick = 9; // the plant lands on tick 10
    let merchant = spawn_actor(&mut world, "Wren", Role::Merchant, Position::new(150.0, 150.0));
    world.credit_item(merchant, "tree_seed", 1);

    let _ = step(&mut world, vec![act(merchant, Action::Plant {
        seed_id: "tree_seed".to_owned(),
        x: 150.0,
        y: 150.0,
    })]);
    assert_eq!(world.tick, 10);
    let sapling_id = world.sapling_at(&Position::new(150.0, 150.0)).unwrap();
    assert_eq!(
        world.resources.get(&sapling_id).unwrap().growth_complete_tick,
        Some(310)
    );
    assert!(world.actors.get(&merchant).unwrap().inventory.is_empty());

    // Ticks 11-14 idle, then water on tick 15.
    for _ in 0..4 {
        let _ = step(&mut world, Vec::new());
    }
    let _ = step(&mut world, vec![act(merchant, Action::Water {
        x: 150.0,
        y: 150.0,
    })]);
    assert_eq!(world.tick, 15);
    assert_eq!(
        world.resources.get(&sapling_id).unwrap().growth_complete_tick,
        Some(260)
    );

    // Run forward to the growth tick.
    let mut grown_event_seen = false;
    while world.tick < 260 {
        let result = step(&mut world, Vec::new());
        grown_event_seen |= result.events.iter().any(|event| {
            matches!(event.kind, WorldEventKind::TreeGrown { resource } if resource == sapling_id)
        });
    }
    assert!(grown_event_seen);
    let node = world.resources.get(&sapling_id).unwrap();
    assert_eq!(node.kind, ResourceKind::Tree);
    assert_eq!(node.state, ResourceState::Available);
    assert_eq!(node.remaining, node.max_capacity);
}

// ---------------------------------------------------------------------------
// Scenario 3: behemoth feed, knockout, climb, wake
// ---------------------------------------------------------------------------

#[test]
fn behemoth_feed_knockout_climb_wake_cycle() {
    let mut world = WorldState::new(42);
    let merchant = spawn_actor(&mut world, "Wren", Role::Merchant, Position::new(405.0, 400.0));
    let fighter = spawn_actor(&mut world, "Tam", Role::Fighter, Position::new(403.0, 400.0));
    let behemoth = spawn_ironhide(&mut world, Position::new(400.0, 400.0));
    world.credit_item(merchant, "wood", 12);

    // Ten feed actions land on ticks 1-10; the ore timer arms at the
    // tenth: 10 + 120 = 130.
    for _ in 0..10 {
        let _ = step(&mut world, vec![act(merchant, Action::Feed {
            behemoth_id: behemoth,
            item_id: "wood".to_owned(),
        })]);
    }
    assert_eq!(
        world.behemoths.get(&behemoth).unwrap().ore_growth_ready_at,
        Some(130)
    );

    // At tick 130 the ore is grown.
    while world.tick < 130 {
        let _ = step(&mut world, Vec::new());
    }
    assert_eq!(world.behemoths.get(&behemoth).unwrap().ore_amount, 10);

    // The fighter lands the finishing blow; knockout happens the same
    // tick, for 60 ticks of unconsciousness.
    if let Some(b) = world.behemoths.get_mut(&behemoth) {
        b.stats.health = 3;
    }
    let result = step(&mut world, vec![act(fighter, Action::Attack {
        target_id: behemoth.into_inner(),
    })]);
    let knockout_tick = world.tick;
    assert!(result.events.iter().any(|event| matches!(
        event.kind,
        WorldEventKind::BehemothKnockout { behemoth: id } if id == behemoth
    )));
    {
        let b = world.behemoths.get(&behemoth).unwrap();
        assert_eq!(b.status, BehemothStatus::Unconscious);
        assert_eq!(b.unconscious_until_tick, Some(knockout_tick + 60));
    }

    // The merchant climbs on and mines while the behemoth is out.
    let _ = step(&mut world, vec![act(merchant, Action::Climb {
        behemoth_id: behemoth,
    })]);
    assert_eq!(
        world.actors.get(&merchant).unwrap().status,
        ActorStatus::Climbing
    );

    // Run to the wake tick.
    let mut wake_result = None;
    while world.tick < knockout_tick + 60 {
        let result = step(&mut world, Vec::new());
        if result.events.iter().any(|event| {
            matches!(event.kind, WorldEventKind::BehemothWake { behemoth: id, .. } if id == behemoth)
        }) {
            wake_result = Some(result);
        }
    }
    let wake_result = wake_result.expect("behemoth woke");
    assert!(wake_result.events.iter().any(|event| matches!(
        &event.kind,
        WorldEventKind::BehemothWake { thrown_off, .. } if thrown_off.contains(&merchant)
    )));

    // The merchant mined ore and then ate floor(50 * 0.5) = 25 damage.
    let merchant_state = world.actors.get(&merchant).unwrap();
    assert_eq!(merchant_state.stats.health, 80 - 25);
    assert_eq!(merchant_state.status, ActorStatus::Idle);
    assert_eq!(
        merchant_state.inventory.get("iron_ore").copied().unwrap_or(0),
        10
    );

    // The behemoth reset completely.
    let b = world.behemoths.get(&behemoth).unwrap();
    assert_eq!(b.status, BehemothStatus::Roaming);
    assert_eq!(b.stats.health, b.stats.max_health);
    assert_eq!(b.ore_amount, 0);
    assert_eq!(b.fed_amount, 0);
    assert!(b.unconscious_until_tick.is_none());
}

// ---------------------------------------------------------------------------
// Scenario 4: fog of war
// ---------------------------------------------------------------------------

#[test]
fn fog_of_war_hides_and_reveals() {
    let mut world = WorldState::new(42);
    let a = spawn_actor(&mut world, "A", Role::Merchant, Position::new(100.0, 100.0));
    let b = spawn_actor(&mut world, "B", Role::Fighter, Position::new(900.0, 900.0));
    let _ = step(&mut world, Vec::new());

    let updates = broadcast::build_all(&world);
    assert!(updates.get(&a).unwrap().nearby.actors.is_empty());
    assert!(updates.get(&b).unwrap().nearby.actors.is_empty());

    world.move_actor(b, Position::new(150.0, 100.0));
    let _ = step(&mut world, Vec::new());
    let updates = broadcast::build_all(&world);

    let a_view = updates.get(&a).unwrap();
    let seen = a_view.nearby.actors.first().expect("B visible to A");
    assert_eq!(seen.id, b);
    // Public view only: serialized form carries no private fields.
    let raw = serde_json::to_string(seen).unwrap();
    assert!(!raw.contains("gold"));
    assert!(!raw.contains("inventory"));
    assert!(!raw.contains("equipment"));

    let b_view = updates.get(&b).unwrap();
    assert!(b_view.nearby.actors.iter().any(|view| view.id == a));
}

// ---------------------------------------------------------------------------
// Scenario 5: local chat radius
// ---------------------------------------------------------------------------

#[test]
fn local_chat_reaches_near_but_not_far() {
    let mut world = WorldState::new(42);
    let a = spawn_actor(&mut world, "A", Role::Merchant, Position::new(100.0, 100.0));
    let b = spawn_actor(&mut world, "B", Role::Fighter, Position::new(150.0, 150.0));
    let c = spawn_actor(&mut world, "C", Role::Fighter, Position::new(300.0, 300.0));

    let result = run_tick(
        &mut world,
        Vec::new(),
        vec![act(a, Action::Talk {
            mode: ChatMode::Local,
            message: "hi".to_owned(),
            target_id: None,
        })],
    );
    assert_eq!(result.rejected.len(), 0);

    // Views are built before the buffers clear, exactly as the runner
    // does it.
    let updates = broadcast::build_all(&world);
    assert_eq!(updates.get(&b).unwrap().messages.len(), 1);
    assert_eq!(
        updates.get(&b).unwrap().messages.first().unwrap().content,
        "hi"
    );
    assert!(updates.get(&c).unwrap().messages.is_empty());
    world.clear_tick_buffers();
}

// ---------------------------------------------------------------------------
// Scenario 6: monster evolution on the fifth kill
// ---------------------------------------------------------------------------

#[test]
fn monster_evolves_on_fifth_kill() {
    let mut world = WorldState::new(42);
    let monster = spawn_actor(&mut world, "Gnash", Role::Monster, Position::new(100.0, 100.0));
    if let Some(actor) = world.actors.get_mut(&monster) {
        actor.kills = 4;
    }
    let wolf = spawn_wolf(&mut world, Position::new(103.0, 100.0));

    let _ = step(&mut world, vec![act(monster, Action::Attack {
        target_id: wolf.into_inner(),
    })]);

    // Monster ATK 12 vs wolf DEF 8: 4 damage per tick; the wolf falls on
    // the eighth hit, countering 2 per tick until then.
    let mut evolution_event = None;
    for _ in 0..10 {
        let result = step(&mut world, Vec::new());
        if let Some(event) = result.events.iter().find(|event| {
            matches!(event.kind, WorldEventKind::Evolution { actor, .. } if actor == monster)
        }) {
            evolution_event = Some(event.kind.clone());
            break;
        }
    }

    match evolution_event.expect("monster evolved") {
        WorldEventKind::Evolution {
            from_stage,
            to_stage,
            ..
        } => {
            assert_eq!(from_stage, 1);
            assert_eq!(to_stage, 2);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    let actor = world.actors.get(&monster).unwrap();
    assert_eq!(actor.kills, 5);
    assert_eq!(actor.evolution_stage, 2);
    // The wolf was eaten first (+1 attack, +3 max health), then the
    // stage-2 ratios applied: floor(13 * 1.5) and floor(123 * 1.25),
    // healed to the new ceiling.
    assert_eq!(actor.monster_eats, 1);
    assert_eq!(actor.stats.attack, 19);
    assert_eq!(actor.stats.max_health, 153);
    assert_eq!(actor.stats.health, 153);
}

// ---------------------------------------------------------------------------
// Disconnection semantics
// ---------------------------------------------------------------------------

#[test]
fn disconnect_does_not_cancel_continuous_effects() {
    let mut world = WorldState::new(42);
    let walker = spawn_actor(&mut world, "Wren", Role::Merchant, Position::new(100.0, 100.0));

    let _ = step(&mut world, vec![act(walker, Action::Move {
        x: 100.0,
        y: 200.0,
    })]);
    if let Some(actor) = world.actors.get_mut(&walker) {
        actor.connected = false;
    }

    // Movement keeps advancing while disconnected.
    let _ = step(&mut world, Vec::new());
    let actor = world.actors.get(&walker).unwrap();
    assert_eq!(actor.status, ActorStatus::Moving);
    assert!(actor.position.y > 100.0);
    // And no payload is built for the dropped connection.
    assert!(!broadcast::build_all(&world).contains_key(&walker));
}
