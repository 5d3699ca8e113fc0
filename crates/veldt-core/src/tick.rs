//! The tick pipeline: a pure function of (world, controls, actions).
//!
//! Every tick runs the same fixed order: drain controls, validate and
//! execute the drained actions, advance the continuous effects, resolve
//! combat, run the NPC / resource / behemoth / economy processors, handle
//! respawns, and top up the NPC population on its cadence. The result is
//! a [`TickResult`] the runner broadcasts and persists.
//!
//! Nothing here awaits: the loop is deterministic given an identical
//! drained set, and the same ordered inputs always yield the same world.

use std::collections::BTreeMap;

use veldt_actors::actions::{handlers, validation};
use veldt_actors::{behemoth, combat, crafting, death, gathering, movement, npc, trade};
use veldt_types::{
    ActorId, ActorStatus, EntityRef, NpcId, QueuedAction, RejectedAction, Role, WorldEvent,
    WorldEventKind,
};
use veldt_world::constants::{NPC_SPAWN_CHECK_TICKS, SPAWN_POINT, role_base_stats};
use veldt_world::{WorldState, growth};

use crate::queue::{ControlReply, ControlRequest};

/// Everything one tick produced, for broadcast and persistence.
#[derive(Debug, Clone, Default)]
pub struct TickResult {
    /// The tick number that was executed.
    pub tick: u64,
    /// Approved actions that ran, in processing order.
    pub executed: Vec<(ActorId, String)>,
    /// Rejected actions, each routed back to its actor only.
    pub rejected: Vec<RejectedAction>,
    /// Snapshot of the tick's event buffer.
    pub events: Vec<WorldEvent>,
    /// Entities mutated this tick.
    pub state_changes: Vec<EntityRef>,
    /// NPCs spawned by the population check this tick.
    pub spawns: Vec<NpcId>,
}

/// Execute one complete tick.
pub fn run_tick(
    world: &mut WorldState,
    controls: Vec<ControlRequest>,
    actions: Vec<QueuedAction>,
) -> TickResult {
    world.tick = world.tick.saturating_add(1);
    let tick = world.tick;
    tracing::debug!(tick, actions = actions.len(), "Tick started");

    // Joins, resumes, and disconnects first: a joining actor can act on
    // the next tick, never this one.
    process_controls(world, controls);

    // Validate, then execute the approved batch in drain order.
    let (executed, rejected) = resolve_actions(world, actions);

    // Continuous phase.
    movement::movement_tick(world);
    gathering::gathering_tick(world);

    // Combat resolution and pair hygiene.
    combat::combat_tick(world);
    combat::sweep_inactive(world);

    // World processors, in the fixed order.
    npc::npc_tick(world);
    growth::resource_tick(world);
    let throw_offs = behemoth::behemoth_tick(world);
    handlers::process_throw_offs(world, &throw_offs);
    trade::expire_trades(world);
    crafting::complete_jobs(world);
    death::respawn_tick(world);

    if tick.checked_rem(NPC_SPAWN_CHECK_TICKS) == Some(0) {
        npc::npc_spawn_check(world);
    }

    let events = world.tick_events.clone();
    let spawns = events
        .iter()
        .filter_map(|event| match event.kind {
            WorldEventKind::NpcSpawn { npc, .. } => Some(npc),
            _ => None,
        })
        .collect();

    TickResult {
        tick,
        executed,
        rejected,
        events,
        state_changes: world.take_dirty(),
        spawns,
    }
}

/// Apply reserves, joins, and disconnects, answering each session task.
fn process_controls(world: &mut WorldState, controls: Vec<ControlRequest>) {
    for request in controls {
        match request {
            ControlRequest::Reserve { name, reply } => {
                let response = reserve_actor(world, &name);
                // The session may have hung up; that is not our problem.
                let _ = reply.send(response);
            }
            ControlRequest::Join {
                actor_id,
                name,
                role,
                reply,
            } => {
                let response = join_actor(world, actor_id, &name, role);
                let _ = reply.send(response);
            }
            ControlRequest::Disconnect { actor_id } => {
                if let Some(actor) = world.actors.get_mut(&actor_id) {
                    actor.connected = false;
                    world.mark_dirty(EntityRef::Actor(actor_id));
                    tracing::info!(actor = %actor_id, "Actor disconnected");
                }
            }
        }
    }
}

/// Authenticate a name: resume a disconnected actor, refuse a connected
/// one, or reserve an id for a new one.
fn reserve_actor(world: &mut WorldState, name: &str) -> ControlReply {
    if let Some(existing) = world.actor_by_name(name) {
        if existing.connected {
            return ControlReply::NameTaken;
        }
        return resume_actor(world, name);
    }
    let id = ActorId::from_raw(world.allocate_id());
    tracing::debug!(actor = %id, name, "Actor id reserved");
    ControlReply::Reserved { actor_id: id }
}

/// Create a reserved actor once its role is chosen.
///
/// Role selection is permanent: a join that races an existing name keeps
/// the stored role and resumes instead.
fn join_actor(world: &mut WorldState, id: ActorId, name: &str, role: Role) -> ControlReply {
    if let Some(existing) = world.actor_by_name(name) {
        if existing.connected {
            return ControlReply::NameTaken;
        }
        return resume_actor(world, name);
    }

    let tick = world.tick;
    world.insert_actor(veldt_types::Actor {
        id,
        name: name.to_owned(),
        role,
        position: SPAWN_POINT,
        destination: None,
        status: ActorStatus::Idle,
        stats: role_base_stats(role),
        gold: 0,
        inventory: BTreeMap::new(),
        equipment: veldt_types::Equipment::default(),
        alliance: None,
        kills: 0,
        monster_eats: 0,
        evolution_stage: 1,
        action_cooldown_until_tick: 0,
        respawn_tick: None,
        last_action_tick: 0,
        connected_at_tick: tick,
        is_alive: true,
        connected: true,
    });
    tracing::info!(actor = %id, name, ?role, "Actor joined");
    ControlReply::Joined {
        actor_id: id,
        role,
        spawn_position: SPAWN_POINT,
    }
}

/// Resume a disconnected actor: same role, inventory, position, health.
fn resume_actor(world: &mut WorldState, name: &str) -> ControlReply {
    let Some(existing) = world.actor_by_name(name) else {
        return ControlReply::NameTaken;
    };
    if existing.connected {
        return ControlReply::NameTaken;
    }
    let id = existing.id;
    let role = existing.role;
    let position = existing.position;
    if let Some(actor) = world.actors.get_mut(&id) {
        actor.connected = true;
        world.mark_dirty(EntityRef::Actor(id));
    }
    tracing::info!(actor = %id, name, "Actor resumed");
    ControlReply::Resumed {
        actor_id: id,
        role,
        position,
    }
}

/// Validate and execute the drained batch in actor-id order.
fn resolve_actions(
    world: &mut WorldState,
    mut actions: Vec<QueuedAction>,
) -> (Vec<(ActorId, String)>, Vec<RejectedAction>) {
    // The queue drains in actor-id order already; sorting again costs
    // nothing and protects the determinism guarantee against a different
    // queue implementation.
    actions.sort_by_key(|action| action.actor);

    let mut executed = Vec::new();
    let mut rejected = Vec::new();
    for queued in actions {
        match validation::validate(world, queued.actor, &queued.action) {
            Ok(()) => {
                handlers::execute(world, queued.actor, &queued.action);
                executed.push((queued.actor, queued.action.name().to_owned()));
            }
            Err(reason) => {
                tracing::debug!(
                    actor = %queued.actor,
                    action = queued.action.name(),
                    reason,
                    "Action rejected"
                );
                rejected.push(RejectedAction {
                    actor: queued.actor,
                    action: queued.action.name().to_owned(),
                    reason: reason.to_owned(),
                });
            }
        }
    }
    (executed, rejected)
}
