//! Batch-phase execution of approved actions.
//!
//! Each handler mutates the world for one validated action. Handlers trust
//! the validator for rule checks but re-verify anything that could have
//! changed between validation and execution within the same tick (another
//! actor's action may have consumed the same resource). A failed re-check
//! skips the action without partial mutation.

use std::collections::BTreeSet;

use veldt_types::structs::Combatant;
use veldt_types::{
    Action, ActorId, ActorStatus, ChatMessage, ChatMode, ChatRecipients, EntityRef, Position,
    ResourceId, ResourceKind, ResourceNode, ResourceState, Trade, TradeId, TradeStatus,
    WorldEventKind,
};
use veldt_world::constants::{
    ACTION_COOLDOWN_TICKS, LOCAL_CHAT_RADIUS, SAPLING_GROWTH_TICKS, TREE_CAPACITY,
    WATER_BONUS_TICKS,
};
use veldt_world::world::GatherAttachment;
use veldt_world::WorldState;

use crate::{alliance, behemoth, combat, crafting, death};

/// Apply one approved action to the world.
pub fn execute(world: &mut WorldState, actor_id: ActorId, action: &Action) {
    match action {
        Action::Move { x, y } => execute_move(world, actor_id, Position::new(*x, *y)),
        Action::Gather { target_id } => execute_gather(world, actor_id, *target_id),
        Action::Attack { target_id } => execute_attack(world, actor_id, *target_id),
        Action::Craft { recipe_id } => crafting::start_job(world, actor_id, recipe_id),
        Action::Talk {
            mode,
            message,
            target_id,
        } => execute_talk(world, actor_id, *mode, message, *target_id),
        Action::Inspect { target_id } => execute_inspect(world, actor_id, *target_id),
        Action::Trade {
            target_id,
            offer,
            request,
        } => execute_trade(world, actor_id, *target_id, offer, request),
        Action::Plant { seed_id, x, y } => {
            execute_plant(world, actor_id, seed_id, Position::new(*x, *y));
        }
        Action::Water { x, y } => execute_water(world, actor_id, &Position::new(*x, *y)),
        Action::Feed {
            behemoth_id,
            item_id,
        } => execute_feed(world, actor_id, *behemoth_id, item_id),
        Action::Climb { behemoth_id } => execute_climb(world, actor_id, *behemoth_id),
        Action::FormAlliance { name } => alliance::form(world, actor_id, name),
        Action::JoinAlliance { name } => alliance::join(world, actor_id, name),
        Action::LeaveAlliance => alliance::leave(world, actor_id),
        Action::Idle => return,
    }

    // Every executed non-idle action arms the cooldown.
    let tick = world.tick;
    if let Some(actor) = world.actors.get_mut(&actor_id) {
        actor.action_cooldown_until_tick = tick.saturating_add(ACTION_COOLDOWN_TICKS);
        actor.last_action_tick = tick;
        world.mark_dirty(EntityRef::Actor(actor_id));
    }
}

/// Move: set the destination; the continuous phase does the walking.
fn execute_move(world: &mut WorldState, actor_id: ActorId, destination: Position) {
    if let Some(actor) = world.actors.get_mut(&actor_id) {
        actor.destination = Some(destination);
        actor.status = ActorStatus::Moving;
        world.mark_dirty(EntityRef::Actor(actor_id));
    }
}

/// Gather: attach the actor to the node and flip the node to being-gathered.
fn execute_gather(world: &mut WorldState, actor_id: ActorId, target: ResourceId) {
    let tick = world.tick;
    // Another actor may have claimed or depleted the node this tick.
    let Some(node) = world.resources.get_mut(&target) else {
        return;
    };
    if node.state != ResourceState::Available {
        tracing::debug!(tick, actor = %actor_id, resource = %target, "Gather target claimed mid-tick");
        return;
    }
    node.state = ResourceState::BeingGathered;
    world.mark_dirty(EntityRef::Resource(target));

    if let Some(actor) = world.actors.get_mut(&actor_id) {
        actor.status = ActorStatus::Gathering;
    }
    world
        .gathering
        .insert(actor_id, GatherAttachment {
            resource: target,
            start_tick: tick,
        });
}

/// Attack: attach a combat pair unless one already exists for this
/// attacker/target.
fn execute_attack(world: &mut WorldState, actor_id: ActorId, target_raw: u64) {
    let Some(target) = world.resolve_combatant(target_raw) else {
        return;
    };
    let attacker = Combatant::Actor(actor_id);
    combat::attach_pair(world, attacker, target);
}

/// Talk: resolve recipients per mode and buffer the message.
fn execute_talk(
    world: &mut WorldState,
    actor_id: ActorId,
    mode: ChatMode,
    message: &str,
    target_id: Option<ActorId>,
) {
    let Some(sender) = world.actors.get(&actor_id) else {
        return;
    };
    let sender_name = sender.name.clone();
    let sender_position = sender.position;

    let recipients = match mode {
        ChatMode::Whisper => {
            let mut ids = BTreeSet::new();
            ids.insert(actor_id);
            if let Some(target) = target_id {
                ids.insert(target);
            }
            ChatRecipients::Ids(ids)
        }
        ChatMode::Local => {
            let mut ids = BTreeSet::new();
            for entity in world.spatial.in_radius(&sender_position, LOCAL_CHAT_RADIUS) {
                if let EntityRef::Actor(id) = entity {
                    ids.insert(id);
                }
            }
            ids.insert(actor_id);
            ChatRecipients::Ids(ids)
        }
        ChatMode::Broadcast => ChatRecipients::All,
    };

    let id = world.allocate_message_id();
    let tick = world.tick;
    world.push_message(ChatMessage {
        id,
        tick,
        sender_id: actor_id,
        sender_name,
        mode,
        content: message.to_owned(),
        target_id,
        sender_position,
        recipients,
    });
}

/// Inspect: emit an actor-only event carrying the target's public details.
fn execute_inspect(world: &mut WorldState, actor_id: ActorId, target_raw: u64) {
    let Some(target) = world.resolve_entity(target_raw) else {
        return;
    };
    let details = inspect_details(world, target);
    world.emit(WorldEventKind::Inspect {
        actor: actor_id,
        target,
        details,
    });
}

/// The public details payload for an inspected entity.
fn inspect_details(world: &WorldState, target: EntityRef) -> serde_json::Value {
    match target {
        EntityRef::Actor(id) => world.actors.get(&id).map_or(
            serde_json::Value::Null,
            |actor| {
                serde_json::json!({
                    "name": actor.name,
                    "role": actor.role,
                    "status": actor.status,
                    "health": actor.stats.health,
                    "maxHealth": actor.stats.max_health,
                    "alliance": actor.alliance,
                    "evolutionStage": actor.evolution_stage,
                })
            },
        ),
        EntityRef::Resource(id) => world.resources.get(&id).map_or(
            serde_json::Value::Null,
            |node| {
                serde_json::json!({
                    "kind": node.kind,
                    "state": node.state,
                    "remaining": node.remaining,
                    "maxCapacity": node.max_capacity,
                })
            },
        ),
        EntityRef::Npc(id) => world.npcs.get(&id).map_or(serde_json::Value::Null, |npc| {
            serde_json::json!({
                "template": npc.template,
                "health": npc.stats.health,
                "maxHealth": npc.stats.max_health,
                "behavior": npc.behavior,
            })
        }),
        EntityRef::Behemoth(id) => world.behemoths.get(&id).map_or(
            serde_json::Value::Null,
            |behemoth| {
                serde_json::json!({
                    "kind": behemoth.kind,
                    "status": behemoth.status,
                    "health": behemoth.stats.health,
                    "maxHealth": behemoth.stats.max_health,
                    "oreAvailable": behemoth.ore_amount > 0,
                })
            },
        ),
        EntityRef::Structure(id) => world.structures.get(&id).map_or(
            serde_json::Value::Null,
            |structure| {
                serde_json::json!({
                    "kind": structure.kind,
                    "owner": structure.owner,
                    "alliance": structure.alliance,
                })
            },
        ),
    }
}

/// Trade: record a pending trade; the proposer waits in trading status.
fn execute_trade(
    world: &mut WorldState,
    actor_id: ActorId,
    target_id: ActorId,
    offer: &veldt_types::ItemBundle,
    request: &veldt_types::ItemBundle,
) {
    let tick = world.tick;
    let id = TradeId::from_raw(world.allocate_id());
    world.trades.insert(id, Trade {
        id,
        seller: actor_id,
        buyer: target_id,
        offered: offer.clone(),
        requested: request.clone(),
        status: TradeStatus::Pending,
        created_at_tick: tick,
        resolved_at_tick: None,
    });
    if let Some(actor) = world.actors.get_mut(&actor_id) {
        actor.status = ActorStatus::Trading;
        world.mark_dirty(EntityRef::Actor(actor_id));
    }
    tracing::debug!(tick, trade = %id, "Trade proposed");
}

/// Plant: consume the seed and place a growing sapling.
fn execute_plant(world: &mut WorldState, actor_id: ActorId, seed_id: &str, position: Position) {
    if !world.debit_item(actor_id, &seed_id.to_owned(), 1) {
        // The seed was spent earlier this tick; skip without mutation.
        return;
    }
    let tick = world.tick;
    let id = ResourceId::from_raw(world.allocate_id());
    world.insert_resource(ResourceNode {
        id,
        kind: ResourceKind::Sapling,
        position,
        remaining: 0,
        max_capacity: TREE_CAPACITY,
        state: ResourceState::Growing,
        growth_start_tick: Some(tick),
        growth_complete_tick: Some(tick.saturating_add(SAPLING_GROWTH_TICKS)),
    });
}

/// Water: pull the sapling's completion tick forward, never past the
/// next tick.
fn execute_water(world: &mut WorldState, _actor_id: ActorId, position: &Position) {
    let tick = world.tick;
    let Some(sapling_id) = world.sapling_at(position) else {
        return;
    };
    if let Some(node) = world.resources.get_mut(&sapling_id) {
        let floor = tick.saturating_add(1);
        node.growth_complete_tick = node
            .growth_complete_tick
            .map(|complete| complete.saturating_sub(WATER_BONUS_TICKS).max(floor));
        world.mark_dirty(EntityRef::Resource(sapling_id));
    }
}

/// Feed: consume the item and delegate to the behemoth processor.
fn execute_feed(
    world: &mut WorldState,
    actor_id: ActorId,
    behemoth_id: veldt_types::BehemothId,
    item_id: &str,
) {
    if !world.debit_item(actor_id, &item_id.to_owned(), 1) {
        return;
    }
    behemoth::feed(world, behemoth_id);
}

/// Climb: register the actor with the behemoth's climber set.
fn execute_climb(
    world: &mut WorldState,
    actor_id: ActorId,
    behemoth_id: veldt_types::BehemothId,
) {
    if let Some(actor) = world.actors.get_mut(&actor_id) {
        actor.status = ActorStatus::Climbing;
        world.mark_dirty(EntityRef::Actor(actor_id));
    }
    world.climbers.entry(behemoth_id).or_default().insert(actor_id);
}

/// Apply throw-off damage to each climber tossed by a waking behemoth.
///
/// Damage is half the behemoth's max health, clamped at zero; lethal
/// throws route through the standard death protocol with no killer.
pub fn process_throw_offs(world: &mut WorldState, throw_offs: &[(ActorId, u32)]) {
    for (actor_id, damage) in throw_offs {
        let died = {
            let Some(actor) = world.actors.get_mut(actor_id) else {
                continue;
            };
            if !actor.is_alive {
                continue;
            }
            actor.stats.health = actor.stats.health.saturating_sub(*damage);
            if actor.status == ActorStatus::Climbing {
                actor.status = ActorStatus::Idle;
            }
            actor.stats.health == 0
        };
        world.mark_dirty(EntityRef::Actor(*actor_id));
        if died {
            death::process_death(world, Combatant::Actor(*actor_id), None);
        }
    }
}
