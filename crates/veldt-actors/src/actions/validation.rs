//! Action validation: rule-checking proposals against the world.
//!
//! The validator is read-only with respect to the world. For each proposed
//! action it returns `Ok(())` or the contract rejection string that goes
//! back to the proposing actor. Checks run in a fixed order: the common
//! preconditions (exists, alive, off cooldown) first, then the
//! action-specific rules in the order the contract lists them.

use veldt_types::rejections as reject;
use veldt_types::structs::Combatant;
use veldt_types::{Action, Actor, ActorId, ChatMode, Position, ResourceKind, ResourceState, Role};
use veldt_world::WorldState;
use veldt_world::constants::{
    ATTACK_RANGE, CLIMB_RANGE, FEED_RANGE, GATHER_RANGE, TRADE_RANGE,
};

/// Validate one proposed action. Returns the contract rejection reason on
/// failure.
pub fn validate(world: &WorldState, actor_id: ActorId, action: &Action) -> Result<(), &'static str> {
    let Some(actor) = world.actors.get(&actor_id) else {
        return Err(reject::AGENT_NOT_FOUND);
    };
    if !actor.is_alive {
        return Err(reject::AGENT_IS_DEAD);
    }
    if world.tick < actor.action_cooldown_until_tick {
        return Err(reject::ON_COOLDOWN);
    }

    match action {
        Action::Move { x, y } => validate_move(*x, *y),
        Action::Gather { target_id } => validate_gather(world, actor, *target_id),
        Action::Attack { target_id } => validate_attack(world, actor, *target_id),
        Action::Craft { .. } => validate_craft(actor),
        Action::Talk {
            mode,
            message,
            target_id,
        } => validate_talk(world, *mode, message, *target_id),
        Action::Inspect { target_id } => validate_inspect(world, *target_id),
        Action::Trade {
            target_id,
            offer,
            ..
        } => validate_trade(world, actor, *target_id, offer),
        Action::Plant { seed_id, x, y } => validate_plant(actor, seed_id, *x, *y),
        Action::Water { x, y } => validate_water(world, actor, *x, *y),
        Action::Feed {
            behemoth_id,
            item_id,
        } => validate_feed(world, actor, *behemoth_id, item_id),
        Action::Climb { behemoth_id } => validate_climb(world, actor, *behemoth_id),
        Action::FormAlliance { name } => validate_form_alliance(world, actor, name),
        Action::JoinAlliance { name } => validate_join_alliance(world, actor, name),
        Action::LeaveAlliance => validate_leave_alliance(actor),
        Action::Idle => Ok(()),
    }
}

/// Move: the destination must be inside world bounds.
fn validate_move(x: f64, y: f64) -> Result<(), &'static str> {
    if Position::new(x, y).in_bounds() {
        Ok(())
    } else {
        Err(reject::DESTINATION_OUT_OF_BOUNDS)
    }
}

/// Gather: node exists, in range, available, role permits the node kind.
fn validate_gather(
    world: &WorldState,
    actor: &Actor,
    target_id: veldt_types::ResourceId,
) -> Result<(), &'static str> {
    let Some(node) = world.resources.get(&target_id) else {
        return Err(reject::RESOURCE_NOT_FOUND);
    };
    if actor.position.distance_to(&node.position) > GATHER_RANGE {
        return Err(reject::TOO_FAR);
    }
    if node.state != ResourceState::Available {
        return Err(reject::RESOURCE_UNAVAILABLE);
    }
    match actor.role {
        Role::Monster => Err(reject::MONSTERS_CANNOT_GATHER),
        Role::Fighter if node.kind != ResourceKind::GoldVein => {
            Err(reject::FIGHTERS_ONLY_MINE_GOLD)
        }
        Role::Merchant if node.kind == ResourceKind::GoldVein => {
            Err(reject::MERCHANTS_CANNOT_MINE_GOLD)
        }
        Role::Merchant | Role::Fighter => Ok(()),
    }
}

/// Attack: target exists, in range, not self, role gating.
fn validate_attack(world: &WorldState, actor: &Actor, target_id: u64) -> Result<(), &'static str> {
    let Some(target) = world.resolve_combatant(target_id) else {
        return Err(reject::TARGET_NOT_FOUND);
    };
    let Some(target_position) = world.combatant_position(target) else {
        return Err(reject::TARGET_NOT_FOUND);
    };
    if actor.position.distance_to(&target_position) > ATTACK_RANGE {
        return Err(reject::TOO_FAR);
    }
    if target == Combatant::Actor(actor.id) {
        return Err(reject::CANNOT_ATTACK_SELF);
    }
    match actor.role {
        Role::Merchant => Err(reject::MERCHANTS_CANNOT_ATTACK),
        Role::Fighter => match target {
            Combatant::Actor(other_id) => {
                match world.actors.get(&other_id).map(|other| other.role) {
                    Some(Role::Fighter) => Err(reject::FIGHTERS_CANNOT_ATTACK_FIGHTERS),
                    Some(Role::Merchant) => Err(reject::FIGHTERS_CANNOT_ATTACK_MERCHANTS),
                    Some(Role::Monster) => Ok(()),
                    None => Err(reject::TARGET_NOT_FOUND),
                }
            }
            Combatant::Npc(_) | Combatant::Behemoth(_) => Ok(()),
        },
        Role::Monster => match target {
            // Monsters prey on anything that is not a monster actor.
            Combatant::Actor(other_id) => {
                match world.actors.get(&other_id).map(|other| other.role) {
                    Some(Role::Monster) => Err(reject::TARGET_NOT_FOUND),
                    Some(Role::Merchant | Role::Fighter) => Ok(()),
                    None => Err(reject::TARGET_NOT_FOUND),
                }
            }
            Combatant::Npc(_) | Combatant::Behemoth(_) => Ok(()),
        },
    }
}

/// Craft: merchants only.
fn validate_craft(actor: &Actor) -> Result<(), &'static str> {
    if actor.role == Role::Merchant {
        Ok(())
    } else {
        Err(reject::ONLY_MERCHANTS_CRAFT)
    }
}

/// Talk: non-empty content; whispers need an existing target.
fn validate_talk(
    world: &WorldState,
    mode: ChatMode,
    message: &str,
    target_id: Option<ActorId>,
) -> Result<(), &'static str> {
    if message.trim().is_empty() {
        return Err(reject::MESSAGE_EMPTY);
    }
    if mode == ChatMode::Whisper {
        let target_exists =
            target_id.is_some_and(|id| world.actors.contains_key(&id));
        if !target_exists {
            return Err(reject::WHISPER_TARGET_NOT_FOUND);
        }
    }
    Ok(())
}

/// Inspect: the target must exist in some entity map.
fn validate_inspect(world: &WorldState, target_id: u64) -> Result<(), &'static str> {
    if world.resolve_entity(target_id).is_some() {
        Ok(())
    } else {
        Err(reject::TARGET_NOT_FOUND)
    }
}

/// Trade: not self, target exists and in range, offer covered.
fn validate_trade(
    world: &WorldState,
    actor: &Actor,
    target_id: ActorId,
    offer: &veldt_types::ItemBundle,
) -> Result<(), &'static str> {
    if target_id == actor.id {
        return Err(reject::CANNOT_TRADE_SELF);
    }
    let Some(target) = world.actors.get(&target_id) else {
        return Err(reject::TARGET_NOT_FOUND);
    };
    if actor.position.distance_to(&target.position) > TRADE_RANGE {
        return Err(reject::TOO_FAR);
    }
    if !covers_bundle(actor, offer) {
        return Err(reject::INSUFFICIENT_TRADE_OFFER);
    }
    Ok(())
}

/// Whether the actor's holdings cover a bundle.
pub fn covers_bundle(actor: &Actor, bundle: &veldt_types::ItemBundle) -> bool {
    if actor.gold < bundle.gold {
        return false;
    }
    bundle
        .items
        .iter()
        .all(|(item, quantity)| actor.inventory.get(item).copied().unwrap_or(0) >= *quantity)
}

/// Plant: merchants only, seed in inventory, position in bounds.
fn validate_plant(actor: &Actor, seed_id: &str, x: f64, y: f64) -> Result<(), &'static str> {
    if actor.role != Role::Merchant {
        return Err(reject::ONLY_MERCHANTS_PLANT);
    }
    if actor.inventory.get(seed_id).copied().unwrap_or(0) == 0 {
        return Err(reject::NO_SEED_IN_INVENTORY);
    }
    if !Position::new(x, y).in_bounds() {
        return Err(reject::DESTINATION_OUT_OF_BOUNDS);
    }
    Ok(())
}

/// Water: merchants only, a sapling must exist at the position.
fn validate_water(world: &WorldState, actor: &Actor, x: f64, y: f64) -> Result<(), &'static str> {
    if actor.role != Role::Merchant {
        return Err(reject::ONLY_MERCHANTS_WATER);
    }
    if world.sapling_at(&Position::new(x, y)).is_none() {
        return Err(reject::NO_SAPLING_AT_POSITION);
    }
    Ok(())
}

/// Feed: behemoth exists, in range, item in inventory.
fn validate_feed(
    world: &WorldState,
    actor: &Actor,
    behemoth_id: veldt_types::BehemothId,
    item_id: &str,
) -> Result<(), &'static str> {
    let Some(behemoth) = world.behemoths.get(&behemoth_id) else {
        return Err(reject::TARGET_NOT_FOUND);
    };
    if actor.position.distance_to(&behemoth.position) > FEED_RANGE {
        return Err(reject::TOO_FAR);
    }
    if actor.inventory.get(item_id).copied().unwrap_or(0) == 0 {
        return Err(reject::NO_FOOD_IN_INVENTORY);
    }
    Ok(())
}

/// Climb: merchants only, behemoth exists, unconscious, in range.
fn validate_climb(
    world: &WorldState,
    actor: &Actor,
    behemoth_id: veldt_types::BehemothId,
) -> Result<(), &'static str> {
    if actor.role != Role::Merchant {
        return Err(reject::ONLY_MERCHANTS_CLIMB);
    }
    let Some(behemoth) = world.behemoths.get(&behemoth_id) else {
        return Err(reject::TARGET_NOT_FOUND);
    };
    if behemoth.status != veldt_types::BehemothStatus::Unconscious {
        return Err(reject::BEHEMOTH_NOT_UNCONSCIOUS);
    }
    if actor.position.distance_to(&behemoth.position) > CLIMB_RANGE {
        return Err(reject::TOO_FAR);
    }
    Ok(())
}

/// Form alliance: not already in one, name free.
fn validate_form_alliance(
    world: &WorldState,
    actor: &Actor,
    name: &str,
) -> Result<(), &'static str> {
    if actor.alliance.is_some() {
        return Err(reject::ALREADY_IN_ALLIANCE);
    }
    if world.alliances.contains_key(name) {
        return Err(reject::ALLIANCE_NAME_TAKEN);
    }
    Ok(())
}

/// Join alliance: alliance exists, not already in one.
fn validate_join_alliance(
    world: &WorldState,
    actor: &Actor,
    name: &str,
) -> Result<(), &'static str> {
    if !world.alliances.contains_key(name) {
        return Err(reject::ALLIANCE_NOT_FOUND);
    }
    if actor.alliance.is_some() {
        return Err(reject::ALREADY_IN_ALLIANCE);
    }
    Ok(())
}

/// Leave alliance: must be a member somewhere.
fn validate_leave_alliance(actor: &Actor) -> Result<(), &'static str> {
    if actor.alliance.is_some() {
        Ok(())
    } else {
        Err(reject::NOT_IN_ALLIANCE)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use veldt_types::ItemBundle;

    use crate::testutil::{empty_world, give_item, spawn_actor, spawn_behemoth, spawn_tree, spawn_vein};

    use super::*;

    #[test]
    fn unknown_actor_is_rejected() {
        let world = empty_world();
        let result = validate(&world, ActorId::from_raw(99), &Action::Idle);
        assert_eq!(result, Err(reject::AGENT_NOT_FOUND));
    }

    #[test]
    fn dead_actor_is_rejected() {
        let mut world = empty_world();
        let id = spawn_actor(&mut world, "Wren", Role::Fighter, Position::new(0.0, 0.0));
        if let Some(actor) = world.actors.get_mut(&id) {
            actor.is_alive = false;
            actor.status = veldt_types::ActorStatus::Dead;
            actor.stats.health = 0;
        }
        assert_eq!(
            validate(&world, id, &Action::Idle),
            Err(reject::AGENT_IS_DEAD)
        );
    }

    #[test]
    fn cooldown_blocks_until_elapsed() {
        let mut world = empty_world();
        let id = spawn_actor(&mut world, "Wren", Role::Fighter, Position::new(0.0, 0.0));
        if let Some(actor) = world.actors.get_mut(&id) {
            actor.action_cooldown_until_tick = 5;
        }
        world.tick = 4;
        assert_eq!(
            validate(&world, id, &Action::Idle),
            Err(reject::ON_COOLDOWN)
        );
        world.tick = 5;
        assert!(validate(&world, id, &Action::Idle).is_ok());
    }

    #[test]
    fn move_bounds_are_enforced() {
        let mut world = empty_world();
        let id = spawn_actor(&mut world, "Wren", Role::Fighter, Position::new(0.0, 0.0));
        assert_eq!(
            validate(&world, id, &Action::Move { x: 1000.0, y: 10.0 }),
            Err(reject::DESTINATION_OUT_OF_BOUNDS)
        );
        assert!(validate(&world, id, &Action::Move { x: 999.0, y: 10.0 }).is_ok());
    }

    #[test]
    fn gather_role_gating() {
        let mut world = empty_world();
        let merchant = spawn_actor(&mut world, "Wren", Role::Merchant, Position::new(100.0, 100.0));
        let fighter = spawn_actor(&mut world, "Tam", Role::Fighter, Position::new(100.0, 100.0));
        let monster = spawn_actor(&mut world, "Gnash", Role::Monster, Position::new(100.0, 100.0));
        let tree = spawn_tree(&mut world, Position::new(102.0, 100.0));
        let vein = spawn_vein(&mut world, Position::new(101.0, 100.0));

        assert!(validate(&world, merchant, &Action::Gather { target_id: tree }).is_ok());
        assert_eq!(
            validate(&world, merchant, &Action::Gather { target_id: vein }),
            Err(reject::MERCHANTS_CANNOT_MINE_GOLD)
        );
        assert_eq!(
            validate(&world, fighter, &Action::Gather { target_id: tree }),
            Err(reject::FIGHTERS_ONLY_MINE_GOLD)
        );
        assert!(validate(&world, fighter, &Action::Gather { target_id: vein }).is_ok());
        assert_eq!(
            validate(&world, monster, &Action::Gather { target_id: tree }),
            Err(reject::MONSTERS_CANNOT_GATHER)
        );
    }

    #[test]
    fn gather_range_and_state() {
        let mut world = empty_world();
        let merchant = spawn_actor(&mut world, "Wren", Role::Merchant, Position::new(100.0, 100.0));
        let far_tree = spawn_tree(&mut world, Position::new(200.0, 100.0));
        assert_eq!(
            validate(&world, merchant, &Action::Gather { target_id: far_tree }),
            Err(reject::TOO_FAR)
        );
        let near_tree = spawn_tree(&mut world, Position::new(102.0, 100.0));
        if let Some(node) = world.resources.get_mut(&near_tree) {
            node.state = ResourceState::Depleted;
            node.remaining = 0;
        }
        assert_eq!(
            validate(&world, merchant, &Action::Gather { target_id: near_tree }),
            Err(reject::RESOURCE_UNAVAILABLE)
        );
        assert_eq!(
            validate(
                &world,
                merchant,
                &Action::Gather {
                    target_id: veldt_types::ResourceId::from_raw(9999)
                }
            ),
            Err(reject::RESOURCE_NOT_FOUND)
        );
    }

    #[test]
    fn attack_role_gating() {
        let mut world = empty_world();
        let merchant = spawn_actor(&mut world, "Wren", Role::Merchant, Position::new(100.0, 100.0));
        let fighter = spawn_actor(&mut world, "Tam", Role::Fighter, Position::new(101.0, 100.0));
        let fighter2 = spawn_actor(&mut world, "Bryn", Role::Fighter, Position::new(102.0, 100.0));
        let monster = spawn_actor(&mut world, "Gnash", Role::Monster, Position::new(103.0, 100.0));

        assert_eq!(
            validate(&world, merchant, &Action::Attack { target_id: fighter.into_inner() }),
            Err(reject::MERCHANTS_CANNOT_ATTACK)
        );
        assert_eq!(
            validate(&world, fighter, &Action::Attack { target_id: fighter2.into_inner() }),
            Err(reject::FIGHTERS_CANNOT_ATTACK_FIGHTERS)
        );
        assert_eq!(
            validate(&world, fighter, &Action::Attack { target_id: merchant.into_inner() }),
            Err(reject::FIGHTERS_CANNOT_ATTACK_MERCHANTS)
        );
        assert!(
            validate(&world, fighter, &Action::Attack { target_id: monster.into_inner() }).is_ok()
        );
        assert!(
            validate(&world, monster, &Action::Attack { target_id: merchant.into_inner() })
                .is_ok()
        );
        assert_eq!(
            validate(&world, fighter, &Action::Attack { target_id: fighter.into_inner() }),
            Err(reject::CANNOT_ATTACK_SELF)
        );
    }

    #[test]
    fn attack_range_is_checked_before_roles() {
        let mut world = empty_world();
        let merchant = spawn_actor(&mut world, "Wren", Role::Merchant, Position::new(100.0, 100.0));
        let fighter = spawn_actor(&mut world, "Tam", Role::Fighter, Position::new(500.0, 500.0));
        assert_eq!(
            validate(&world, merchant, &Action::Attack { target_id: fighter.into_inner() }),
            Err(reject::TOO_FAR)
        );
    }

    #[test]
    fn talk_rules() {
        let mut world = empty_world();
        let sender = spawn_actor(&mut world, "Wren", Role::Merchant, Position::new(100.0, 100.0));
        assert_eq!(
            validate(
                &world,
                sender,
                &Action::Talk {
                    mode: ChatMode::Local,
                    message: "   ".to_owned(),
                    target_id: None
                }
            ),
            Err(reject::MESSAGE_EMPTY)
        );
        assert_eq!(
            validate(
                &world,
                sender,
                &Action::Talk {
                    mode: ChatMode::Whisper,
                    message: "psst".to_owned(),
                    target_id: Some(ActorId::from_raw(999))
                }
            ),
            Err(reject::WHISPER_TARGET_NOT_FOUND)
        );
    }

    #[test]
    fn trade_rules() {
        let mut world = empty_world();
        let seller = spawn_actor(&mut world, "Wren", Role::Merchant, Position::new(100.0, 100.0));
        let near = spawn_actor(&mut world, "Moss", Role::Merchant, Position::new(105.0, 100.0));
        let far = spawn_actor(&mut world, "Fen", Role::Merchant, Position::new(500.0, 500.0));

        assert_eq!(
            validate(
                &world,
                seller,
                &Action::Trade {
                    target_id: seller,
                    offer: ItemBundle::default(),
                    request: ItemBundle::default()
                }
            ),
            Err(reject::CANNOT_TRADE_SELF)
        );
        assert_eq!(
            validate(
                &world,
                seller,
                &Action::Trade {
                    target_id: far,
                    offer: ItemBundle::default(),
                    request: ItemBundle::default()
                }
            ),
            Err(reject::TOO_FAR)
        );
        let rich_offer = ItemBundle {
            gold: 10,
            items: std::collections::BTreeMap::new(),
        };
        assert_eq!(
            validate(
                &world,
                seller,
                &Action::Trade {
                    target_id: near,
                    offer: rich_offer,
                    request: ItemBundle::default()
                }
            ),
            Err(reject::INSUFFICIENT_TRADE_OFFER)
        );
    }

    #[test]
    fn merchant_only_actions() {
        let mut world = empty_world();
        let fighter = spawn_actor(&mut world, "Tam", Role::Fighter, Position::new(100.0, 100.0));
        let behemoth = spawn_behemoth(&mut world, Position::new(105.0, 100.0));
        assert_eq!(
            validate(&world, fighter, &Action::Craft { recipe_id: "wooden_sword".to_owned() }),
            Err(reject::ONLY_MERCHANTS_CRAFT)
        );
        assert_eq!(
            validate(
                &world,
                fighter,
                &Action::Plant {
                    seed_id: "tree_seed".to_owned(),
                    x: 100.0,
                    y: 100.0
                }
            ),
            Err(reject::ONLY_MERCHANTS_PLANT)
        );
        assert_eq!(
            validate(&world, fighter, &Action::Water { x: 100.0, y: 100.0 }),
            Err(reject::ONLY_MERCHANTS_WATER)
        );
        assert_eq!(
            validate(&world, fighter, &Action::Climb { behemoth_id: behemoth }),
            Err(reject::ONLY_MERCHANTS_CLIMB)
        );
    }

    #[test]
    fn climb_needs_an_unconscious_behemoth() {
        let mut world = empty_world();
        let merchant = spawn_actor(&mut world, "Wren", Role::Merchant, Position::new(100.0, 100.0));
        let behemoth = spawn_behemoth(&mut world, Position::new(105.0, 100.0));
        assert_eq!(
            validate(&world, merchant, &Action::Climb { behemoth_id: behemoth }),
            Err(reject::BEHEMOTH_NOT_UNCONSCIOUS)
        );
        if let Some(b) = world.behemoths.get_mut(&behemoth) {
            b.status = veldt_types::BehemothStatus::Unconscious;
            b.stats.health = 0;
            b.unconscious_until_tick = Some(100);
        }
        assert!(validate(&world, merchant, &Action::Climb { behemoth_id: behemoth }).is_ok());
    }

    #[test]
    fn feed_needs_the_item() {
        let mut world = empty_world();
        let merchant = spawn_actor(&mut world, "Wren", Role::Merchant, Position::new(100.0, 100.0));
        let behemoth = spawn_behemoth(&mut world, Position::new(105.0, 100.0));
        assert_eq!(
            validate(
                &world,
                merchant,
                &Action::Feed {
                    behemoth_id: behemoth,
                    item_id: "wood".to_owned()
                }
            ),
            Err(reject::NO_FOOD_IN_INVENTORY)
        );
        give_item(&mut world, merchant, "wood", 1);
        assert!(
            validate(
                &world,
                merchant,
                &Action::Feed {
                    behemoth_id: behemoth,
                    item_id: "wood".to_owned()
                }
            )
            .is_ok()
        );
    }

    #[test]
    fn alliance_rules() {
        let mut world = empty_world();
        let founder = spawn_actor(&mut world, "Wren", Role::Merchant, Position::new(0.0, 0.0));
        let other = spawn_actor(&mut world, "Moss", Role::Fighter, Position::new(0.0, 0.0));

        assert_eq!(
            validate(&world, founder, &Action::LeaveAlliance),
            Err(reject::NOT_IN_ALLIANCE)
        );
        assert_eq!(
            validate(&world, other, &Action::JoinAlliance { name: "north".to_owned() }),
            Err(reject::ALLIANCE_NOT_FOUND)
        );

        crate::alliance::form(&mut world, founder, "north");
        assert_eq!(
            validate(&world, founder, &Action::FormAlliance { name: "south".to_owned() }),
            Err(reject::ALREADY_IN_ALLIANCE)
        );
        assert_eq!(
            validate(&world, other, &Action::FormAlliance { name: "north".to_owned() }),
            Err(reject::ALLIANCE_NAME_TAKEN)
        );
        assert!(
            validate(&world, other, &Action::JoinAlliance { name: "north".to_owned() }).is_ok()
        );
    }

    #[test]
    fn water_needs_a_sapling() {
        let mut world = empty_world();
        let merchant = spawn_actor(&mut world, "Wren", Role::Merchant, Position::new(100.0, 100.0));
        assert_eq!(
            validate(&world, merchant, &Action::Water { x: 100.0, y: 100.0 }),
            Err(reject::NO_SAPLING_AT_POSITION)
        );
    }

    #[test]
    fn inspect_needs_an_existing_target() {
        let mut world = empty_world();
        let merchant = spawn_actor(&mut world, "Wren", Role::Merchant, Position::new(100.0, 100.0));
        let tree = spawn_tree(&mut world, Position::new(900.0, 900.0));
        assert!(
            validate(&world, merchant, &Action::Inspect { target_id: tree.into_inner() }).is_ok()
        );
        assert_eq!(
            validate(&world, merchant, &Action::Inspect { target_id: 9999 }),
            Err(reject::TARGET_NOT_FOUND)
        );
    }
}
