//! Crafting recipes, job timers, and equipment bonuses.
//!
//! Recipes consume their inputs when the job starts and produce the output
//! when the completion tick arrives. Outputs that fit an empty equipment
//! slot are equipped on completion.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use veldt_types::{
    ActorId, ActorStatus, CraftJobId, CraftingJob, EntityRef, EquipSlot, ItemBundle, Recipe,
    WorldEventKind,
};
use veldt_world::WorldState;

use crate::actions::validation;

/// The recipe book. Keyed by recipe id, which doubles as the output item id.
static RECIPES: LazyLock<BTreeMap<&'static str, Recipe>> = LazyLock::new(|| {
    let mut book = BTreeMap::new();
    book.insert("wooden_sword", Recipe {
        id: "wooden_sword".to_owned(),
        inputs: bundle(10, &[("wood", 5)]),
        craft_ticks: 10,
        slot: Some(EquipSlot::Weapon),
        bonus: 5,
    });
    book.insert("iron_sword", Recipe {
        id: "iron_sword".to_owned(),
        inputs: bundle(20, &[("iron_ore", 3)]),
        craft_ticks: 20,
        slot: Some(EquipSlot::Weapon),
        bonus: 12,
    });
    book.insert("wooden_shield", Recipe {
        id: "wooden_shield".to_owned(),
        inputs: bundle(5, &[("wood", 8)]),
        craft_ticks: 10,
        slot: Some(EquipSlot::Armor),
        bonus: 4,
    });
    book.insert("iron_plate", Recipe {
        id: "iron_plate".to_owned(),
        inputs: bundle(30, &[("iron_ore", 5)]),
        craft_ticks: 25,
        slot: Some(EquipSlot::Armor),
        bonus: 10,
    });
    book.insert("lumber_axe", Recipe {
        id: "lumber_axe".to_owned(),
        inputs: bundle(5, &[("wood", 4)]),
        craft_ticks: 8,
        slot: Some(EquipSlot::Tool),
        bonus: 0,
    });
    book
});

/// Build an input bundle from gold plus item pairs.
fn bundle(gold: u64, items: &[(&str, u32)]) -> ItemBundle {
    ItemBundle {
        gold,
        items: items
            .iter()
            .map(|(item, quantity)| ((*item).to_owned(), *quantity))
            .collect(),
    }
}

/// Look up a recipe by id.
pub fn recipe(id: &str) -> Option<&'static Recipe> {
    RECIPES.get(id)
}

/// The attack bonus granted by an equipped weapon item.
pub fn weapon_bonus(item: &str) -> Option<u32> {
    RECIPES
        .get(item)
        .filter(|recipe| recipe.slot == Some(EquipSlot::Weapon))
        .map(|recipe| recipe.bonus)
}

/// The defense bonus granted by an equipped armor item.
pub fn armor_bonus(item: &str) -> Option<u32> {
    RECIPES
        .get(item)
        .filter(|recipe| recipe.slot == Some(EquipSlot::Armor))
        .map(|recipe| recipe.bonus)
}

/// Start a crafting job: consume inputs now, produce at the completion
/// tick.
///
/// The validator only gates on role; the recipe lookup and the holdings
/// re-check happen here because another action this tick may have spent
/// the same inputs.
pub fn start_job(world: &mut WorldState, actor_id: ActorId, recipe_id: &str) {
    let tick = world.tick;
    let Some(recipe) = recipe(recipe_id) else {
        tracing::debug!(tick, actor = %actor_id, recipe = recipe_id, "Unknown recipe");
        return;
    };
    let covered = world
        .actors
        .get(&actor_id)
        .is_some_and(|actor| validation::covers_bundle(actor, &recipe.inputs));
    if !covered {
        tracing::debug!(tick, actor = %actor_id, recipe = recipe_id, "Inputs no longer covered");
        return;
    }

    // Consume inputs atomically: the coverage check above guarantees every
    // debit below succeeds.
    if let Some(actor) = world.actors.get_mut(&actor_id) {
        actor.gold = actor.gold.saturating_sub(recipe.inputs.gold);
    }
    for (item, quantity) in &recipe.inputs.items {
        let _ = world.debit_item(actor_id, item, *quantity);
    }

    let id = CraftJobId::from_raw(world.allocate_id());
    world.crafting_jobs.insert(id, CraftingJob {
        id,
        actor: actor_id,
        recipe: recipe.id.clone(),
        start_tick: tick,
        complete_tick: tick.saturating_add(recipe.craft_ticks),
    });
    if let Some(actor) = world.actors.get_mut(&actor_id) {
        actor.status = ActorStatus::Crafting;
        world.mark_dirty(EntityRef::Actor(actor_id));
    }
    tracing::debug!(tick, actor = %actor_id, recipe = recipe_id, "Crafting started");
}

/// Complete every job whose timer has elapsed.
pub fn complete_jobs(world: &mut WorldState) {
    let tick = world.tick;
    let due: Vec<CraftJobId> = world
        .crafting_jobs
        .values()
        .filter(|job| job.complete_tick <= tick)
        .map(|job| job.id)
        .collect();

    for id in due {
        let Some(job) = world.crafting_jobs.remove(&id) else {
            continue;
        };
        world.credit_item(job.actor, &job.recipe, 1);

        if let Some(actor) = world.actors.get_mut(&job.actor) {
            // Auto-equip into an empty matching slot.
            if let Some(slot) = recipe(&job.recipe).and_then(|recipe| recipe.slot) {
                let slot_ref = match slot {
                    EquipSlot::Weapon => &mut actor.equipment.weapon,
                    EquipSlot::Armor => &mut actor.equipment.armor,
                    EquipSlot::Tool => &mut actor.equipment.tool,
                };
                if slot_ref.is_none() {
                    *slot_ref = Some(job.recipe.clone());
                }
            }
            if actor.is_alive && actor.status == ActorStatus::Crafting {
                actor.status = ActorStatus::Idle;
            }
            world.mark_dirty(EntityRef::Actor(job.actor));
        }

        world.emit(WorldEventKind::CraftComplete {
            actor: job.actor,
            recipe: job.recipe.clone(),
            item: job.recipe,
        });
    }
}
