//! The authoritative in-memory world state.
//!
//! One [`WorldState`] owns every entity map, the spatial index, the seeded
//! PRNG, and the tick-scoped buffers. All mutation flows through it: the
//! tick pipeline borrows it `&mut` for the duration of a tick, and nothing
//! else ever writes. Entity maps are `BTreeMap`s so that every iteration
//! during a tick is deterministic.

use std::collections::{BTreeMap, BTreeSet};

use veldt_types::structs::{Combatant, ItemId};
use veldt_types::{
    Actor, ActorId, Alliance, Behemoth, BehemothId, ChatMessage, CombatPair, CraftJobId,
    CraftingJob, EntityRef, EventId, MessageId, NpcId, NpcMonster, Position, ResourceId,
    ResourceNode, Structure, StructureId, Trade, TradeId, WorldEvent, WorldEventKind,
};

use crate::rng::WorldRng;
use crate::spatial::SpatialIndex;

/// An actor's attachment to the resource node it is gathering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatherAttachment {
    /// The node being gathered.
    pub resource: ResourceId,
    /// Tick the gather began; fixes the payout cadence.
    pub start_tick: u64,
}

/// The complete authoritative world.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldState {
    /// The world seed; all randomness derives from it.
    pub seed: u64,
    /// The current tick number.
    pub tick: u64,
    /// The world's single pseudo-random source.
    pub rng: WorldRng,
    /// All actors ever connected, keyed by id.
    pub actors: BTreeMap<ActorId, Actor>,
    /// All resource nodes.
    pub resources: BTreeMap<ResourceId, ResourceNode>,
    /// All living NPC monsters. Dead NPCs are removed outright.
    pub npcs: BTreeMap<NpcId, NpcMonster>,
    /// All behemoths.
    pub behemoths: BTreeMap<BehemothId, Behemoth>,
    /// All built structures.
    pub structures: BTreeMap<StructureId, Structure>,
    /// Alliances keyed by name (the primary key).
    pub alliances: BTreeMap<String, Alliance>,
    /// Trades, live and resolved.
    pub trades: BTreeMap<TradeId, Trade>,
    /// In-flight crafting jobs.
    pub crafting_jobs: BTreeMap<CraftJobId, CraftingJob>,
    /// Active and recently deactivated combat pairs, in attachment order.
    /// Transient: not persisted, rebuilt empty after a restore.
    pub combat_pairs: Vec<CombatPair>,
    /// Actors registered as climbing each behemoth. Transient.
    pub climbers: BTreeMap<BehemothId, BTreeSet<ActorId>>,
    /// Gather attachments, keyed by the gathering actor. Transient.
    pub gathering: BTreeMap<ActorId, GatherAttachment>,
    /// Chunk-grid index over every positioned entity.
    pub spatial: SpatialIndex,
    /// Chat messages sent this tick; cleared after broadcast.
    pub tick_messages: Vec<ChatMessage>,
    /// Events emitted this tick; cleared after broadcast.
    pub tick_events: Vec<WorldEvent>,
    /// Next raw id to hand out. One counter for all entity kinds keeps
    /// every raw id globally unambiguous.
    next_id: u64,
    /// Entities mutated this tick, drained into the tick result.
    dirty: BTreeSet<EntityRef>,
}

impl WorldState {
    /// Create an empty world from a seed.
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            tick: 0,
            rng: WorldRng::new(seed),
            actors: BTreeMap::new(),
            resources: BTreeMap::new(),
            npcs: BTreeMap::new(),
            behemoths: BTreeMap::new(),
            structures: BTreeMap::new(),
            alliances: BTreeMap::new(),
            trades: BTreeMap::new(),
            crafting_jobs: BTreeMap::new(),
            combat_pairs: Vec::new(),
            climbers: BTreeMap::new(),
            gathering: BTreeMap::new(),
            spatial: SpatialIndex::new(),
            tick_messages: Vec::new(),
            tick_events: Vec::new(),
            next_id: 1,
            dirty: BTreeSet::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Id allocation
    // -----------------------------------------------------------------------

    /// Hand out the next raw id.
    pub const fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// The next raw id that would be handed out, for persistence.
    pub const fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Restore the id counter after a snapshot load.
    pub const fn set_next_id(&mut self, next_id: u64) {
        self.next_id = next_id;
    }

    // -----------------------------------------------------------------------
    // Entity insertion and removal (spatial index kept in lockstep)
    // -----------------------------------------------------------------------

    /// Insert an actor and index its position.
    pub fn insert_actor(&mut self, actor: Actor) {
        self.spatial.add(EntityRef::Actor(actor.id), actor.position);
        self.mark_dirty(EntityRef::Actor(actor.id));
        self.actors.insert(actor.id, actor);
    }

    /// Insert a resource node and index its position.
    pub fn insert_resource(&mut self, resource: ResourceNode) {
        self.spatial
            .add(EntityRef::Resource(resource.id), resource.position);
        self.mark_dirty(EntityRef::Resource(resource.id));
        self.resources.insert(resource.id, resource);
    }

    /// Insert an NPC and index its position.
    pub fn insert_npc(&mut self, npc: NpcMonster) {
        self.spatial.add(EntityRef::Npc(npc.id), npc.position);
        self.mark_dirty(EntityRef::Npc(npc.id));
        self.npcs.insert(npc.id, npc);
    }

    /// Insert a behemoth and index its position.
    pub fn insert_behemoth(&mut self, behemoth: Behemoth) {
        self.spatial
            .add(EntityRef::Behemoth(behemoth.id), behemoth.position);
        self.mark_dirty(EntityRef::Behemoth(behemoth.id));
        self.behemoths.insert(behemoth.id, behemoth);
    }

    /// Insert a structure and index its position.
    pub fn insert_structure(&mut self, structure: Structure) {
        self.spatial
            .add(EntityRef::Structure(structure.id), structure.position);
        self.mark_dirty(EntityRef::Structure(structure.id));
        self.structures.insert(structure.id, structure);
    }

    /// Remove an NPC (death) from the map and the index.
    pub fn remove_npc(&mut self, id: NpcId) -> Option<NpcMonster> {
        self.spatial.remove(EntityRef::Npc(id));
        self.mark_dirty(EntityRef::Npc(id));
        self.npcs.remove(&id)
    }

    /// Remove a resource node from the map and the index.
    pub fn remove_resource(&mut self, id: ResourceId) -> Option<ResourceNode> {
        self.spatial.remove(EntityRef::Resource(id));
        self.mark_dirty(EntityRef::Resource(id));
        self.resources.remove(&id)
    }

    // -----------------------------------------------------------------------
    // Position updates
    // -----------------------------------------------------------------------

    /// Move an actor, keeping the index in sync.
    pub fn move_actor(&mut self, id: ActorId, position: Position) {
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.position = position;
            self.spatial.move_entity(EntityRef::Actor(id), position);
            self.mark_dirty(EntityRef::Actor(id));
        }
    }

    /// Move an NPC, keeping the index in sync.
    pub fn move_npc(&mut self, id: NpcId, position: Position) {
        if let Some(npc) = self.npcs.get_mut(&id) {
            npc.position = position;
            self.spatial.move_entity(EntityRef::Npc(id), position);
            self.mark_dirty(EntityRef::Npc(id));
        }
    }

    /// Move a behemoth, keeping the index in sync.
    pub fn move_behemoth(&mut self, id: BehemothId, position: Position) {
        if let Some(behemoth) = self.behemoths.get_mut(&id) {
            behemoth.position = position;
            self.spatial.move_entity(EntityRef::Behemoth(id), position);
            self.mark_dirty(EntityRef::Behemoth(id));
        }
    }

    // -----------------------------------------------------------------------
    // Tick buffers
    // -----------------------------------------------------------------------

    /// Emit a world event into the tick buffer.
    pub fn emit(&mut self, kind: WorldEventKind) {
        let id = EventId::from_raw(self.allocate_id());
        self.tick_events.push(WorldEvent {
            id,
            tick: self.tick,
            kind,
        });
    }

    /// Append a chat message to the tick buffer.
    pub fn push_message(&mut self, message: ChatMessage) {
        self.tick_messages.push(message);
    }

    /// Allocate a message id.
    pub const fn allocate_message_id(&mut self) -> MessageId {
        MessageId::from_raw(self.allocate_id())
    }

    /// Clear the tick-scoped buffers. Called at tick end, after broadcast
    /// and persistence have read them.
    pub fn clear_tick_buffers(&mut self) {
        self.tick_messages.clear();
        self.tick_events.clear();
    }

    // -----------------------------------------------------------------------
    // Dirty tracking
    // -----------------------------------------------------------------------

    /// Record that an entity changed this tick.
    pub fn mark_dirty(&mut self, entity: EntityRef) {
        self.dirty.insert(entity);
    }

    /// Drain the tick's dirty set.
    pub fn take_dirty(&mut self) -> Vec<EntityRef> {
        let drained: Vec<EntityRef> = self.dirty.iter().copied().collect();
        self.dirty.clear();
        drained
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Find an actor by display name.
    pub fn actor_by_name(&self, name: &str) -> Option<&Actor> {
        self.actors.values().find(|actor| actor.name == name)
    }

    /// Count alive, connected, human-role actors (population control input).
    pub fn alive_connected_humans(&self) -> u32 {
        let count = self
            .actors
            .values()
            .filter(|actor| actor.is_alive && actor.connected && actor.is_human_role())
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Resolve a raw target id against actors, NPCs, and behemoths, in
    /// that order. Raw ids come from one counter, so at most one map can
    /// hold the id.
    pub fn resolve_combatant(&self, raw: u64) -> Option<Combatant> {
        let actor_id = ActorId::from_raw(raw);
        if self.actors.contains_key(&actor_id) {
            return Some(Combatant::Actor(actor_id));
        }
        let npc_id = NpcId::from_raw(raw);
        if self.npcs.contains_key(&npc_id) {
            return Some(Combatant::Npc(npc_id));
        }
        let behemoth_id = BehemothId::from_raw(raw);
        if self.behemoths.contains_key(&behemoth_id) {
            return Some(Combatant::Behemoth(behemoth_id));
        }
        None
    }

    /// Resolve a raw target id against every entity map (inspect targets).
    pub fn resolve_entity(&self, raw: u64) -> Option<EntityRef> {
        if let Some(combatant) = self.resolve_combatant(raw) {
            return Some(EntityRef::from(combatant));
        }
        let resource_id = ResourceId::from_raw(raw);
        if self.resources.contains_key(&resource_id) {
            return Some(EntityRef::Resource(resource_id));
        }
        let structure_id = StructureId::from_raw(raw);
        if self.structures.contains_key(&structure_id) {
            return Some(EntityRef::Structure(structure_id));
        }
        None
    }

    /// The position of a combatant, if it still exists.
    pub fn combatant_position(&self, combatant: Combatant) -> Option<Position> {
        match combatant {
            Combatant::Actor(id) => self.actors.get(&id).map(|a| a.position),
            Combatant::Npc(id) => self.npcs.get(&id).map(|n| n.position),
            Combatant::Behemoth(id) => self.behemoths.get(&id).map(|b| b.position),
        }
    }

    /// Sapling lookup by exact planting position.
    ///
    /// Plant coordinates round-trip through JSON untouched, so watering the
    /// coordinates that were planted compares equal. A tolerance guards
    /// against clients that re-serialize with lower precision.
    pub fn sapling_at(&self, position: &Position) -> Option<ResourceId> {
        self.resources
            .values()
            .find(|node| {
                node.kind == veldt_types::ResourceKind::Sapling
                    && node.position.distance_to(position) < 0.5
            })
            .map(|node| node.id)
    }

    // -----------------------------------------------------------------------
    // Inventory helpers
    // -----------------------------------------------------------------------

    /// Credit items to an actor's inventory.
    pub fn credit_item(&mut self, actor_id: ActorId, item: &str, amount: u32) {
        if let Some(actor) = self.actors.get_mut(&actor_id) {
            let entry = actor.inventory.entry(item.to_owned()).or_insert(0);
            *entry = entry.saturating_add(amount);
            self.mark_dirty(EntityRef::Actor(actor_id));
        }
    }

    /// Debit items from an actor's inventory. Returns false (and leaves the
    /// inventory untouched) if the actor lacks the quantity.
    pub fn debit_item(&mut self, actor_id: ActorId, item: &ItemId, amount: u32) -> bool {
        let Some(actor) = self.actors.get_mut(&actor_id) else {
            return false;
        };
        let Some(held) = actor.inventory.get_mut(item) else {
            return false;
        };
        if *held < amount {
            return false;
        }
        *held = held.saturating_sub(amount);
        if *held == 0 {
            actor.inventory.remove(item);
        }
        self.mark_dirty(EntityRef::Actor(actor_id));
        true
    }

    // -----------------------------------------------------------------------
    // Restore support
    // -----------------------------------------------------------------------

    /// Rebuild the spatial index by replaying `add` for every positioned
    /// entity. Used after a snapshot load.
    pub fn rebuild_spatial(&mut self) {
        self.spatial = SpatialIndex::new();
        let actors: Vec<(ActorId, Position)> = self
            .actors
            .values()
            .map(|a| (a.id, a.position))
            .collect();
        for (id, position) in actors {
            self.spatial.add(EntityRef::Actor(id), position);
        }
        let resources: Vec<(ResourceId, Position)> = self
            .resources
            .values()
            .map(|r| (r.id, r.position))
            .collect();
        for (id, position) in resources {
            self.spatial.add(EntityRef::Resource(id), position);
        }
        let npcs: Vec<(NpcId, Position)> =
            self.npcs.values().map(|n| (n.id, n.position)).collect();
        for (id, position) in npcs {
            self.spatial.add(EntityRef::Npc(id), position);
        }
        let behemoths: Vec<(BehemothId, Position)> = self
            .behemoths
            .values()
            .map(|b| (b.id, b.position))
            .collect();
        for (id, position) in behemoths {
            self.spatial.add(EntityRef::Behemoth(id), position);
        }
        let structures: Vec<(StructureId, Position)> = self
            .structures
            .values()
            .map(|s| (s.id, s.position))
            .collect();
        for (id, position) in structures {
            self.spatial.add(EntityRef::Structure(id), position);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use veldt_types::structs::{CombatStats, Equipment};
    use veldt_types::{ActorStatus, Role};

    use super::*;

    fn make_actor(world: &mut WorldState, name: &str) -> ActorId {
        let id = ActorId::from_raw(world.allocate_id());
        let actor = Actor {
            id,
            name: name.to_owned(),
            role: Role::Fighter,
            position: Position::new(500.0, 500.0),
            destination: None,
            status: ActorStatus::Idle,
            stats: CombatStats {
                health: 100,
                max_health: 100,
                attack: 15,
                defense: 10,
                speed: 5.0,
                vision_radius: 100.0,
            },
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
        };
        world.insert_actor(actor);
        id
    }

    #[test]
    fn ids_are_sequential_from_one() {
        let mut world = WorldState::new(42);
        assert_eq!(world.allocate_id(), 1);
        assert_eq!(world.allocate_id(), 2);
    }

    #[test]
    fn insert_actor_indexes_position() {
        let mut world = WorldState::new(42);
        let id = make_actor(&mut world, "Wren");
        assert_eq!(
            world.spatial.position_of(EntityRef::Actor(id)),
            Some(Position::new(500.0, 500.0))
        );
    }

    #[test]
    fn move_actor_keeps_index_in_sync() {
        let mut world = WorldState::new(42);
        let id = make_actor(&mut world, "Wren");
        world.move_actor(id, Position::new(100.0, 100.0));
        let actor = world.actors.get(&id).unwrap();
        assert_eq!(
            world.spatial.position_of(EntityRef::Actor(id)),
            Some(actor.position)
        );
    }

    #[test]
    fn resolve_combatant_distinguishes_kinds() {
        let mut world = WorldState::new(42);
        let id = make_actor(&mut world, "Wren");
        assert_eq!(
            world.resolve_combatant(id.into_inner()),
            Some(Combatant::Actor(id))
        );
        assert_eq!(world.resolve_combatant(9999), None);
    }

    #[test]
    fn credit_and_debit_items() {
        let mut world = WorldState::new(42);
        let id = make_actor(&mut world, "Wren");
        world.credit_item(id, "wood", 3);
        assert!(world.debit_item(id, &"wood".to_owned(), 2));
        assert!(!world.debit_item(id, &"wood".to_owned(), 2));
        assert_eq!(
            world.actors.get(&id).unwrap().inventory.get("wood"),
            Some(&1)
        );
    }

    #[test]
    fn debit_removes_empty_stacks() {
        let mut world = WorldState::new(42);
        let id = make_actor(&mut world, "Wren");
        world.credit_item(id, "wood", 2);
        assert!(world.debit_item(id, &"wood".to_owned(), 2));
        assert!(world.actors.get(&id).unwrap().inventory.is_empty());
    }

    #[test]
    fn events_carry_the_current_tick() {
        let mut world = WorldState::new(42);
        world.tick = 7;
        let id = make_actor(&mut world, "Wren");
        world.emit(WorldEventKind::Respawn { actor: id });
        assert_eq!(world.tick_events.len(), 1);
        assert_eq!(world.tick_events.first().unwrap().tick, 7);
    }

    #[test]
    fn rebuild_spatial_matches_entity_positions() {
        let mut world = WorldState::new(42);
        let id = make_actor(&mut world, "Wren");
        world.move_actor(id, Position::new(250.0, 250.0));
        world.rebuild_spatial();
        assert_eq!(
            world.spatial.position_of(EntityRef::Actor(id)),
            Some(Position::new(250.0, 250.0))
        );
    }

    #[test]
    fn take_dirty_drains() {
        let mut world = WorldState::new(42);
        let id = make_actor(&mut world, "Wren");
        let drained = world.take_dirty();
        assert!(drained.contains(&EntityRef::Actor(id)));
        assert!(world.take_dirty().is_empty());
    }
}
