//! Shared type definitions for the Veldt world simulator.
//!
//! This crate is the single source of truth for all types used across the
//! Veldt workspace. Wire-visible types flow downstream to TypeScript agent
//! clients via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe `u64` wrappers for all entity identifiers
//! - [`enums`] -- Roles, statuses, and every state-machine variant set
//! - [`structs`] -- Core entity structs (actors, resources, NPCs, behemoths)
//! - [`geometry`] -- Positions and distance math on the world plane
//! - [`actions`] -- The action tagged union proposed by actors
//! - [`events`] -- World events emitted by the tick pipeline
//! - [`protocol`] -- Wire envelopes and fog-of-war view types
//! - [`rejections`] -- Contract rejection-reason strings

pub mod actions;
pub mod enums;
pub mod events;
pub mod geometry;
pub mod ids;
pub mod protocol;
pub mod rejections;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use actions::{Action, QueuedAction, RejectedAction};
pub use enums::{
    ActorStatus, BehemothStatus, ChatMode, EquipSlot, NpcBehavior, ResourceKind, ResourceState,
    Role, TradeStatus,
};
pub use events::{WorldEvent, WorldEventKind};
pub use geometry::{Position, WORLD_SIZE};
pub use ids::{
    ActorId, BehemothId, CraftJobId, EntityRef, EventId, MessageId, NpcId, ResourceId,
    StructureId, TradeId,
};
pub use protocol::{
    BehemothView, ClientMessage, MessageView, NearbyView, NpcView, PublicActorView, ResourceView,
    SelfView, ServerMessage, StructureView, TickUpdateData,
};
pub use structs::{
    Actor, Alliance, Behemoth, ChatMessage, ChatRecipients, CombatPair, CombatStats, Combatant,
    CraftingJob, Equipment, ItemBundle, ItemId, NpcMonster, Recipe, ResourceNode, Structure,
    Trade,
};
