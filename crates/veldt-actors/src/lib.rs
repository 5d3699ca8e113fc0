//! Actor-side processors for the Veldt simulator.
//!
//! Everything that judges or mutates actors lives here: the action
//! validator and handlers, the continuous movement and gathering phases,
//! combat resolution, the death protocol, NPC AI and population control,
//! the behemoth lifecycle, the economy timers, and alliance maintenance.
//! The tick loop in `veldt-core` decides the order these run in; each
//! processor takes `&mut WorldState` and nothing else.

pub mod actions;
pub mod alliance;
pub mod behemoth;
pub mod combat;
pub mod crafting;
pub mod death;
pub mod error;
pub mod evolution;
pub mod gathering;
pub mod movement;
pub mod npc;
pub mod trade;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::ActorError;
