//! World state, spatial indexing, seeding, and resource growth.
//!
//! This crate owns the authoritative simulation state. Processors in the
//! actor crate receive a `&mut WorldState` for the duration of a tick; the
//! tick loop in the core crate decides the order they run in.
//!
//! # Modules
//!
//! - [`constants`] -- Contract constants and balance tables
//! - [`rng`] -- The seeded deterministic PRNG
//! - [`spatial`] -- Chunk-grid entity index with radius queries
//! - [`world`] -- The world-state bundle all mutation flows through
//! - [`seeder`] -- Deterministic initial placement
//! - [`growth`] -- Sapling growth and gather-attachment hygiene
//! - [`invariants`] -- Post-tick contract checks for test suites

pub mod constants;
pub mod error;
pub mod growth;
pub mod invariants;
pub mod rng;
pub mod seeder;
pub mod spatial;
pub mod world;

pub use error::WorldError;
pub use rng::{WorldRng, keyed_draw};
pub use spatial::SpatialIndex;
pub use world::{GatherAttachment, WorldState};
