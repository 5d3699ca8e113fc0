//! Orchestration for the Veldt simulator: queues, tick pipeline,
//! broadcaster, and the fixed-rate runner.
//!
//! # Modules
//!
//! - [`queue`] -- Action queue (last-write-wins slots) and control queue
//! - [`tick`] -- The fixed-order tick pipeline producing a `TickResult`
//! - [`broadcast`] -- Per-actor fog-of-war payload assembly
//! - [`runner`] -- The 1 Hz loop: drain, simulate, broadcast, persist
//! - [`config`] -- YAML configuration with contract defaults

pub mod broadcast;
pub mod config;
pub mod queue;
pub mod runner;
pub mod tick;

pub use config::{ConfigError, SimulationConfig};
pub use queue::{ActionQueue, ControlQueue, ControlReply, ControlRequest};
pub use runner::{EngineShared, NoopPersister, OutboundSink, TickPersister};
pub use tick::{TickResult, run_tick};
