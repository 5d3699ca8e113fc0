//! `WebSocket` gateway for the Veldt simulator.
//!
//! The gateway owns everything connection-shaped: the auth and
//! role-selection handshake, the per-connection session tasks, and the
//! outbound fan-out the tick loop broadcasts through. It never mutates
//! the world -- ingress lands on the action and control queues, and the
//! tick loop answers back over per-session channels.
//!
//! # Modules
//!
//! - [`registry`] -- Outbound senders and session tokens
//! - [`session`] -- The per-connection auth/role/action state machine
//! - [`ws`] -- Socket upgrade and the select loop
//! - [`server`] -- Router construction and lifecycle

pub mod registry;
pub mod server;
pub mod session;
pub mod ws;

pub use registry::ConnectionRegistry;
pub use server::{GatewayError, GatewayState, build_router, spawn_gateway, start_server};
pub use session::Session;
