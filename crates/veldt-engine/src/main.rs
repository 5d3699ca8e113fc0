//! World server binary for the Veldt simulator.
//!
//! This is the main entry point that wires together configuration, the
//! persistence layer, the world (restored from the last snapshot or
//! freshly seeded), the `WebSocket` gateway, and the tick loop.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `veldt-config.yaml` (or `argv[1]`)
//! 3. Connect to `SQLite` and bootstrap the schema
//! 4. Restore the world from the last snapshot, or seed a new one
//! 5. Start the gateway and register the shared queues
//! 6. Run the tick loop until Ctrl-C

use std::path::Path;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use veldt_core::runner::EngineShared;
use veldt_core::{SimulationConfig, runner};
use veldt_db::Persistence;
use veldt_gateway::{ConnectionRegistry, GatewayState};
use veldt_world::WorldState;
use veldt_world::seeder::seed_world;

/// Application entry point for the world server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("veldt-engine starting");

    // 2. Configuration.
    let config = load_config()?;
    info!(
        world_name = config.world.name,
        seed = ?config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        gateway_port = config.infrastructure.gateway_port,
        "Configuration loaded"
    );

    // 3. Persistence.
    let mut persistence = Persistence::connect(&config.infrastructure.database_url).await?;

    // 4. World: restore or seed.
    let mut world = match persistence.load_world_snapshot().await? {
        Some(world) => {
            info!(tick = world.tick, "World restored from snapshot");
            world
        }
        None => {
            let seed = config.world.seed.unwrap_or_else(rand::random);
            let mut world = WorldState::new(seed);
            seed_world(&mut world);
            info!(seed, "New world seeded");
            world
        }
    };

    // 5. Gateway.
    let shared = Arc::new(EngineShared::new());
    let registry = Arc::new(ConnectionRegistry::new());
    let gateway_state = Arc::new(GatewayState {
        registry: Arc::clone(&registry),
        shared: Arc::clone(&shared),
    });
    let _gateway = veldt_gateway::spawn_gateway(
        config.infrastructure.gateway_port,
        gateway_state,
    )
    .await;
    info!(port = config.infrastructure.gateway_port, "Gateway started");

    // 6. Shutdown plumbing: Ctrl-C flips the watch the runner selects on.
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            let _ = shutdown_tx.send(true);
        }
    });

    // 7. The tick loop owns the world until shutdown.
    runner::run_loop(
        &mut world,
        shared,
        registry,
        &mut persistence,
        config.world.tick_interval_ms,
        shutdown_rx,
    )
    .await;

    info!(tick = world.tick, "veldt-engine shutdown complete");
    Ok(())
}

/// Load configuration from `argv[1]` or `veldt-config.yaml`, falling back
/// to defaults when the file does not exist.
fn load_config() -> anyhow::Result<SimulationConfig> {
    let path_arg = std::env::args().nth(1);
    let path = path_arg.as_deref().unwrap_or("veldt-config.yaml");
    let config_path = Path::new(path);
    if config_path.exists() {
        Ok(SimulationConfig::from_file(config_path)?)
    } else {
        info!("Config file not found, using defaults");
        Ok(SimulationConfig::default())
    }
}
