//! Round-trip tests against an in-memory `SQLite` database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use sqlx::sqlite::SqlitePoolOptions;
use veldt_core::{TickPersister, broadcast, run_tick};
use veldt_db::Persistence;
use veldt_types::{Action, QueuedAction, Role};
use veldt_world::WorldState;
use veldt_world::seeder::seed_world;

async fn memory_persistence() -> Persistence {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    Persistence::from_pool(pool).await.expect("schema init")
}

fn seeded_world() -> WorldState {
    let mut world = WorldState::new(42);
    seed_world(&mut world);
    world
}

#[tokio::test]
async fn snapshot_round_trips_every_entity_table() {
    let mut persistence = memory_persistence().await;
    let mut world = seeded_world();
    // A few ticks of real activity so the snapshot is not pristine.
    for _ in 0..3 {
        let _ = run_tick(&mut world, Vec::new(), Vec::new());
        world.clear_tick_buffers();
    }

    persistence.snapshot_world(&world).await.expect("snapshot");
    let restored = persistence
        .load_world_snapshot()
        .await
        .expect("load")
        .expect("snapshot present");

    assert_eq!(restored.tick, world.tick);
    assert_eq!(restored.seed, world.seed);
    assert_eq!(restored.actors, world.actors);
    assert_eq!(restored.resources, world.resources);
    assert_eq!(restored.npcs, world.npcs);
    assert_eq!(restored.behemoths, world.behemoths);
    assert_eq!(restored.alliances, world.alliances);
    assert_eq!(restored.next_id(), world.next_id());
    assert_eq!(restored.rng, world.rng);
}

#[tokio::test]
async fn restore_rebuilds_the_spatial_index() {
    let mut persistence = memory_persistence().await;
    let world = seeded_world();
    persistence.snapshot_world(&world).await.expect("snapshot");
    let restored = persistence
        .load_world_snapshot()
        .await
        .expect("load")
        .expect("snapshot present");

    assert!(veldt_world::invariants::check(&restored).is_ok());
    assert_eq!(restored.spatial.len(), world.spatial.len());
}

#[tokio::test]
async fn empty_database_restores_nothing() {
    let persistence = memory_persistence().await;
    assert!(
        persistence
            .load_world_snapshot()
            .await
            .expect("load")
            .is_none()
    );
}

#[tokio::test]
async fn broadcast_payloads_survive_the_round_trip() {
    // Snapshot -> restore -> broadcast must produce identical payloads,
    // modulo the tick-scoped buffers (empty post-tick on both sides).
    let mut persistence = memory_persistence().await;
    let mut world = seeded_world();
    let join = join_request(&mut world, "Wren", Role::Merchant);
    let result = run_tick(&mut world, vec![join], Vec::new());
    assert_eq!(result.tick, 1);
    world.clear_tick_buffers();

    persistence.snapshot_world(&world).await.expect("snapshot");
    let restored = persistence
        .load_world_snapshot()
        .await
        .expect("load")
        .expect("snapshot present");

    let before = broadcast::build_all(&world);
    let after = broadcast::build_all(&restored);
    assert_eq!(before, after);
}

#[tokio::test]
async fn incremental_persist_records_events_and_deltas() {
    let mut persistence = memory_persistence().await;
    let mut world = seeded_world();
    let join = join_request(&mut world, "Wren", Role::Merchant);
    let result = run_tick(&mut world, vec![join], Vec::new());
    persistence
        .persist_tick(&world, &result)
        .await
        .expect("persist tick");

    let agent_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM agents")
        .fetch_one(persistence.pool())
        .await
        .expect("count agents");
    assert_eq!(agent_count, 1);

    let meta_tick: String =
        sqlx::query_scalar("SELECT value FROM world_meta WHERE key = 'current_tick'")
            .fetch_one(persistence.pool())
            .await
            .expect("meta tick");
    assert_eq!(meta_tick, "1");
}

#[tokio::test]
async fn deleted_entities_lose_their_rows() {
    let mut persistence = memory_persistence().await;
    let mut world = seeded_world();
    persistence.snapshot_world(&world).await.expect("snapshot");

    let npc_id = *world.npcs.keys().next().expect("seeded npc");
    world.remove_npc(npc_id);
    let result = run_tick(
        &mut world,
        Vec::new(),
        vec![QueuedAction {
            actor: veldt_types::ActorId::from_raw(999),
            action: Action::Idle,
            client_tick: 0,
        }],
    );
    persistence
        .persist_tick(&world, &result)
        .await
        .expect("persist tick");

    let row: Option<String> = sqlx::query_scalar("SELECT data FROM npc_monsters WHERE id = ?")
        .bind(i64::try_from(npc_id.into_inner()).unwrap())
        .fetch_optional(persistence.pool())
        .await
        .expect("query");
    assert!(row.is_none());
}

fn join_request(world: &mut WorldState, name: &str, role: Role) -> veldt_core::ControlRequest {
    let (tx, _rx) = tokio::sync::oneshot::channel();
    let actor_id = veldt_types::ActorId::from_raw(world.allocate_id());
    veldt_core::ControlRequest::Join {
        actor_id,
        name: name.to_owned(),
        role,
        reply: tx,
    }
}
