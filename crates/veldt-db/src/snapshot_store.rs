//! Full world snapshots: atomic save and boot-time restore.
//!
//! A snapshot rewrites every entity table inside one transaction, along
//! with the world metadata (seed, tick, id counter, PRNG state) and the
//! chunk occupancy rows. Restore rebuilds the world from the tables and
//! replays `add` into a fresh spatial index; the transient engine state
//! (combat pairs, climbers, gather attachments) intentionally restarts
//! empty.

use std::collections::BTreeMap;

use sqlx::SqlitePool;
use veldt_types::{
    Actor, Alliance, Behemoth, CraftingJob, EntityRef, NpcMonster, ResourceNode, Structure, Trade,
};
use veldt_world::WorldState;
use veldt_world::constants::CHUNK_SIZE;

use crate::error::DbError;
use crate::{encode, id_i64, now};

/// Serialize all entity tables atomically.
pub async fn save_snapshot(pool: &SqlitePool, world: &WorldState) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;
    let stamp = now();

    for table in [
        "agents",
        "resources",
        "npc_monsters",
        "behemoths",
        "structures",
        "alliances",
        "alliance_members",
        "trades",
        "crafting_queue",
        "chunks",
    ] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await?;
    }

    for actor in world.actors.values() {
        sqlx::query(
            "INSERT INTO agents (id, name, role, x, y, data, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id_i64(actor.id.into_inner()))
        .bind(&actor.name)
        .bind(encode(&actor.role, "agents")?)
        .bind(actor.position.x)
        .bind(actor.position.y)
        .bind(encode(actor, "agents")?)
        .bind(&stamp)
        .execute(&mut *tx)
        .await?;
    }

    for node in world.resources.values() {
        sqlx::query(
            "INSERT INTO resources (id, kind, x, y, data, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id_i64(node.id.into_inner()))
        .bind(encode(&node.kind, "resources")?)
        .bind(node.position.x)
        .bind(node.position.y)
        .bind(encode(node, "resources")?)
        .bind(&stamp)
        .execute(&mut *tx)
        .await?;
    }

    for npc in world.npcs.values() {
        sqlx::query(
            "INSERT INTO npc_monsters (id, template, x, y, data, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id_i64(npc.id.into_inner()))
        .bind(&npc.template)
        .bind(npc.position.x)
        .bind(npc.position.y)
        .bind(encode(npc, "npc_monsters")?)
        .bind(&stamp)
        .execute(&mut *tx)
        .await?;
    }

    for behemoth in world.behemoths.values() {
        sqlx::query(
            "INSERT INTO behemoths (id, kind, x, y, data, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id_i64(behemoth.id.into_inner()))
        .bind(&behemoth.kind)
        .bind(behemoth.position.x)
        .bind(behemoth.position.y)
        .bind(encode(behemoth, "behemoths")?)
        .bind(&stamp)
        .execute(&mut *tx)
        .await?;
    }

    for structure in world.structures.values() {
        sqlx::query(
            "INSERT INTO structures (id, kind, x, y, data, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id_i64(structure.id.into_inner()))
        .bind(&structure.kind)
        .bind(structure.position.x)
        .bind(structure.position.y)
        .bind(encode(structure, "structures")?)
        .bind(&stamp)
        .execute(&mut *tx)
        .await?;
    }

    for alliance in world.alliances.values() {
        sqlx::query("INSERT INTO alliances (name, data, updated_at) VALUES (?, ?, ?)")
            .bind(&alliance.name)
            .bind(encode(alliance, "alliances")?)
            .bind(&stamp)
            .execute(&mut *tx)
            .await?;
        for member in &alliance.members {
            sqlx::query("INSERT INTO alliance_members (alliance, agent_id) VALUES (?, ?)")
                .bind(&alliance.name)
                .bind(id_i64(member.into_inner()))
                .execute(&mut *tx)
                .await?;
        }
    }

    for trade in world.trades.values() {
        sqlx::query("INSERT INTO trades (id, status, data, updated_at) VALUES (?, ?, ?, ?)")
            .bind(id_i64(trade.id.into_inner()))
            .bind(encode(&trade.status, "trades")?)
            .bind(encode(trade, "trades")?)
            .bind(&stamp)
            .execute(&mut *tx)
            .await?;
    }

    for job in world.crafting_jobs.values() {
        sqlx::query(
            "INSERT INTO crafting_queue (id, agent_id, data, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(id_i64(job.id.into_inner()))
        .bind(id_i64(job.actor.into_inner()))
        .bind(encode(job, "crafting_queue")?)
        .bind(&stamp)
        .execute(&mut *tx)
        .await?;
    }

    for (key, refs) in chunk_rows(world) {
        sqlx::query("INSERT INTO chunks (key, data, updated_at) VALUES (?, ?, ?)")
            .bind(key)
            .bind(encode(&refs, "chunks")?)
            .bind(&stamp)
            .execute(&mut *tx)
            .await?;
    }

    for (key, value) in [
        ("seed", world.seed.to_string()),
        ("current_tick", world.tick.to_string()),
        ("next_id", world.next_id().to_string()),
        ("rng_state", world.rng.state().to_string()),
    ] {
        sqlx::query(
            "INSERT INTO world_meta (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT (key) DO UPDATE SET value = excluded.value,
                                             updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(&stamp)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::debug!(tick = world.tick, "World snapshot saved");
    Ok(())
}

/// Group the spatial index contents into chunk rows for the snapshot.
// Positions are confined to the world square, so the cell quotient fits i64.
#[allow(clippy::cast_possible_truncation)]
fn chunk_rows(world: &WorldState) -> BTreeMap<String, Vec<EntityRef>> {
    let mut rows: BTreeMap<String, Vec<EntityRef>> = BTreeMap::new();
    for (entity, position) in world.spatial.iter() {
        let cx = (position.x / CHUNK_SIZE).floor() as i64;
        let cy = (position.y / CHUNK_SIZE).floor() as i64;
        rows.entry(format!("{cx}:{cy}")).or_default().push(*entity);
    }
    rows
}

/// Restore the world from the last snapshot, if one exists.
pub async fn load_world_snapshot(pool: &SqlitePool) -> Result<Option<WorldState>, DbError> {
    let meta: BTreeMap<String, String> =
        sqlx::query_as::<_, (String, String)>("SELECT key, value FROM world_meta")
            .fetch_all(pool)
            .await?
            .into_iter()
            .collect();

    let Some(seed) = meta.get("seed").and_then(|value| value.parse::<u64>().ok()) else {
        return Ok(None);
    };

    let mut world = WorldState::new(seed);
    world.tick = meta
        .get("current_tick")
        .and_then(|value| value.parse().ok())
        .unwrap_or(0);
    if let Some(next_id) = meta.get("next_id").and_then(|value| value.parse().ok()) {
        world.set_next_id(next_id);
    }
    if let Some(state) = meta.get("rng_state").and_then(|value| value.parse().ok()) {
        world.rng = veldt_world::WorldRng::from_state(state);
    }

    for data in fetch_data(pool, "agents").await? {
        let actor: Actor = decode(&data, "agents")?;
        world.actors.insert(actor.id, actor);
    }
    for data in fetch_data(pool, "resources").await? {
        let node: ResourceNode = decode(&data, "resources")?;
        world.resources.insert(node.id, node);
    }
    for data in fetch_data(pool, "npc_monsters").await? {
        let npc: NpcMonster = decode(&data, "npc_monsters")?;
        world.npcs.insert(npc.id, npc);
    }
    for data in fetch_data(pool, "behemoths").await? {
        let behemoth: Behemoth = decode(&data, "behemoths")?;
        world.behemoths.insert(behemoth.id, behemoth);
    }
    for data in fetch_data(pool, "structures").await? {
        let structure: Structure = decode(&data, "structures")?;
        world.structures.insert(structure.id, structure);
    }
    for data in fetch_data(pool, "alliances").await? {
        let alliance: Alliance = decode(&data, "alliances")?;
        world.alliances.insert(alliance.name.clone(), alliance);
    }
    for data in fetch_data(pool, "trades").await? {
        let trade: Trade = decode(&data, "trades")?;
        world.trades.insert(trade.id, trade);
    }
    for data in fetch_data(pool, "crafting_queue").await? {
        let job: CraftingJob = decode(&data, "crafting_queue")?;
        world.crafting_jobs.insert(job.id, job);
    }

    // The index is derived state: replay add from the entity tables.
    world.rebuild_spatial();
    // Loading marked nothing dirty; clear whatever insertion recorded.
    let _ = world.take_dirty();

    tracing::info!(tick = world.tick, seed, "World restored from snapshot");
    Ok(Some(world))
}

/// Fetch every `data` column from a table.
async fn fetch_data(pool: &SqlitePool, table: &'static str) -> Result<Vec<String>, DbError> {
    let rows = sqlx::query_scalar::<_, String>(&format!("SELECT data FROM {table}"))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Decode one JSON `data` column.
fn decode<T: serde::de::DeserializeOwned>(data: &str, table: &'static str) -> Result<T, DbError> {
    serde_json::from_str(data).map_err(|source| DbError::CorruptRow { table, source })
}
