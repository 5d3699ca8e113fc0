//! Incremental per-tick persistence: events, messages, and state deltas.
//!
//! Runs synchronously at the end of every tick, before the next begins.
//! Entity deltas come from the tick result's dirty set: a changed entity
//! is upserted, a vanished one (a killed NPC, a cleared sapling) has its
//! row deleted. Alliances, trades, and crafting jobs are refreshed by the
//! periodic full snapshot.

use sqlx::{Sqlite, SqlitePool, Transaction};
use veldt_core::TickResult;
use veldt_types::EntityRef;
use veldt_world::WorldState;

use crate::error::DbError;
use crate::{encode, id_i64, now};

/// Write one tick's incremental rows.
pub async fn persist_tick_changes(
    pool: &SqlitePool,
    world: &WorldState,
    result: &TickResult,
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;
    let stamp = now();

    for event in &result.events {
        sqlx::query("INSERT OR REPLACE INTO events (id, tick, data) VALUES (?, ?, ?)")
            .bind(id_i64(event.id.into_inner()))
            .bind(id_i64(event.tick))
            .bind(encode(event, "events")?)
            .execute(&mut *tx)
            .await?;
    }

    for message in &world.tick_messages {
        sqlx::query(
            "INSERT OR REPLACE INTO messages (id, tick, sender_id, data) VALUES (?, ?, ?, ?)",
        )
        .bind(id_i64(message.id.into_inner()))
        .bind(id_i64(message.tick))
        .bind(id_i64(message.sender_id.into_inner()))
        .bind(encode(message, "messages")?)
        .execute(&mut *tx)
        .await?;
    }

    for change in &result.state_changes {
        persist_entity(&mut tx, world, *change, &stamp).await?;
    }

    sqlx::query(
        "INSERT INTO world_meta (key, value, updated_at) VALUES ('current_tick', ?, ?)
         ON CONFLICT (key) DO UPDATE SET value = excluded.value,
                                         updated_at = excluded.updated_at",
    )
    .bind(result.tick.to_string())
    .bind(&stamp)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Upsert a changed entity's row, or delete it if the entity vanished.
async fn persist_entity(
    tx: &mut Transaction<'_, Sqlite>,
    world: &WorldState,
    change: EntityRef,
    stamp: &str,
) -> Result<(), DbError> {
    match change {
        EntityRef::Actor(id) => match world.actors.get(&id) {
            Some(actor) => {
                sqlx::query(
                    "INSERT OR REPLACE INTO agents (id, name, role, x, y, data, updated_at)
                     VALUES (?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(id_i64(id.into_inner()))
                .bind(&actor.name)
                .bind(encode(&actor.role, "agents")?)
                .bind(actor.position.x)
                .bind(actor.position.y)
                .bind(encode(actor, "agents")?)
                .bind(stamp)
                .execute(&mut **tx)
                .await?;
            }
            None => {
                sqlx::query("DELETE FROM agents WHERE id = ?")
                    .bind(id_i64(id.into_inner()))
                    .execute(&mut **tx)
                    .await?;
            }
        },
        EntityRef::Resource(id) => match world.resources.get(&id) {
            Some(node) => {
                sqlx::query(
                    "INSERT OR REPLACE INTO resources (id, kind, x, y, data, updated_at)
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(id_i64(id.into_inner()))
                .bind(encode(&node.kind, "resources")?)
                .bind(node.position.x)
                .bind(node.position.y)
                .bind(encode(node, "resources")?)
                .bind(stamp)
                .execute(&mut **tx)
                .await?;
            }
            None => {
                sqlx::query("DELETE FROM resources WHERE id = ?")
                    .bind(id_i64(id.into_inner()))
                    .execute(&mut **tx)
                    .await?;
            }
        },
        EntityRef::Npc(id) => match world.npcs.get(&id) {
            Some(npc) => {
                sqlx::query(
                    "INSERT OR REPLACE INTO npc_monsters (id, template, x, y, data, updated_at)
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(id_i64(id.into_inner()))
                .bind(&npc.template)
                .bind(npc.position.x)
                .bind(npc.position.y)
                .bind(encode(npc, "npc_monsters")?)
                .bind(stamp)
                .execute(&mut **tx)
                .await?;
            }
            None => {
                sqlx::query("DELETE FROM npc_monsters WHERE id = ?")
                    .bind(id_i64(id.into_inner()))
                    .execute(&mut **tx)
                    .await?;
            }
        },
        EntityRef::Behemoth(id) => {
            if let Some(behemoth) = world.behemoths.get(&id) {
                sqlx::query(
                    "INSERT OR REPLACE INTO behemoths (id, kind, x, y, data, updated_at)
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(id_i64(id.into_inner()))
                .bind(&behemoth.kind)
                .bind(behemoth.position.x)
                .bind(behemoth.position.y)
                .bind(encode(behemoth, "behemoths")?)
                .bind(stamp)
                .execute(&mut **tx)
                .await?;
            }
        }
        EntityRef::Structure(id) => {
            if let Some(structure) = world.structures.get(&id) {
                sqlx::query(
                    "INSERT OR REPLACE INTO structures (id, kind, x, y, data, updated_at)
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(id_i64(id.into_inner()))
                .bind(&structure.kind)
                .bind(structure.position.x)
                .bind(structure.position.y)
                .bind(encode(structure, "structures")?)
                .bind(stamp)
                .execute(&mut **tx)
                .await?;
            }
        }
    }
    Ok(())
}
