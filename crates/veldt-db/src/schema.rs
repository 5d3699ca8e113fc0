//! `SQLite` schema bootstrap.
//!
//! Entity rows carry their hot columns (id, kind, position) for indexing
//! plus the full entity as a JSON `data` column, so schema evolution is a
//! JSON concern rather than a column-migration concern. Position pairs
//! are indexed per the persisted-state contract.

use sqlx::SqlitePool;

use crate::error::DbError;

/// Every table and index, executed statement by statement.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS world_meta (
        key        TEXT PRIMARY KEY,
        value      TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS chunks (
        key        TEXT PRIMARY KEY,
        data       TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS agents (
        id         INTEGER PRIMARY KEY,
        name       TEXT NOT NULL,
        role       TEXT NOT NULL,
        x          REAL NOT NULL,
        y          REAL NOT NULL,
        data       TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_agents_pos ON agents (x, y)",
    "CREATE TABLE IF NOT EXISTS resources (
        id         INTEGER PRIMARY KEY,
        kind       TEXT NOT NULL,
        x          REAL NOT NULL,
        y          REAL NOT NULL,
        data       TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_resources_pos ON resources (x, y)",
    "CREATE TABLE IF NOT EXISTS npc_monsters (
        id         INTEGER PRIMARY KEY,
        template   TEXT NOT NULL,
        x          REAL NOT NULL,
        y          REAL NOT NULL,
        data       TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_npc_monsters_pos ON npc_monsters (x, y)",
    "CREATE TABLE IF NOT EXISTS behemoths (
        id         INTEGER PRIMARY KEY,
        kind       TEXT NOT NULL,
        x          REAL NOT NULL,
        y          REAL NOT NULL,
        data       TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS structures (
        id         INTEGER PRIMARY KEY,
        kind       TEXT NOT NULL,
        x          REAL NOT NULL,
        y          REAL NOT NULL,
        data       TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS alliances (
        name       TEXT PRIMARY KEY,
        data       TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS alliance_members (
        alliance   TEXT NOT NULL,
        agent_id   INTEGER NOT NULL,
        PRIMARY KEY (alliance, agent_id)
    )",
    "CREATE TABLE IF NOT EXISTS trades (
        id         INTEGER PRIMARY KEY,
        status     TEXT NOT NULL,
        data       TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS crafting_queue (
        id         INTEGER PRIMARY KEY,
        agent_id   INTEGER NOT NULL,
        data       TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS messages (
        id         INTEGER PRIMARY KEY,
        tick       INTEGER NOT NULL,
        sender_id  INTEGER NOT NULL,
        data       TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_messages_tick ON messages (tick)",
    "CREATE TABLE IF NOT EXISTS events (
        id         INTEGER PRIMARY KEY,
        tick       INTEGER NOT NULL,
        data       TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_events_tick ON events (tick)",
];

/// Create every table and index if absent.
pub async fn init(pool: &SqlitePool) -> Result<(), DbError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("Database schema ready");
    Ok(())
}
