//! Error types for the persistence layer.

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `SQLite` operation failed.
    #[error("sqlite error: {source}")]
    Sqlite {
        /// The underlying driver error.
        #[from]
        source: sqlx::Error,
    },

    /// A persisted row could not be decoded back into an entity.
    #[error("corrupt row in {table}: {source}")]
    CorruptRow {
        /// The table holding the bad row.
        table: &'static str,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}
