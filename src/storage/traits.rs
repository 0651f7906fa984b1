// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use async_trait::async_trait;
use thiserror::Error;

use crate::record::{IndexedUser, NewUser, UserColumn, UserPatch};
use crate::search::Predicate;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Record '{0}' already exists")]
    Conflict(String),
    #[error("Invalid search pattern {0}")]
    InvalidPattern(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// What an upsert changes when the identifier already exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertMode {
    /// Overwrite every column the payload carries, plus the string representation
    All,
    /// Overwrite only these columns (when the payload carries them)
    Columns(Vec<UserColumn>),
}

impl UpsertMode {
    /// Columns of `user` that an upsert overwrites on conflict.
    pub fn conflict_columns(&self, user: &NewUser) -> Vec<UserColumn> {
        let present = user.fields.present().into_iter().map(|(col, _)| col);
        match self {
            UpsertMode::All => present.collect(),
            UpsertMode::Columns(cols) => present.filter(|c| cols.contains(c)).collect(),
        }
    }

    /// Whether the stored representation is overwritten on conflict.
    pub fn writes_string_rep(&self) -> bool {
        matches!(self, UpsertMode::All)
    }
}

/// Store contract the index relies on.
///
/// Records are keyed by their identifier. `search` must evaluate the
/// predicate case-insensitively against the stored string representation.
/// None of these calls touch the representation implicitly except where
/// a `string_rep` argument is passed in.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<IndexedUser>, StorageError>;

    /// Insert a new record. Omitted fields take the store's defaults.
    /// Fails with [`StorageError::Conflict`] if the identifier exists.
    async fn insert(&self, user: &NewUser, string_rep: &str) -> Result<(), StorageError>;

    /// Insert, or on identifier conflict apply `mode`.
    async fn upsert(&self, user: &NewUser, string_rep: &str, mode: &UpsertMode) -> Result<(), StorageError>;

    /// Change the fields present in `patch`. Returns `false` when no row matched.
    async fn update(&self, id: &str, patch: &UserPatch) -> Result<bool, StorageError>;

    /// Overwrite the stored representation. Returns `false` when no row matched.
    async fn write_string_rep(&self, id: &str, string_rep: &str) -> Result<bool, StorageError>;

    /// Returns `false` when no row matched.
    async fn delete(&self, id: &str) -> Result<bool, StorageError>;

    /// All records whose representation satisfies `predicate`, ordered by identifier.
    ///
    /// How a term's metacharacters are read depends on the backend. The
    /// in-memory, Postgres and MySQL stores treat a term as a case-insensitive
    /// regular expression, so `$`, `(` or `.` keep their regex meaning. SQLite
    /// has no regex builtin and matches the term as a literal case-insensitive
    /// substring. Terms free of metacharacters match identically everywhere.
    async fn search(&self, predicate: &Predicate, limit: usize) -> Result<Vec<IndexedUser>, StorageError>;

    /// Page through records ordered by identifier.
    async fn list(&self, offset: u64, limit: usize) -> Result<Vec<IndexedUser>, StorageError>;

    async fn count_all(&self) -> Result<u64, StorageError>;

    /// Fetch several records, skipping identifiers that do not exist.
    /// Default implementation falls back to sequential gets.
    async fn get_many(&self, ids: &[&str]) -> Result<Vec<IndexedUser>, StorageError> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = self.get(id).await? {
                out.push(user);
            }
        }
        Ok(out)
    }
}
