// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::record::{IndexedUser, NewUser, UserPatch};
use crate::search::{CompiledPredicate, Predicate};
use super::traits::{RecordStore, StorageError, UpsertMode};

/// Concurrent in-process store.
///
/// Applies the same column defaults as the SQL schema and evaluates
/// predicates with case-insensitive regexes.
pub struct InMemoryStore {
    data: DashMap<String, IndexedUser>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Get current record count
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&self) {
        self.data.clear();
    }

    /// Rows passing `keep`, cloned only after the check, in identifier order.
    fn matching(&self, keep: impl Fn(&IndexedUser) -> bool) -> Vec<IndexedUser> {
        let mut rows: Vec<IndexedUser> = self
            .data
            .iter()
            .filter(|r| keep(r.value()))
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| a.record.user_id.cmp(&b.record.user_id));
        rows
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn get(&self, id: &str) -> Result<Option<IndexedUser>, StorageError> {
        Ok(self.data.get(id).map(|r| r.value().clone()))
    }

    async fn insert(&self, user: &NewUser, string_rep: &str) -> Result<(), StorageError> {
        match self.data.entry(user.user_id.clone()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(user.user_id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(IndexedUser {
                    record: user.with_defaults(),
                    string_rep: string_rep.to_string(),
                });
                Ok(())
            }
        }
    }

    async fn upsert(&self, user: &NewUser, string_rep: &str, mode: &UpsertMode) -> Result<(), StorageError> {
        match self.data.entry(user.user_id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(IndexedUser {
                    record: user.with_defaults(),
                    string_rep: string_rep.to_string(),
                });
            }
            Entry::Occupied(mut slot) => {
                let row = slot.get_mut();
                for col in mode.conflict_columns(user) {
                    if let Some(value) = user.fields.get(col) {
                        col.assign(&mut row.record, value);
                    }
                }
                if mode.writes_string_rep() {
                    row.string_rep = string_rep.to_string();
                }
            }
        }
        Ok(())
    }

    async fn update(&self, id: &str, patch: &UserPatch) -> Result<bool, StorageError> {
        match self.data.get_mut(id) {
            Some(mut row) => {
                patch.apply_to(&mut row.record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn write_string_rep(&self, id: &str, string_rep: &str) -> Result<bool, StorageError> {
        match self.data.get_mut(id) {
            Some(mut row) => {
                row.string_rep = string_rep.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.data.remove(id).is_some())
    }

    async fn search(&self, predicate: &Predicate, limit: usize) -> Result<Vec<IndexedUser>, StorageError> {
        let compiled = CompiledPredicate::compile(predicate)?;
        let mut rows = self.matching(|row| compiled.is_match(&row.string_rep));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn list(&self, offset: u64, limit: usize) -> Result<Vec<IndexedUser>, StorageError> {
        let mut ids: Vec<String> = self.data.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        // Rows removed since the key scan are skipped
        Ok(ids
            .iter()
            .skip(offset as usize)
            .take(limit)
            .filter_map(|id| self.data.get(id).map(|r| r.value().clone()))
            .collect())
    }

    async fn count_all(&self) -> Result<u64, StorageError> {
        Ok(self.data.len() as u64)
    }
}
