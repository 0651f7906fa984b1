// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Index coordinator.
//!
//! [`IndexCoordinator`] sits in front of a [`RecordStore`] and keeps each
//! record's string representation in step with its fields:
//!
//! ```text
//! create / upsert / update          resync(id)
//!   │                                 │
//!   ├─→ store mutation ───────────────┤
//!   │                                 ├─→ store.get(id)        (read-back)
//!   │                                 ├─→ encode(fields)
//!   │                                 └─→ store.write_string_rep (write-back)
//! ```
//!
//! The mutation and the write-back are separate round trips with no
//! transaction around them. A reader in between sees a representation one
//! write behind. Concurrent resyncs of the same id are last-writer-wins,
//! which is harmless because the value is recomputed from current fields.
//!
//! Write-back failures are logged and returned; nothing is retried here.

mod search_api;

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::RepIndexConfig;
use crate::encoder::{encode, StringRep};
use crate::error::IndexError;
use crate::metrics::{self, ResyncTimer};
use crate::record::{IndexedUser, NewUser, UserPatch, UserRecord};
use crate::storage::traits::{RecordStore, UpsertMode};

/// Page size used when scanning for stale representations.
const REPAIR_PAGE_SIZE: usize = 500;

pub struct IndexCoordinator<S> {
    store: Arc<S>,
    search_limit: usize,
}

impl<S: RecordStore> IndexCoordinator<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(Arc::new(store), &RepIndexConfig::default())
    }

    /// Share an existing store handle.
    pub fn with_config(store: Arc<S>, config: &RepIndexConfig) -> Self {
        Self {
            store,
            search_limit: config.search_limit,
        }
    }

    /// The underlying store. Mutations made through it directly are not
    /// reflected in the representation until [`resync`](Self::resync) runs.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Re-derive and persist the representation of `id` from its stored fields.
    ///
    /// Fails with [`IndexError::NotFound`] if the record does not exist (or
    /// disappears before the write-back lands). A failed write-back leaves the
    /// previous representation in place.
    #[tracing::instrument(skip(self))]
    pub async fn resync(&self, id: &str) -> Result<StringRep, IndexError> {
        let _timer = ResyncTimer::start();
        let result = self.read_encode_write(id).await;
        record_outcome(&result);
        result.map(|(_, rep)| rep)
    }

    /// Insert `user`, then resync so store-side defaults show up in the representation.
    #[tracing::instrument(skip(self, user), fields(user_id = %user.user_id))]
    pub async fn create(&self, user: &NewUser) -> Result<IndexedUser, IndexError> {
        let provisional = encode(&user.provisional());
        self.store.insert(user, provisional.as_str()).await?;
        self.resync_record(&user.user_id).await
    }

    /// Create several records one by one, stopping at the first failure.
    pub async fn create_many(&self, users: &[NewUser]) -> Result<Vec<IndexedUser>, IndexError> {
        let mut created = Vec::with_capacity(users.len());
        for user in users {
            created.push(self.create(user).await?);
        }
        info!(count = created.len(), "Created records");
        Ok(created)
    }

    /// Insert, or on conflict apply `mode`, then resync.
    #[tracing::instrument(skip(self, user), fields(user_id = %user.user_id))]
    pub async fn upsert(&self, user: &NewUser, mode: &UpsertMode) -> Result<IndexedUser, IndexError> {
        let provisional = encode(&user.provisional());
        self.store.upsert(user, provisional.as_str(), mode).await?;
        self.resync_record(&user.user_id).await
    }

    /// Change the fields present in `patch`, then resync.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: &UserPatch) -> Result<IndexedUser, IndexError> {
        if !self.store.update(id, patch).await? {
            return Err(IndexError::NotFound(id.to_string()));
        }
        self.resync_record(id).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<IndexedUser>, IndexError> {
        Ok(self.store.get(id).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), IndexError> {
        if self.store.delete(id).await? {
            Ok(())
        } else {
            Err(IndexError::NotFound(id.to_string()))
        }
    }

    /// Scan every record and resync the ones whose representation is stale.
    ///
    /// Returns the number of records rewritten. Records deleted mid-scan are skipped.
    pub async fn repair_all(&self) -> Result<usize, IndexError> {
        let mut offset = 0u64;
        let mut repaired = 0usize;
        loop {
            let page = self.store.list(offset, REPAIR_PAGE_SIZE).await?;
            if page.is_empty() {
                break;
            }
            offset += page.len() as u64;
            for user in page.iter().filter(|u| !u.is_consistent()) {
                match self.resync_record(&user.record.user_id).await {
                    Ok(_) => repaired += 1,
                    Err(IndexError::NotFound(_)) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        info!(repaired, scanned = offset, "Representation repair finished");
        Ok(repaired)
    }

    async fn resync_record(&self, id: &str) -> Result<IndexedUser, IndexError> {
        let _timer = ResyncTimer::start();
        let result = self.read_encode_write(id).await;
        record_outcome(&result);
        result.map(|(record, rep)| IndexedUser {
            record,
            string_rep: rep.into_inner(),
        })
    }

    async fn read_encode_write(&self, id: &str) -> Result<(UserRecord, StringRep), IndexError> {
        let current = match self.store.get(id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!(user_id = %id, "Resync target not found");
                return Err(IndexError::NotFound(id.to_string()));
            }
            Err(e) => {
                warn!(user_id = %id, error = %e, "Resync read-back failed");
                return Err(e.into());
            }
        };

        let rep = encode(&current.record);
        let stale = current.string_rep != rep.as_str();
        debug!(user_id = %id, stale, string_rep = %rep, "Resync read-back");

        match self.store.write_string_rep(id, rep.as_str()).await {
            Ok(true) => Ok((current.record, rep)),
            Ok(false) => {
                debug!(user_id = %id, "Record removed before write-back");
                Err(IndexError::NotFound(id.to_string()))
            }
            Err(e) => {
                warn!(
                    user_id = %id,
                    error = %e,
                    "Resync write-back failed; stored representation left unchanged"
                );
                Err(e.into())
            }
        }
    }
}

fn record_outcome<T>(result: &Result<T, IndexError>) {
    metrics::record_resync(match result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    });
}
