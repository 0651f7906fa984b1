// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search API for IndexCoordinator
//!
//! ```text
//! search(request)
//!       │
//!       ├─→ build_predicate (EmptyInput on no terms, single-term override)
//!       │
//!       └─→ store.search(predicate, search_limit)
//!                │
//!                └─→ records ordered by user_id
//! ```
//!
//! Results reflect the representation as last written. A record whose
//! resync has not landed yet matches on its previous field values.

use std::time::Instant;
use tracing::{debug, warn};

use crate::error::IndexError;
use crate::metrics;
use crate::record::IndexedUser;
use crate::search::{CompositionMode, MatchMode, SearchRequest};
use crate::storage::traits::RecordStore;

use super::IndexCoordinator;

impl<S: RecordStore> IndexCoordinator<S> {
    /// Run `request` against the store.
    ///
    /// Returns [`IndexError::EmptyInput`] for a request without terms, and
    /// [`IndexError::StoreFailure`] if the store rejects the query (including
    /// a pattern the backend cannot compile).
    #[tracing::instrument(skip(self, request), fields(terms = request.terms.len()))]
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<IndexedUser>, IndexError> {
        let start = Instant::now();
        let match_label = request.match_mode.as_str();
        let composition = request.effective_mode();

        let result = self.run_search(request).await;

        metrics::record_search_latency(match_label, start.elapsed());
        match &result {
            Ok(rows) => {
                metrics::record_search(match_label, composition.as_str(), "success");
                metrics::record_search_results(rows.len());
                debug!(
                    results = rows.len(),
                    composition = %composition,
                    match_mode = match_label,
                    "Search complete"
                );
            }
            Err(e) => {
                metrics::record_search(match_label, composition.as_str(), e.kind());
                if matches!(e, IndexError::StoreFailure(_)) {
                    warn!(error = %e, match_mode = match_label, "Search failed");
                }
            }
        }
        result
    }

    /// Shorthand for `search(&SearchRequest::new(terms, mode, match_mode)?)`.
    pub async fn search_terms<T: Into<String>>(
        &self,
        terms: impl IntoIterator<Item = T>,
        mode: CompositionMode,
        match_mode: MatchMode,
    ) -> Result<Vec<IndexedUser>, IndexError> {
        let request = match SearchRequest::new(terms, mode, match_mode) {
            Ok(request) => request,
            Err(e) => {
                metrics::record_search(match_mode.as_str(), mode.as_str(), e.kind());
                return Err(e);
            }
        };
        self.search(&request).await
    }

    async fn run_search(&self, request: &SearchRequest) -> Result<Vec<IndexedUser>, IndexError> {
        let predicate = request.predicate()?;
        Ok(self.store.search(&predicate, self.search_limit).await?)
    }
}
