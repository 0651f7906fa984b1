// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! # Rep Index
//!
//! Searchable string representations for user records in a relational store.
//!
//! ## Architecture
//!
//! Every record carries a derived `string_rep` column holding all of its
//! fields joined and bounded by a delimiter. Searches run against that one
//! column instead of per-field predicates.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     IndexCoordinator                        │
//! │  • create / upsert / update → store mutation               │
//! │  • resync: read back → encode → write back                 │
//! │  • search: SearchRequest → Predicate → store               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       RecordStore                           │
//! │  • InMemoryStore: DashMap + case-insensitive regex         │
//! │  • SqlStore: SQLite / MySQL / Postgres, bound parameters   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Representation
//!
//! ```text
//! #A1#Wendy#Lawson#wendylawson@x.com#555-0001#false#$1,582.33#
//! ```
//!
//! - **Exact** search for `Wendy` looks for `#Wendy#`, so it only hits a whole field.
//! - **Pattern** search for `0001` looks for the raw term anywhere.
//!
//! Both are case-insensitive.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rep_index::{IndexCoordinator, NewUser, SearchRequest, CompositionMode, SqlStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqlStore::new("sqlite::memory:").await?;
//!     let index = IndexCoordinator::new(store);
//!
//!     index.create(&NewUser::new("A1").first_name("Wendy").last_name("Lawson")).await?;
//!
//!     let hits = index
//!         .search(&SearchRequest::exact(["wendy", "lawson"], CompositionMode::And)?)
//!         .await?;
//!     assert_eq!(hits.len(), 1);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`coordinator`]: [`IndexCoordinator`], the resync maintainer and search entry point
//! - [`encoder`]: record → representation
//! - [`search`]: predicate building, SQL translation, in-memory matching
//! - [`storage`]: store backends (memory, SQL)
//! - [`resilience`]: retry with backoff for connects and reads

pub mod config;
pub mod error;
pub mod record;
pub mod encoder;
pub mod search;
pub mod storage;
pub mod resilience;
pub mod coordinator;
pub mod metrics;

pub use config::RepIndexConfig;
pub use error::IndexError;
pub use coordinator::IndexCoordinator;
pub use encoder::{encode, StringRep, DELIMITER};
pub use record::{IndexedUser, NewUser, Record, UserColumn, UserPatch, UserRecord};
pub use search::{CompositionMode, MatchMode, Predicate, SearchRequest};
pub use storage::traits::{RecordStore, StorageError, UpsertMode};
pub use storage::memory::InMemoryStore;
pub use storage::sql::SqlStore;
pub use resilience::retry::RetryConfig;
