// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Storage backends implementing [`RecordStore`](traits::RecordStore).
//!
//! - [`memory::InMemoryStore`]: DashMap-backed, regex evaluation in process
//! - [`sql::SqlStore`]: SQLite / MySQL / Postgres through the sqlx `Any` driver

pub mod traits;
pub mod memory;
pub mod sql;
