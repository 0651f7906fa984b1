// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Infrastructure
//!
//! Exact and pattern search over the string representation column.
//!
//! # Architecture
//!
//! ```text
//! SearchRequest (terms, composition, match mode)
//!     ↓
//! build_predicate → Predicate (AST)
//!     ├─→ SqlTranslator → parameterized WHERE clause (SqlStore)
//!     └─→ CompiledPredicate → case-insensitive regex (InMemoryStore)
//! ```
//!
//! # Matching
//!
//! ```text
//! exact   ["Wendy", "Lawson"] AND  →  rep ~* '#Wendy#' AND rep ~* '#Lawson#'
//! exact   ["Sonia", "Wendy"]  OR   →  rep ~* '#Sonia#' OR  rep ~* '#Wendy#'
//! pattern ["62855", "570-2414"] OR →  rep ~* '62855'   OR  rep ~* '570-2414'
//! ```

mod query_builder;
mod sql_translator;
mod matcher;

pub use query_builder::{
    build_exact, build_pattern, build_predicate, CompositionMode, MatchMode, Predicate,
    SearchRequest, TermMatch,
};
pub use sql_translator::{Dialect, SqlQuery, SqlTranslator};
pub use matcher::CompiledPredicate;
