// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! In-process predicate evaluation.
//!
//! Compiles each atomic match into a case-insensitive regex, mirroring
//! Postgres `~*`. Terms are compiled as given, so a term with regex
//! metacharacters matches as a regex and a malformed one fails to compile.

use regex::{Regex, RegexBuilder};

use super::query_builder::Predicate;
use crate::storage::traits::StorageError;

/// A [`Predicate`] with every pattern compiled.
#[derive(Debug, Clone)]
pub enum CompiledPredicate {
    Match(Regex),
    And(Vec<CompiledPredicate>),
    Or(Vec<CompiledPredicate>),
}

impl CompiledPredicate {
    pub fn compile(predicate: &Predicate) -> Result<Self, StorageError> {
        Ok(match predicate {
            Predicate::Match(m) => {
                let pattern = m.pattern();
                let regex = RegexBuilder::new(&pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| StorageError::InvalidPattern(format!("{}: {}", pattern, e)))?;
                CompiledPredicate::Match(regex)
            }
            Predicate::And(nodes) => CompiledPredicate::And(
                nodes.iter().map(Self::compile).collect::<Result<_, _>>()?,
            ),
            Predicate::Or(nodes) => CompiledPredicate::Or(
                nodes.iter().map(Self::compile).collect::<Result<_, _>>()?,
            ),
        })
    }

    pub fn is_match(&self, string_rep: &str) -> bool {
        match self {
            CompiledPredicate::Match(re) => re.is_match(string_rep),
            CompiledPredicate::And(nodes) => nodes.iter().all(|n| n.is_match(string_rep)),
            CompiledPredicate::Or(nodes) => nodes.iter().any(|n| n.is_match(string_rep)),
        }
    }
}
