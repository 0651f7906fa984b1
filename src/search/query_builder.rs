// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query Builder - predicate AST over the string representation
//!
//! Turns a list of search terms, a composition mode and a match mode into a
//! [`Predicate`]. The predicate is backend-neutral: [`SqlTranslator`] renders
//! it as a parameterized SQL clause and [`CompiledPredicate`] evaluates it in
//! memory.
//!
//! # Example
//!
//! ```rust
//! use rep_index::search::{build_predicate, CompositionMode, MatchMode, Predicate};
//!
//! // Exact: "Wendy" must be a whole field AND "Lawson" must be a whole field
//! let pred = build_predicate(&["Wendy", "Lawson"], CompositionMode::And, MatchMode::Exact).unwrap();
//! assert_eq!(pred.patterns(), vec!["#Wendy#", "#Lawson#"]);
//!
//! // A single term ignores the declared composition
//! let pred = build_predicate(&["0001"], CompositionMode::Or, MatchMode::Pattern).unwrap();
//! assert!(matches!(pred, Predicate::Match(_)));
//! ```
//!
//! [`SqlTranslator`]: super::SqlTranslator
//! [`CompiledPredicate`]: super::CompiledPredicate

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::encoder::wrap_exact;
use crate::error::IndexError;

/// How multiple terms combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CompositionMode {
    /// Every term must match
    And,
    /// At least one term must match
    Or,
    /// Only the first term is used
    Single,
}

impl CompositionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositionMode::And => "and",
            CompositionMode::Or => "or",
            CompositionMode::Single => "single",
        }
    }
}

impl fmt::Display for CompositionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompositionMode {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" => Ok(CompositionMode::And),
            "or" => Ok(CompositionMode::Or),
            "single" => Ok(CompositionMode::Single),
            _ => Err(IndexError::InvalidMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for CompositionMode {
    type Error = IndexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CompositionMode> for String {
    fn from(mode: CompositionMode) -> Self {
        mode.as_str().to_string()
    }
}

/// Whether a term must equal a whole field or may appear anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Term must equal a complete field value (delimiter-wrapped)
    Exact,
    /// Term may occur anywhere in the representation, across field boundaries too
    Pattern,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Exact => "exact",
            MatchMode::Pattern => "pattern",
        }
    }
}

/// One atomic, case-insensitive match against the string representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermMatch {
    /// The caller's term, unmodified
    pub term: String,
    pub mode: MatchMode,
}

impl TermMatch {
    /// Pattern the store evaluates: the term itself, or `#term#` for exact matches.
    ///
    /// Regex metacharacters in the term are passed through untouched.
    pub fn pattern(&self) -> String {
        match self.mode {
            MatchMode::Exact => wrap_exact(&self.term),
            MatchMode::Pattern => self.term.clone(),
        }
    }
}

/// Predicate AST node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    Match(TermMatch),
    /// All children must hold
    And(Vec<Predicate>),
    /// At least one child must hold
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Store-side patterns in term order.
    pub fn patterns(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_patterns(&mut out);
        out
    }

    fn collect_patterns(&self, out: &mut Vec<String>) {
        match self {
            Predicate::Match(m) => out.push(m.pattern()),
            Predicate::And(nodes) | Predicate::Or(nodes) => {
                for node in nodes {
                    node.collect_patterns(out);
                }
            }
        }
    }
}

/// A validated search: terms, composition and match mode.
///
/// Deserializing goes through [`SearchRequest::new`], so an empty term list
/// is rejected there too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSearchRequest")]
pub struct SearchRequest {
    pub terms: Vec<String>,
    pub mode: CompositionMode,
    #[serde(rename = "match")]
    pub match_mode: MatchMode,
}

/// Wire shape of a [`SearchRequest`] before validation.
#[derive(Deserialize)]
struct RawSearchRequest {
    terms: Vec<String>,
    #[serde(default = "default_mode")]
    mode: CompositionMode,
    #[serde(rename = "match", default = "default_match")]
    match_mode: MatchMode,
}

fn default_mode() -> CompositionMode { CompositionMode::And }
fn default_match() -> MatchMode { MatchMode::Exact }

impl TryFrom<RawSearchRequest> for SearchRequest {
    type Error = IndexError;

    fn try_from(raw: RawSearchRequest) -> Result<Self, Self::Error> {
        Self::new(raw.terms, raw.mode, raw.match_mode)
    }
}

impl SearchRequest {
    pub fn new<S: Into<String>>(
        terms: impl IntoIterator<Item = S>,
        mode: CompositionMode,
        match_mode: MatchMode,
    ) -> Result<Self, IndexError> {
        let terms: Vec<String> = terms.into_iter().map(Into::into).collect();
        if terms.is_empty() {
            return Err(IndexError::EmptyInput);
        }
        Ok(Self { terms, mode, match_mode })
    }

    /// Exact-match request.
    pub fn exact<S: Into<String>>(
        terms: impl IntoIterator<Item = S>,
        mode: CompositionMode,
    ) -> Result<Self, IndexError> {
        Self::new(terms, mode, MatchMode::Exact)
    }

    /// Pattern-match request.
    pub fn pattern<S: Into<String>>(
        terms: impl IntoIterator<Item = S>,
        mode: CompositionMode,
    ) -> Result<Self, IndexError> {
        Self::new(terms, mode, MatchMode::Pattern)
    }

    /// Composition mode that will actually be applied.
    pub fn effective_mode(&self) -> CompositionMode {
        if self.terms.len() == 1 {
            CompositionMode::Single
        } else {
            self.mode
        }
    }

    pub fn predicate(&self) -> Result<Predicate, IndexError> {
        build_predicate(&self.terms, self.mode, self.match_mode)
    }
}

/// Build a predicate from `terms`.
///
/// - Fails with [`IndexError::EmptyInput`] when `terms` is empty.
/// - A single term always yields an unwrapped [`Predicate::Match`].
/// - [`CompositionMode::Single`] with several terms uses the first term only.
pub fn build_predicate<S: AsRef<str>>(
    terms: &[S],
    mode: CompositionMode,
    match_mode: MatchMode,
) -> Result<Predicate, IndexError> {
    let first = terms.first().ok_or(IndexError::EmptyInput)?;

    let effective = if terms.len() == 1 { CompositionMode::Single } else { mode };
    let atom = |t: &S| {
        Predicate::Match(TermMatch {
            term: t.as_ref().to_string(),
            mode: match_mode,
        })
    };

    let predicate = match effective {
        CompositionMode::Single => atom(first),
        CompositionMode::And => Predicate::And(terms.iter().map(atom).collect()),
        CompositionMode::Or => Predicate::Or(terms.iter().map(atom).collect()),
    };

    debug!(
        terms = terms.len(),
        requested = %mode,
        effective = %effective,
        match_mode = match_mode.as_str(),
        "Built search predicate"
    );
    Ok(predicate)
}

/// Exact-match entry point.
pub fn build_exact<S: AsRef<str>>(terms: &[S], mode: CompositionMode) -> Result<Predicate, IndexError> {
    build_predicate(terms, mode, MatchMode::Exact)
}

/// Pattern-match entry point.
pub fn build_pattern<S: AsRef<str>>(terms: &[S], mode: CompositionMode) -> Result<Predicate, IndexError> {
    build_predicate(terms, mode, MatchMode::Pattern)
}
