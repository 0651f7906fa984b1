// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! SQL Translator
//!
//! Translates a [`Predicate`] into a parameterized SQL WHERE clause over the
//! string representation column. Terms are always bound, never spliced into
//! the clause text.
//!
//! # SQL Syntax Generated
//!
//! ```sql
//! string_rep ~* $1                              -- Postgres
//! REGEXP_LIKE(string_rep, ?, 'i')               -- MySQL
//! instr(lower(string_rep), lower(?)) > 0        -- SQLite (substring only)
//! (string_rep ~* $1 AND string_rep ~* $2)       -- AND composition
//! ```

use super::query_builder::Predicate;

/// SQL flavour of the target store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    MySql,
    Postgres,
}

impl Dialect {
    /// Pick the dialect from a connection string.
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("sqlite:") {
            Some(Dialect::Sqlite)
        } else if url.starts_with("mysql:") || url.starts_with("mariadb:") {
            Some(Dialect::MySql)
        } else if url.starts_with("postgres:") || url.starts_with("postgresql:") {
            Some(Dialect::Postgres)
        } else {
            None
        }
    }

    /// Case-insensitive match of one bound pattern against `column`.
    fn match_clause(&self, column: &str) -> String {
        match self {
            Dialect::Postgres => format!("{} ~* ?", column),
            Dialect::MySql => format!("REGEXP_LIKE({}, ?, 'i')", column),
            Dialect::Sqlite => format!("instr(lower({}), lower(?)) > 0", column),
        }
    }

    /// Rewrite `?` placeholders into the dialect's bind markers.
    ///
    /// Postgres uses numbered `$n` markers; the others keep `?`.
    /// Statements passed here must not contain `?` inside string literals.
    pub fn bind_markers(&self, sql: &str) -> String {
        match self {
            Dialect::Postgres => {
                let mut out = String::with_capacity(sql.len() + 8);
                let mut n = 0;
                for ch in sql.chars() {
                    if ch == '?' {
                        n += 1;
                        out.push('$');
                        out.push_str(&n.to_string());
                    } else {
                        out.push(ch);
                    }
                }
                out
            }
            Dialect::MySql | Dialect::Sqlite => sql.to_string(),
        }
    }
}

/// SQL query translator for the string representation column
pub struct SqlTranslator;

/// SQL clause with its bound parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    /// The WHERE clause (without "WHERE" keyword), using `?` placeholders
    pub clause: String,
    /// Patterns to bind, in placeholder order
    pub params: Vec<String>,
}

impl SqlTranslator {
    /// Translate a predicate into a parameterized WHERE clause.
    ///
    /// The clause uses `?` placeholders; run it through
    /// [`Dialect::bind_markers`] once the full statement is assembled.
    pub fn translate(predicate: &Predicate, column: &str, dialect: Dialect) -> SqlQuery {
        let mut params = Vec::new();
        let clause = Self::translate_node(predicate, column, dialect, &mut params);
        SqlQuery { clause, params }
    }

    /// Translate with values spliced in.
    ///
    /// Warning: Only use for logging, never for execution (SQL injection risk)
    pub fn translate_inline(predicate: &Predicate, column: &str, dialect: Dialect) -> String {
        let SqlQuery { clause, params } = Self::translate(predicate, column, dialect);
        let mut params = params.into_iter().peekable();
        let mut out = String::with_capacity(clause.len() + 16);
        // Single pass: a '?' inside an already spliced value is never a placeholder.
        for ch in clause.chars() {
            match (ch, params.next_if(|_| ch == '?')) {
                (_, Some(param)) => {
                    out.push('\'');
                    out.push_str(&param.replace('\'', "''"));
                    out.push('\'');
                }
                (ch, None) => out.push(ch),
            }
        }
        out
    }

    fn translate_node(
        node: &Predicate,
        column: &str,
        dialect: Dialect,
        params: &mut Vec<String>,
    ) -> String {
        match node {
            Predicate::Match(m) => {
                params.push(m.pattern());
                dialect.match_clause(column)
            }
            Predicate::And(nodes) => Self::join(nodes, " AND ", column, dialect, params),
            Predicate::Or(nodes) => Self::join(nodes, " OR ", column, dialect, params),
        }
    }

    fn join(
        nodes: &[Predicate],
        connector: &str,
        column: &str,
        dialect: Dialect,
        params: &mut Vec<String>,
    ) -> String {
        let parts: Vec<String> = nodes
            .iter()
            .map(|n| Self::translate_node(n, column, dialect, params))
            .collect();
        match parts.len() {
            0 => "1=0".to_string(),
            1 => parts.into_iter().next().unwrap_or_default(),
            _ => format!("({})", parts.join(connector)),
        }
    }
}
