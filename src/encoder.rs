// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! String representation encoder.
//!
//! Turns a record into a single delimiter-bounded text value:
//!
//! ```text
//! #<f1>#<f2>#...#<fn>#
//! ```
//!
//! Every field is wrapped on both sides by [`DELIMITER`], so an exact search
//! for a whole field value is a substring search for `#value#`.
//!
//! Values are written verbatim. Case is left alone (matching is
//! case-insensitive at query time) and a value containing the delimiter is
//! neither escaped nor rejected; it is logged and counted instead.
//!
//! # Example
//!
//! ```
//! use rep_index::encoder::encode;
//! use rep_index::record::UserRecord;
//!
//! let user = UserRecord {
//!     user_id: "A1".into(),
//!     first_name: "Wendy".into(),
//!     last_name: "Lawson".into(),
//!     email: "wendylawson@x.com".into(),
//!     phone: "555-0001".into(),
//!     active: false,
//!     balance: "$1,582.33".into(),
//! };
//!
//! assert_eq!(
//!     encode(&user).as_str(),
//!     "#A1#Wendy#Lawson#wendylawson@x.com#555-0001#false#$1,582.33#"
//! );
//! ```

use std::fmt;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::metrics;
use crate::record::Record;

/// Field delimiter inside the string representation.
pub const DELIMITER: char = '#';

/// Derived, delimiter-bounded representation of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringRep(String);

impl StringRep {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for StringRep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StringRep {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for StringRep {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StringRep {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Encode `record` into its string representation.
pub fn encode<R: Record>(record: &R) -> StringRep {
    let mut out = String::with_capacity(64);
    out.push(DELIMITER);
    for field in R::FIELDS {
        let value = field.value(record).canonical();
        if value.contains(DELIMITER) {
            warn!(
                id = %record.id(),
                field = field.name,
                "Field value contains the delimiter; exact matches on this record are ambiguous"
            );
            metrics::record_delimiter_collision(field.name);
        }
        out.push_str(&value);
        out.push(DELIMITER);
    }
    metrics::record_encode();
    StringRep(out)
}

/// Wrap a term in delimiters so it only matches a whole field value.
pub fn wrap_exact(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push(DELIMITER);
    out.push_str(term);
    out.push(DELIMITER);
    out
}
