// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Crate-level error taxonomy.
//!
//! Store adapters report [`StorageError`]; everything that crosses the public
//! API is an [`IndexError`]. Nothing here is fatal to the process, every
//! error is returned to the caller for disposition.

use thiserror::Error;
use crate::storage::traits::StorageError;

#[derive(Error, Debug)]
pub enum IndexError {
    /// A search was issued without any terms.
    #[error("search requires at least one term")]
    EmptyInput,
    /// The composition mode is not one of `and`, `or`, `single`.
    #[error("invalid composition mode '{0}' (expected and, or, single)")]
    InvalidMode(String),
    /// No record with this identifier exists in the store.
    #[error("record '{0}' not found")]
    NotFound(String),
    #[error("store failure: {0}")]
    StoreFailure(#[from] StorageError),
}

impl IndexError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            IndexError::EmptyInput => "empty_input",
            IndexError::InvalidMode(_) => "invalid_mode",
            IndexError::NotFound(_) => "not_found",
            IndexError::StoreFailure(_) => "store_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_convert() {
        let err: IndexError = StorageError::Backend("connection reset".into()).into();
        assert!(matches!(err, IndexError::StoreFailure(_)));
        assert_eq!(err.kind(), "store_failure");
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_invalid_mode_message_names_the_mode() {
        let err = IndexError::InvalidMode("xor".into());
        assert_eq!(err.to_string(), "invalid composition mode 'xor' (expected and, or, single)");
    }
}
