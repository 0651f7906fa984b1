// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Record types and their statically declared field order.
//!
//! A [`Record`] exposes its fields through [`Record::FIELDS`], an ordered
//! table of accessors. The encoder walks that table, so encoding order is
//! fixed at compile time rather than discovered at runtime.
//!
//! # Example
//!
//! ```
//! use rep_index::record::{Record, UserRecord};
//!
//! let names: Vec<&str> = UserRecord::FIELDS.iter().map(|f| f.name).collect();
//! assert_eq!(
//!     names,
//!     ["user_id", "first_name", "last_name", "email", "phone", "active", "balance"]
//! );
//! ```

use std::borrow::Cow;
use std::fmt;
use serde::{Deserialize, Serialize};

/// Value a store fills in for `first_name` / `last_name` when omitted.
pub const DEFAULT_NAME: &str = "NA";
/// Value a store fills in for `email` when omitted.
pub const DEFAULT_EMAIL: &str = "no-reply@none.com";
/// Value a store fills in for `phone` when omitted.
pub const DEFAULT_PHONE: &str = "000-000-0000";
/// Value a store fills in for `active` when omitted.
pub const DEFAULT_ACTIVE: bool = false;
/// Value a store fills in for `balance` when omitted.
pub const DEFAULT_BALANCE: &str = "0";

/// A single field value, borrowed from its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Free text, rendered verbatim
    Text(&'a str),
    /// Boolean flag, rendered as `true` / `false`
    Flag(bool),
    /// Pre-formatted numeric or currency string (e.g. `$1,582.33`), rendered exactly as stored
    Formatted(&'a str),
}

impl<'a> FieldValue<'a> {
    /// Canonical textual form used inside the string representation.
    pub fn canonical(&self) -> Cow<'a, str> {
        match *self {
            FieldValue::Text(s) | FieldValue::Formatted(s) => Cow::Borrowed(s),
            FieldValue::Flag(true) => Cow::Borrowed("true"),
            FieldValue::Flag(false) => Cow::Borrowed("false"),
        }
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Named accessor for one field of a record type.
pub struct Field<R> {
    pub name: &'static str,
    pub get: fn(&R) -> FieldValue<'_>,
}

impl<R> Field<R> {
    pub fn value<'r>(&self, record: &'r R) -> FieldValue<'r> {
        (self.get)(record)
    }
}

/// A record with a fixed, ordered schema of scalar fields.
pub trait Record: Sized + 'static {
    /// Fields in schema order. The first entry is the identifier.
    const FIELDS: &'static [Field<Self>];

    /// Immutable primary key.
    fn id(&self) -> &str;
}

/// A user row as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub active: bool,
    pub balance: String,
}

impl Record for UserRecord {
    const FIELDS: &'static [Field<Self>] = &[
        Field { name: "user_id", get: |u| FieldValue::Text(&u.user_id) },
        Field { name: "first_name", get: |u| FieldValue::Text(&u.first_name) },
        Field { name: "last_name", get: |u| FieldValue::Text(&u.last_name) },
        Field { name: "email", get: |u| FieldValue::Text(&u.email) },
        Field { name: "phone", get: |u| FieldValue::Text(&u.phone) },
        Field { name: "active", get: |u| FieldValue::Flag(u.active) },
        Field { name: "balance", get: |u| FieldValue::Formatted(&u.balance) },
    ];

    fn id(&self) -> &str {
        &self.user_id
    }
}

/// Mutable (non-key) columns of [`UserRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserColumn {
    FirstName,
    LastName,
    Email,
    Phone,
    Active,
    Balance,
}

impl UserColumn {
    pub const ALL: [UserColumn; 6] = [
        UserColumn::FirstName,
        UserColumn::LastName,
        UserColumn::Email,
        UserColumn::Phone,
        UserColumn::Active,
        UserColumn::Balance,
    ];

    /// Column name in the relational schema
    pub fn as_str(&self) -> &'static str {
        match self {
            UserColumn::FirstName => "first_name",
            UserColumn::LastName => "last_name",
            UserColumn::Email => "email",
            UserColumn::Phone => "phone",
            UserColumn::Active => "active",
            UserColumn::Balance => "balance",
        }
    }

    /// Value the store uses when an insert omits this column.
    pub fn default_value(&self) -> FieldValue<'static> {
        match self {
            UserColumn::FirstName | UserColumn::LastName => FieldValue::Text(DEFAULT_NAME),
            UserColumn::Email => FieldValue::Text(DEFAULT_EMAIL),
            UserColumn::Phone => FieldValue::Text(DEFAULT_PHONE),
            UserColumn::Active => FieldValue::Flag(DEFAULT_ACTIVE),
            UserColumn::Balance => FieldValue::Formatted(DEFAULT_BALANCE),
        }
    }

    /// Overwrite this column on `record`.
    pub fn assign(&self, record: &mut UserRecord, value: FieldValue<'_>) {
        let text = || value.canonical().into_owned();
        match self {
            UserColumn::FirstName => record.first_name = text(),
            UserColumn::LastName => record.last_name = text(),
            UserColumn::Email => record.email = text(),
            UserColumn::Phone => record.phone = text(),
            UserColumn::Balance => record.balance = text(),
            UserColumn::Active => {
                record.active = match value {
                    FieldValue::Flag(b) => b,
                    other => other.canonical() == "true",
                }
            }
        }
    }
}

/// Set of optional column values keyed by [`UserColumn`].
///
/// Shared by [`NewUser`] (insert / upsert payload) and [`UserPatch`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
}

impl UserFields {
    pub fn get(&self, column: UserColumn) -> Option<FieldValue<'_>> {
        match column {
            UserColumn::FirstName => self.first_name.as_deref().map(FieldValue::Text),
            UserColumn::LastName => self.last_name.as_deref().map(FieldValue::Text),
            UserColumn::Email => self.email.as_deref().map(FieldValue::Text),
            UserColumn::Phone => self.phone.as_deref().map(FieldValue::Text),
            UserColumn::Active => self.active.map(FieldValue::Flag),
            UserColumn::Balance => self.balance.as_deref().map(FieldValue::Formatted),
        }
    }

    /// Columns that carry a value, in schema order.
    pub fn present(&self) -> Vec<(UserColumn, FieldValue<'_>)> {
        UserColumn::ALL
            .iter()
            .filter_map(|col| self.get(*col).map(|v| (*col, v)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present().is_empty()
    }

    /// Copy every present value onto `record`.
    pub fn apply_to(&self, record: &mut UserRecord) {
        for (col, value) in self.present() {
            col.assign(record, value);
        }
    }
}

/// Insert / upsert payload. Omitted fields are defaulted by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub user_id: String,
    #[serde(flatten)]
    pub fields: UserFields,
}

impl NewUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), fields: UserFields::default() }
    }

    pub fn first_name(mut self, v: impl Into<String>) -> Self {
        self.fields.first_name = Some(v.into());
        self
    }

    pub fn last_name(mut self, v: impl Into<String>) -> Self {
        self.fields.last_name = Some(v.into());
        self
    }

    pub fn email(mut self, v: impl Into<String>) -> Self {
        self.fields.email = Some(v.into());
        self
    }

    pub fn phone(mut self, v: impl Into<String>) -> Self {
        self.fields.phone = Some(v.into());
        self
    }

    pub fn active(mut self, v: bool) -> Self {
        self.fields.active = Some(v);
        self
    }

    pub fn balance(mut self, v: impl Into<String>) -> Self {
        self.fields.balance = Some(v.into());
        self
    }

    /// The row a store persists on a fresh insert: omitted columns take their defaults.
    pub fn with_defaults(&self) -> UserRecord {
        let mut record = UserRecord {
            user_id: self.user_id.clone(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            active: DEFAULT_ACTIVE,
            balance: String::new(),
        };
        for col in UserColumn::ALL {
            let value = self.fields.get(col).unwrap_or_else(|| col.default_value());
            col.assign(&mut record, value);
        }
        record
    }

    /// The row as the caller sees it before the store applies defaults:
    /// omitted text is empty and omitted flags are `false`.
    pub fn provisional(&self) -> UserRecord {
        UserRecord {
            user_id: self.user_id.clone(),
            first_name: self.fields.first_name.clone().unwrap_or_default(),
            last_name: self.fields.last_name.clone().unwrap_or_default(),
            email: self.fields.email.clone().unwrap_or_default(),
            phone: self.fields.phone.clone().unwrap_or_default(),
            active: self.fields.active.unwrap_or(false),
            balance: self.fields.balance.clone().unwrap_or_default(),
        }
    }
}

impl From<UserRecord> for NewUser {
    fn from(record: UserRecord) -> Self {
        Self {
            user_id: record.user_id,
            fields: UserFields {
                first_name: Some(record.first_name),
                last_name: Some(record.last_name),
                email: Some(record.email),
                phone: Some(record.phone),
                active: Some(record.active),
                balance: Some(record.balance),
            },
        }
    }
}

/// Partial update of an existing user. Only `Some` fields change.
pub type UserPatch = UserFields;

/// A user row together with its stored string representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedUser {
    #[serde(flatten)]
    pub record: UserRecord,
    pub string_rep: String,
}

impl IndexedUser {
    /// Whether the stored representation matches the current field values.
    pub fn is_consistent(&self) -> bool {
        crate::encoder::encode(&self.record).as_str() == self.string_rep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wendy() -> UserRecord {
        UserRecord {
            user_id: "A1".into(),
            first_name: "Wendy".into(),
            last_name: "Lawson".into(),
            email: "wendylawson@x.com".into(),
            phone: "555-0001".into(),
            active: false,
            balance: "$1,582.33".into(),
        }
    }

    #[test]
    fn test_fields_follow_schema_order() {
        let rec = wendy();
        let values: Vec<String> = UserRecord::FIELDS
            .iter()
            .map(|f| f.value(&rec).to_string())
            .collect();
        assert_eq!(
            values,
            ["A1", "Wendy", "Lawson", "wendylawson@x.com", "555-0001", "false", "$1,582.33"]
        );
        assert_eq!(rec.id(), "A1");
    }

    #[test]
    fn test_flag_renders_literal() {
        assert_eq!(FieldValue::Flag(true).canonical(), "true");
        assert_eq!(FieldValue::Flag(false).canonical(), "false");
        assert_eq!(FieldValue::Formatted("$3,682.63").canonical(), "$3,682.63");
    }

    #[test]
    fn test_with_defaults_fills_omitted_columns() {
        let draft = NewUser::new("B2").email("someone@hinway.com").active(true);
        let row = draft.with_defaults();
        assert_eq!(row.first_name, "NA");
        assert_eq!(row.last_name, "NA");
        assert_eq!(row.email, "someone@hinway.com");
        assert_eq!(row.phone, "000-000-0000");
        assert!(row.active);
        assert_eq!(row.balance, "0");
    }

    #[test]
    fn test_provisional_leaves_omitted_columns_empty() {
        let row = NewUser::new("B2").first_name("Mandy").provisional();
        assert_eq!(row.first_name, "Mandy");
        assert_eq!(row.last_name, "");
        assert_eq!(row.balance, "");
        assert!(!row.active);
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let mut rec = wendy();
        let patch = UserPatch {
            first_name: Some("Wendy-1".into()),
            balance: Some("$200,000.00".into()),
            ..Default::default()
        };
        patch.apply_to(&mut rec);
        assert_eq!(rec.first_name, "Wendy-1");
        assert_eq!(rec.last_name, "Lawson");
        assert_eq!(rec.balance, "$200,000.00");
        assert!(UserPatch::default().present().is_empty());
        assert!(UserPatch::default().is_empty());
    }

    #[test]
    fn test_full_record_round_trips_through_new_user() {
        let rec = wendy();
        let draft = NewUser::from(rec.clone());
        assert_eq!(draft.with_defaults(), rec);
        assert_eq!(draft.provisional(), rec);
    }

    #[test]
    fn test_new_user_deserializes_flat_json() {
        let draft: NewUser = serde_json::from_str(
            r#"{"user_id": "628555772a8b7b9926ffb917", "first_name": "Wendy", "active": false}"#,
        )
        .unwrap();
        assert_eq!(draft.fields.first_name.as_deref(), Some("Wendy"));
        assert_eq!(draft.fields.active, Some(false));
        assert!(draft.fields.email.is_none());
    }

    #[test]
    fn test_assign_active_from_text() {
        let mut rec = wendy();
        UserColumn::Active.assign(&mut rec, FieldValue::Text("true"));
        assert!(rec.active);
    }
}
