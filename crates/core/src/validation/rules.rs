//! Field rule, constraint and error types.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Whether input is a full create payload or a partial update.
///
/// On update every rule behaves as "sometimes": absent fields are skipped and
/// left unchanged by the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update,
}

/// The value type a field must coerce to.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A trimmed string of at most `max` characters.
    Text { max: usize },
    /// A trimmed string with no length limit.
    LongText,
    /// A decimal number that fits `NUMERIC(precision, scale)`, accepted as a
    /// JSON number or a numeric string.
    Decimal { precision: u32, scale: u32 },
    /// A whole number in `i32` range, accepted as a JSON number or a numeric string.
    Integer,
    /// A positive row id.
    Id,
    /// A calendar date (`YYYY-MM-DD`).
    Date,
    /// A UTC instant (RFC 3339, or a naive `YYYY-MM-DD HH:MM[:SS]` taken as UTC).
    DateTime,
    /// One of a fixed set of strings.
    OneOf(&'static [&'static str]),
}

/// Tables a field may reference by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefTable {
    Users,
    Projects,
    Tasks,
}

impl RefTable {
    pub fn table_name(self) -> &'static str {
        match self {
            RefTable::Users => "users",
            RefTable::Projects => "projects",
            RefTable::Tasks => "tasks",
        }
    }
}

/// Additional constraint checked after the value has been coerced.
#[derive(Debug, Clone, Copy)]
pub enum Constraint {
    /// Numeric value must be `>= 0`.
    NonNegative,
    /// Integer value must be `<= n`.
    AtMost(i64),
    /// Date or timestamp must be on or after the named field's value.
    AfterOrEqual(&'static str),
    /// Id must exist in the given table. Checked against the store by the caller.
    Exists(RefTable),
}

/// Whether a field must be supplied on create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Nullable,
}

/// A single field's validation rule.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
    pub constraints: Vec<Constraint>,
}

impl FieldRule {
    pub fn required(field: &'static str, kind: FieldKind) -> Self {
        Self {
            field,
            kind,
            presence: Presence::Required,
            constraints: Vec::new(),
        }
    }

    pub fn nullable(field: &'static str, kind: FieldKind) -> Self {
        Self {
            field,
            kind,
            presence: Presence::Nullable,
            constraints: Vec::new(),
        }
    }

    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// An id that must be checked for existence before the input is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub field: &'static str,
    pub table: RefTable,
    pub id: i64,
}

/// Per-field error messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// `Ok(())` when no errors were collected.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.0.values().flatten().next();
        match (first, self.0.values().map(Vec::len).sum::<usize>()) {
            (Some(msg), 1) => f.write_str(msg),
            (Some(msg), n) => write!(f, "{msg} (and {} more errors)", n - 1),
            (None, _) => f.write_str("The given data was invalid."),
        }
    }
}

/// Human-readable label for a field name (`start_date` -> `start date`).
pub fn label(field: &str) -> String {
    field.replace('_', " ")
}
