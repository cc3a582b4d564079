//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//! - Detail structs that flatten an entity with its eager-loaded relations

use serde::{Deserialize, Deserializer};

pub mod attachment;
pub mod contract;
pub mod dashboard;
pub mod document;
pub mod expense;
pub mod project;
pub mod report;
pub mod role;
pub mod schedule;
pub mod task;
pub mod user;

/// Deserialize a field that may be absent, explicitly `null`, or set.
///
/// Use with `#[serde(default, deserialize_with = "clearable")]` on an
/// `Option<Option<T>>`: absent stays `None` (keep), `null` becomes
/// `Some(None)` (clear).
pub(crate) fn clearable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
