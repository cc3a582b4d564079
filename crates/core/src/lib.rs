//! Pure domain logic for the Buildtrack backend.
//!
//! Nothing in this crate touches the database or the filesystem: it holds the
//! shared id/timestamp types, the domain error type, status vocabularies, the
//! field validator with its per-entity rule sets, upload policies, and the
//! report content builders.

pub mod error;
pub mod pagination;
pub mod reports;
pub mod roles;
pub mod status;
pub mod types;
pub mod uploads;
pub mod validation;
