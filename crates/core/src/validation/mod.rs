//! Input validation.
//!
//! Rules are plain data ([`FieldRule`]) evaluated by one generic
//! [`validate`] function. Rule sets per entity live in [`schemas`].
//! Reference existence is reported back as [`Reference`]s for the caller to
//! check against the store.

pub mod evaluator;
pub mod rules;
pub mod schemas;

pub use evaluator::{validate, Validated};
pub use rules::{
    Constraint, FieldErrors, FieldKind, FieldRule, Mode, Presence, RefTable, Reference,
};
