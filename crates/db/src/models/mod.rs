//! Row structs for the finance tables.
//!
//! Each submodule contains a `FromRow` struct matching the table columns and a
//! `TryFrom` conversion into the `buildledger_core` record. Enum columns are
//! TEXT; an unknown label surfaces as [`sqlx::Error::Decode`].

pub mod expense;
pub mod payment;
pub mod project;
