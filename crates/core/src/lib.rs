//! Domain core for construction-project finance tracking.
//!
//! Holds the records (projects, expenses, payments), the expense split
//! normalizer, the split-aware aggregator, and the storage abstraction the
//! outer layers plug into.

pub mod aggregation;
pub mod allocation;
pub mod error;
pub mod ledger;
pub mod models;
pub mod store;
pub mod types;
