//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod expense_repo;
pub mod payment_repo;
pub mod project_repo;

pub use expense_repo::ExpenseRepo;
pub use payment_repo::PaymentRepo;
pub use project_repo::ProjectRepo;
