pub mod dashboard;
pub mod expense;
pub mod payment;
pub mod project;
