use std::sync::Arc;

use buildledger_core::store::FinanceStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Record storage (PostgreSQL or in-memory).
    pub store: Arc<dyn FinanceStore>,
}

impl AppState {
    pub fn store(&self) -> &dyn FinanceStore {
        self.store.as_ref()
    }
}
