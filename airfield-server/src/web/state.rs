//! Application state for the web layer.

use std::sync::Arc;

use crate::service::LookupService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Airport lookup with caching and timezone refresh
    pub lookup: Arc<LookupService>,
}

impl AppState {
    pub fn new(lookup: LookupService) -> Self {
        Self {
            lookup: Arc::new(lookup),
        }
    }
}
