use std::sync::Arc;

use crate::store::RecordStore;

/// Shared handler state. Cloned per request; the store behind it is opened
/// once at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}
