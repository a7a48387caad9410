// Application state module
// Built once at startup and shared by every connection task

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use super::types::Config;
use crate::store::DocumentStore;

/// Application state
pub struct AppState {
    pub config: Config,
    /// The one collection handle all requests run against
    pub store: Arc<dyn DocumentStore>,
    /// Connections currently being served
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config,
            store,
            active_connections: AtomicUsize::new(0),
        }
    }
}
