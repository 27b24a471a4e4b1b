// Library exports for binary tools and tests
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use std::sync::Arc;

use tokio::sync::Mutex;

use config::Config;
use store::JsonStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<JsonStore>,
    /// Held by handlers that read, modify and save a document so that two
    /// requests never interleave their writes.
    pub write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            store: Arc::new(JsonStore::new(config.data_dir.clone())),
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}
