use std::sync::Arc;

use crate::broadcast::Broadcaster;
use crate::config::Settings;
use crate::registry::ConnectionRegistry;
use crate::store::{BoardStore, MemoryStore};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub registry: Arc<ConnectionRegistry>,
    pub broadcaster: Arc<Broadcaster>,
    pub store: Arc<dyn BoardStore>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let broadcaster = Arc::new(Broadcaster::with_send_timeout(
            registry.clone(),
            settings.send_timeout(),
        ));
        let store: Arc<dyn BoardStore> = Arc::new(MemoryStore::new());

        Self {
            settings: Arc::new(settings),
            registry,
            broadcaster,
            store,
        }
    }
}
