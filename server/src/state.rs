use std::sync::Arc;

use crate::auth::Authenticator;
use crate::db::EventStore;

/// Shared by every handler; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub auth: Arc<Authenticator>,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>, auth: Authenticator) -> Self {
        Self {
            store,
            auth: Arc::new(auth),
        }
    }
}
