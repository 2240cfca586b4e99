//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::db::InventoryStore;
use crate::services::AuthProvider;

/// Application state shared across all handlers.
///
/// Cheap to clone: everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: DashboardConfig,
    store: Arc<dyn InventoryStore>,
    auth: Arc<dyn AuthProvider>,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: DashboardConfig,
        store: Arc<dyn InventoryStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                auth,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    /// The inventory store.
    #[must_use]
    pub fn store(&self) -> &dyn InventoryStore {
        self.inner.store.as_ref()
    }

    /// The auth provider.
    #[must_use]
    pub fn auth(&self) -> &dyn AuthProvider {
        self.inner.auth.as_ref()
    }
}
