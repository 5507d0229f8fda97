//! Plugin catalog cache.

use bobdsp_types::PluginInfo;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::client::BobDspClient;
use crate::error::ClientError;
use crate::transport::Transport;

struct CachedCatalog {
    session_id: String,
    plugins: Arc<Vec<PluginInfo>>,
}

/// Caches `GET plugins` for as long as the host session it was fetched under
/// lives.
pub struct PluginCatalog<T: Transport> {
    api: Arc<BobDspClient<T>>,
    cached: Mutex<Option<CachedCatalog>>,
}

impl<T: Transport> PluginCatalog<T> {
    pub fn new(api: Arc<BobDspClient<T>>) -> Self {
        Self {
            api,
            cached: Mutex::new(None),
        }
    }

    /// Catalog for `session_id`, fetched when nothing is cached for that
    /// session.
    pub async fn plugins(&self, session_id: &str) -> Result<Arc<Vec<PluginInfo>>, ClientError> {
        if let Some(cached) = self.cached.lock().as_ref() {
            if cached.session_id == session_id {
                return Ok(cached.plugins.clone());
            }
        }

        let plugins = Arc::new(self.api.fetch_plugins().await?);
        tracing::debug!("Fetched {} plugins for session {:?}", plugins.len(), session_id);
        *self.cached.lock() = Some(CachedCatalog {
            session_id: session_id.to_string(),
            plugins: plugins.clone(),
        });
        Ok(plugins)
    }

    pub fn find(&self, label: &str) -> Option<PluginInfo> {
        self.cached
            .lock()
            .as_ref()?
            .plugins
            .iter()
            .find(|p| p.plugin.label == label || p.name == label)
            .cloned()
    }

    pub fn invalidate(&self) {
        if self.cached.lock().take().is_some() {
            tracing::debug!("Plugin catalog invalidated");
        }
    }

    pub fn is_cached(&self) -> bool {
        self.cached.lock().is_some()
    }
}
