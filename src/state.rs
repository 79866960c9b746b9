//! Application state management

use std::sync::Arc;
use std::time::Duration;

use mets_resolver::config::{Config, ResolverConfig};

/// Shared application state
///
/// Holds only immutable configuration; every resolution loads its own
/// documents.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Resolver settings handed to each resolution
    pub fn resolver_config(&self) -> &ResolverConfig {
        &self.inner.config.resolver
    }

    /// Upper bound for one request
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.inner.config.server.request_timeout_secs)
    }
}
