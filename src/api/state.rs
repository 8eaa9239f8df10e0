//! Application state for the royalty distribution API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::ConfigLoader;
use crate::distribution::InMemoryBackOffice;

/// Shared application state.
///
/// Holds the loaded configuration and the back office. The back office sits
/// behind an async mutex so that at most one distribution run executes at a
/// time.
#[derive(Clone)]
pub struct AppState {
    /// The loaded engine configuration.
    config: Arc<ConfigLoader>,
    /// The back office runs read from and commit to.
    back_office: Arc<Mutex<InMemoryBackOffice>>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: ConfigLoader, back_office: InMemoryBackOffice) -> Self {
        Self {
            config: Arc::new(config),
            back_office: Arc::new(Mutex::new(back_office)),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the shared back office.
    pub fn back_office(&self) -> &Mutex<InMemoryBackOffice> {
        &self.back_office
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[tokio::test]
    async fn test_clones_share_back_office() {
        let config = ConfigLoader::load("./config/default").unwrap();
        let state = AppState::new(config, InMemoryBackOffice::new());
        let clone = state.clone();

        let before = state.back_office().lock().await.utilisations().count();
        assert_eq!(before, 0);
        assert!(std::ptr::eq(state.back_office(), clone.back_office()));
    }
}
