//! Application state management

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::auth::NonceGuard;
use crate::config::Config;
use crate::hooks::HookRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    db: SqlitePool,
    nonces: NonceGuard,
    hooks: HookRegistry,
}

impl AppState {
    /// Create the application state. Hooks are passed in here so
    /// deployments register their collaborators at construction time.
    pub fn new(config: Config, db: SqlitePool, hooks: HookRegistry) -> Self {
        let nonces = NonceGuard::new(
            config.auth.nonce_secret.as_bytes().to_vec(),
            Duration::from_secs(config.auth.nonce_lifetime_secs),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                nonces,
                hooks,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    pub fn nonces(&self) -> &NonceGuard {
        &self.inner.nonces
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.inner.hooks
    }
}
