//! Application context shared by every service.

use std::sync::Arc;

use crate::authorizer::Authorizer;
use crate::config::CoreConfig;
use crate::credentials::{CredentialHasher, Pbkdf2Hasher};
use crate::session::{MemorySessionCache, SessionCache};
use crate::store::{MemoryStore, Store};

/// Collaborators resolved once at startup and cloned into each service.
///
/// Cloning is cheap: every field is either `Copy` or behind an `Arc`.
#[derive(Clone)]
pub struct AppContext {
    cfg: Arc<CoreConfig>,
    store: Arc<dyn Store>,
    sessions: Arc<dyn SessionCache>,
    hasher: Arc<dyn CredentialHasher>,
    authorizer: Authorizer,
}

impl AppContext {
    pub fn new(
        cfg: Arc<CoreConfig>,
        store: Arc<dyn Store>,
        sessions: Arc<dyn SessionCache>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        let authorizer = Authorizer::new(cfg.authorization_strategy());
        Self {
            cfg,
            store,
            sessions,
            hasher,
            authorizer,
        }
    }

    /// Context backed by the in-memory store and session cache.
    pub fn in_memory(cfg: Arc<CoreConfig>) -> Self {
        Self::new(
            cfg,
            Arc::new(MemoryStore::new()),
            Arc::new(MemorySessionCache::new()),
            Arc::new(Pbkdf2Hasher::default()),
        )
    }

    pub fn cfg(&self) -> &CoreConfig {
        &self.cfg
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn sessions(&self) -> &dyn SessionCache {
        self.sessions.as_ref()
    }

    pub fn hasher(&self) -> &dyn CredentialHasher {
        self.hasher.as_ref()
    }

    pub fn authorizer(&self) -> &Authorizer {
        &self.authorizer
    }
}
