//! The ordered upstream server set and its demotion policy.

use ember_dns_domain::ArgumentError;
use std::sync::RwLock;
use tracing::debug;

/// Ordered set of DoH endpoints with unique membership.
///
/// Smart rotation never promotes: a server that fails a whole query is
/// moved to the tail, and recovery is implicit as other servers get demoted
/// behind it. No health state is kept.
pub struct ServerSet {
    inner: RwLock<Vec<String>>,
}

impl ServerSet {
    pub fn new(servers: Vec<String>) -> Result<Self, ArgumentError> {
        let set = Self {
            inner: RwLock::new(Vec::new()),
        };
        set.set(servers)?;
        Ok(set)
    }

    /// Replace the whole set, de-duplicating while preserving first
    /// occurrence order.
    pub fn set(&self, servers: Vec<String>) -> Result<(), ArgumentError> {
        let mut deduped: Vec<String> = Vec::with_capacity(servers.len());
        for server in servers {
            if !deduped.contains(&server) {
                deduped.push(server);
            }
        }
        if deduped.is_empty() {
            return Err(ArgumentError::MissingArgs(
                "servers must contain at least one endpoint".into(),
            ));
        }

        *self.inner.write().expect("server set lock poisoned") = deduped;
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.inner.read().expect("server set lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("server set lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move `server` to the tail. A server another query already demoted
    /// (or removed via `set`) is handled idempotently.
    pub fn demote(&self, server: &str) {
        let mut servers = self.inner.write().expect("server set lock poisoned");
        if servers.len() < 2 {
            return;
        }
        if let Some(idx) = servers.iter().position(|s| s == server) {
            let demoted = servers.remove(idx);
            debug!(server = %demoted, "Demoting failing server to tail");
            servers.push(demoted);
        }
    }
}
