//! Per-artifact-name write locks.
//!
//! A command chain reads, transforms, then writes one name. Two chains on
//! the same name must not interleave those steps or one write is lost, so
//! the service takes the name's lock for the duration of the cycle.
//! Distinct names never contend.

use std::sync::Arc;

use {dashmap::DashMap, tokio::sync::Mutex};

#[derive(Debug, Default)]
pub struct NameLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl NameLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock guarding `name`. Hold the guard across the whole
    /// read-modify-write cycle.
    #[must_use]
    pub fn lock_for(&self, name: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
