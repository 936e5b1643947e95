//! Last-known status per host, shared by sibling entities.
//!
//! The air-quality entity polls the monitor and stores the snapshot here;
//! sensors, numbers and switches of the same host read it instead of
//! issuing their own request. Entries are immutable `Arc<Status>` values,
//! replaced wholesale on each write (last write wins).

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use airmon_domain::status::Status;

/// Process-wide host → snapshot map. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct StatusCache {
    entries: Arc<RwLock<HashMap<String, Arc<Status>>>>,
}

impl StatusCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest snapshot stored for `host`.
    #[must_use]
    pub fn get(&self, host: &str) -> Option<Arc<Status>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(host)
            .cloned()
    }

    /// Replace the snapshot for `host` and return the shared handle.
    pub fn put(&self, host: &str, status: Status) -> Arc<Status> {
        let status = Arc::new(status);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(host.to_string(), Arc::clone(&status));
        status
    }

    /// Forget the snapshot for `host`.
    pub fn clear(&self, host: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airmon_domain::status::MiotStatus;

    fn snapshot(co2: i64) -> Status {
        Status::Miot(MiotStatus {
            co2_density: Some(co2),
            ..MiotStatus::default()
        })
    }

    #[test]
    fn should_return_same_snapshot_to_every_reader() {
        let cache = StatusCache::new();
        let sibling = cache.clone();
        cache.put("192.168.1.20", snapshot(600));

        let a = cache.get("192.168.1.20").unwrap();
        let b = sibling.get("192.168.1.20").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn should_keep_last_write() {
        let cache = StatusCache::new();
        cache.put("192.168.1.20", snapshot(600));
        cache.put("192.168.1.20", snapshot(720));
        assert_eq!(cache.get("192.168.1.20").unwrap().co2(), Some(720));
    }

    #[test]
    fn should_isolate_hosts() {
        let cache = StatusCache::new();
        cache.put("192.168.1.20", snapshot(600));
        assert!(cache.get("192.168.1.21").is_none());
    }

    #[test]
    fn should_forget_host_when_cleared() {
        let cache = StatusCache::new();
        cache.put("192.168.1.20", snapshot(600));
        cache.clear("192.168.1.20");
        assert!(cache.get("192.168.1.20").is_none());
    }
}
