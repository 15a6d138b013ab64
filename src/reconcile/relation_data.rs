//! Replicated relation-data abstraction.
//!
//! Cooperating cluster members share configuration and credentials through a
//! replicated key/value area ("relation data"). The orchestration runtime
//! owns the actual replication; this module abstracts it behind the
//! [`RelationData`] trait so the engine is testable with an in-memory fake.
//!
//! # Consistency Contract
//!
//! - Updates are atomic per key: readers observe either the old or the new
//!   value, never a torn write.
//! - Propagation to other replicas is asynchronous and eventually consistent;
//!   a non-leader read may be stale by at most one propagation cycle.
//! - Mutation is serialized by the leader-only constraint enforced above this
//!   layer, not by a lock here.
//!
//! # Change Notification
//!
//! [`RelationData::on_change`] hands out a `watch` receiver over a version
//! counter bumped on every mutation, letting the driver schedule a
//! reconciliation pass when peer data arrives.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::{watch, RwLock};

/// Replicated key/value sharing mechanism between cluster members.
///
/// Implementations for real orchestration backends live outside this crate;
/// [`InMemoryRelationData`] is provided for tests and single-process use.
#[async_trait]
pub trait RelationData: Send + Sync {
    /// Get the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value atomically.
    async fn set(&self, key: &str, value: &str);

    /// Remove `key`. Absence is the tombstone: removal signals "revoked"
    /// to all replicas.
    async fn delete(&self, key: &str);

    /// Snapshot the full mapping.
    ///
    /// Used by the driver when validating the coordination-service
    /// connection descriptor on each pass.
    async fn snapshot(&self) -> HashMap<String, String>;

    /// Subscribe to change notifications.
    ///
    /// The carried value is a monotonically increasing version counter; any
    /// observed increase means at least one mutation happened since the last
    /// read. Receivers may miss intermediate versions, never the latest.
    fn on_change(&self) -> watch::Receiver<u64>;
}

/// In-memory [`RelationData`] implementation.
///
/// Full-featured fake for tests and for wiring the engine in a single
/// process without an orchestration backend.
#[derive(Debug)]
pub struct InMemoryRelationData {
    entries: RwLock<HashMap<String, String>>,
    version: AtomicU64,
    notify: watch::Sender<u64>,
}

impl Default for InMemoryRelationData {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRelationData {
    /// Create an empty relation-data area.
    pub fn new() -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            entries: RwLock::new(HashMap::new()),
            version: AtomicU64::new(0),
            notify,
        }
    }

    /// Create an area pre-populated with `entries` (peer-supplied data).
    pub fn with_entries(entries: HashMap<String, String>) -> Self {
        let data = Self::new();
        Self {
            entries: RwLock::new(entries),
            ..data
        }
    }

    fn bump_version(&self) {
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        // Receivers may have all dropped; that is fine.
        let _ = self.notify.send(version);
    }
}

#[async_trait]
impl RelationData for InMemoryRelationData {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        self.bump_version();
    }

    async fn delete(&self, key: &str) {
        self.entries.write().await.remove(key);
        self.bump_version();
    }

    async fn snapshot(&self) -> HashMap<String, String> {
        self.entries.read().await.clone()
    }

    fn on_change(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }
}
