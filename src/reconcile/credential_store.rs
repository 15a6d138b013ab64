//! Leader-gated facade over the shared credential area.
//!
//! Thin key/value facade over the relation-data mechanism, scoped to the
//! cluster's leader-writable namespace. Reads are leader-agnostic; writes
//! and deletes pass through the [`LeadershipGate`].
//!
//! All operations are synchronous from the caller's point of view;
//! propagation to other replicas is asynchronous and eventually consistent,
//! bounded by the relation-data propagation interval.

use std::sync::Arc;

use tracing::debug;

use super::error::ReconcileResult;
use super::leadership::LeadershipGate;
use super::relation_data::RelationData;

/// Shared mapping from credential name to secret value.
#[derive(Clone)]
pub struct CredentialStore {
    data: Arc<dyn RelationData>,
    gate: Arc<LeadershipGate>,
}

impl CredentialStore {
    /// Create a store over the given relation-data area.
    pub fn new(data: Arc<dyn RelationData>, gate: Arc<LeadershipGate>) -> Self {
        Self { data, gate }
    }

    /// Read the secret stored under `name`. Any replica may read; the value
    /// may be stale by at most one propagation cycle during leader transition.
    pub async fn get(&self, name: &str) -> Option<String> {
        self.data.get(name).await
    }

    /// Store `secret` under `name`, atomically per key.
    ///
    /// # Errors
    ///
    /// [`ReconcileError::NotLeader`](super::ReconcileError::NotLeader) if
    /// invoked on a non-leader replica.
    pub async fn set(&self, name: &str, secret: &str) -> ReconcileResult<()> {
        let _permit = self.gate.validate_mutation()?;
        self.data.set(name, secret).await;
        debug!(name, "credential stored");
        Ok(())
    }

    /// Remove `name`, signaling "revoked" to all replicas.
    ///
    /// # Errors
    ///
    /// [`ReconcileError::NotLeader`](super::ReconcileError::NotLeader) if
    /// invoked on a non-leader replica.
    pub async fn delete(&self, name: &str) -> ReconcileResult<()> {
        let _permit = self.gate.validate_mutation()?;
        self.data.delete(name).await;
        debug!(name, "credential tombstoned");
        Ok(())
    }
}
