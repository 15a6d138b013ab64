//! Event-driven reconciliation loop.
//!
//! Translates discrete cluster lifecycle and relation events into calls
//! against the property merger, the descriptor validator, and the credential
//! lifecycle manager, owning the ordering and idempotence guarantees.
//!
//! # Scheduling Model
//!
//! Single consumer, run-to-completion: each event is handled fully before the
//! next is dispatched. External calls (registry writes, workload restarts)
//! block the handling task; the system's event rate is cluster topology
//! changes, not per-request traffic, so this is acceptable.
//!
//! # Idempotence and Retry
//!
//! Every handler is idempotent, so redelivery after a crash is safe.
//! Failures are not retried in-flight; the orchestration layer re-delivers
//! unresolved events and the failed step is re-attempted on the next pass.
//!
//! # Leader Gating
//!
//! Mutating transitions are skipped outright on non-leader replicas; only
//! read-only derivation (merge, validate, workload apply) runs there. The
//! lifecycle manager defends in depth with its own gate check.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::credentials::{credential_name, generate_secret, CredentialLifecycleManager};
use super::descriptor::ConnectionDescriptor;
use super::error::ReconcileResult;
use super::leadership::LeadershipGate;
use super::relation_data::RelationData;
use crate::properties::merge_property_files;

/// A discrete cluster lifecycle or relation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    /// The workload is starting for the first time on this replica.
    Start,
    /// A configuration source changed; re-derive the effective config.
    ConfigChanged,
    /// Coordination-service membership or relation data changed.
    CoordinatorChanged,
    /// A client relation joined; provision its credential.
    RelationJoined { relation_id: u32 },
    /// A client relation was torn down; revoke its credential.
    RelationBroken { relation_id: u32 },
    /// Explicit request to rotate a relation's credential in place.
    RotateCredential { relation_id: u32 },
}

/// Workload control surface.
///
/// External collaborator that materializes the effective configuration and
/// (re)starts the broker process.
#[async_trait]
pub trait Workload: Send + Sync {
    /// Apply the effective configuration and connection descriptor.
    async fn apply(
        &self,
        effective_config: &str,
        descriptor: &ConnectionDescriptor,
    ) -> ReconcileResult<()>;
}

/// Locations of the layered property sources.
#[derive(Debug, Clone)]
pub struct ConfigSources {
    /// Required default property file.
    pub default_path: PathBuf,
    /// Optional operator override file; absence degrades to defaults.
    pub override_path: Option<PathBuf>,
}

/// Event-triggered controller over the reconciliation components.
pub struct ReconciliationDriver {
    sources: ConfigSources,
    coordinator_data: Arc<dyn RelationData>,
    credentials: CredentialLifecycleManager,
    gate: Arc<LeadershipGate>,
    workload: Arc<dyn Workload>,
    /// Last `(effective config, connect string)` handed to the workload,
    /// used to avoid unnecessary restarts.
    last_applied: Option<(String, String)>,
}

impl ReconciliationDriver {
    /// Wire a driver over its collaborators.
    pub fn new(
        sources: ConfigSources,
        coordinator_data: Arc<dyn RelationData>,
        credentials: CredentialLifecycleManager,
        gate: Arc<LeadershipGate>,
        workload: Arc<dyn Workload>,
    ) -> Self {
        Self {
            sources,
            coordinator_data,
            credentials,
            gate,
            workload,
            last_applied: None,
        }
    }

    /// Handle one event to completion.
    ///
    /// Safe to re-invoke with the same event: every transition is idempotent.
    /// Errors leave the relation in its prior lifecycle state; the next
    /// delivery retries.
    pub async fn handle_event(&mut self, event: ReconcileEvent) -> ReconcileResult<()> {
        debug!(?event, "handling reconciliation event");
        match event {
            ReconcileEvent::Start
            | ReconcileEvent::ConfigChanged
            | ReconcileEvent::CoordinatorChanged => self.reconcile_workload().await,

            ReconcileEvent::RelationJoined { relation_id } => {
                if !self.gate.is_leader() {
                    debug!(relation_id, "non-leader replica, deferring provisioning");
                    return Ok(());
                }
                self.credentials.provision(relation_id).await.map(|_| ())
            }

            ReconcileEvent::RelationBroken { relation_id } => {
                if !self.gate.is_leader() {
                    debug!(relation_id, "non-leader replica, deferring revocation");
                    return Ok(());
                }
                self.credentials.revoke(relation_id).await
            }

            ReconcileEvent::RotateCredential { relation_id } => {
                if !self.gate.is_leader() {
                    debug!(relation_id, "non-leader replica, deferring rotation");
                    return Ok(());
                }
                let name = credential_name(relation_id);
                let new_secret = generate_secret();
                self.credentials.rotate(&name, &new_secret).await
            }
        }
    }

    /// Consume events until the channel closes, logging failures.
    ///
    /// Passes are serialized by construction: this task is the only consumer
    /// and each event is awaited to completion before the next `recv`.
    pub async fn run(mut self, mut events: mpsc::Receiver<ReconcileEvent>) {
        while let Some(event) = events.recv().await {
            if let Err(e) = self.handle_event(event.clone()).await {
                error!(?event, error = %e, "reconciliation pass failed, awaiting redelivery");
            }
        }
        info!("event channel closed, reconciliation driver stopping");
    }

    /// Re-derive the effective configuration and connection descriptor, and
    /// apply them to the workload only if they differ from the last-applied
    /// pair.
    async fn reconcile_workload(&mut self) -> ReconcileResult<()> {
        let effective_config =
            merge_property_files(&self.sources.default_path, self.sources.override_path.as_ref())
                .await?;

        let peer_data = self.coordinator_data.snapshot().await;
        let Some(descriptor) = ConnectionDescriptor::validate(&peer_data) else {
            info!("coordination service not ready, deferring workload apply");
            return Ok(());
        };

        let desired = (effective_config, descriptor.connect.clone());
        if self.last_applied.as_ref() == Some(&desired) {
            debug!("effective state unchanged, skipping workload apply");
            return Ok(());
        }

        self.workload.apply(&desired.0, &descriptor).await?;
        info!(connect = %descriptor.connect, "effective state applied to workload");
        self.last_applied = Some(desired);
        Ok(())
    }
}
