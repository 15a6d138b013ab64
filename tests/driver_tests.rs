//! Integration tests for the reconciliation driver.
//!
//! These tests wire the full engine against in-memory collaborators and
//! drive it with discrete events, verifying dispatch, leader gating, the
//! apply-only-on-change contract, and defer-on-incomplete-descriptor.

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use brokersync::reconcile::{
    ConfigSources, ConnectionDescriptor, CredentialLifecycleManager, CredentialStore,
    InMemoryRelationData, LeadershipGate, ReconcileEvent, ReconcileResult, ReconciliationDriver,
    RegistryError, RelationData, UserRegistry, Workload,
};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

/// Workload fake that records every apply call.
#[derive(Default)]
struct RecordingWorkload {
    applies: AtomicUsize,
    last: Mutex<Option<(String, String)>>,
}

impl RecordingWorkload {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn apply_count(&self) -> usize {
        self.applies.load(Ordering::SeqCst)
    }

    async fn last_applied(&self) -> Option<(String, String)> {
        self.last.lock().await.clone()
    }
}

#[async_trait]
impl Workload for RecordingWorkload {
    async fn apply(
        &self,
        effective_config: &str,
        descriptor: &ConnectionDescriptor,
    ) -> ReconcileResult<()> {
        self.applies.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().await =
            Some((effective_config.to_string(), descriptor.connect.clone()));
        Ok(())
    }
}

/// Minimal always-succeeding registry fake.
#[derive(Default)]
struct NullRegistry {
    users: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl UserRegistry for NullRegistry {
    async fn add_user(&self, username: &str, password: &str) -> Result<(), RegistryError> {
        self.users
            .lock()
            .await
            .insert(username.to_string(), password.to_string());
        Ok(())
    }

    async fn delete_user(&self, username: &str) -> Result<(), RegistryError> {
        match self.users.lock().await.remove(username) {
            Some(_) => Ok(()),
            None => Err(RegistryError::NotFound),
        }
    }
}

struct Harness {
    driver: ReconciliationDriver,
    workload: Arc<RecordingWorkload>,
    coordinator: Arc<InMemoryRelationData>,
    credentials: Arc<InMemoryRelationData>,
    gate: Arc<LeadershipGate>,
    // Keep the temp files alive for the duration of the test.
    _defaults: NamedTempFile,
}

fn property_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp property file");
    file.write_all(contents.as_bytes()).expect("write properties");
    file
}

fn harness(leader: bool, defaults: &str) -> Harness {
    let defaults = property_file(defaults);
    let gate = Arc::new(LeadershipGate::new());
    if leader {
        gate.acquire();
    }

    let coordinator = Arc::new(InMemoryRelationData::new());
    let credentials = Arc::new(InMemoryRelationData::new());
    let store = CredentialStore::new(credentials.clone(), gate.clone());
    let manager =
        CredentialLifecycleManager::new(store, Arc::new(NullRegistry::default()), gate.clone());
    let workload = RecordingWorkload::new();

    let driver = ReconciliationDriver::new(
        ConfigSources {
            default_path: defaults.path().to_path_buf(),
            override_path: None,
        },
        coordinator.clone(),
        manager,
        gate.clone(),
        workload.clone(),
    );

    Harness {
        driver,
        workload,
        coordinator,
        credentials,
        gate,
        _defaults: defaults,
    }
}

async fn publish_coordinator_data(coordinator: &InMemoryRelationData) {
    coordinator.set("chroot", "/kafka").await;
    coordinator.set("username", "moria").await;
    coordinator.set("password", "mellon").await;
    coordinator.set("endpoints", "1.1.1.1,2.2.2.2").await;
    coordinator
        .set("uris", "1.1.1.1:2181/kafka,2.2.2.2:2181/kafka")
        .await;
}

// ============================================================================
// Workload Reconciliation
// ============================================================================

#[tokio::test]
async fn test_start_applies_config_and_descriptor() {
    let mut h = harness(true, "broker.id=0\n");
    publish_coordinator_data(&h.coordinator).await;

    h.driver.handle_event(ReconcileEvent::Start).await.unwrap();

    assert_eq!(h.workload.apply_count(), 1);
    let (config, connect) = h.workload.last_applied().await.unwrap();
    assert_eq!(config, "broker.id=0\n");
    assert_eq!(connect, "1.1.1.1:2181/kafka,2.2.2.2:2181/kafka");
}

#[tokio::test]
async fn test_incomplete_descriptor_defers_without_error() {
    let mut h = harness(true, "broker.id=0\n");
    // No password published yet: bootstrap in progress.
    h.coordinator.set("username", "moria").await;
    h.coordinator.set("uris", "1.1.1.1:2181").await;

    h.driver.handle_event(ReconcileEvent::Start).await.unwrap();
    assert_eq!(h.workload.apply_count(), 0);

    // Peer finishes publishing; the next pass converges.
    h.coordinator.set("password", "mellon").await;
    h.driver
        .handle_event(ReconcileEvent::CoordinatorChanged)
        .await
        .unwrap();
    assert_eq!(h.workload.apply_count(), 1);
}

#[tokio::test]
async fn test_unchanged_state_skips_workload_apply() {
    let mut h = harness(true, "broker.id=0\n");
    publish_coordinator_data(&h.coordinator).await;

    h.driver.handle_event(ReconcileEvent::Start).await.unwrap();
    h.driver
        .handle_event(ReconcileEvent::ConfigChanged)
        .await
        .unwrap();
    h.driver
        .handle_event(ReconcileEvent::CoordinatorChanged)
        .await
        .unwrap();

    // Nothing changed after the first pass: exactly one apply.
    assert_eq!(h.workload.apply_count(), 1);
}

#[tokio::test]
async fn test_changed_coordinator_data_reapplies() {
    let mut h = harness(true, "broker.id=0\n");
    publish_coordinator_data(&h.coordinator).await;
    h.driver.handle_event(ReconcileEvent::Start).await.unwrap();

    h.coordinator.set("uris", "3.3.3.3:2181/kafka").await;
    h.driver
        .handle_event(ReconcileEvent::CoordinatorChanged)
        .await
        .unwrap();

    assert_eq!(h.workload.apply_count(), 2);
    let (_, connect) = h.workload.last_applied().await.unwrap();
    assert_eq!(connect, "3.3.3.3:2181/kafka");
}

#[tokio::test]
async fn test_non_leader_still_applies_derived_state() {
    // Read-only derivation (merge + validate + apply) runs on every replica.
    let mut h = harness(false, "broker.id=1\n");
    publish_coordinator_data(&h.coordinator).await;

    h.driver.handle_event(ReconcileEvent::Start).await.unwrap();
    assert_eq!(h.workload.apply_count(), 1);
}

// ============================================================================
// Credential Events
// ============================================================================

#[tokio::test]
async fn test_relation_joined_provisions_on_leader() {
    let mut h = harness(true, "broker.id=0\n");

    h.driver
        .handle_event(ReconcileEvent::RelationJoined { relation_id: 4 })
        .await
        .unwrap();

    let secret = h.credentials.get("relation-4").await.unwrap();
    assert_eq!(secret.len(), 32);
}

#[tokio::test]
async fn test_relation_joined_replay_is_idempotent() {
    let mut h = harness(true, "broker.id=0\n");
    let event = ReconcileEvent::RelationJoined { relation_id: 4 };

    h.driver.handle_event(event.clone()).await.unwrap();
    let first = h.credentials.get("relation-4").await.unwrap();

    h.driver.handle_event(event).await.unwrap();
    assert_eq!(h.credentials.get("relation-4").await.unwrap(), first);
}

#[tokio::test]
async fn test_relation_broken_revokes() {
    let mut h = harness(true, "broker.id=0\n");
    h.driver
        .handle_event(ReconcileEvent::RelationJoined { relation_id: 4 })
        .await
        .unwrap();

    h.driver
        .handle_event(ReconcileEvent::RelationBroken { relation_id: 4 })
        .await
        .unwrap();
    assert_eq!(h.credentials.get("relation-4").await, None);
}

#[tokio::test]
async fn test_rotation_request_installs_new_secret() {
    let mut h = harness(true, "broker.id=0\n");
    h.driver
        .handle_event(ReconcileEvent::RelationJoined { relation_id: 4 })
        .await
        .unwrap();
    let original = h.credentials.get("relation-4").await.unwrap();

    h.driver
        .handle_event(ReconcileEvent::RotateCredential { relation_id: 4 })
        .await
        .unwrap();

    let rotated = h.credentials.get("relation-4").await.unwrap();
    assert_ne!(rotated, original);
    assert_eq!(rotated.len(), 32);
}

#[tokio::test]
async fn test_non_leader_credential_events_are_noops() {
    let mut h = harness(false, "broker.id=1\n");

    for event in [
        ReconcileEvent::RelationJoined { relation_id: 4 },
        ReconcileEvent::RotateCredential { relation_id: 4 },
        ReconcileEvent::RelationBroken { relation_id: 4 },
    ] {
        // Deferred, not failed: the leader owns these transitions.
        h.driver.handle_event(event).await.unwrap();
    }
    assert!(h.credentials.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_leadership_handover_mid_stream() {
    let mut h = harness(false, "broker.id=2\n");
    let join = ReconcileEvent::RelationJoined { relation_id: 9 };

    // Deferred while follower...
    h.driver.handle_event(join.clone()).await.unwrap();
    assert_eq!(h.credentials.get("relation-9").await, None);

    // ...provisioned once elected and the event is redelivered.
    h.gate.acquire();
    h.driver.handle_event(join).await.unwrap();
    assert!(h.credentials.get("relation-9").await.is_some());
}

// ============================================================================
// Event Loop
// ============================================================================

#[tokio::test]
async fn test_run_loop_processes_events_in_order() {
    let h = harness(true, "broker.id=0\n");
    publish_coordinator_data(&h.coordinator).await;
    let workload = h.workload.clone();
    let credentials = h.credentials.clone();

    let (tx, rx) = tokio::sync::mpsc::channel(8);
    let loop_handle = tokio::spawn(h.driver.run(rx));

    tx.send(ReconcileEvent::Start).await.unwrap();
    tx.send(ReconcileEvent::RelationJoined { relation_id: 1 })
        .await
        .unwrap();
    tx.send(ReconcileEvent::RelationBroken { relation_id: 1 })
        .await
        .unwrap();
    drop(tx);
    loop_handle.await.unwrap();

    assert_eq!(workload.apply_count(), 1);
    // Joined then broken: the credential ends tombstoned.
    assert_eq!(credentials.get("relation-1").await, None);
}
