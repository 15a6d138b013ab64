//! # Brokersync
//! Cluster configuration and credential reconciliation engine for log brokers.
//!
//! This crate reconciles the desired state of a clustered log-broker deployment
//! (effective configuration, coordination-service connection data, per-client
//! credentials) against the live deployment, under a single-writer leadership
//! constraint and an eventually-consistent shared state store.
//!
//! # Goals
//! - Idempotent reconciliation: every pass is safe to re-run after crash or
//!   event redelivery
//! - Structurally enforced leader-only mutation via [`LeadershipGate`](reconcile::LeadershipGate)
//! - Testable seams: the relation-data store, the coordination-service user
//!   registry, and the workload control surface are all traits
//!
//! # Architecture
//!
//! ```text
//!   lifecycle / relation events
//!              │
//!              ▼
//!   ┌──────────────────────┐
//!   │ ReconciliationDriver │ ← serialized, run-to-completion passes
//!   └──────┬───────┬───────┘
//!          │       │
//!          ▼       ▼
//!   PropertySet  ConnectionDescriptor
//!    (merge)        (validate)
//!          │       │
//!          ▼       ▼
//!   ┌──────────────────────────┐
//!   │ CredentialLifecycleMgr   │──▶ UserRegistry (external)
//!   └──────────┬───────────────┘
//!              ▼
//!       CredentialStore ──▶ RelationData (replicated k/v)
//! ```
//!
//! # Getting started
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use brokersync::reconcile::{
//!     CredentialLifecycleManager, CredentialStore, InMemoryRelationData, LeadershipGate,
//! };
//!
//! # async fn example(registry: std::sync::Arc<dyn brokersync::reconcile::UserRegistry>) {
//! let gate = Arc::new(LeadershipGate::new());
//! gate.acquire();
//!
//! let data = Arc::new(InMemoryRelationData::new());
//! let store = CredentialStore::new(data, gate.clone());
//! let manager = CredentialLifecycleManager::new(store, registry, gate);
//!
//! let credential = manager.provision(7).await.unwrap();
//! assert_eq!(credential.name, "relation-7");
//! # }
//! ```
//!
//! See `tests/` for full driver wiring against in-memory collaborators.

#![forbid(unsafe_code)]

pub mod constants;
pub mod error;
pub mod properties;
pub mod reconcile;
pub mod telemetry;

pub mod prelude {
    //! Main export of reconciliation structures.

    pub use crate::error::{Error, Result};
    pub use crate::properties::{merge_property_files, PropertySet};
    pub use crate::reconcile::{
        ConnectionDescriptor, Credential, ReconcileError, ReconcileEvent, ReconcileResult,
        ReconciliationDriver,
    };
}
