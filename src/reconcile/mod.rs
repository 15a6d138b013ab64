//! Cluster configuration and credential reconciliation engine.
//!
//! This module reconciles desired cluster state against the live deployment:
//!
//! - **Connection descriptors**: peer-supplied coordination-service data is
//!   validated into a [`ConnectionDescriptor`] or treated as "not ready"
//! - **Credentials**: per-client credentials are provisioned, rotated, and
//!   revoked by the [`CredentialLifecycleManager`] against the shared
//!   [`CredentialStore`] and the external [`UserRegistry`]
//! - **Dispatch**: the [`ReconciliationDriver`] turns lifecycle and relation
//!   events into serialized, idempotent reconciliation passes
//!
//! # Architecture
//!
//! ```text
//!        events                     leader election
//!          │                              │
//!          ▼                              ▼
//!   ┌────────────────┐           ┌────────────────┐
//!   │ Reconciliation │──────────▶│ LeadershipGate │
//!   │     Driver     │           └───────┬────────┘
//!   └──┬──────────┬──┘                   │ MutationPermit
//!      │          │                      ▼
//!      │          │            ┌───────────────────┐
//!      │          └───────────▶│ CredentialLifecycle│──▶ UserRegistry
//!      │                       │      Manager       │    (external)
//!      ▼                       └─────────┬─────────┘
//!   Workload ◀── EffectiveConfig         ▼
//!   (external)   + Descriptor      CredentialStore
//!                                        │
//!                                        ▼
//!                                  RelationData (replicated k/v)
//! ```
//!
//! # Consistency Model
//!
//! The credential store is the only shared mutable resource. It is mutated
//! exclusively by the leader (single logical writer) and treated as read-only
//! everywhere else; non-leader reads may be stale by at most one propagation
//! cycle. Per-key updates are atomic, so readers never observe a torn write.

mod credential_store;
mod credentials;
mod descriptor;
mod driver;
pub mod error;
mod leadership;
mod relation_data;

pub use credential_store::CredentialStore;
pub use credentials::{
    credential_name, generate_secret, Credential, CredentialLifecycleManager, RegistryError,
    UserRegistry,
};
pub use descriptor::ConnectionDescriptor;
pub use driver::{ConfigSources, ReconcileEvent, ReconciliationDriver, Workload};
pub use error::{ReconcileError, ReconcileResult};
pub use leadership::{LeadershipGate, MutationPermit};
pub use relation_data::{InMemoryRelationData, RelationData};
