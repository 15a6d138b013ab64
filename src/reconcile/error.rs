//! Error types for the reconciliation engine.
//!
//! # Error Handling Patterns
//!
//! The engine uses two patterns based on how a failure is recovered:
//!
//! ## Skip and Defer (Local Recovery)
//!
//! [`ReconcileError::NotLeader`] guards against accidental mutation from a
//! non-leader replica. The driver recovers locally by skipping the mutating
//! step; the leader eventually publishes the authoritative state that all
//! replicas observe. This is never surfaced as a pass failure.
//!
//! ## Propagate and Retry on Next Event
//!
//! [`ReconcileError::Registration`] means the coordination-service user
//! registry call failed. The engine does NOT retry internally: the error
//! propagates to the driver, which leaves the relation in its prior lifecycle
//! state so the next event delivery retries. Registry call and store write
//! are treated as a unit; if registration fails, the store is not touched.
//!
//! # Not an Error
//!
//! An incomplete coordination-service descriptor ("not ready") is a normal
//! bootstrap state, represented as `Option::None` by
//! [`ConnectionDescriptor::validate`](super::ConnectionDescriptor::validate),
//! never as an error variant.

use thiserror::Error;

/// Result type for reconciliation operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Errors that can occur in the reconciliation engine.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A mutating operation was attempted on a non-leader replica.
    #[error("not the cluster leader; shared-state mutation refused")]
    NotLeader,

    /// The coordination-service user registry call failed.
    #[error("user registry call failed for {username}: {reason}")]
    Registration { username: String, reason: String },

    /// The relation-data backend reported a failure.
    #[error("relation data error: {0}")]
    Relation(String),

    /// Configuration source failure.
    #[error(transparent)]
    Config(#[from] crate::error::Error),
}
