//! Leadership gating - THE source of truth for mutation eligibility.
//!
//! The credential store is a shared, cluster-wide resource mutated by exactly
//! one replica at a time: the current leader. Instead of scattering "am I the
//! leader?" checks through event handlers, this module provides a single
//! `LeadershipGate` abstraction that every mutating call passes through,
//! making the invariant structurally enforced rather than convention-based.
//!
//! # Safety Properties
//!
//! 1. **Atomic transitions**: leadership changes use `SeqCst` ordering for
//!    visibility across tasks
//! 2. **Capability pattern**: mutations require a [`MutationPermit`], which
//!    can only be obtained from [`LeadershipGate::validate_mutation`]
//! 3. **Timestamp tracking**: acquisition time is recorded for diagnostics
//!    across leader re-election
//!
//! # Example
//!
//! ```rust
//! use brokersync::reconcile::LeadershipGate;
//! use std::sync::Arc;
//!
//! let gate = Arc::new(LeadershipGate::new());
//! assert!(gate.validate_mutation().is_err());
//!
//! gate.acquire();
//! let permit = gate.validate_mutation().expect("leader may mutate");
//! // permit is held for the duration of the mutation
//! # let _ = permit;
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

use super::error::ReconcileError;

/// Single validation point for leader-only mutation.
///
/// Shared via `Arc` between the credential store, the lifecycle manager, and
/// the reconciliation driver. A replica starts as a follower; the external
/// leader-election mechanism drives [`acquire`](Self::acquire) and
/// [`resign`](Self::resign).
#[derive(Debug)]
pub struct LeadershipGate {
    /// Whether this replica currently holds leadership.
    leader: AtomicBool,
    /// Timestamp (epoch millis) when leadership was acquired. 0 = never/follower.
    acquired_at_millis: AtomicU64,
}

impl Default for LeadershipGate {
    fn default() -> Self {
        Self::new()
    }
}

impl LeadershipGate {
    /// Create a new gate in the follower state.
    pub fn new() -> Self {
        Self {
            leader: AtomicBool::new(false),
            acquired_at_millis: AtomicU64::new(0),
        }
    }

    /// Check if this replica is currently the leader.
    ///
    /// Cheap atomic load with `SeqCst` ordering, safe to call on every pass.
    #[inline]
    pub fn is_leader(&self) -> bool {
        self.leader.load(Ordering::SeqCst)
    }

    /// Timestamp (epoch millis) when leadership was acquired, 0 if follower.
    pub fn acquired_at(&self) -> u64 {
        self.acquired_at_millis.load(Ordering::SeqCst)
    }

    /// Record that this replica was elected leader.
    ///
    /// Returns `true` if this call transitioned into leadership, `false` if
    /// already leader (idempotent re-delivery of the election event).
    pub fn acquire(&self) -> bool {
        // swap returns the previous value; if it was false, we just acquired
        if !self.leader.swap(true, Ordering::SeqCst) {
            let now_millis = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0);
            self.acquired_at_millis.store(now_millis, Ordering::SeqCst);
            info!("leadership acquired, shared-state mutation enabled");
            true
        } else {
            false
        }
    }

    /// Record that this replica lost leadership.
    ///
    /// Returns `true` if this call transitioned out of leadership.
    pub fn resign(&self) -> bool {
        if self.leader.swap(false, Ordering::SeqCst) {
            self.acquired_at_millis.store(0, Ordering::SeqCst);
            info!("leadership resigned, shared-state mutation disabled");
            true
        } else {
            false
        }
    }

    /// Single validation point before any shared-state mutation.
    ///
    /// # Returns
    ///
    /// - `Ok(MutationPermit)` if this replica is the leader
    /// - `Err(ReconcileError::NotLeader)` otherwise
    pub fn validate_mutation(&self) -> Result<MutationPermit, ReconcileError> {
        if self.is_leader() {
            Ok(MutationPermit { _private: () })
        } else {
            debug!("refusing shared-state mutation on non-leader replica");
            Err(ReconcileError::NotLeader)
        }
    }
}

/// Capability representing validated permission to mutate shared state.
///
/// Can only be constructed through [`LeadershipGate::validate_mutation`],
/// so any code path holding one has passed the leadership check.
#[derive(Debug)]
pub struct MutationPermit {
    _private: (),
}
