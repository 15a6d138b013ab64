//! Per-client credential lifecycle management.
//!
//! Orchestrates provisioning, rotation, and revocation of per-client
//! credentials against the [`CredentialStore`] and the coordination-service
//! user registry, enforcing leader-only mutation.
//!
//! # Lifecycle
//!
//! ```text
//! UNPROVISIONED ──provision──▶ ACTIVE ──rotate──▶ ACTIVE
//!                                │
//!                              revoke
//!                                ▼
//!                             REVOKED
//! ```
//!
//! Credential names are derived deterministically from the relation id
//! (`relation-<id>`), so re-running provisioning for the same relation is
//! idempotent across leader re-election and event replay: an existing secret
//! is reused without a second registry call.
//!
//! # Failure Semantics
//!
//! Registry call and store write are treated as a unit. If the registry call
//! fails, the store is not touched and the error propagates to the driver,
//! which retries on the next event delivery. No internal retries.

use std::sync::Arc;

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::constants::{CREDENTIAL_KEY_PREFIX, SECRET_LENGTH};

use super::credential_store::CredentialStore;
use super::error::{ReconcileError, ReconcileResult};
use super::leadership::LeadershipGate;

/// A named credential and its secret value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Deterministic name, `relation-<id>`.
    pub name: String,
    /// Secret value, 32 characters from A-Z, a-z, 0-9.
    pub secret: String,
}

/// Outcome classification for registry calls.
///
/// The registry itself may error on duplicates or missing users; the
/// lifecycle manager swallows `AlreadyExists` and `NotFound` as success so
/// that provisioning and revocation stay idempotent.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The user already exists (swallowed on add).
    #[error("user already exists")]
    AlreadyExists,
    /// The user does not exist (swallowed on delete).
    #[error("user not found")]
    NotFound,
    /// The registry could not be reached or rejected the call.
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

/// Coordination-service user registry.
///
/// External call surface; implementations talk to the real coordination
/// service. Both methods must be safe to call when the user does not
/// already exist / no longer exists.
#[async_trait]
pub trait UserRegistry: Send + Sync {
    /// Register (or re-register) a user with the given password.
    async fn add_user(&self, username: &str, password: &str) -> Result<(), RegistryError>;

    /// Remove a user.
    async fn delete_user(&self, username: &str) -> Result<(), RegistryError>;
}

/// Generate a credential secret: [`SECRET_LENGTH`] characters drawn from
/// A-Z, a-z, 0-9 using the operating system's CSPRNG.
pub fn generate_secret() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(SECRET_LENGTH)
        .map(char::from)
        .collect()
}

/// Derive the deterministic credential name for a relation.
pub fn credential_name(relation_id: u32) -> String {
    format!("{CREDENTIAL_KEY_PREFIX}{relation_id}")
}

/// Orchestrates credential provisioning, rotation, and revocation.
///
/// Every mutating path validates leadership through the shared
/// [`LeadershipGate`] as a safety net; the driver additionally gates at the
/// event level so non-leader replicas normally never reach these methods.
#[derive(Clone)]
pub struct CredentialLifecycleManager {
    store: CredentialStore,
    registry: Arc<dyn UserRegistry>,
    gate: Arc<LeadershipGate>,
}

impl CredentialLifecycleManager {
    /// Create a manager over the given store and registry.
    pub fn new(
        store: CredentialStore,
        registry: Arc<dyn UserRegistry>,
        gate: Arc<LeadershipGate>,
    ) -> Self {
        Self {
            store,
            registry,
            gate,
        }
    }

    /// Whether a credential is currently provisioned for `relation_id`.
    ///
    /// Presence in the store encodes provisioned; absence encodes revoked
    /// or never provisioned. Readable from any replica.
    pub async fn is_provisioned(&self, relation_id: u32) -> bool {
        self.store.get(&credential_name(relation_id)).await.is_some()
    }

    /// Provision a credential for a client relation.
    ///
    /// Idempotent: if the store already holds a secret for this relation
    /// (leader re-election, event replay), it is reused and the registry is
    /// not called again. Otherwise a fresh secret is generated, registered,
    /// and then stored.
    ///
    /// # Errors
    ///
    /// - [`ReconcileError::NotLeader`] on a non-leader replica
    /// - [`ReconcileError::Registration`] if the registry call fails; the
    ///   store is left untouched so the next pass retries
    pub async fn provision(&self, relation_id: u32) -> ReconcileResult<Credential> {
        let _permit = self.gate.validate_mutation()?;
        let name = credential_name(relation_id);

        if let Some(secret) = self.store.get(&name).await {
            debug!(name = %name, "credential already provisioned, reusing secret");
            return Ok(Credential { name, secret });
        }

        let secret = generate_secret();
        self.register(&name, &secret).await?;
        self.store.set(&name, &secret).await?;
        info!(name = %name, "credential provisioned");
        Ok(Credential { name, secret })
    }

    /// Rotate a credential in place: same name, new secret.
    ///
    /// Re-registers the secret with the registry, then overwrites the stored
    /// value. Per-key atomicity of the store means any observer sees either
    /// the old or the new secret, never a partial value. If re-registration
    /// fails the stored secret is untouched.
    pub async fn rotate(&self, name: &str, new_secret: &str) -> ReconcileResult<()> {
        let _permit = self.gate.validate_mutation()?;
        self.register(name, new_secret).await?;
        self.store.set(name, new_secret).await?;
        info!(name = %name, "credential rotated");
        Ok(())
    }

    /// Revoke the credential for a client relation.
    ///
    /// Deregisters the user (tolerating "already absent" as success), then
    /// tombstones the stored value. Idempotent.
    pub async fn revoke(&self, relation_id: u32) -> ReconcileResult<()> {
        let _permit = self.gate.validate_mutation()?;
        let name = credential_name(relation_id);

        match self.registry.delete_user(&name).await {
            Ok(()) => {}
            Err(RegistryError::NotFound) => {
                debug!(name = %name, "user already absent from registry");
            }
            Err(e) => {
                warn!(name = %name, error = %e, "user deregistration failed");
                return Err(ReconcileError::Registration {
                    username: name,
                    reason: e.to_string(),
                });
            }
        }

        self.store.delete(&name).await?;
        info!(name = %name, "credential revoked");
        Ok(())
    }

    async fn register(&self, name: &str, secret: &str) -> ReconcileResult<()> {
        match self.registry.add_user(name, secret).await {
            Ok(()) | Err(RegistryError::AlreadyExists) => Ok(()),
            Err(e) => {
                warn!(name = %name, error = %e, "user registration failed");
                Err(ReconcileError::Registration {
                    username: name.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_name_is_deterministic() {
        assert_eq!(credential_name(0), "relation-0");
        assert_eq!(credential_name(42), "relation-42");
        assert_eq!(credential_name(42), credential_name(42));
    }

    #[test]
    fn test_generate_secret_length_and_alphabet() {
        let secret = generate_secret();
        assert_eq!(secret.len(), SECRET_LENGTH);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_secret_uniqueness() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generate_secret()), "duplicate secret generated");
        }
    }
}
