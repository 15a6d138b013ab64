//! Centralized configuration and protocol constants.
//!
//! This module consolidates the magic numbers and fixed strings used throughout
//! the reconciliation engine. Having them in one place makes it easier to:
//!
//! - Understand the contracts with external collaborators
//! - Update values consistently
//! - Document the rationale for each constant

// =============================================================================
// Credential Constants
// =============================================================================

/// Length of generated credential secrets, in characters.
///
/// Secrets are drawn from [`SECRET_ALPHABET_DESCRIPTION`] using a
/// cryptographically secure source. 32 alphanumeric characters yield
/// ~190 bits of entropy, well beyond guessing/replay feasibility.
pub const SECRET_LENGTH: usize = 32;

/// Human-readable description of the secret alphabet (A-Z, a-z, 0-9).
///
/// The actual sampling uses `rand::distributions::Alphanumeric`, which is
/// exactly this 62-character set.
pub const SECRET_ALPHABET_DESCRIPTION: &str = "A-Za-z0-9";

/// Prefix for credential names derived from relation identifiers.
///
/// A relation with id `7` owns the credential named `relation-7`. The name is
/// deterministic so that re-running provisioning for the same relation is
/// idempotent across leader re-election and event replay.
pub const CREDENTIAL_KEY_PREFIX: &str = "relation-";

// =============================================================================
// Property File Constants
// =============================================================================

/// Comment marker for property files. Lines whose first non-whitespace
/// character is this marker are ignored by the parser.
pub const PROPERTY_COMMENT_MARKER: char = '#';

/// Key/value separator in property files. Only the first occurrence on a
/// line splits key from value.
pub const PROPERTY_SEPARATOR: char = '=';

// =============================================================================
// Relation Data Keys (coordination-service side)
// =============================================================================

/// Relation-data key carrying the coordination-service namespace prefix.
pub const RELATION_KEY_CHROOT: &str = "chroot";

/// Relation-data key carrying the coordination-service username.
pub const RELATION_KEY_USERNAME: &str = "username";

/// Relation-data key carrying the coordination-service password.
pub const RELATION_KEY_PASSWORD: &str = "password";

/// Relation-data key carrying the comma-separated `host:port` endpoint list.
pub const RELATION_KEY_ENDPOINTS: &str = "endpoints";

/// Relation-data key carrying the comma-separated `host:port[/chroot]` list.
pub const RELATION_KEY_URIS: &str = "uris";
