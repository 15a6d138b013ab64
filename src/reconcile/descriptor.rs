//! Coordination-service connection descriptor validation.
//!
//! Peers on the coordination-service relation publish endpoint data piecemeal
//! during cluster bootstrap. This module parses that key/value data into a
//! validated [`ConnectionDescriptor`], or reports "not ready".
//!
//! "Not ready" is a normal, expected state, not a failure: validation returns
//! `None` rather than an error, and an invalid descriptor collapses to absent
//! rather than a partially-populated value. Consumers never see a
//! malformed-but-usable descriptor.

use std::collections::HashMap;

use tracing::debug;

use crate::constants::{
    RELATION_KEY_CHROOT, RELATION_KEY_ENDPOINTS, RELATION_KEY_PASSWORD, RELATION_KEY_URIS,
    RELATION_KEY_USERNAME,
};

/// A validated coordination-service endpoint set.
///
/// Only ever observed fully populated: [`ConnectionDescriptor::validate`]
/// returns `None` instead of a partial descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    /// Path-like namespace prefix within the coordination service.
    pub chroot: String,
    /// Username for the coordination-service session.
    pub username: String,
    /// Password for the coordination-service session.
    pub password: String,
    /// `host:port` pairs, in the order the peer listed them.
    pub endpoints: Vec<String>,
    /// `host:port[/chroot]` pairs, in the order the peer listed them.
    pub uris: Vec<String>,
    /// Canonical connection string: `uris` joined with commas.
    pub connect: String,
}

impl ConnectionDescriptor {
    /// Parse and validate peer-supplied relation data.
    ///
    /// Returns `None` (not an error) if `username` or `password` is
    /// absent/empty, or if `uris` is empty after parsing. Pure and
    /// side-effect-free, safe to call speculatively on every pass.
    ///
    /// List order is preserved verbatim; duplicate or conflicting entries are
    /// the peer's responsibility.
    pub fn validate(data: &HashMap<String, String>) -> Option<Self> {
        let username = non_empty(data.get(RELATION_KEY_USERNAME))?;
        let password = non_empty(data.get(RELATION_KEY_PASSWORD))?;

        let uris = split_list(data.get(RELATION_KEY_URIS));
        if uris.is_empty() {
            debug!("coordination descriptor not ready: no uris published");
            return None;
        }

        let endpoints = split_list(data.get(RELATION_KEY_ENDPOINTS));
        let chroot = data
            .get(RELATION_KEY_CHROOT)
            .cloned()
            .unwrap_or_default();

        let connect = uris.join(",");
        Some(Self {
            chroot,
            username,
            password,
            endpoints,
            uris,
            connect,
        })
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v.clone()),
        _ => {
            debug!("coordination descriptor not ready: credentials incomplete");
            None
        }
    }
}

fn split_list(value: Option<&String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
