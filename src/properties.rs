//! Property file parsing and layered merging.
//!
//! The broker workload reads its configuration from a single effective
//! properties file. That file is produced by merging two sources:
//!
//! 1. A **default** property set shipped with the deployment (required)
//! 2. An optional operator-supplied **override** set
//!
//! Merge precedence is unconditional override-wins: for every key present in
//! both sets the override value replaces the default; keys unique to either
//! side pass through unchanged.
//!
//! # File Format
//!
//! UTF-8 text, one `key=value` pair per line. Blank lines and lines whose
//! first non-whitespace character is `#` are ignored. Keys and values are
//! trimmed of surrounding whitespace; on duplicate keys the last occurrence
//! wins.
//!
//! # Example
//!
//! ```rust,no_run
//! use brokersync::properties::merge_property_files;
//!
//! # async fn example() -> brokersync::error::Result<()> {
//! let effective = merge_property_files(
//!     "/etc/broker/server.properties",
//!     Some("/etc/broker/override.properties"),
//! )
//! .await?;
//! // Caller persists `effective` to the location the workload reads.
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::constants::{PROPERTY_COMMENT_MARKER, PROPERTY_SEPARATOR};
use crate::error::{Error, Result};

/// An ordered mapping of configuration keys to values.
///
/// Backed by a `BTreeMap` so serialization is deterministic (key order) for
/// a given input, regardless of source line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySet {
    entries: BTreeMap<String, String>,
}

impl PropertySet {
    /// Create an empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse properties from text.
    ///
    /// Skips blank lines and `#`-comments. Lines without a `=` separator are
    /// ignored. Splits remaining lines on the first `=`; key and value are
    /// trimmed. On duplicate keys, the last occurrence wins.
    pub fn parse_str(text: &str) -> Self {
        let mut entries = BTreeMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(PROPERTY_COMMENT_MARKER) {
                continue;
            }
            let Some((key, value)) = line.split_once(PROPERTY_SEPARATOR) else {
                debug!(line, "skipping property line without separator");
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            entries.insert(key.to_string(), value.trim().to_string());
        }
        Self { entries }
    }

    /// Load and parse a property file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if the file does not exist, and
    /// [`Error::Io`] for other filesystem failures.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Ok(Self::parse_str(&text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Insert a key/value pair, returning the previous value if present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Number of keys in the set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the set holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge an override set into this one, consuming both.
    ///
    /// Override values win key-for-key; keys unique to either side are
    /// preserved as-is.
    pub fn merge(mut self, overrides: PropertySet) -> PropertySet {
        for (key, value) in overrides.entries {
            self.entries.insert(key, value);
        }
        self
    }

    /// Serialize to `key=value\n` lines in key order.
    ///
    /// Re-parsing the output yields an equal `PropertySet`.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push(PROPERTY_SEPARATOR);
            out.push_str(value);
            out.push('\n');
        }
        out
    }
}

/// Merge a default property file with an optional override file and return
/// the effective configuration as serialized `key=value` lines.
///
/// A missing override file is not an error and degrades to the default set;
/// a missing default file is [`Error::ConfigNotFound`]. This function has no
/// side effects beyond reading the two files; persisting the result is the
/// caller's responsibility.
pub async fn merge_property_files(
    default_path: impl AsRef<Path>,
    override_path: Option<impl AsRef<Path>>,
) -> Result<String> {
    let defaults = PropertySet::load(default_path.as_ref()).await?;

    let overrides = match override_path {
        Some(path) => match PropertySet::load(path.as_ref()).await {
            Ok(set) => set,
            Err(Error::ConfigNotFound { path }) => {
                debug!(path = %path.display(), "no override properties, using defaults");
                PropertySet::new()
            }
            Err(e) => return Err(e),
        },
        None => PropertySet::new(),
    };

    debug!(
        defaults = defaults.len(),
        overrides = overrides.len(),
        "merging property sets"
    );
    Ok(defaults.merge(overrides).serialize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let text = "\n# a comment\n  # indented comment\nretention.ms=100\n\n";
        let set = PropertySet::parse_str(text);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("retention.ms"), Some("100"));
    }

    #[test]
    fn test_parse_trims_keys_and_values() {
        let set = PropertySet::parse_str("  log.dirs =  /var/lib/broker  \n");
        assert_eq!(set.get("log.dirs"), Some("/var/lib/broker"));
    }

    #[test]
    fn test_parse_last_occurrence_wins() {
        let set = PropertySet::parse_str("a=1\na=2\na=3\n");
        assert_eq!(set.get("a"), Some("3"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_parse_splits_on_first_separator_only() {
        let set = PropertySet::parse_str("listener=PLAINTEXT://host:9092,SSL=on\n");
        assert_eq!(set.get("listener"), Some("PLAINTEXT://host:9092,SSL=on"));
    }

    #[test]
    fn test_parse_skips_lines_without_separator() {
        let set = PropertySet::parse_str("not a property\nvalid=yes\n");
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("valid"), Some("yes"));
    }

    #[test]
    fn test_parse_skips_empty_key() {
        let set = PropertySet::parse_str("=orphan value\n");
        assert!(set.is_empty());
    }

    #[test]
    fn test_merge_override_wins() {
        let defaults = PropertySet::parse_str("a=1\nb=2\n");
        let overrides = PropertySet::parse_str("b=9\nc=3\n");
        let merged = defaults.merge(overrides);
        assert_eq!(merged.get("a"), Some("1"));
        assert_eq!(merged.get("b"), Some("9"));
        assert_eq!(merged.get("c"), Some("3"));
    }

    #[test]
    fn test_merge_empty_override_is_identity() {
        let defaults = PropertySet::parse_str("a=1\nb=2\n");
        let merged = defaults.clone().merge(PropertySet::new());
        assert_eq!(merged, defaults);
    }

    #[test]
    fn test_serialize_parse_round_trip() {
        let set = PropertySet::parse_str("z=26\na=1\nm=13\n");
        let reparsed = PropertySet::parse_str(&set.serialize());
        assert_eq!(set, reparsed);
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let a = PropertySet::parse_str("b=2\na=1\n");
        let b = PropertySet::parse_str("a=1\nb=2\n");
        assert_eq!(a.serialize(), b.serialize());
        assert_eq!(a.serialize(), "a=1\nb=2\n");
    }

    #[tokio::test]
    async fn test_load_missing_file_is_config_not_found() {
        let err = PropertySet::load("/nonexistent/server.properties")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }
}
