//! Dotted key paths.

use std::fmt;

use super::ConfigError;

/// A dotted key such as `server.http.port`, split into its segments.
///
/// The first segment names a child of the root mapping, the last one names
/// the entry that an operation reads or writes. A path always has at least
/// one segment and no segment is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Splits `key` on `.`.
    ///
    /// Returns [`ConfigError::InvalidKey`] for an empty key or for a key with
    /// an empty segment (`.a`, `a.`, `a..b`).
    pub fn parse(key: &str) -> Result<Self, ConfigError> {
        let segments: Vec<String> = key.split('.').map(str::to_owned).collect();
        if key.is_empty() || segments.iter().any(|s| s.is_empty()) {
            return Err(ConfigError::InvalidKey(key.to_string()));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false` for a parsed path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Splits off the terminal segment from its ancestors.
    pub fn split_last(&self) -> (&String, &[String]) {
        self.segments
            .split_last()
            .expect("key path is non-empty")
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl std::str::FromStr for KeyPath {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
