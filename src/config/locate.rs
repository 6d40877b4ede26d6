//! Locating per-application config files.

use std::path::{Path, PathBuf};

use super::ConfigError;

/// Maps application names to files under `<home>/.config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    home: PathBuf,
}

impl Locator {
    /// Creates a locator rooted at the given home directory.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Creates a locator rooted at the current user's home directory.
    pub fn from_home_dir() -> Result<Self, ConfigError> {
        dirs::home_dir()
            .map(Self::new)
            .ok_or(ConfigError::NoHomeDirectory)
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Returns `<home>/.config/<application_name>.<extension>`.
    pub fn locate(&self, application_name: &str, extension: &str) -> PathBuf {
        self.home
            .join(".config")
            .join(format!("{application_name}.{extension}"))
    }
}
