//! File-backed configuration trees.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use super::format::{Format, Indent};
use super::locate::Locator;
use super::tree::{ConfigTree, PathTree};
use super::ConfigError;

/// Indent width used by [`ConfigFile::save`].
const SAVE_INDENT: usize = 2;

/// A configuration tree bound to a file on disk.
///
/// The file is read once when opened. Changes stay in memory until
/// [`save`](Self::save) writes the whole tree back.
///
/// ## Example
///
/// ```no_run
/// use dragon_cfg::{ConfigFile, Locator, PathTree};
///
/// let locator = Locator::from_home_dir()?;
/// let mut config = ConfigFile::open_app("myapp", &locator)?;
///
/// let port: u16 = config.get_or_set("server.port", 8080)?;
/// config.set("server.host", "localhost")?;
/// config.save()?;
/// # Ok::<(), dragon_cfg::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    format: Format,
    tree: ConfigTree,
}

impl ConfigFile {
    /// Opens the config file at `path`, creating an empty one if missing.
    ///
    /// The format follows the file extension: `.toml` files are TOML,
    /// everything else is JSON.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        Self::open_with_format(path, Format::from_path(path))
    }

    /// Opens the config file at `path` using an explicit format.
    pub fn open_with_format(path: impl AsRef<Path>, format: Format) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        if path.is_dir() {
            return Err(ConfigError::IsADirectory(path));
        }
        if !path.exists() {
            create_empty(&path, format)?;
        }

        let root = load_config_file(&path, format)?;
        debug!(path = %path.display(), keys = root.len(), "Loaded config file");
        Ok(Self {
            path,
            format,
            tree: ConfigTree::from(root),
        })
    }

    /// Opens `<home>/.config/<application_name>.json`.
    pub fn open_app(application_name: &str, locator: &Locator) -> Result<Self, ConfigError> {
        Self::open(locator.locate(application_name, Format::Json.extension()))
    }

    /// Writes the whole tree back to the file, pretty-printed.
    ///
    /// On failure the file may be left unwritten but the in-memory tree is
    /// unchanged.
    ///
    /// TOML files do not keep the tree's key order: top-level scalars are
    /// written ahead of tables, and datetimes read from the file are saved
    /// as strings. See [`Format`].
    pub fn save(&self) -> Result<(), ConfigError> {
        let mut contents = self
            .format
            .render(self.tree.as_map(), Indent::Spaces(SAVE_INDENT))?;
        if !contents.ends_with('\n') {
            contents.push('\n');
        }
        std::fs::write(&self.path, contents).map_err(|e| ConfigError::WriteError {
            path: self.path.clone(),
            source: e,
        })?;
        debug!(path = %self.path.display(), "Saved config file");
        Ok(())
    }

    /// Re-reads the file, discarding unsaved changes.
    ///
    /// If reading or parsing fails the current tree is kept.
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        let root = load_config_file(&self.path, self.format)?;
        debug!(path = %self.path.display(), keys = root.len(), "Reloaded config file");
        self.tree = ConfigTree::from(root);
        Ok(())
    }

    /// Path of the backing file.
    pub fn file(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn tree(&self) -> &ConfigTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ConfigTree {
        &mut self.tree
    }

    /// Detaches the tree from its file.
    pub fn into_tree(self) -> ConfigTree {
        self.tree
    }
}

impl PathTree for ConfigFile {
    fn as_map(&self) -> &Map<String, Value> {
        self.tree.as_map()
    }

    fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        self.tree.as_map_mut()
    }
}

impl fmt::Display for ConfigFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.tree, f)
    }
}

/// Creates `path` and any missing parent directories, holding an empty
/// document.
fn create_empty(path: &Path, format: Format) -> Result<(), ConfigError> {
    let write_error = |e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
    }
    std::fs::write(path, format.empty_document()).map_err(write_error)?;
    debug!(path = %path.display(), "Created empty config file");
    Ok(())
}

/// Loads and parses a config file.
fn load_config_file(path: &Path, format: Format) -> Result<Map<String, Value>, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    format.parse(&contents, path)
}
