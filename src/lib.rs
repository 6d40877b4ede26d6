pub mod config;

pub use config::{
    ConfigError, ConfigFile, ConfigTree, Format, Indent, KeyPath, Locator, PathTree, SubtreeMut,
};
