//! Dotted-key configuration trees and their backing files.

mod error;
mod file;
mod format;
mod locate;
mod navigate;
mod path;
mod tree;

pub use error::ConfigError;
pub use file::ConfigFile;
pub use format::{Format, Indent};
pub use locate::Locator;
pub use path::KeyPath;
pub use tree::{ConfigTree, PathTree, SubtreeMut};
