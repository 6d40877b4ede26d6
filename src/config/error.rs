use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid key path: '{0}'")]
    InvalidKey(String),

    #[error("document root is not a mapping: {0}")]
    NotAMapping(PathBuf),

    #[error("value at '{key}' has an unexpected type: {source}")]
    TypeMismatch {
        key: String,
        source: serde_json::Error,
    },

    #[error("cannot store value at '{key}': {source}")]
    InvalidValue {
        key: String,
        source: serde_json::Error,
    },

    #[error("TOML cannot represent the null value at '{0}'")]
    TomlNull(String),

    #[error("failed to render config as TOML: {0}")]
    TomlRender(#[from] toml::ser::Error),

    #[error("failed to parse config file '{path}': {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to parse config file '{path}': non-finite float at '{key}' has no JSON form")]
    NonFiniteFloat { path: PathBuf, key: String },

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{0} is a directory, file expected")]
    IsADirectory(PathBuf),

    #[error("cannot determine the user's home directory")]
    NoHomeDirectory,
}
