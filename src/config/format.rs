//! Text formats for config documents.

use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use super::ConfigError;

/// Layout used when rendering a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    /// Single line, no whitespace between tokens.
    Compact,
    /// Pretty-printed, nested levels indented by this many spaces.
    Spaces(usize),
}

/// Serialization format of a backing file.
///
/// Documents are held as JSON trees, so TOML files go through a lossy
/// conversion:
///
/// - datetimes load as RFC 3339 strings and are saved back as quoted
///   strings;
/// - non-finite floats (`nan`, `inf`) are rejected on load;
/// - `null` values cannot be saved;
/// - on save, top-level scalars are written ahead of tables, so a reopened
///   file may list its keys in a different order than the saved tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Json,
    Toml,
}

impl Format {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Toml => "toml",
        }
    }

    /// Picks the format from a file extension, defaulting to JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
            _ => Format::Json,
        }
    }

    /// Contents written to a freshly created file.
    pub fn empty_document(self) -> &'static str {
        match self {
            Format::Json => "{}\n",
            Format::Toml => "",
        }
    }

    /// Parses `contents` read from `path` into a root mapping.
    ///
    /// The document root must be a mapping; a bare scalar or array at the
    /// top level is rejected.
    pub fn parse(self, contents: &str, path: &Path) -> Result<Map<String, Value>, ConfigError> {
        let value = match self {
            Format::Json => {
                serde_json::from_str::<Value>(contents).map_err(|e| ConfigError::JsonParse {
                    path: path.to_path_buf(),
                    source: e,
                })?
            }
            Format::Toml => {
                let table: toml::Table =
                    toml::from_str(contents).map_err(|e| ConfigError::TomlParse {
                        path: path.to_path_buf(),
                        source: e,
                    })?;
                toml_to_json(toml::Value::Table(table), "", path)?
            }
        };

        match value {
            Value::Object(map) => Ok(map),
            _ => Err(ConfigError::NotAMapping(path.to_path_buf())),
        }
    }

    /// Renders a root mapping as text.
    ///
    /// TOML output ignores the indent width and fails on `null` values,
    /// which TOML cannot represent.
    pub fn render(self, table: &Map<String, Value>, indent: Indent) -> Result<String, ConfigError> {
        match self {
            Format::Json => Ok(render_json(table, indent)),
            Format::Toml => {
                if let Some(key) = find_null(table, "") {
                    return Err(ConfigError::TomlNull(key));
                }
                match indent {
                    Indent::Compact => Ok(toml::to_string(table)?),
                    Indent::Spaces(_) => Ok(toml::to_string_pretty(table)?),
                }
            }
        }
    }
}

/// Renders a mapping as JSON text.
pub(crate) fn render_json(table: &Map<String, Value>, indent: Indent) -> String {
    let mut out = Vec::new();
    let result = match indent {
        Indent::Compact => serde_json::to_writer(&mut out, table),
        Indent::Spaces(width) => {
            let spaces = " ".repeat(width);
            let formatter = PrettyFormatter::with_indent(spaces.as_bytes());
            let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
            table.serialize(&mut ser)
        }
    };
    result.expect("a JSON map always serializes into memory");
    String::from_utf8(out).expect("serde_json emits UTF-8")
}

/// Returns the dotted key of the first `null` in `table`, if any.
fn find_null(table: &Map<String, Value>, prefix: &str) -> Option<String> {
    table.iter().find_map(|(key, value)| {
        let key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        contains_null(value, key)
    })
}

fn contains_null(value: &Value, key: String) -> Option<String> {
    match value {
        Value::Null => Some(key),
        Value::Object(nested) => find_null(nested, &key),
        Value::Array(items) => items
            .iter()
            .find_map(|item| contains_null(item, key.clone())),
        _ => None,
    }
}

/// Converts a parsed TOML value found at `key` into the JSON tree model.
///
/// Datetimes become their RFC 3339 string form and are written back as
/// strings on save. Floats JSON cannot hold (`nan`, `inf`) are an error.
fn toml_to_json(value: toml::Value, key: &str, path: &Path) -> Result<Value, ConfigError> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => match serde_json::Number::from_f64(f) {
            Some(n) => Value::Number(n),
            None => {
                return Err(ConfigError::NonFiniteFloat {
                    path: path.to_path_buf(),
                    key: key.to_string(),
                })
            }
        },
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| toml_to_json(item, key, path))
                .collect::<Result<_, _>>()?,
        ),
        toml::Value::Table(table) => {
            let mut map = Map::with_capacity(table.len());
            for (name, value) in table {
                let nested = if key.is_empty() {
                    name.clone()
                } else {
                    format!("{key}.{name}")
                };
                map.insert(name, toml_to_json(value, &nested, path)?);
            }
            Value::Object(map)
        }
    })
}
