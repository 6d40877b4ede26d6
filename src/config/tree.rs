//! In-memory configuration trees addressed by dotted keys.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::format::{render_json, Indent};
use super::navigate::{self, Slot};
use super::path::KeyPath;
use super::ConfigError;

/// Dotted-key access to a root mapping.
///
/// Keys are split on `.` (see [`KeyPath`]); the first segment names a child
/// of the root. Writes create missing intermediate mappings and overwrite
/// intermediate values that are not mappings, discarding them.
///
/// Implementations are plain owned or borrowed data without internal
/// locking. Sharing one tree between threads needs an external mutex.
pub trait PathTree {
    /// The root mapping.
    fn as_map(&self) -> &Map<String, Value>;

    /// The root mapping, mutably.
    fn as_map_mut(&mut self) -> &mut Map<String, Value>;

    /// Returns the raw value at `key` without modifying the tree.
    ///
    /// Returns `Ok(None)` if any segment is missing or a node along the way
    /// is not a mapping.
    fn get_value(&self, key: &str) -> Result<Option<&Value>, ConfigError> {
        let path = KeyPath::parse(key)?;
        Ok(navigate::lookup(self.as_map(), path.segments()))
    }

    /// Reads the value at `key` as a `T`.
    ///
    /// A stored value that does not deserialize into `T` is reported as
    /// [`ConfigError::TypeMismatch`].
    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        self.get_value(key)?
            .map(|value| convert(key, value))
            .transpose()
    }

    /// Reads the value at `key`, storing `default` there first if absent.
    ///
    /// Missing intermediate mappings are created. An intermediate value that
    /// is not a mapping is replaced by one, so the default always lands at
    /// `key`. An existing value is returned as stored; if it does not
    /// deserialize into `T` the call fails with
    /// [`ConfigError::TypeMismatch`] and the tree keeps the stored value.
    fn get_or_set<T>(&mut self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: Serialize + DeserializeOwned,
    {
        let path = KeyPath::parse(key)?;
        let node = to_node(key, &default)?;
        match navigate::get_or_insert(self.as_map_mut(), path.segments(), node) {
            Slot::Occupied(existing) => convert(key, existing),
            Slot::Inserted => Ok(default),
        }
    }

    /// Stores `value` at `key`, replacing whatever was there.
    ///
    /// Returns `self` so writes can be chained.
    fn set<V: Serialize>(&mut self, key: &str, value: V) -> Result<&mut Self, ConfigError> {
        let node = to_node(key, &value)?;
        self.set_value(key, node)?;
        Ok(self)
    }

    /// Stores a raw value at `key` and returns the value it replaced.
    fn set_value(&mut self, key: &str, value: Value) -> Result<Option<Value>, ConfigError> {
        let path = KeyPath::parse(key)?;
        Ok(navigate::insert(self.as_map_mut(), path.segments(), value))
    }

    /// Removes the entry at `key` and returns it.
    ///
    /// Removing a key that does not exist is not an error. Mappings left
    /// empty by the removal stay in the tree.
    fn remove(&mut self, key: &str) -> Result<Option<Value>, ConfigError> {
        let path = KeyPath::parse(key)?;
        Ok(navigate::remove(self.as_map_mut(), path.segments()))
    }

    fn contains(&self, key: &str) -> Result<bool, ConfigError> {
        Ok(self.get_value(key)?.is_some())
    }

    /// Top-level keys in document order.
    fn keys(&self) -> Vec<&str> {
        self.as_map().keys().map(String::as_str).collect()
    }

    fn is_empty(&self) -> bool {
        self.as_map().is_empty()
    }

    /// Returns a detached copy of the mapping at `key`.
    ///
    /// Returns `Ok(None)` if the walk is blocked or the value at `key` is
    /// not a mapping. Changes to the copy do not reach this tree; use
    /// [`subset_mut`](Self::subset_mut) for a live view.
    fn subset(&self, key: &str) -> Result<Option<ConfigTree>, ConfigError> {
        Ok(match self.get_value(key)? {
            Some(Value::Object(map)) => Some(ConfigTree::from(map.clone())),
            _ => None,
        })
    }

    /// Returns a live view of the mapping at `key`.
    ///
    /// Writes through the view land in this tree. The view borrows the tree
    /// mutably, so the tree cannot be changed behind its back.
    fn subset_mut(&mut self, key: &str) -> Result<Option<SubtreeMut<'_>>, ConfigError> {
        let path = KeyPath::parse(key)?;
        Ok(navigate::lookup_table_mut(self.as_map_mut(), path.segments())
            .map(|root| SubtreeMut { root }))
    }

    /// Compact single-line JSON.
    fn flat(&self) -> String {
        render_json(self.as_map(), Indent::Compact)
    }

    /// JSON indented by `indent` spaces per level.
    fn pretty(&self, indent: usize) -> String {
        render_json(self.as_map(), Indent::Spaces(indent))
    }
}

fn convert<T: DeserializeOwned>(key: &str, value: &Value) -> Result<T, ConfigError> {
    T::deserialize(value).map_err(|e| ConfigError::TypeMismatch {
        key: key.to_string(),
        source: e,
    })
}

fn to_node<V: Serialize + ?Sized>(key: &str, value: &V) -> Result<Value, ConfigError> {
    serde_json::to_value(value).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        source: e,
    })
}

/// A configuration tree that owns its root mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
    root: Map<String, Value>,
}

impl ConfigTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.root
    }
}

impl From<Map<String, Value>> for ConfigTree {
    fn from(root: Map<String, Value>) -> Self {
        Self { root }
    }
}

impl PathTree for ConfigTree {
    fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.root
    }
}

impl fmt::Display for ConfigTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty(2))
    }
}

/// A live view of a mapping nested inside another tree.
///
/// Obtained from [`PathTree::subset_mut`].
#[derive(Debug)]
pub struct SubtreeMut<'a> {
    root: &'a mut Map<String, Value>,
}

impl SubtreeMut<'_> {
    /// Copies the viewed mapping into a detached tree.
    pub fn to_tree(&self) -> ConfigTree {
        ConfigTree::from(self.root.clone())
    }
}

impl PathTree for SubtreeMut<'_> {
    fn as_map(&self) -> &Map<String, Value> {
        self.root
    }

    fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        self.root
    }
}

impl fmt::Display for SubtreeMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_empty_tree() {
        let tree = ConfigTree::new();
        assert_eq!(tree.flat(), "{}");
        assert!(tree.is_empty());
        assert!(tree.keys().is_empty());
    }

    #[test]
    fn test_set_flat() {
        let mut tree = ConfigTree::new();
        tree.set("hello", "world").unwrap();
        assert_eq!(tree.flat(), r#"{"hello":"world"}"#);
    }

    #[test]
    fn test_set_nested() {
        let mut tree = ConfigTree::new();

        tree.set("this.is.a", "test").unwrap();
        assert_eq!(tree.flat(), r#"{"this":{"is":{"a":"test"}}}"#);

        tree.set("this.is.no", "joke").unwrap();
        assert_eq!(tree.flat(), r#"{"this":{"is":{"a":"test","no":"joke"}}}"#);

        tree.set("this.is.a", "farce").unwrap();
        assert_eq!(tree.flat(), r#"{"this":{"is":{"a":"farce","no":"joke"}}}"#);

        tree.set("this.is", "gone").unwrap();
        assert_eq!(tree.flat(), r#"{"this":{"is":"gone"}}"#);

        tree.set("int", 3).unwrap();
        assert_eq!(tree.flat(), r#"{"this":{"is":"gone"},"int":3}"#);
    }

    #[test]
    fn test_set_chains() {
        let mut tree = ConfigTree::new();
        tree.set("a", 1).unwrap().set("b.c", true).unwrap();
        assert_eq!(tree.flat(), r#"{"a":1,"b":{"c":true}}"#);
    }

    #[test]
    fn test_set_struct_value() {
        #[derive(Serialize, Deserialize, Debug, PartialEq)]
        struct Server {
            host: String,
            port: u16,
        }

        let server = Server {
            host: "localhost".into(),
            port: 8080,
        };
        let mut tree = ConfigTree::new();
        tree.set("server", &server).unwrap();

        assert_eq!(tree.get::<u16>("server.port").unwrap(), Some(8080));
        assert_eq!(tree.get::<Server>("server").unwrap(), Some(server));
    }

    #[test]
    fn test_set_value_returns_previous() {
        let mut tree = ConfigTree::new();
        assert_eq!(tree.set_value("a.b", json!(1)).unwrap(), None);
        assert_eq!(tree.set_value("a.b", json!(2)).unwrap(), Some(json!(1)));
    }

    #[test]
    fn test_get_flat_and_nested() {
        let mut tree = ConfigTree::new();
        tree.set("hello", "world").unwrap();
        tree.set("this.is.a", "test").unwrap();

        assert_eq!(tree.get::<String>("hello").unwrap().as_deref(), Some("world"));
        assert_eq!(tree.get::<String>("this.is.a").unwrap().as_deref(), Some("test"));
        assert_eq!(
            tree.get_value("this").unwrap(),
            Some(&json!({"is": {"a": "test"}}))
        );
    }

    #[test]
    fn test_get_missing_does_not_mutate() {
        let mut tree = ConfigTree::new();
        tree.set("this", "scalar").unwrap();

        assert_eq!(tree.get::<String>("this.is.a").unwrap(), None);
        assert_eq!(tree.get::<String>("other.key").unwrap(), None);
        assert_eq!(tree.flat(), r#"{"this":"scalar"}"#);
    }

    #[test]
    fn test_get_type_mismatch() {
        let mut tree = ConfigTree::new();
        tree.set("port", "eighty").unwrap();

        let result = tree.get::<u16>("port");
        assert!(matches!(result, Err(ConfigError::TypeMismatch { ref key, .. }) if key == "port"));
    }

    #[test]
    fn test_get_rejects_invalid_key() {
        let tree = ConfigTree::new();
        assert!(matches!(tree.get::<String>("a..b"), Err(ConfigError::InvalidKey(_))));
        assert!(matches!(tree.get_value(""), Err(ConfigError::InvalidKey(_))));
    }

    #[test]
    fn test_get_or_set() {
        let mut tree = ConfigTree::new();
        assert_eq!(tree.get_or_set("hello", "world".to_string()).unwrap(), "world");
        let before = tree.clone();
        assert_eq!(tree.get_or_set("hello", "sunshine".to_string()).unwrap(), "world");
        assert_eq!(tree, before);
    }

    #[test]
    fn test_get_or_set_nested() {
        let mut tree = ConfigTree::new();
        assert_eq!(tree.get_or_set("this.is.a", "test".to_string()).unwrap(), "test");
        assert_eq!(tree.get_or_set("this.is.a", "farce".to_string()).unwrap(), "test");
        assert_eq!(tree.flat(), r#"{"this":{"is":{"a":"test"}}}"#);
    }

    #[test]
    fn test_get_or_set_overwrites_leaf_intermediate() {
        let mut tree = ConfigTree::new();
        tree.set("server", "disabled").unwrap();

        assert_eq!(tree.get_or_set("server.port", 8080u16).unwrap(), 8080);
        assert_eq!(tree.flat(), r#"{"server":{"port":8080}}"#);
    }

    #[test]
    fn test_get_or_set_type_mismatch_keeps_value() {
        let mut tree = ConfigTree::new();
        tree.set("port", "eighty").unwrap();

        let result = tree.get_or_set("port", 80u16);
        assert!(matches!(result, Err(ConfigError::TypeMismatch { .. })));
        assert_eq!(tree.flat(), r#"{"port":"eighty"}"#);
    }

    #[test]
    fn test_get_or_set_returns_stored_kind() {
        let mut tree = ConfigTree::new();
        tree.set("answer", 42).unwrap();

        let value: Value = tree.get_or_set("answer", json!("default")).unwrap();
        assert_eq!(value, json!(42));
    }

    #[test]
    fn test_remove() {
        let mut tree = ConfigTree::new();
        tree.set("this.is.a", "test").unwrap();
        tree.set("hello", "world").unwrap();

        assert_eq!(tree.remove("test.is.an").unwrap(), None);
        assert_eq!(tree.flat(), r#"{"this":{"is":{"a":"test"}},"hello":"world"}"#);

        assert_eq!(tree.remove("this.is.a").unwrap(), Some(json!("test")));
        assert_eq!(tree.flat(), r#"{"this":{"is":{}},"hello":"world"}"#);

        tree.remove("this").unwrap();
        assert_eq!(tree.flat(), r#"{"hello":"world"}"#);

        tree.remove("hello").unwrap();
        assert_eq!(tree.flat(), "{}");
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut tree = ConfigTree::new();
        tree.set("a.b", 1).unwrap();
        tree.set("a.c", 2).unwrap();

        tree.remove("a.b").unwrap();
        let once = tree.clone();
        tree.remove("a.b").unwrap();
        assert_eq!(tree, once);
    }

    #[test]
    fn test_remove_through_leaf_is_noop() {
        let mut tree = ConfigTree::new();
        tree.set("a", "leaf").unwrap();
        assert_eq!(tree.remove("a.b.c").unwrap(), None);
        assert_eq!(tree.flat(), r#"{"a":"leaf"}"#);
    }

    #[test]
    fn test_keys_in_document_order() {
        let mut tree = ConfigTree::new();
        tree.set("zeta", 1).unwrap();
        tree.set("alpha.nested", 2).unwrap();
        tree.set("mid", 3).unwrap();
        assert_eq!(tree.keys(), ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_contains() {
        let mut tree = ConfigTree::new();
        tree.set("a.b", serde_json::Value::Null).unwrap();
        assert!(tree.contains("a").unwrap());
        assert!(tree.contains("a.b").unwrap());
        assert!(!tree.contains("a.c").unwrap());
    }

    #[test]
    fn test_subset() {
        let mut tree = ConfigTree::new();
        tree.set("a.a.a", "aaa").unwrap();
        tree.set("a.a.b", "aab").unwrap();
        tree.set("a.b.a", "aba").unwrap();
        tree.set("a.b.b", "abb").unwrap();
        assert_eq!(
            tree.flat(),
            r#"{"a":{"a":{"a":"aaa","b":"aab"},"b":{"a":"aba","b":"abb"}}}"#
        );

        let subset = tree.subset("a").unwrap().unwrap();
        assert_eq!(subset.flat(), r#"{"a":{"a":"aaa","b":"aab"},"b":{"a":"aba","b":"abb"}}"#);

        let subset = tree.subset("a.b").unwrap().unwrap();
        assert_eq!(subset.flat(), r#"{"a":"aba","b":"abb"}"#);
    }

    #[test]
    fn test_subset_missing_or_leaf() {
        let mut tree = ConfigTree::new();
        tree.set("a.b", "leaf").unwrap();
        assert!(tree.subset("a.b").unwrap().is_none());
        assert!(tree.subset("a.b.c").unwrap().is_none());
        assert!(tree.subset("x").unwrap().is_none());
    }

    #[test]
    fn test_subset_is_detached() {
        let mut tree = ConfigTree::new();
        tree.set("a.b", 1).unwrap();

        let mut copy = tree.subset("a").unwrap().unwrap();
        copy.set("c", 2).unwrap();

        assert_eq!(copy.flat(), r#"{"b":1,"c":2}"#);
        assert_eq!(tree.flat(), r#"{"a":{"b":1}}"#);
    }

    #[test]
    fn test_subset_mut_writes_through() {
        let mut tree = ConfigTree::new();
        tree.set("server.host", "localhost").unwrap();

        {
            let mut server = tree.subset_mut("server").unwrap().unwrap();
            server.set("port", 8080).unwrap();
            server.remove("host").unwrap();
            assert_eq!(server.flat(), r#"{"port":8080}"#);
            assert_eq!(server.to_tree().keys(), ["port"]);
        }

        assert_eq!(tree.flat(), r#"{"server":{"port":8080}}"#);
    }

    #[test]
    fn test_subset_mut_missing() {
        let mut tree = ConfigTree::new();
        tree.set("a", 1).unwrap();
        assert!(tree.subset_mut("a").unwrap().is_none());
        assert!(tree.subset_mut("b").unwrap().is_none());
        assert!(matches!(tree.subset_mut("a."), Err(ConfigError::InvalidKey(_))));
    }

    #[test]
    fn test_display_is_pretty() {
        let mut tree = ConfigTree::new();
        tree.set("a.b", 1).unwrap();
        assert_eq!(tree.to_string(), "{\n  \"a\": {\n    \"b\": 1\n  }\n}");
        assert_eq!(tree.pretty(4), "{\n    \"a\": {\n        \"b\": 1\n    }\n}");
    }
}
