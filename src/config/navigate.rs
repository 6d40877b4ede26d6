//! Walks over nested mappings addressed by key path segments.
//!
//! Every function takes the remaining segments as a slice and recurses on
//! the tail. Only `Value::Object` nodes are descended into; arrays and
//! scalars are leaves.

use serde_json::map::Entry;
use serde_json::{Map, Value};
use tracing::trace;

/// Result of [`get_or_insert`].
#[derive(Debug)]
pub(crate) enum Slot<'a> {
    /// The terminal entry already existed.
    Occupied(&'a Value),
    /// The terminal entry was missing and the default has been written.
    Inserted,
}

/// Returns the value at `path`, or `None` when a segment is missing or an
/// intermediate node is not a mapping.
pub(crate) fn lookup<'a>(table: &'a Map<String, Value>, path: &[String]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let value = table.get(first)?;
    if rest.is_empty() {
        return Some(value);
    }
    lookup(value.as_object()?, rest)
}

/// Returns the mapping at `path`, or `None` when the walk is blocked or the
/// final node is not a mapping.
pub(crate) fn lookup_table_mut<'a>(
    table: &'a mut Map<String, Value>,
    path: &[String],
) -> Option<&'a mut Map<String, Value>> {
    let (first, rest) = path.split_first()?;
    let nested = table.get_mut(first)?.as_object_mut()?;
    if rest.is_empty() {
        return Some(nested);
    }
    lookup_table_mut(nested, rest)
}

/// Writes `value` at `path`, creating intermediate mappings as needed.
///
/// Returns the value previously stored at the terminal segment.
pub(crate) fn insert(
    table: &mut Map<String, Value>,
    path: &[String],
    value: Value,
) -> Option<Value> {
    let (first, rest) = path.split_first()?;
    if rest.is_empty() {
        return table.insert(first.clone(), value);
    }
    insert(vivify(table, first), rest, value)
}

/// Returns the value at `path`, writing `default` there first if the
/// terminal segment is missing.
///
/// Intermediate nodes are created or overwritten exactly as in [`insert`].
pub(crate) fn get_or_insert<'a>(
    table: &'a mut Map<String, Value>,
    path: &[String],
    default: Value,
) -> Slot<'a> {
    let (first, rest) = path.split_first().expect("key path is non-empty");
    if !rest.is_empty() {
        return get_or_insert(vivify(table, first), rest, default);
    }
    match table.entry(first.clone()) {
        Entry::Occupied(entry) => Slot::Occupied(entry.into_mut()),
        Entry::Vacant(entry) => {
            entry.insert(default);
            Slot::Inserted
        }
    }
}

/// Removes the entry at `path` and returns it.
///
/// A missing segment or a non-mapping intermediate makes this a no-op.
/// Mappings emptied by the removal are left in place.
pub(crate) fn remove(table: &mut Map<String, Value>, path: &[String]) -> Option<Value> {
    let (first, rest) = path.split_first()?;
    if rest.is_empty() {
        return table.shift_remove(first);
    }
    match table.get_mut(first) {
        Some(Value::Object(nested)) => remove(nested, rest),
        _ => None,
    }
}

/// Returns the mapping stored under `key`, replacing a missing or
/// non-mapping value with an empty one.
fn vivify<'a>(table: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = table
        .entry(key.to_owned())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        trace!(key, replaced = %slot, "overwriting leaf with a mapping");
        *slot = Value::Object(Map::new());
    }
    slot.as_object_mut().expect("slot holds a mapping")
}
