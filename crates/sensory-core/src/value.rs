//! Tree utilities for the JSON-shaped application state.
//!
//! The state is a `serde_json::Value` rooted at an object. Only three container
//! kinds matter here: objects (merged key by key), arrays and scalars (both
//! replaced wholesale).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A single leaf change between two snapshots. `None` marks an absent key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub from: Option<Value>,
    pub to: Option<Value>,
}

/// Changed leaf paths keyed by dot-path, sorted for stable output.
pub type ChangeSet = BTreeMap<String, Change>;

/// Parsed dot-separated path such as `themeConfigs.snowflakes.count`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatePath<'a> {
    segments: Vec<&'a str>,
}

impl<'a> StatePath<'a> {
    /// Parse a dot-path. The empty string is the root; empty segments
    /// (`"a..b"`, `".a"`, `"a."`) are rejected.
    pub fn parse(raw: &'a str) -> Option<Self> {
        if raw.is_empty() {
            return Some(Self { segments: Vec::new() });
        }
        let segments: Vec<&str> = raw.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self { segments })
    }

    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Null-safe traversal. Array elements are addressed by decimal index.
    pub fn resolve<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        let mut cur = root;
        for seg in &self.segments {
            cur = match cur {
                Value::Object(map) => map.get(*seg)?,
                Value::Array(items) => items.get(seg.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(cur)
    }
}

/// Resolve `dot_path` against `root`; `None` means absent, which is distinct
/// from a stored `null` (`Some(&Value::Null)`).
pub fn lookup<'v>(root: &'v Value, dot_path: &str) -> Option<&'v Value> {
    StatePath::parse(dot_path)?.resolve(root)
}

/// Recursively merge `partial` into `target`.
///
/// Objects merge key by key; arrays, scalars and `null` replace. Returns
/// `false` without touching `target` when `partial` is not an object.
pub fn deep_merge(target: &mut Value, partial: &Value) -> bool {
    let Value::Object(patch) = partial else {
        return false;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(dst) = target {
        merge_maps(dst, patch);
    }
    true
}

fn merge_maps(dst: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, incoming) in patch {
        match (dst.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(nested)) => merge_maps(existing, nested),
            _ => {
                dst.insert(key.clone(), incoming.clone());
            }
        }
    }
}

/// Merge two partials into one, equivalent to applying `a` then `b`.
pub fn merged(a: &Value, b: &Value) -> Value {
    let mut out = a.clone();
    if !deep_merge(&mut out, b) {
        out = b.clone();
    }
    out
}

/// Every leaf path whose value differs between `old` and `new`.
pub fn diff(old: &Value, new: &Value) -> ChangeSet {
    let mut changes = ChangeSet::new();
    diff_into(&mut changes, String::new(), Some(old), Some(new));
    changes
}

fn diff_into(out: &mut ChangeSet, path: String, old: Option<&Value>, new: Option<&Value>) {
    match (old, new) {
        (Some(Value::Object(a)), Some(Value::Object(b))) => {
            walk_keys(out, &path, Some(a), Some(b));
        }
        // Adding or removing a whole subtree reports its leaves.
        (None, Some(Value::Object(b))) if !b.is_empty() => walk_keys(out, &path, None, Some(b)),
        (Some(Value::Object(a)), None) if !a.is_empty() => walk_keys(out, &path, Some(a), None),
        (a, b) if a == b => {}
        (a, b) => {
            out.insert(
                path,
                Change {
                    from: a.cloned(),
                    to: b.cloned(),
                },
            );
        }
    }
}

fn walk_keys(
    out: &mut ChangeSet,
    prefix: &str,
    old: Option<&Map<String, Value>>,
    new: Option<&Map<String, Value>>,
) {
    let old_keys = old.into_iter().flat_map(|m| m.keys());
    let new_only = new
        .into_iter()
        .flat_map(|m| m.keys())
        .filter(|k| old.map_or(true, |o| !o.contains_key(*k)));
    let keys: Vec<&String> = old_keys.chain(new_only).collect();
    for key in keys {
        let child = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        diff_into(
            out,
            child,
            old.and_then(|m| m.get(key)),
            new.and_then(|m| m.get(key)),
        );
    }
}

/// True when one dot-path equals the other or is a segment prefix of it.
pub fn paths_overlap(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return true;
    }
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    long == short || (long.starts_with(short) && long.as_bytes()[short.len()] == b'.')
}

/// Build a nested partial `{ seg0: { seg1: ... value } }` from a dot-path.
pub fn nest(dot_path: &str, value: Value) -> Option<Value> {
    let path = StatePath::parse(dot_path)?;
    if path.is_root() {
        return Some(value);
    }
    Some(path.segments().iter().rev().fold(value, |acc, seg| {
        let mut map = Map::new();
        map.insert((*seg).to_string(), acc);
        Value::Object(map)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_recurses_into_objects_and_replaces_arrays() {
        let mut target = json!({"a": {"x": 1, "y": [1, 2, 3]}, "b": true});
        assert!(deep_merge(&mut target, &json!({"a": {"y": [9]}, "c": null})));
        assert_eq!(target, json!({"a": {"x": 1, "y": [9]}, "b": true, "c": null}));
    }

    #[test]
    fn non_object_partial_is_ignored() {
        let mut target = json!({"a": 1});
        assert!(!deep_merge(&mut target, &json!([1, 2])));
        assert!(!deep_merge(&mut target, &json!("oops")));
        assert_eq!(target, json!({"a": 1}));
    }

    #[test]
    fn object_replaces_scalar_branch() {
        let mut target = json!({"a": 5});
        deep_merge(&mut target, &json!({"a": {"b": 1}}));
        assert_eq!(target, json!({"a": {"b": 1}}));
    }

    #[test]
    fn diff_reports_leaf_paths_only() {
        let old = json!({"t": {"s": {"count": 200, "color": "#fff"}}, "debug": false});
        let new = json!({"t": {"s": {"count": 50, "color": "#fff"}}, "debug": false});
        let changes = diff(&old, &new);
        assert_eq!(changes.len(), 1);
        let c = &changes["t.s.count"];
        assert_eq!(c.from, Some(json!(200)));
        assert_eq!(c.to, Some(json!(50)));
    }

    #[test]
    fn diff_tracks_added_subtrees_and_removed_keys() {
        let old = json!({"a": 1});
        let new = json!({"b": {"c": 2}});
        let changes = diff(&old, &new);
        assert_eq!(changes["a"].to, None);
        assert_eq!(changes["b.c"].from, None);
        assert_eq!(changes["b.c"].to, Some(json!(2)));
    }

    #[test]
    fn diff_compares_arrays_by_value() {
        let old = json!({"a": [1, 2]});
        assert!(diff(&old, &json!({"a": [1, 2]})).is_empty());
        assert!(diff(&old, &json!({"a": [2, 1]})).contains_key("a"));
    }

    #[test]
    fn lookup_distinguishes_null_from_absent() {
        let root = json!({"a": {"b": null, "list": [10, 20]}});
        assert_eq!(lookup(&root, "a.b"), Some(&Value::Null));
        assert_eq!(lookup(&root, "a.c"), None);
        assert_eq!(lookup(&root, "a.b.c"), None);
        assert_eq!(lookup(&root, "a.list.1"), Some(&json!(20)));
        assert_eq!(lookup(&root, "a..b"), None);
        assert_eq!(lookup(&root, ""), Some(&root));
    }

    #[test]
    fn overlap_respects_segment_boundaries() {
        assert!(paths_overlap("themeConfigs", "themeConfigs.snowflakes.count"));
        assert!(paths_overlap("themeConfigs.snowflakes.count", "themeConfigs"));
        assert!(!paths_overlap("theme", "themeConfigs.snowflakes"));
        assert!(!paths_overlap("audioConfig", "themeConfigs"));
    }

    #[test]
    fn nest_builds_partial() {
        assert_eq!(nest("a.b", json!(3)), Some(json!({"a": {"b": 3}})));
        assert_eq!(nest("a..b", json!(3)), None);
    }
}
