//! Path-addressed JSON tree used to edit dashboard metadata.
//!
//! The tree wraps a [`serde_json::Value`] (object, array, string, number, bool
//! or null). Objects keep their insertion order, so serializing a parsed tree
//! that was not modified reproduces its keys in the same order.
//!
//! Paths are slices of object keys. Every type mismatch along a path is
//! reported as a [`DecodeError`] instead of being coerced.

use crate::errors::DecodeError;
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq)]
pub struct Tree(Value);

impl Tree {
    /// An empty object.
    pub fn new() -> Self {
        Tree(Value::Object(Map::new()))
    }

    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        Ok(Tree(serde_json::from_str(text)?))
    }

    pub fn from_value(value: Value) -> Self {
        Tree(value)
    }

    pub fn serialize(&self) -> String {
        self.0.to_string()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        path.iter()
            .try_fold(&self.0, |node, key| node.as_object()?.get(*key))
    }

    /// Replaces the value at `path`, creating intermediate objects as needed.
    pub fn set(&mut self, path: &[&str], value: Value) -> Result<(), DecodeError> {
        let Some((last, parents)) = path.split_last() else {
            self.0 = value;
            return Ok(());
        };

        let mut node = &mut self.0;
        for (depth, key) in parents.iter().enumerate() {
            node = object_mut(node, &path[..depth])?
                .entry(key.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }

        object_mut(node, parents)?.insert(last.to_string(), value);
        Ok(())
    }

    /// Removes and returns the value at `path`. Missing paths are not an error.
    pub fn delete(&mut self, path: &[&str]) -> Option<Value> {
        let (last, parents) = path.split_last()?;
        let mut node = &mut self.0;
        for key in parents {
            node = node.as_object_mut()?.get_mut(*key)?;
        }
        node.as_object_mut()?.shift_remove(*last)
    }

    /// Places a fresh array of `len` nulls at `path`, replacing whatever was there.
    pub fn array_of_size(&mut self, len: usize, path: &[&str]) -> Result<(), DecodeError> {
        self.set(path, Value::Array(vec![Value::Null; len]))
    }

    /// Writes `value` into slot `index` of the array at `path`.
    pub fn set_index(&mut self, path: &[&str], index: usize, value: Value) -> Result<(), DecodeError> {
        let mut node = &mut self.0;
        for (depth, key) in path.iter().enumerate() {
            node = object_mut(node, &path[..depth])?
                .get_mut(*key)
                .ok_or_else(|| DecodeError::MissingPath {
                    path: display_path(&path[..=depth]),
                })?;
        }

        let slot = node
            .as_array_mut()
            .ok_or_else(|| unexpected(path, "array"))?
            .get_mut(index)
            .ok_or_else(|| DecodeError::IndexOutOfBounds {
                path: display_path(path),
                index,
            })?;
        *slot = value;
        Ok(())
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

fn object_mut<'a>(
    node: &'a mut Value,
    path: &[&str],
) -> Result<&'a mut Map<String, Value>, DecodeError> {
    node.as_object_mut()
        .ok_or_else(|| unexpected(path, "object"))
}

fn unexpected(path: &[&str], expected: &'static str) -> DecodeError {
    DecodeError::UnexpectedType {
        path: display_path(path),
        expected,
    }
}

pub(crate) fn display_path(path: &[&str]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_serialize_keeps_key_order() {
        let text = r#"{"z":1,"a":{"y":[1,2,3],"b":null},"m":"x"}"#;
        let tree = Tree::parse(text).unwrap();
        assert_eq!(tree.serialize(), text);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(Tree::parse("{not json"), Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_get() {
        let tree = Tree::from_value(json!({"a": {"b": {"c": 3}}, "list": [1]}));
        assert_eq!(tree.get(&["a", "b", "c"]), Some(&json!(3)));
        assert_eq!(tree.get(&["a", "missing"]), None);
        // Paths do not index into arrays
        assert_eq!(tree.get(&["list", "0"]), None);
        assert_eq!(tree.get(&[]), Some(tree.as_value()));
    }

    #[test]
    fn test_set_creates_intermediate_objects() {
        let mut tree = Tree::new();
        tree.set(&["a", "b"], json!("x")).unwrap();
        tree.set(&["a", "c"], json!(1)).unwrap();
        assert_eq!(tree.as_value(), &json!({"a": {"b": "x", "c": 1}}));
    }

    #[test]
    fn test_set_through_scalar_fails() {
        let mut tree = Tree::from_value(json!({"a": 5}));
        let err = tree.set(&["a", "b"], json!(1)).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnexpectedType { ref path, expected: "object" } if path == "a"
        ));
    }

    #[test]
    fn test_set_on_non_object_root_fails() {
        let mut tree = Tree::from_value(json!([1, 2]));
        assert!(matches!(
            tree.set(&["a"], json!(1)),
            Err(DecodeError::UnexpectedType { .. })
        ));
    }

    #[test]
    fn test_delete() {
        let mut tree = Tree::from_value(json!({"a": {"b": 1, "c": 2}}));
        assert_eq!(tree.delete(&["a", "b"]), Some(json!(1)));
        assert_eq!(tree.delete(&["a", "b"]), None);
        assert_eq!(tree.delete(&["x", "y"]), None);
        assert_eq!(tree.as_value(), &json!({"a": {"c": 2}}));
    }

    #[test]
    fn test_array_of_size_and_set_index() {
        let mut tree = Tree::from_value(json!({"keep": true, "items": ["stale", "stale", "stale"]}));
        tree.array_of_size(2, &["items"]).unwrap();
        tree.set_index(&["items"], 0, json!({"n": 0})).unwrap();
        tree.set_index(&["items"], 1, json!({"n": 1})).unwrap();
        assert_eq!(
            tree.as_value(),
            &json!({"keep": true, "items": [{"n": 0}, {"n": 1}]})
        );

        assert!(matches!(
            tree.set_index(&["items"], 2, json!(null)),
            Err(DecodeError::IndexOutOfBounds { index: 2, .. })
        ));
        assert!(matches!(
            tree.set_index(&["keep"], 0, json!(null)),
            Err(DecodeError::UnexpectedType { expected: "array", .. })
        ));
    }

    #[test]
    fn test_set_index_reports_the_failing_segment() {
        let mut tree = Tree::from_value(json!({"a": {"list": []}, "scalar": 1}));

        assert!(matches!(
            tree.set_index(&["a", "missing", "list"], 0, json!(null)),
            Err(DecodeError::MissingPath { ref path }) if path == "a.missing"
        ));
        assert!(matches!(
            tree.set_index(&["nope"], 0, json!(null)),
            Err(DecodeError::MissingPath { ref path }) if path == "nope"
        ));
        assert!(matches!(
            tree.set_index(&["scalar", "list"], 0, json!(null)),
            Err(DecodeError::UnexpectedType { ref path, expected: "object" }) if path == "scalar"
        ));
    }
}
