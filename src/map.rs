//! Ordered map type for document objects.
//!
//! [`NodeMap`] wraps an [`IndexMap`] so object fields iterate in insertion order.
//! The mapper relies on this twice: the serialize engine inserts fields in plan order
//! and expects the codec to write them in that order, and the codec inserts decoded
//! fields in the order they were written.
//!
//! ## Examples
//!
//! ```rust
//! use serde_mapper::{Node, NodeMap};
//!
//! let mut map = NodeMap::new();
//! map.insert("version".to_string(), Node::from(1.2));
//! map.insert("id".to_string(), Node::from(1));
//!
//! let keys: Vec<_> = map.keys().cloned().collect();
//! assert_eq!(keys, vec!["version", "id"]);
//! ```

use crate::Node;
use indexmap::IndexMap;

/// An insertion-ordered map of string keys to document nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeMap(IndexMap<String, Node>);

impl NodeMap {
    #[must_use]
    pub fn new() -> Self {
        NodeMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        NodeMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, its value is replaced in place (the key
    /// keeps its original position) and the old value is returned.
    pub fn insert(&mut self, key: String, value: Node) -> Option<Node> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes `key`, keeping the relative order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the single entry of a one-key map.
    #[must_use]
    pub fn single_entry(&self) -> Option<(&String, &Node)> {
        if self.0.len() == 1 {
            self.0.first()
        } else {
            None
        }
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Node> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Node> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Node> {
        self.0.iter()
    }
}

impl IntoIterator for NodeMap {
    type Item = (String, Node);
    type IntoIter = indexmap::map::IntoIter<String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a NodeMap {
    type Item = (&'a String, &'a Node);
    type IntoIter = indexmap::map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Node)> for NodeMap {
    fn from_iter<T: IntoIterator<Item = (String, Node)>>(iter: T) -> Self {
        NodeMap(IndexMap::from_iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_keeps_order() {
        let mut map: NodeMap = [("a", 1), ("b", 2), ("c", 3)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), Node::from(v)))
            .collect();
        map.remove("b");
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_single_entry() {
        let mut map = NodeMap::new();
        assert!(map.single_entry().is_none());
        map.insert("User".to_string(), Node::Null);
        assert_eq!(map.single_entry().map(|(k, _)| k.as_str()), Some("User"));
        map.insert("other".to_string(), Node::Null);
        assert!(map.single_entry().is_none());
    }
}
