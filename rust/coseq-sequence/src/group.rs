use std::hash::{Hash, Hasher};

use serde_json::Value;

use crate::sequence::Sequence;

/// One group produced by `group_by`: the key shared by the items and the
/// items themselves, in their original relative order.
pub struct Group<K, T> {
    pub key: K,
    pub items: Sequence<T>,
}

impl<K: Clone, T> Clone for Group<K, T> {
    fn clone(&self) -> Self {
        Group {
            key: self.key.clone(),
            items: self.items.clone(),
        }
    }
}

impl<K: std::fmt::Debug, T> std::fmt::Debug for Group<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("key", &self.key)
            .field("items", &self.items)
            .finish()
    }
}

/// Values found at the grouping key paths of one element.
///
/// `serde_json::Value` is not `Hash`, so the serialized form is hashed.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct CompositeKey(pub Vec<Value>);

impl Hash for CompositeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.len().hash(state);
        for value in &self.0 {
            value.to_string().hash(state);
        }
    }
}
