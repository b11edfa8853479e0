/// Ordered, uniquely-keyed collection
///
/// Iteration follows insertion order; lookups go through the key.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct IdentifiedVec<K, V> {
    order: Vec<K>,
    entries: HashMap<K, V>,
}

impl<K, V> Default for IdentifiedVec<K, V> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> IdentifiedVec<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a sequence that may repeat keys.
    ///
    /// A repeated key keeps the position of its first occurrence and the
    /// value of its last occurrence.
    pub fn from_iter_last_wins<I, F>(items: I, key: F) -> Self
    where
        I: IntoIterator<Item = V>,
        F: Fn(&V) -> K,
    {
        let mut collection = Self::new();
        for item in items {
            collection.insert(key(&item), item);
        }
        collection
    }

    /// Insert or replace. A replaced value keeps its position.
    /// Returns the previous value for the key, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let previous = self.entries.insert(key.clone(), value);
        if previous.is_none() {
            self.order.push(key);
        }
        previous
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.order.iter().filter_map(|key| self.entries.get(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key).map(|value| (key, value)))
    }

    /// Consume into the bare key/value map, dropping the order
    pub fn into_map(self) -> HashMap<K, V> {
        self.entries
    }

    /// Consume into values, in order
    pub fn into_values(self) -> Vec<V> {
        let Self { order, mut entries } = self;
        order
            .into_iter()
            .filter_map(|key| entries.remove(&key))
            .collect()
    }
}
