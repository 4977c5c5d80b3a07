//! Property store: current value of every animated property

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use af_core::Rgb;

use crate::value::Value;

/// Trait bound shared by every property key type
pub trait PropertyKey: Copy + Eq + Hash + Ord + Debug {}

impl<T: Copy + Eq + Hash + Ord + Debug> PropertyKey for T {}

/// Current values, keyed by property
#[derive(Debug, Clone)]
pub struct PropertyStore<K> {
    values: HashMap<K, Value>,
}

impl<K: PropertyKey> Default for PropertyStore<K> {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
        }
    }
}

impl<K: PropertyKey> PropertyStore<K> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, key: &K) -> Option<Value> {
        self.values.get(key).copied()
    }

    /// Scalar value, 0.0 when unset or not a scalar
    #[inline]
    pub fn scalar(&self, key: &K) -> f32 {
        self.get(key).and_then(|v| v.as_scalar()).unwrap_or(0.0)
    }

    #[inline]
    pub fn color(&self, key: &K) -> Option<Rgb> {
        self.get(key).and_then(|v| v.as_color())
    }

    #[inline]
    pub fn insert(&mut self, key: K, value: Value) {
        self.values.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values, sorted by key
    pub fn snapshot(&self) -> Vec<(K, Value)> {
        let mut out: Vec<(K, Value)> = self.values.iter().map(|(k, v)| (*k, *v)).collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}
