//! String-keyed hash table.
//!
//! Entries are bucketed by the key's precomputed hash; keys that collide are
//! told apart by comparing their full contents.

use super::value::{ObjString, Value, hash_string};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone)]
struct Entry {
    key: Rc<ObjString>,
    value: Value,
}

#[derive(Debug, Default, Clone)]
pub struct Table {
    buckets: HashMap<u32, Vec<Entry>>,
    count: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Insert or overwrite. Returns `true` if the key was not present before.
    pub fn set(&mut self, key: Rc<ObjString>, value: Value) -> bool {
        let bucket = self.buckets.entry(key.hash()).or_default();
        if let Some(entry) = bucket.iter_mut().find(|e| *e.key == *key) {
            entry.value = value;
            return false;
        }
        bucket.push(Entry { key, value });
        self.count += 1;
        true
    }

    pub fn get(&self, key: &ObjString) -> Option<Value> {
        self.buckets
            .get(&key.hash())?
            .iter()
            .find(|e| *e.key == *key)
            .map(|e| e.value.clone())
    }

    /// Returns `true` if an entry was removed.
    pub fn delete(&mut self, key: &ObjString) -> bool {
        let Some(bucket) = self.buckets.get_mut(&key.hash()) else {
            return false;
        };
        let Some(pos) = bucket.iter().position(|e| *e.key == *key) else {
            return false;
        };
        bucket.swap_remove(pos);
        if bucket.is_empty() {
            self.buckets.remove(&key.hash());
        }
        self.count -= 1;
        true
    }

    pub fn contains(&self, text: &str) -> bool {
        self.find_string(text, hash_string(text.as_bytes())).is_some()
    }

    /// Look up a key by raw text, without allocating an `ObjString` first.
    pub fn find_string(&self, text: &str, hash: u32) -> Option<Rc<ObjString>> {
        self.buckets
            .get(&hash)?
            .iter()
            .find(|e| e.key.as_str() == text)
            .map(|e| Rc::clone(&e.key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Rc<ObjString>, &Value)> {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.iter().map(|e| (&e.key, &e.value)))
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.count = 0;
    }
}
