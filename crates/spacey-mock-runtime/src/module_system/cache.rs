// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module cache
//!
//! Exports are stored by `(identity, mode)` and handed out by reference, so
//! state mutated through one result is seen by every later request for the
//! same key.

use crate::error::{Result, RuntimeError};
use crate::module_system::resolver::ModuleId;
use crate::value::Value;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::trace;

/// Which flavour of a module an entry holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheMode {
    /// The real module
    Actual,
    /// Exports produced by a registered mock factory
    Explicit,
    /// A hand-written mock from a mock directory
    Manual,
    /// Generated from the real exports
    Automock,
}

/// Cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    /// Module identity
    pub id: ModuleId,
    /// Substitution mode
    pub mode: CacheMode,
}

impl CacheKey {
    /// Create a new key
    pub fn new(id: ModuleId, mode: CacheMode) -> Self {
        Self { id, mode }
    }
}

/// Module cache owned by one runtime
#[derive(Default)]
pub struct ModuleCache {
    /// Finished exports
    cache: DashMap<CacheKey, Value>,
    /// Keys whose factory is currently running
    loading: Mutex<Vec<CacheKey>>,
}

impl ModuleCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the stored value for `key`, or run `factory` and store its
    /// result.
    ///
    /// No lock is held while `factory` runs, so it may load other modules.
    /// Requesting `key` again from inside its own factory fails with
    /// [`RuntimeError::CircularDependency`]. Failed factories leave no entry.
    pub fn get_or_try_insert_with<F>(&self, key: CacheKey, factory: F) -> Result<Value>
    where
        F: FnOnce() -> Result<Value>,
    {
        if let Some(cached) = self.get(&key) {
            trace!("Cache hit for {} ({:?})", key.id, key.mode);
            return Ok(cached);
        }

        {
            let mut loading = self.loading.lock();
            if loading.contains(&key) {
                return Err(RuntimeError::CircularDependency(key.id.to_string()));
            }
            loading.push(key.clone());
        }

        trace!("Cache miss for {} ({:?})", key.id, key.mode);
        let result = factory();
        self.loading.lock().retain(|k| k != &key);

        let value = result?;
        let stored = self.cache.entry(key).or_insert(value).value().clone();
        Ok(stored)
    }

    /// Get a cached value
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        self.cache.get(key).map(|entry| entry.value().clone())
    }

    /// Check if a key is cached
    pub fn has(&self, key: &CacheKey) -> bool {
        self.cache.contains_key(key)
    }

    /// Store a value, replacing any previous one
    pub fn set(&self, key: CacheKey, value: Value) {
        self.cache.insert(key, value);
    }

    /// Remove an entry
    pub fn delete(&self, key: &CacheKey) -> Option<Value> {
        self.cache.remove(key).map(|(_, v)| v)
    }

    /// Clear the entire cache
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// All cached keys, sorted
    pub fn keys(&self) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self.cache.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::PathBuf;

    fn key(mode: CacheMode) -> CacheKey {
        CacheKey::new(ModuleId::File(PathBuf::from("/root/RegularModule.js")), mode)
    }

    #[test]
    fn test_factory_runs_once_per_key() {
        let cache = ModuleCache::new();
        let runs = Cell::new(0);
        let factory = || {
            runs.set(runs.get() + 1);
            Ok(Value::object())
        };

        let first = cache.get_or_try_insert_with(key(CacheMode::Automock), factory).unwrap();
        let second = cache.get_or_try_insert_with(key(CacheMode::Automock), factory).unwrap();
        assert_eq!(runs.get(), 1);
        assert!(first.same(&second));

        let other = cache.get_or_try_insert_with(key(CacheMode::Manual), factory).unwrap();
        assert_eq!(runs.get(), 2);
        assert!(!first.same(&other));
    }

    #[test]
    fn test_mutations_are_visible_on_later_reads() {
        let cache = ModuleCache::new();
        let exports = cache
            .get_or_try_insert_with(key(CacheMode::Actual), || Ok(Value::object()))
            .unwrap();
        exports.set("externalMutation", Value::string("test value"));

        let again = cache.get(&key(CacheMode::Actual)).unwrap();
        assert_eq!(again.get("externalMutation"), Some(Value::string("test value")));
    }

    #[test]
    fn test_failed_factory_leaves_no_entry() {
        let cache = ModuleCache::new();
        let err = cache
            .get_or_try_insert_with(key(CacheMode::Actual), || {
                Err(RuntimeError::Config("boom".to_string()))
            })
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Config(_)));
        assert!(!cache.has(&key(CacheMode::Actual)));

        // And the key is not stuck in the loading set.
        assert!(cache
            .get_or_try_insert_with(key(CacheMode::Actual), || Ok(Value::Null))
            .is_ok());
    }

    #[test]
    fn test_reentrant_request_is_circular() {
        let cache = ModuleCache::new();
        let err = cache
            .get_or_try_insert_with(key(CacheMode::Manual), || {
                cache.get_or_try_insert_with(key(CacheMode::Manual), || Ok(Value::Null))
            })
            .unwrap_err();
        assert!(matches!(err, RuntimeError::CircularDependency(_)));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_delete_and_clear() {
        let cache = ModuleCache::new();
        cache.set(key(CacheMode::Actual), Value::Null);
        cache.set(key(CacheMode::Automock), Value::Null);
        assert_eq!(cache.keys()[0].mode, CacheMode::Actual);
        assert!(cache.delete(&key(CacheMode::Actual)).is_some());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
