// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Shared object handles

use super::Value;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Own members of an object or function
pub type Properties = BTreeMap<String, Value>;

/// A shared, interior-mutable object.
#[derive(Clone, Default)]
pub struct Object {
    inner: Arc<RwLock<Properties>>,
}

impl Object {
    /// Create an empty object
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an own member
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.read().get(key).cloned()
    }

    /// Set an own member
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.inner.write().insert(key.into(), value);
    }

    /// Remove an own member
    pub fn delete(&self, key: &str) -> Option<Value> {
        self.inner.write().remove(key)
    }

    /// Check if an own member exists
    pub fn has(&self, key: &str) -> bool {
        self.inner.read().contains_key(key)
    }

    /// Own member names
    pub fn keys(&self) -> Vec<String> {
        self.inner.read().keys().cloned().collect()
    }

    /// Snapshot of the own members.
    ///
    /// The snapshot holds handles, so nested objects stay shared.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.inner
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Number of own members
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if the object has no members
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// True if both handles point at the same object
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Members are not printed: exports graphs may be cyclic.
        f.debug_struct("Object").field("keys", &self.keys()).finish()
    }
}
