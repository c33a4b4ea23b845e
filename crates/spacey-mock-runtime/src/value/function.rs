// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Function values: native implementations and mock recorders

use super::{Properties, Value};
use crate::error::Result;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;

/// Member set on every mock function so harness code can recognise it
pub const MOCK_FUNCTION_MARKER: &str = "_isMockFunction";

/// A native (Rust) function body.
pub type NativeFn = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// Recorded state of a mock function
#[derive(Default)]
pub struct MockState {
    /// Arguments of every call, in order
    pub calls: Vec<Vec<Value>>,
    /// Value returned when no implementation is set
    pub return_value: Value,
    /// Optional implementation invoked after recording
    pub implementation: Option<NativeFn>,
}

impl fmt::Debug for MockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockState")
            .field("calls", &self.calls.len())
            .field("return_value", &self.return_value)
            .field("implementation", &self.implementation.is_some())
            .finish()
    }
}

enum Body {
    Native(NativeFn),
    Mock(Mutex<MockState>),
}

struct Inner {
    name: String,
    body: Body,
    properties: RwLock<Properties>,
}

/// A shared function handle. Functions carry their own members, like any
/// other object.
#[derive(Clone)]
pub struct Function {
    inner: Arc<Inner>,
}

impl Function {
    /// Create a native function
    pub fn native<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                body: Body::Native(Arc::new(func)),
                properties: RwLock::new(Properties::new()),
            }),
        }
    }

    /// Create a mock function that records calls and returns undefined
    pub fn mock(name: impl Into<String>) -> Self {
        let mut properties = Properties::new();
        properties.insert(MOCK_FUNCTION_MARKER.to_string(), Value::Boolean(true));
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                body: Body::Mock(Mutex::new(MockState::default())),
                properties: RwLock::new(properties),
            }),
        }
    }

    /// Function name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns true for mock functions
    pub fn is_mock(&self) -> bool {
        matches!(self.inner.body, Body::Mock(_))
    }

    /// Call the function.
    ///
    /// Mock functions record the arguments before running their
    /// implementation (if any).
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        match &self.inner.body {
            Body::Native(func) => func(args),
            Body::Mock(state) => {
                let implementation = {
                    let mut state = state.lock();
                    state.calls.push(args.to_vec());
                    match &state.implementation {
                        Some(implementation) => Arc::clone(implementation),
                        None => return Ok(state.return_value.clone()),
                    }
                };
                implementation(args)
            }
        }
    }

    /// Recorded calls (empty for native functions)
    pub fn calls(&self) -> Vec<Vec<Value>> {
        match &self.inner.body {
            Body::Mock(state) => state.lock().calls.clone(),
            Body::Native(_) => Vec::new(),
        }
    }

    /// Set the value a mock returns. No-op on native functions.
    pub fn mock_return_value(&self, value: Value) -> &Self {
        if let Body::Mock(state) = &self.inner.body {
            state.lock().return_value = value;
        }
        self
    }

    /// Give a mock an implementation. No-op on native functions.
    pub fn mock_implementation<F>(&self, func: F) -> &Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        if let Body::Mock(state) = &self.inner.body {
            state.lock().implementation = Some(Arc::new(func));
        }
        self
    }

    /// Forget recorded calls, keeping return value and implementation
    pub fn mock_clear(&self) {
        if let Body::Mock(state) = &self.inner.body {
            state.lock().calls.clear();
        }
    }

    /// Get an own member
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.properties.read().get(key).cloned()
    }

    /// Set an own member
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.inner.properties.write().insert(key.into(), value);
    }

    /// Own member names
    pub fn keys(&self) -> Vec<String> {
        self.inner.properties.read().keys().cloned().collect()
    }

    /// Snapshot of the own members
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.inner
            .properties
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// True if both handles point at the same function
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.body {
            Body::Native(_) => write!(f, "NativeFunction({})", self.inner.name),
            Body::Mock(_) => write!(f, "MockFunction({})", self.inner.name),
        }
    }
}
