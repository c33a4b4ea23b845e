// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Automock generation
//!
//! An automock has the shape of the real exports: every callable own member
//! becomes a fresh mock function and every other member is the same value
//! (by reference) as in the real exports. Only the top level is rewritten.

use crate::value::{Function, Object, Value};

/// Decides whether a member is callable
pub type CallablePredicate = fn(&Value) -> bool;

/// Builds automocks from real exports
#[derive(Debug, Clone, Copy)]
pub struct AutoMocker {
    is_callable: CallablePredicate,
}

impl Default for AutoMocker {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoMocker {
    /// Automocker treating function values as callable
    pub fn new() -> Self {
        Self {
            is_callable: Value::is_function,
        }
    }

    /// Automocker with a custom callable test
    pub fn with_predicate(is_callable: CallablePredicate) -> Self {
        Self { is_callable }
    }

    /// Generate the automock of `exports`
    pub fn automock(&self, exports: &Value) -> Value {
        match exports {
            Value::Function(func) => {
                let mock = Function::mock(func.name());
                for (name, member) in func.entries() {
                    mock.set(name.clone(), self.mock_member(&name, &member));
                }
                Value::Function(mock)
            }
            Value::Object(obj) => {
                let mock = Object::new();
                for (name, member) in obj.entries() {
                    mock.set(name.clone(), self.mock_member(&name, &member));
                }
                Value::Object(mock)
            }
            primitive => primitive.clone(),
        }
    }

    fn mock_member(&self, name: &str, member: &Value) -> Value {
        if !(self.is_callable)(member) {
            return member.clone();
        }
        let name = member.as_function().map_or(name, Function::name);
        Value::Function(Function::mock(name))
    }
}
