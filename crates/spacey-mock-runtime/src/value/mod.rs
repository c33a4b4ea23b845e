// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module exports values.
//!
//! Objects and functions are shared references: cloning a [`Value`] clones
//! the handle, not the contents, so a mutation made through one clone is seen
//! by every other holder. The module cache relies on this to hand out the
//! same exports on every request.

mod function;
mod object;

pub use function::{Function, MockState, NativeFn, MOCK_FUNCTION_MARKER};
pub use object::{Object, Properties};

use std::fmt;

/// A module exports value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// undefined
    #[default]
    Undefined,
    /// null
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number (IEEE 754 double)
    Number(f64),
    /// String
    String(String),
    /// Shared object reference
    Object(Object),
    /// Shared function reference
    Function(Function),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Value {
    /// Create an empty object value
    pub fn object() -> Self {
        Value::Object(Object::new())
    }

    /// Create an object value from `(name, value)` pairs
    pub fn object_from<I, K>(members: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let object = Object::new();
        for (key, value) in members {
            object.set(key, value);
        }
        Value::Object(object)
    }

    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Returns true if this value is undefined.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns true if this value is callable.
    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Returns true if this value is a recorder function produced by the
    /// automocker (or created with [`Function::mock`]).
    pub fn is_mock_function(&self) -> bool {
        matches!(self, Value::Function(f) if f.is_mock())
    }

    /// Borrow as an object handle
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Borrow as a function handle
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Borrow as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Read an own member of an object or function.
    ///
    /// Primitives have no members and yield `None`.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(obj) => obj.get(key),
            Value::Function(func) => func.get(key),
            _ => None,
        }
    }

    /// Write an own member of an object or function.
    ///
    /// Returns false (and does nothing) for primitives.
    pub fn set(&self, key: impl Into<String>, value: Value) -> bool {
        match self {
            Value::Object(obj) => {
                obj.set(key, value);
                true
            }
            Value::Function(func) => {
                func.set(key, value);
                true
            }
            _ => false,
        }
    }

    /// Own member names, sorted
    pub fn keys(&self) -> Vec<String> {
        match self {
            Value::Object(obj) => obj.keys(),
            Value::Function(func) => func.keys(),
            _ => Vec::new(),
        }
    }

    /// True if both values are the same reference (or equal primitives)
    pub fn same(&self, other: &Value) -> bool {
        self == other
    }

    /// Returns the type of this value as a string.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

/// Convert parsed JSON into an exports value.
///
/// Arrays become objects with index keys and a `length` member.
pub fn from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(arr) => {
            let obj = Object::new();
            for (i, v) in arr.iter().enumerate() {
                obj.set(i.to_string(), from_json(v));
            }
            obj.set("length", Value::Number(arr.len() as f64));
            Value::Object(obj)
        }
        serde_json::Value::Object(map) => {
            let obj = Object::new();
            for (k, v) in map {
                obj.set(k.clone(), from_json(v));
            }
            Value::Object(obj)
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Function(func) if func.is_mock() => {
                write!(f, "[Function: {} (mock)]", func.name())
            }
            Value::Function(func) => write!(f, "[Function: {}]", func.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_object() {
        let exports = Value::object();
        let alias = exports.clone();
        alias.set("externalMutation", Value::string("test value"));
        assert_eq!(
            exports.get("externalMutation"),
            Some(Value::string("test value"))
        );
        assert!(exports.same(&alias));
    }

    #[test]
    fn test_distinct_objects_are_not_equal() {
        assert_ne!(Value::object(), Value::object());
    }

    #[test]
    fn test_from_json() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"name": "x", "tags": ["a", "b"], "n": 3}"#).unwrap();
        let value = from_json(&json);
        assert_eq!(value.get("name"), Some(Value::string("x")));
        assert_eq!(value.get("n"), Some(Value::Number(3.0)));
        let tags = value.get("tags").unwrap();
        assert_eq!(tags.get("length"), Some(Value::Number(2.0)));
        assert_eq!(tags.get("1"), Some(Value::string("b")));
    }

    #[test]
    fn test_primitives_have_no_members() {
        let v = Value::Number(1.0);
        assert!(!v.set("x", Value::Null));
        assert!(v.get("x").is_none());
        assert!(v.keys().is_empty());
    }
}
