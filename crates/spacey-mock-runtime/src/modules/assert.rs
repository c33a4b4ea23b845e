// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! `assert` module
//!
//! The export is itself callable (`assert(value)`) and carries the other
//! assertions as members.

use super::util::deep_equal;
use crate::error::{Result, RuntimeError};
use crate::value::{Function, Value};

/// Create the assert module exports
pub fn create_module() -> Value {
    let assert = Function::native("assert", ok);
    assert.set("ok", Value::Function(Function::native("ok", ok)));
    assert.set(
        "equal",
        Value::Function(Function::native("equal", |args| {
            compare(args, "==", |a, b| a == b)
        })),
    );
    assert.set(
        "notEqual",
        Value::Function(Function::native("notEqual", |args| {
            compare(args, "!=", |a, b| a != b)
        })),
    );
    assert.set(
        "deepEqual",
        Value::Function(Function::native("deepEqual", |args| {
            compare(args, "deepEqual", deep_equal)
        })),
    );
    assert.set(
        "fail",
        Value::Function(Function::native("fail", |args| {
            let message = args
                .first()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Failed".to_string());
            Err(RuntimeError::Assertion(message))
        })),
    );
    Value::Function(assert)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Undefined | Value::Null => false,
        Value::Boolean(b) => *b,
        Value::Number(n) => !n.is_nan() && *n != 0.0,
        Value::String(s) => !s.is_empty(),
        Value::Object(_) | Value::Function(_) => true,
    }
}

fn ok(args: &[Value]) -> Result<Value> {
    let value = args.first().cloned().unwrap_or_default();
    if truthy(&value) {
        return Ok(Value::Undefined);
    }
    let message = match args.get(1) {
        Some(m) => m.to_string(),
        None => format!("{} == true", value),
    };
    Err(RuntimeError::Assertion(message))
}

fn compare(args: &[Value], op: &str, check: fn(&Value, &Value) -> bool) -> Result<Value> {
    let actual = args.first().cloned().unwrap_or_default();
    let expected = args.get(1).cloned().unwrap_or_default();
    if check(&actual, &expected) {
        Ok(Value::Undefined)
    } else {
        Err(RuntimeError::Assertion(format!("{} {} {}", actual, op, expected)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str) -> Function {
        create_module().get(name).unwrap().as_function().unwrap().clone()
    }

    #[test]
    fn test_callable_export() {
        let assert = create_module();
        let f = assert.as_function().unwrap();
        assert!(f.call(&[Value::Boolean(true)]).is_ok());
        let err = f.call(&[Value::Number(0.0)]).unwrap_err();
        assert_eq!(err.to_string(), "AssertionError: 0 == true");
    }

    #[test]
    fn test_members() {
        assert!(member("equal").call(&[Value::Number(1.0), Value::Number(1.0)]).is_ok());
        assert!(member("notEqual").call(&[Value::Number(1.0), Value::Number(1.0)]).is_err());
        assert!(matches!(
            member("fail").call(&[Value::string("boom")]),
            Err(RuntimeError::Assertion(m)) if m == "boom"
        ));
    }
}
