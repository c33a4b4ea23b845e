// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! `util` module

use crate::value::{Function, Value};

/// Create the util module exports
pub fn create_module() -> Value {
    Value::object_from([
        (
            "format",
            Value::Function(Function::native("format", |args| Ok(Value::String(format(args))))),
        ),
        (
            "inspect",
            Value::Function(Function::native("inspect", |args| {
                Ok(Value::String(inspect(args.first().unwrap_or(&Value::Undefined))))
            })),
        ),
        (
            "isDeepStrictEqual",
            Value::Function(Function::native("isDeepStrictEqual", |args| {
                let a = args.first().cloned().unwrap_or_default();
                let b = args.get(1).cloned().unwrap_or_default();
                Ok(Value::Boolean(deep_equal(&a, &b)))
            })),
        ),
    ])
}

/// util.format(fmt, ...args) with `%s`, `%d`, `%j` and `%%`
pub fn format(args: &[Value]) -> String {
    let Some(Value::String(fmt)) = args.first() else {
        return args.iter().map(inspect).collect::<Vec<_>>().join(" ");
    };

    let mut out = String::new();
    let mut rest = args[1..].iter();
    let mut chars = fmt.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some('s' | 'd' | 'j') => {
                chars.next();
                match rest.next() {
                    Some(Value::String(s)) => out.push_str(s),
                    Some(v) => out.push_str(&inspect(v)),
                    None => out.push_str("undefined"),
                }
            }
            _ => out.push('%'),
        }
    }
    for extra in rest {
        out.push(' ');
        out.push_str(&inspect(extra));
    }
    out
}

/// util.inspect(value), one level deep
pub fn inspect(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s),
        Value::Object(obj) => {
            let members: Vec<String> = obj
                .entries()
                .iter()
                .map(|(k, v)| match v {
                    Value::Object(_) => format!("{}: [Object]", k),
                    other => format!("{}: {}", k, inspect(other)),
                })
                .collect();
            if members.is_empty() {
                "{}".to_string()
            } else {
                format!("{{ {} }}", members.join(", "))
            }
        }
        other => other.to_string(),
    }
}

/// Structural equality over objects; functions compare by identity
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => {
            if x.ptr_eq(y) {
                return true;
            }
            let (xs, ys) = (x.entries(), y.entries());
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys.iter())
                    .all(|((ka, va), (kb, vb))| ka == kb && deep_equal(va, vb))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let args = [
            Value::string("%s has %d items (100%%)"),
            Value::string("cart"),
            Value::Number(3.0),
            Value::Boolean(true),
        ];
        assert_eq!(format(&args), "cart has 3 items (100%) true");
    }

    #[test]
    fn test_inspect_object() {
        let v = Value::object_from([("a", Value::Number(1.0)), ("b", Value::string("x"))]);
        assert_eq!(inspect(&v), "{ a: 1, b: 'x' }");
    }

    #[test]
    fn test_deep_equal() {
        let a = Value::object_from([("k", Value::object_from([("n", Value::Number(1.0))]))]);
        let b = Value::object_from([("k", Value::object_from([("n", Value::Number(1.0))]))]);
        assert!(deep_equal(&a, &b));
        b.get("k").unwrap().set("n", Value::Number(2.0));
        assert!(!deep_equal(&a, &b));
    }
}
