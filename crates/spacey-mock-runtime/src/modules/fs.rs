// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! `fs` module - synchronous subset

use super::string_arg;
use crate::value::{Function, Object, Value};

/// Create the fs module exports
pub fn create_module() -> Value {
    // File access constants
    let constants = Value::object_from([
        ("F_OK", Value::Number(0.0)),
        ("R_OK", Value::Number(4.0)),
        ("W_OK", Value::Number(2.0)),
        ("X_OK", Value::Number(1.0)),
    ]);

    Value::object_from([
        ("constants", constants),
        (
            "existsSync",
            Value::Function(Function::native("existsSync", |args| {
                Ok(Value::Boolean(std::path::Path::new(&string_arg(args, 0)).exists()))
            })),
        ),
        (
            "readFileSync",
            Value::Function(Function::native("readFileSync", |args| {
                Ok(Value::String(std::fs::read_to_string(string_arg(args, 0))?))
            })),
        ),
        (
            "writeFileSync",
            Value::Function(Function::native("writeFileSync", |args| {
                std::fs::write(string_arg(args, 0), string_arg(args, 1))?;
                Ok(Value::Undefined)
            })),
        ),
        (
            "mkdirSync",
            Value::Function(Function::native("mkdirSync", |args| {
                std::fs::create_dir_all(string_arg(args, 0))?;
                Ok(Value::Undefined)
            })),
        ),
        (
            "readdirSync",
            Value::Function(Function::native("readdirSync", |args| {
                let mut names = std::fs::read_dir(string_arg(args, 0))?
                    .map(|entry| entry.map(|e| e.file_name().to_string_lossy().to_string()))
                    .collect::<std::io::Result<Vec<_>>>()?;
                names.sort();
                let list = Object::new();
                list.set("length", Value::Number(names.len() as f64));
                for (i, name) in names.into_iter().enumerate() {
                    list.set(i.to_string(), Value::String(name));
                }
                Ok(Value::Object(list))
            })),
        ),
    ])
}
