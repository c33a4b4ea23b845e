// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! `path` module

use super::string_arg;
use crate::value::{Function, Value};
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Create the path module exports
pub fn create_module() -> Value {
    Value::object_from([
        ("sep", Value::String(MAIN_SEPARATOR.to_string())),
        (
            "delimiter",
            Value::string(if cfg!(windows) { ";" } else { ":" }),
        ),
        (
            "basename",
            native("basename", |args| {
                let ext = args.get(1).and_then(Value::as_str);
                Value::String(basename(&string_arg(args, 0), ext))
            }),
        ),
        (
            "dirname",
            native("dirname", |args| Value::String(dirname(&string_arg(args, 0)))),
        ),
        (
            "extname",
            native("extname", |args| Value::String(extname(&string_arg(args, 0)))),
        ),
        (
            "isAbsolute",
            native("isAbsolute", |args| {
                Value::Boolean(Path::new(&string_arg(args, 0)).is_absolute())
            }),
        ),
        (
            "join",
            native("join", |args| {
                let parts: Vec<String> = (0..args.len()).map(|i| string_arg(args, i)).collect();
                let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
                Value::String(join(&parts))
            }),
        ),
        (
            "normalize",
            native("normalize", |args| Value::String(normalize(&string_arg(args, 0)))),
        ),
    ])
}

fn native(name: &'static str, func: fn(&[Value]) -> Value) -> Value {
    Value::Function(Function::native(name, move |args| Ok(func(args))))
}

/// path.basename(path, ext?)
pub fn basename(path: &str, ext: Option<&str>) -> String {
    let name = Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    match ext {
        Some(ext) if name.ends_with(ext) && name != ext => name[..name.len() - ext.len()].to_string(),
        _ => name,
    }
}

/// path.dirname(path)
pub fn dirname(path: &str) -> String {
    match Path::new(path).parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_string_lossy().to_string(),
        _ => ".".to_string(),
    }
}

/// path.extname(path)
pub fn extname(path: &str) -> String {
    Path::new(path)
        .extension()
        .map(|s| format!(".{}", s.to_string_lossy()))
        .unwrap_or_default()
}

/// path.join(...paths)
pub fn join(paths: &[&str]) -> String {
    let mut result = PathBuf::new();
    for p in paths {
        result.push(p.trim_start_matches('/'));
    }
    let joined = result.to_string_lossy().to_string();
    match paths.first() {
        Some(first) if first.starts_with('/') => normalize(&format!("/{}", joined)),
        _ => normalize(&joined),
    }
}

/// path.normalize(path)
pub fn normalize(path: &str) -> String {
    let mut components: Vec<&str> = Vec::new();
    let is_absolute = path.starts_with('/');

    for component in path.split(['/', '\\']) {
        match component {
            "" | "." => continue,
            ".." => {
                if !components.is_empty() && components.last() != Some(&"..") {
                    components.pop();
                } else if !is_absolute {
                    components.push("..");
                }
            }
            c => components.push(c),
        }
    }

    let joined = components.join("/");
    match (is_absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
