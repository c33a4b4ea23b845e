// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! `os` module

use crate::value::{Function, Value};

/// Create the os module exports
pub fn create_module() -> Value {
    Value::object_from([
        ("EOL", Value::string(if cfg!(windows) { "\r\n" } else { "\n" })),
        ("platform", constant("platform", platform())),
        ("arch", constant("arch", arch())),
        ("tmpdir", constant("tmpdir", tmpdir())),
        ("homedir", constant("homedir", homedir())),
    ])
}

/// A function that always returns `value`
fn constant(name: &str, value: String) -> Value {
    Value::Function(Function::native(name, move |_| Ok(Value::String(value.clone()))))
}

/// os.arch()
pub fn arch() -> String {
    match std::env::consts::ARCH {
        "x86_64" => "x64",
        "x86" => "ia32",
        "aarch64" => "arm64",
        other => other,
    }
    .to_string()
}

/// os.platform()
pub fn platform() -> String {
    match std::env::consts::OS {
        "windows" => "win32",
        "macos" => "darwin",
        other => other,
    }
    .to_string()
}

/// os.tmpdir()
pub fn tmpdir() -> String {
    std::env::temp_dir().to_string_lossy().to_string()
}

/// os.homedir()
pub fn homedir() -> String {
    dirs::home_dir()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(tmpdir)
}
