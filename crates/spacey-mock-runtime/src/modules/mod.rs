// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Host (core) modules
//!
//! Host modules are resolved by name alone. Their real exports are built
//! here so they can be returned as-is or automocked like any user module.

pub mod assert;
pub mod events;
pub mod fs;
pub mod os;
pub mod path;
pub mod util;

use crate::value::Value;

/// Names of all host modules
pub const HOST_MODULES: &[&str] = &[
    "assert",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "https",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "worker_threads",
    "zlib",
];

/// Strip the `node:` scheme from a request
pub fn strip_scheme(name: &str) -> &str {
    name.strip_prefix("node:").unwrap_or(name)
}

/// Check if a request names a host module
pub fn is_host_module(name: &str) -> bool {
    HOST_MODULES.contains(&strip_scheme(name))
}

/// Build the real exports of a host module.
///
/// Every call builds fresh values, so two runtimes never share host exports.
/// Modules without a dedicated shape export an empty object.
pub fn create_host_module(name: &str) -> Option<Value> {
    let name = strip_scheme(name);
    if !is_host_module(name) {
        return None;
    }

    let exports = match name {
        "assert" => assert::create_module(),
        "events" => events::create_module(),
        "fs" => fs::create_module(),
        "os" => os::create_module(),
        "path" => path::create_module(),
        "util" | "sys" => util::create_module(),
        _ => Value::object(),
    };
    Some(exports)
}

/// Read argument `index` as a string (`undefined` when missing)
pub(crate) fn string_arg(args: &[Value], index: usize) -> String {
    match args.get(index) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "undefined".to_string(),
    }
}
