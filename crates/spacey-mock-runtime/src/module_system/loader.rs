// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module evaluation boundary
//!
//! Script sources are evaluated by an external [`ModuleEvaluator`]. JSON
//! files and native addons are loaded here.

use crate::error::{Result, RuntimeError};
use crate::runtime::Runtime;
use crate::value::{self, Value};
use std::error::Error as _;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Outcome of loading a module
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// The module ran and produced exports
    Evaluated(Value),
    /// The module cannot be loaded or introspected; carries the loader's
    /// diagnostic unchanged
    Unloadable(String),
}

/// Evaluates script modules.
///
/// Implementations run the source at `path` and return its exports. Requires
/// made by the module go through `scope`, so that they are resolved and
/// mocked by the runtime that loads the module.
pub trait ModuleEvaluator: Send + Sync {
    /// Evaluate the module at `path`
    fn evaluate(&self, path: &Path, scope: &ModuleScope<'_>) -> Result<LoadOutcome>;
}

/// The view of the runtime a module gets while it is evaluated
pub struct ModuleScope<'a> {
    runtime: &'a Runtime,
    filename: PathBuf,
}

impl<'a> ModuleScope<'a> {
    /// Scope for the module at `filename`
    pub fn new(runtime: &'a Runtime, filename: &Path) -> Self {
        Self {
            runtime,
            filename: filename.to_path_buf(),
        }
    }

    /// `__filename`
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// `__dirname`
    pub fn dirname(&self) -> &Path {
        self.filename.parent().unwrap_or(Path::new("."))
    }

    /// `require(request)` as seen from this module
    pub fn require(&self, request: &str) -> Result<Value> {
        self.runtime.require_module_or_mock(&self.filename, request)
    }

    /// Always load the real module
    pub fn require_actual(&self, request: &str) -> Result<Value> {
        self.runtime.require_module(&self.filename, request)
    }

    /// Always load the mock
    pub fn require_mock(&self, request: &str) -> Result<Value> {
        self.runtime.require_mock(&self.filename, request)
    }

    /// The runtime loading this module
    pub fn runtime(&self) -> &'a Runtime {
        self.runtime
    }
}

/// Map an outcome to exports, turning `Unloadable` into
/// [`RuntimeError::NativeModuleLoad`]
pub fn into_exports(path: &Path, outcome: LoadOutcome) -> Result<Value> {
    match outcome {
        LoadOutcome::Evaluated(exports) => Ok(exports),
        LoadOutcome::Unloadable(message) => Err(RuntimeError::NativeModuleLoad {
            path: path.to_path_buf(),
            message,
        }),
    }
}

/// Load a JSON module
pub fn load_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    let json: serde_json::Value = serde_json::from_str(&content)?;
    Ok(value::from_json(&json))
}

/// Try to open a native addon with the platform loader.
///
/// Native exports cannot be introspected, so this never produces exports:
/// a load failure reports the loader's own message, and a successful load
/// reports that the module cannot be inspected.
pub fn load_native(path: &Path) -> LoadOutcome {
    debug!("Opening native module {}", path.display());

    // SAFETY: opening the library runs its initialisers. The file is the
    // module the caller asked for, exactly as a host `require` would run it.
    match unsafe { libloading::Library::new(path) } {
        Ok(library) => {
            drop(library);
            LoadOutcome::Unloadable(format!(
                "{}: native modules cannot be introspected",
                path.display()
            ))
        }
        Err(err) => {
            let message = match err.source() {
                Some(source) => format!("{}: {}", err, source),
                None => err.to_string(),
            };
            LoadOutcome::Unloadable(message)
        }
    }
}
