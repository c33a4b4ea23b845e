// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the mock runtime

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for mock runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors that can occur while resolving, loading or mocking modules
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// No module matched the request
    #[error("Cannot find module '{request}' from '{}'", .from.display())]
    ModuleNotFound {
        /// Request string as written by the caller
        request: String,
        /// Requesting file
        from: PathBuf,
    },

    /// A precompiled native module could not be loaded or introspected.
    ///
    /// The message is the platform loader's diagnostic, unchanged.
    #[error("{message}")]
    NativeModuleLoad {
        /// Path of the native module
        path: PathBuf,
        /// Loader diagnostic
        message: String,
    },

    /// The module evaluator reported a failure
    #[error("Error evaluating '{}': {message}", .path.display())]
    Evaluation {
        /// Module being evaluated
        path: PathBuf,
        /// Failure reported by the evaluator
        message: String,
    },

    /// A module was requested again while it was still being constructed
    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    /// File system error
    #[error("File system error: {0}")]
    Fs(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Assertion raised by the host `assert` module
    #[error("AssertionError: {0}")]
    Assertion(String),

    /// The one-time runtime setup task failed
    #[error("Runtime setup failed: {0}")]
    Setup(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Path error
    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),
}

impl RuntimeError {
    /// Create a module not found error
    pub fn module_not_found(request: impl Into<String>, from: &Path) -> Self {
        Self::ModuleNotFound {
            request: request.into(),
            from: from.to_path_buf(),
        }
    }

    /// Create an evaluation error for `path`
    pub fn evaluation(path: &Path, message: impl Into<String>) -> Self {
        Self::Evaluation {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Returns true if this is a module-not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ModuleNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_load_message_is_verbatim() {
        let err = RuntimeError::NativeModuleLoad {
            path: PathBuf::from("/x/NativeModule.node"),
            message: "/x/NativeModule.node: file too short".to_string(),
        };
        assert_eq!(err.to_string(), "/x/NativeModule.node: file too short");
    }

    #[test]
    fn test_not_found_message() {
        let err = RuntimeError::module_not_found("DoesntExist", Path::new("/root/root.js"));
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Cannot find module 'DoesntExist' from '/root/root.js'"
        );
    }
}
