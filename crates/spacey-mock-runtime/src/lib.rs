// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # spacey-mock-runtime
//!
//! Mock-aware module loading for the Spacey test harness.
//!
//! A [`Runtime`] loads the modules of one test file and can substitute any of
//! them with a mock:
//!
//! - Manual mocks from `__mocks__` directories, scoped to their parent directory
//! - Automocks generated from the real exports (callables become recorders)
//! - Factories registered with [`Runtime::set_mock`]
//!
//! Modules are found by relative or absolute path, by self-declared
//! `@providesModule` name, through `node_modules`, or as host modules
//! (`fs`, `events`, ...).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spacey_mock_runtime::{Runtime, RuntimeConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = Runtime::create(RuntimeConfig::new("tests/root"), evaluator).await?;
//!     let root = runtime.mock_root_path().to_path_buf();
//!     let mocked = runtime.require_mock(&root, "RegularModule")?;
//!     assert!(mocked.get("getModuleStateValue").unwrap().is_mock_function());
//!     Ok(())
//! }
//! ```
//!
//! Script sources are run by a [`ModuleEvaluator`] supplied by the embedder;
//! JSON modules, native addons and host modules are loaded by the runtime.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod module_system;
pub mod modules;
pub mod runtime;
pub mod value;

// Re-exports
pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use module_system::{
    AutoMocker, CacheMode, LoadOutcome, ModuleEvaluator, ModuleId, ModuleScope, RequestKind,
    Resolution,
};
pub use runtime::{MockFactory, Runtime};
pub use value::{Function, Object, Value};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
