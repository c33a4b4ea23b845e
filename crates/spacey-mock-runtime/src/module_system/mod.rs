// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module resolution, mock discovery and caching
//!
//! ## Resolution
//! - Host modules by name (`fs`, `node:events`)
//! - Relative and absolute paths with extension inference and directory indexes
//! - Self-declared names (`@providesModule`)
//! - Packages through `node_modules`
//!
//! ## Substitution
//! - Manual mocks from `__mocks__` directories
//! - Automocks generated from the real exports

pub mod automock;
mod cache;
pub mod loader;
mod mocks;
mod named;
mod resolver;

pub use automock::{AutoMocker, CallablePredicate};
pub use cache::{CacheKey, CacheMode, ModuleCache};
pub use loader::{LoadOutcome, ModuleEvaluator, ModuleScope};
pub use mocks::{ManualMockRegistry, MockRecord};
pub use named::{NamedModuleMap, ScanOptions, parse_provides_module};
pub use resolver::{ModuleId, ModuleResolver, RequestKind, Resolution};
