// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Mock-aware module runtime

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::module_system::loader::{into_exports, load_json, load_native};
use crate::module_system::{
    AutoMocker, CacheKey, CacheMode, ManualMockRegistry, ModuleCache, ModuleEvaluator, ModuleId,
    ModuleResolver, ModuleScope, NamedModuleMap, RequestKind, Resolution, ScanOptions,
};
use crate::modules;
use crate::value::Value;
use dashmap::DashMap;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Factory registered with [`Runtime::set_mock`]
pub type MockFactory = Arc<dyn Fn() -> Result<Value> + Send + Sync>;

/// File name of the virtual requester returned by [`Runtime::mock_root_path`]
const MOCK_ROOT_FILE: &str = "root.js";

/// Loads modules for one test file, substituting mocks on request.
///
/// A runtime owns its resolver, mock registry and module cache. Nothing is
/// shared between runtimes.
pub struct Runtime {
    /// Configuration, with a canonical root
    config: RuntimeConfig,
    /// Module resolver (owns the named-module map)
    resolver: ModuleResolver,
    /// Manual mocks found at construction
    mocks: ManualMockRegistry,
    /// Module cache
    cache: ModuleCache,
    /// Automock generator
    automocker: AutoMocker,
    /// Script evaluator
    evaluator: Arc<dyn ModuleEvaluator>,
    /// Registered mock factories
    explicit_mocks: DashMap<ModuleId, MockFactory>,
    /// Per-module overrides of the automock setting
    mock_overrides: DashMap<ModuleId, bool>,
    /// Compiled `unmocked_module_path_patterns`
    unmocked_patterns: Vec<Regex>,
    /// Virtual requester inside the root directory
    mock_root_path: PathBuf,
}

impl Runtime {
    /// Create a runtime, scanning the project roots on a blocking task.
    ///
    /// This is the one asynchronous step; every operation on the returned
    /// runtime is synchronous.
    pub async fn create(config: RuntimeConfig, evaluator: Arc<dyn ModuleEvaluator>) -> Result<Self> {
        tokio::task::spawn_blocking(move || Self::new(config, evaluator))
            .await
            .map_err(|e| RuntimeError::Setup(e.to_string()))?
    }

    /// Create a runtime, scanning the project roots on the current thread
    pub fn new(mut config: RuntimeConfig, evaluator: Arc<dyn ModuleEvaluator>) -> Result<Self> {
        config.validate()?;

        config.root_dir = canonical_dir(&config.root_dir)?;
        config.roots = config
            .scan_roots()
            .iter()
            .map(|root| canonical_dir(root))
            .collect::<Result<_>>()?;

        let ignore_patterns = config.ignore_patterns()?;
        let unmocked_patterns = config.unmocked_patterns()?;
        let options = ScanOptions {
            extensions: &config.module_file_extensions,
            mocks_directory: &config.mocks_directory,
            module_directories: &config.module_directories,
            ignore_patterns: &ignore_patterns,
        };

        let named = NamedModuleMap::build(&config.roots, options)?;
        let mocks = ManualMockRegistry::build(&config.roots, options)?;
        info!(
            "Runtime ready for {} ({} named modules, {} manual mocks)",
            config.root_dir.display(),
            named.len(),
            mocks.len()
        );

        let resolver = ModuleResolver::new(&config, named);
        let mock_root_path = config.root_dir.join(MOCK_ROOT_FILE);

        Ok(Self {
            config,
            resolver,
            mocks,
            cache: ModuleCache::new(),
            automocker: AutoMocker::new(),
            evaluator,
            explicit_mocks: DashMap::new(),
            mock_overrides: DashMap::new(),
            unmocked_patterns,
            mock_root_path,
        })
    }

    /// Replace the automock generator
    pub fn with_automocker(mut self, automocker: AutoMocker) -> Self {
        self.automocker = automocker;
        self
    }

    /// Base path to use as the requester for fixtures addressed from the
    /// project root
    pub fn mock_root_path(&self) -> &Path {
        &self.mock_root_path
    }

    /// The configuration, with canonical roots
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The module cache
    pub fn cache(&self) -> &ModuleCache {
        &self.cache
    }

    /// The manual mock registry
    pub fn mock_registry(&self) -> &ManualMockRegistry {
        &self.mocks
    }

    /// The named-module map
    pub fn named_modules(&self) -> &NamedModuleMap {
        self.resolver.named()
    }

    /// Resolve `request` from the file `from`.
    ///
    /// A bare name with no real module but a root-level manual mock resolves
    /// to the mock file itself.
    pub fn resolve(&self, from: &Path, request: &str) -> Result<Resolution> {
        match self.resolver.resolve(request, from) {
            Err(err) if err.is_not_found() && !ModuleResolver::is_path_request(request) => {
                match self.mocks.find_named(request) {
                    Some(mock) => {
                        debug!("'{}' only exists as a manual mock: {}", request, mock.display());
                        Ok(Resolution {
                            id: ModuleId::from_path(mock),
                            kind: RequestKind::Named(request.to_string()),
                        })
                    }
                    None => Err(err),
                }
            }
            other => other,
        }
    }

    /// Load the mock of a module.
    ///
    /// Uses, in order: a registered factory, the manual mock in scope, an
    /// automock of the real exports. The result is cached, so repeated
    /// requests return the same value.
    pub fn require_mock(&self, from: &Path, request: &str) -> Result<Value> {
        let resolution = self.resolve(from, request)?;
        self.mock_resolved(&resolution)
    }

    /// Load the real module
    pub fn require_module(&self, from: &Path, request: &str) -> Result<Value> {
        let resolution = self.resolve(from, request)?;
        self.load_actual(&resolution.id)
    }

    /// Load a module the way a module's own `require` does: mocked when
    /// registered or marked as mocked, or when automocking applies; real
    /// otherwise.
    ///
    /// A manual mock requiring the module it replaces gets the real module.
    pub fn require_module_or_mock(&self, from: &Path, request: &str) -> Result<Value> {
        let resolution = self.resolve(from, request)?;
        if self.should_mock(&resolution) && !self.is_manual_mock_of(from, &resolution) {
            self.mock_resolved(&resolution)
        } else {
            self.load_actual(&resolution.id)
        }
    }

    /// Register a factory producing the mock of a module.
    ///
    /// The factory runs lazily, once. Registering again replaces the factory
    /// and drops exports built by the previous one.
    pub fn set_mock<F>(&self, from: &Path, request: &str, factory: F) -> Result<()>
    where
        F: Fn() -> Result<Value> + Send + Sync + 'static,
    {
        let id = self.resolve(from, request)?.id;
        self.cache.delete(&CacheKey::new(id.clone(), CacheMode::Explicit));
        self.explicit_mocks.insert(id, Arc::new(factory));
        Ok(())
    }

    /// Make module-scope requires of a module return its mock
    pub fn mock(&self, from: &Path, request: &str) -> Result<()> {
        let id = self.resolve(from, request)?.id;
        self.mock_overrides.insert(id, true);
        Ok(())
    }

    /// Make module-scope requires of a module return the real module
    pub fn unmock(&self, from: &Path, request: &str) -> Result<()> {
        let id = self.resolve(from, request)?.id;
        self.mock_overrides.insert(id, false);
        Ok(())
    }

    /// Forget every loaded module and mock.
    ///
    /// Registered factories and mock/unmock markers are kept.
    pub fn reset_module_registry(&self) {
        debug!("Resetting module registry ({} entries)", self.cache.len());
        self.cache.clear();
    }

    fn is_manual_mock_of(&self, from: &Path, resolution: &Resolution) -> bool {
        !self.explicit_mocks.contains_key(&resolution.id)
            && self.mocks.find_mock(resolution).is_some_and(|mock| mock == from)
    }

    fn should_mock(&self, resolution: &Resolution) -> bool {
        let id = &resolution.id;
        if self.explicit_mocks.contains_key(id) {
            return true;
        }
        if let Some(flag) = self.mock_overrides.get(id) {
            return *flag;
        }
        // Root-level mocks of packages apply without opting in.
        if let RequestKind::Package(name) = &resolution.kind {
            if self.mocks.find_named(name).is_some() {
                return true;
            }
        }
        if !self.config.automock {
            return false;
        }
        match id.path() {
            Some(path) => {
                let path = path.to_string_lossy();
                !self.unmocked_patterns.iter().any(|re| re.is_match(&path))
            }
            None => true,
        }
    }

    fn mock_resolved(&self, resolution: &Resolution) -> Result<Value> {
        let id = &resolution.id;

        let factory = self.explicit_mocks.get(id).map(|entry| Arc::clone(entry.value()));
        if let Some(factory) = factory {
            return self
                .cache
                .get_or_try_insert_with(CacheKey::new(id.clone(), CacheMode::Explicit), || factory());
        }

        if let Some(mock_path) = self.mocks.find_mock(resolution) {
            let mock_id = ModuleId::from_path(mock_path);
            return self
                .cache
                .get_or_try_insert_with(CacheKey::new(id.clone(), CacheMode::Manual), || {
                    debug!("Using manual mock {} for {}", mock_id, id);
                    self.evaluate(&mock_id)
                });
        }

        self.cache
            .get_or_try_insert_with(CacheKey::new(id.clone(), CacheMode::Automock), || {
                debug!("Automocking {}", id);
                let actual = self.load_actual(id)?;
                Ok(self.automocker.automock(&actual))
            })
    }

    fn load_actual(&self, id: &ModuleId) -> Result<Value> {
        self.cache
            .get_or_try_insert_with(CacheKey::new(id.clone(), CacheMode::Actual), || self.evaluate(id))
    }

    /// Run a module and return its exports, bypassing the cache
    fn evaluate(&self, id: &ModuleId) -> Result<Value> {
        match id {
            ModuleId::Host(name) => modules::create_host_module(name).ok_or_else(|| {
                RuntimeError::module_not_found(name.as_str(), &self.mock_root_path)
            }),
            ModuleId::Json(path) => load_json(path),
            ModuleId::Native(path) => into_exports(path, load_native(path)),
            ModuleId::File(path) => {
                let scope = ModuleScope::new(self, path);
                let outcome = self.evaluator.evaluate(path, &scope)?;
                into_exports(path, outcome)
            }
        }
    }
}

fn canonical_dir(dir: &Path) -> Result<PathBuf> {
    let canonical = dir
        .canonicalize()
        .map_err(|_| RuntimeError::InvalidPath(dir.to_path_buf()))?;
    if !canonical.is_dir() {
        return Err(RuntimeError::InvalidPath(dir.to_path_buf()));
    }
    Ok(canonical)
}
