// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module path resolution

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::module_system::named::NamedModuleMap;
use crate::modules::{is_host_module, strip_scheme};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Canonical identity of a loadable module.
///
/// File-backed variants hold a canonical absolute path, and the variant is
/// derived from the extension alone, so the same file always yields the same
/// identity however it was requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleId {
    /// Host module (fs, path, events, etc.)
    Host(String),
    /// Script module
    File(PathBuf),
    /// JSON file
    Json(PathBuf),
    /// Native addon (.node file)
    Native(PathBuf),
}

impl ModuleId {
    /// Identity of the file at `path`, categorized by extension
    pub fn from_path(path: &Path) -> Self {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => ModuleId::Json(path),
            Some("node") => ModuleId::Native(path),
            _ => ModuleId::File(path),
        }
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            ModuleId::Host(_) => None,
            ModuleId::File(p) | ModuleId::Json(p) | ModuleId::Native(p) => Some(p),
        }
    }

    /// Returns true for host modules
    pub fn is_host(&self) -> bool {
        matches!(self, ModuleId::Host(_))
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleId::Host(name) => write!(f, "node:{}", name),
            ModuleId::File(p) | ModuleId::Json(p) | ModuleId::Native(p) => {
                write!(f, "{}", p.display())
            }
        }
    }
}

/// How a request string was interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// Host module name
    Host,
    /// Relative or absolute path
    Path,
    /// Self-declared module name
    Named(String),
    /// Package found through the module directories
    Package(String),
}

/// Result of module resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Canonical identity
    pub id: ModuleId,
    /// How the request was interpreted
    pub kind: RequestKind,
}

/// Module resolver implementing the Node.js resolution algorithm, extended
/// with self-declared module names
pub struct ModuleResolver {
    /// File extensions to try, without the dot
    extensions: Vec<String>,
    /// Directory names searched for packages
    module_directories: Vec<String>,
    /// Self-declared module names
    named: NamedModuleMap,
}

impl ModuleResolver {
    /// Create a resolver for `config` with a prebuilt named-module map
    pub fn new(config: &RuntimeConfig, named: NamedModuleMap) -> Self {
        Self {
            extensions: config
                .module_file_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect(),
            module_directories: config.module_directories.clone(),
            named,
        }
    }

    /// The named-module map
    pub fn named(&self) -> &NamedModuleMap {
        &self.named
    }

    /// Check if a request is a relative or absolute path
    pub fn is_path_request(request: &str) -> bool {
        request == "."
            || request == ".."
            || request.starts_with("./")
            || request.starts_with("../")
            || request.starts_with('/')
            || (cfg!(windows) && request.chars().nth(1) == Some(':'))
    }

    /// Resolve `request` as seen from the file `parent_path`
    pub fn resolve(&self, request: &str, parent_path: &Path) -> Result<Resolution> {
        if is_host_module(request) {
            return Ok(Resolution {
                id: ModuleId::Host(strip_scheme(request).to_string()),
                kind: RequestKind::Host,
            });
        }

        let resolution = if Self::is_path_request(request) {
            let parent_dir = parent_path.parent().unwrap_or(Path::new("."));
            self.resolve_path(&parent_dir.join(request))
                .map(|path| Resolution {
                    id: ModuleId::from_path(&path),
                    kind: RequestKind::Path,
                })
        } else if let Some(path) = self.named.get(request) {
            Some(Resolution {
                id: ModuleId::from_path(path),
                kind: RequestKind::Named(request.to_string()),
            })
        } else {
            self.resolve_package(request, parent_path)
                .map(|path| Resolution {
                    id: ModuleId::from_path(&path),
                    kind: RequestKind::Package(request.to_string()),
                })
        };

        match resolution {
            Some(resolution) => {
                debug!("Resolved '{}' from {} to {}", request, parent_path.display(), resolution.id);
                Ok(resolution)
            }
            None => Err(RuntimeError::module_not_found(request, parent_path)),
        }
    }

    /// Resolve a path as a file, then as a directory
    fn resolve_path(&self, path: &Path) -> Option<PathBuf> {
        self.resolve_file(path).or_else(|| self.resolve_directory(path))
    }

    /// Exact file, then the path with each extension appended
    fn resolve_file(&self, path: &Path) -> Option<PathBuf> {
        if path.is_file() {
            return Some(path.to_path_buf());
        }

        let file_name = path.file_name()?.to_string_lossy().to_string();
        self.extensions
            .iter()
            .map(|ext| path.with_file_name(format!("{}.{}", file_name, ext)))
            .find(|candidate| candidate.is_file())
    }

    /// package.json `main`, then `index` with each extension
    fn resolve_directory(&self, dir: &Path) -> Option<PathBuf> {
        if !dir.is_dir() {
            return None;
        }

        if let Some(main) = read_package_main(dir) {
            let main_path = dir.join(main);
            if let Some(found) = self
                .resolve_file(&main_path)
                .or_else(|| self.resolve_index(&main_path))
            {
                return Some(found);
            }
        }

        self.resolve_index(dir)
    }

    fn resolve_index(&self, dir: &Path) -> Option<PathBuf> {
        self.extensions
            .iter()
            .map(|ext| dir.join(format!("index.{}", ext)))
            .find(|candidate| candidate.is_file())
    }

    /// Walk up from the requester looking through the module directories
    fn resolve_package(&self, request: &str, parent_path: &Path) -> Option<PathBuf> {
        let mut current = parent_path.parent();
        while let Some(dir) = current {
            for module_dir in &self.module_directories {
                // Avoid node_modules/node_modules lookups
                if dir.file_name().is_some_and(|name| name == module_dir.as_str()) {
                    continue;
                }
                let candidate = dir.join(module_dir).join(request);
                if let Some(found) = self.resolve_path(&candidate) {
                    return Some(found);
                }
            }
            current = dir.parent();
        }
        None
    }
}

/// Minimal package.json structure for resolution
#[derive(Debug, Deserialize)]
struct PackageJson {
    main: Option<String>,
}

fn read_package_main(dir: &Path) -> Option<String> {
    let content = std::fs::read_to_string(dir.join("package.json")).ok()?;
    serde_json::from_str::<PackageJson>(&content).ok()?.main
}
