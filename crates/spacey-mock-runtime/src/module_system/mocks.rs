// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Manual mock registry
//!
//! Manual mocks live in reserved directories (`__mocks__` by default) next to
//! the modules they replace:
//!
//! ```text
//! subdir1/MyModule.js
//! subdir1/__mocks__/MyModule.js   <- mocks subdir1/MyModule.js only
//! subdir2/MyModule.js
//! subdir2/__mocks__/MyModule.js   <- mocks subdir2/MyModule.js only
//! __mocks__/fs.js                 <- root level: mocks by name
//! ```
//!
//! A mock file replaces the module with the same file name, extension
//! included, in the parent of its mock directory. Mock directories directly
//! under a root additionally mock named modules, packages and host modules by
//! name.

use crate::error::Result;
use crate::module_system::named::ScanOptions;
use crate::module_system::resolver::{ModuleId, RequestKind, Resolution};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A discovered manual mock
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MockRecord {
    /// Directory whose modules this mock applies to
    pub scope: PathBuf,
    /// File name of the module the mock replaces
    pub name: String,
    /// Mock source file
    pub path: PathBuf,
}

/// Index of manual mocks found under the configured roots
#[derive(Debug, Clone, Default)]
pub struct ManualMockRegistry {
    /// (scope directory, module file name) -> mock file
    scoped: HashMap<(PathBuf, String), PathBuf>,
    /// Name relative to a root-level mock directory -> mock file
    named: HashMap<String, PathBuf>,
}

impl ManualMockRegistry {
    /// Scan `roots` for manual mock directories.
    ///
    /// `roots` are expected to be canonical.
    pub fn build(roots: &[PathBuf], options: ScanOptions<'_>) -> Result<Self> {
        let mut registry = Self::default();

        for root in roots {
            let mut walker = WalkDir::new(root).sort_by_file_name().into_iter();
            while let Some(entry) = walker.next() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        warn!("Skipping unreadable entry while scanning manual mocks: {}", err);
                        continue;
                    }
                };
                if !entry.file_type().is_dir() || entry.depth() == 0 {
                    continue;
                }

                let path = entry.path();
                let is_mocks_dir = path
                    .file_name()
                    .is_some_and(|name| name == options.mocks_directory);

                if is_mocks_dir && !options.is_ignored(path) {
                    registry.index_mock_dir(path, entry.depth() == 1);
                    walker.skip_current_dir();
                } else if options.skips_dir(path) {
                    walker.skip_current_dir();
                }
            }
        }

        debug!(
            "Indexed {} scoped and {} root-level manual mocks",
            registry.scoped.len(),
            registry.named.len()
        );
        Ok(registry)
    }

    fn index_mock_dir(&mut self, mocks_dir: &Path, root_level: bool) {
        let scope = mocks_dir.parent().unwrap_or(mocks_dir).to_path_buf();

        let mut files: Vec<PathBuf> = match std::fs::read_dir(mocks_dir) {
            Ok(entries) => entries.filter_map(|entry| entry.ok().map(|e| e.path())).collect(),
            Err(err) => {
                warn!("Skipping unreadable mock directory {}: {}", mocks_dir.display(), err);
                return;
            }
        };
        files.sort();

        for file in files.into_iter().filter(|f| f.is_file()) {
            if let Some(name) = file_name(&file) {
                self.scoped
                    .entry((scope.clone(), name))
                    .or_insert_with(|| file.clone());
            }
        }

        if root_level {
            // Root-level mocks are also addressable by nested name (`@scope/pkg`).
            for entry in WalkDir::new(mocks_dir).min_depth(1).sort_by_file_name() {
                let Ok(entry) = entry else {
                    continue;
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                let Ok(relative) = entry.path().strip_prefix(mocks_dir) else {
                    continue;
                };
                let name = name_without_extension(relative);
                if let Some(existing) = self.named.get(&name) {
                    warn!(
                        "Duplicate manual mock for '{}': keeping {}, ignoring {}",
                        name,
                        existing.display(),
                        entry.path().display()
                    );
                    continue;
                }
                self.named.insert(name, entry.into_path());
            }
        }
    }

    /// Find the manual mock that applies to a resolved request.
    ///
    /// Named and package requests prefer a root-level mock of that name, then
    /// fall back to the mock next to the resolved file, so a file found by
    /// name and by path gets the same mock.
    pub fn find_mock(&self, resolution: &Resolution) -> Option<&Path> {
        match (&resolution.kind, &resolution.id) {
            (RequestKind::Named(name) | RequestKind::Package(name), id) => self
                .find_named(name)
                .or_else(|| self.find_scoped(id)),
            (RequestKind::Host, ModuleId::Host(name)) => self.find_named(name),
            (_, id) => self.find_scoped(id),
        }
    }

    /// Find the mock in the mock directory next to a file
    fn find_scoped(&self, id: &ModuleId) -> Option<&Path> {
        let path = id.path()?;
        let scope = path.parent()?.to_path_buf();
        let name = file_name(path)?;
        self.scoped.get(&(scope, name)).map(PathBuf::as_path)
    }

    /// Find a root-level mock by module name
    pub fn find_named(&self, name: &str) -> Option<&Path> {
        self.named.get(name).map(PathBuf::as_path)
    }

    /// Every scoped mock, sorted
    pub fn records(&self) -> Vec<MockRecord> {
        let mut records: Vec<MockRecord> = self
            .scoped
            .iter()
            .map(|((scope, name), path)| MockRecord {
                scope: scope.clone(),
                name: name.clone(),
                path: path.clone(),
            })
            .collect();
        records.sort();
        records
    }

    /// Every root-level mock name, sorted
    pub fn named_entries(&self) -> Vec<(&str, &Path)> {
        let mut entries: Vec<_> = self
            .named
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
            .collect();
        entries.sort();
        entries
    }

    /// Number of scoped mocks
    pub fn len(&self) -> usize {
        self.scoped.len()
    }

    /// Check if no mocks were found
    pub fn is_empty(&self) -> bool {
        self.scoped.is_empty() && self.named.is_empty()
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|s| s.to_string_lossy().to_string())
}

/// File name up to the last extension
fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().to_string())
}

/// `a/b/c.js` -> `a/b/c`, always with forward slashes
fn name_without_extension(relative: &Path) -> String {
    let parent: Vec<String> = relative
        .parent()
        .map(|p| {
            p.components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default();
    let mut parts = parent;
    if let Some(stem) = file_stem(relative) {
        parts.push(stem);
    }
    parts.join("/")
}
