// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Self-declared module names
//!
//! A script file can give itself a global name with a pragma in its leading
//! docblock:
//!
//! ```text
//! /**
//!  * @providesModule RegularModule
//!  */
//! ```
//!
//! The map is built once per runtime by scanning the configured roots.

use crate::error::Result;
use rayon::prelude::*;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};
use walkdir::WalkDir;

static DOCBLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(/\*\*(?s:.*?)\*/)").expect("valid docblock regex"));

static PROVIDES_MODULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@providesModule\s+(\S+)").expect("valid pragma regex"));

/// Extensions never scanned for pragmas
const DATA_EXTENSIONS: &[&str] = &["json", "node"];

/// Map from declared module name to file
#[derive(Debug, Clone, Default)]
pub struct NamedModuleMap {
    modules: HashMap<String, PathBuf>,
}

/// Options controlling which files are scanned
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions<'a> {
    /// Extensions of files that may carry pragmas
    pub extensions: &'a [String],
    /// Reserved manual-mock directory name (skipped)
    pub mocks_directory: &'a str,
    /// Package directory names (skipped)
    pub module_directories: &'a [String],
    /// Paths matching any pattern are skipped
    pub ignore_patterns: &'a [Regex],
}

impl ScanOptions<'_> {
    /// Check whether a directory should not be descended into
    pub fn skips_dir(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        name == self.mocks_directory
            || self.module_directories.iter().any(|d| d == name)
            || self.is_ignored(path)
    }

    /// Check a path against the ignore patterns
    pub fn is_ignored(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.ignore_patterns.iter().any(|re| re.is_match(&path))
    }
}

impl NamedModuleMap {
    /// Scan `roots` for `@providesModule` pragmas
    pub fn build(roots: &[PathBuf], options: ScanOptions<'_>) -> Result<Self> {
        let mut candidates = Vec::new();
        for root in roots {
            let walker = WalkDir::new(root)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| !(entry.file_type().is_dir() && entry.depth() > 0 && options.skips_dir(entry.path())));

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        warn!("Skipping unreadable entry while scanning module names: {}", err);
                        continue;
                    }
                };
                if !entry.file_type().is_file() || options.is_ignored(entry.path()) {
                    continue;
                }
                let scannable = entry
                    .path()
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|ext| {
                        !DATA_EXTENSIONS.contains(&ext) && options.extensions.iter().any(|e| e == ext)
                    });
                if scannable {
                    candidates.push(entry.into_path());
                }
            }
        }

        // Reads run in parallel; insertion stays in walk order.
        let declared: Vec<(PathBuf, Option<String>)> = candidates
            .into_par_iter()
            .map(|path| {
                let name = match std::fs::read_to_string(&path) {
                    Ok(source) => parse_provides_module(&source),
                    Err(err) => {
                        warn!("Skipping {} while scanning module names: {}", path.display(), err);
                        None
                    }
                };
                (path, name)
            })
            .collect();

        let mut map = Self::default();
        for (path, name) in declared {
            if let Some(name) = name {
                let path = path.canonicalize().unwrap_or(path);
                map.insert(name, path);
            }
        }

        debug!("Indexed {} named modules", map.len());
        Ok(map)
    }

    /// Register a name. The first registration of a name wins.
    pub fn insert(&mut self, name: impl Into<String>, path: PathBuf) {
        let name = name.into();
        if let Some(existing) = self.modules.get(&name) {
            if existing != &path {
                warn!(
                    "Duplicate module name '{}': keeping {}, ignoring {}",
                    name,
                    existing.display(),
                    path.display()
                );
            }
            return;
        }
        self.modules.insert(name, path);
    }

    /// Look up a name
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.modules.get(name).map(PathBuf::as_path)
    }

    /// All entries, sorted by name
    pub fn entries(&self) -> Vec<(&str, &Path)> {
        let mut entries: Vec<_> = self
            .modules
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
            .collect();
        entries.sort();
        entries
    }

    /// Number of named modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if no names were found
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Extract the `@providesModule` name from a source's leading docblock
pub fn parse_provides_module(source: &str) -> Option<String> {
    let docblock = DOCBLOCK.captures(source)?.get(1)?.as_str();
    let name = PROVIDES_MODULE.captures(docblock)?.get(1)?.as_str();
    Some(name.to_string())
}
