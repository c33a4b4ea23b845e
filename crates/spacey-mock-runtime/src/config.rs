// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Runtime configuration.
//!
//! Keys use the camelCase spelling of the harness configuration so a
//! `package.json` `"jest"` block can be read as-is.

use crate::error::{Result, RuntimeError};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default name of manual mock directories
pub const DEFAULT_MOCKS_DIRECTORY: &str = "__mocks__";

/// Configuration for a [`Runtime`](crate::Runtime).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Project root
    pub root_dir: PathBuf,

    /// Directories scanned for named modules and manual mocks.
    /// Empty means `[root_dir]`.
    pub roots: Vec<PathBuf>,

    /// Extensions tried, in order, when a request omits one
    pub module_file_extensions: Vec<String>,

    /// Directory names searched for packages (ancestor lookup)
    pub module_directories: Vec<String>,

    /// Reserved name of manual mock directories
    pub mocks_directory: String,

    /// Paths matching any of these are skipped when scanning
    pub module_path_ignore_patterns: Vec<String>,

    /// Mock every module required through a module scope
    pub automock: bool,

    /// Paths matching any of these are never automocked
    pub unmocked_module_path_patterns: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            roots: Vec::new(),
            module_file_extensions: vec!["js".to_string(), "json".to_string(), "node".to_string()],
            module_directories: vec!["node_modules".to_string()],
            mocks_directory: DEFAULT_MOCKS_DIRECTORY.to_string(),
            module_path_ignore_patterns: Vec::new(),
            automock: false,
            unmocked_module_path_patterns: Vec::new(),
        }
    }
}

/// Minimal package.json structure for configuration
#[derive(Debug, Deserialize)]
struct PackageJson {
    #[serde(default)]
    jest: Option<RuntimeConfig>,
}

impl RuntimeConfig {
    /// Create a configuration rooted at `root_dir`
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self::default().with_root_dir(root_dir)
    }

    /// Set the project root
    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = root_dir.into();
        self
    }

    /// Turn automocking of module-scope requires on or off
    pub fn with_automock(mut self, automock: bool) -> Self {
        self.automock = automock;
        self
    }

    /// Load configuration from a JSON file.
    ///
    /// Relative `rootDir` and `roots` are taken relative to the file's directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RuntimeConfig = serde_json::from_str(&content)?;
        let base = path.parent().unwrap_or(Path::new("."));
        Ok(config.rebased(base))
    }

    /// Load configuration from the `"jest"` key of `dir/package.json`.
    ///
    /// A missing key yields the defaults rooted at `dir`.
    pub fn from_package_json(dir: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(dir.join("package.json"))?;
        let pkg: PackageJson = serde_json::from_str(&content)?;
        match pkg.jest {
            Some(config) => Ok(config.rebased(dir)),
            None => Ok(Self::new(dir)),
        }
    }

    fn rebased(mut self, base: &Path) -> Self {
        if self.root_dir.is_relative() {
            self.root_dir = base.join(&self.root_dir);
        }
        for root in &mut self.roots {
            if root.is_relative() {
                *root = base.join(&*root);
            }
        }
        self
    }

    /// Scanned roots, defaulting to `[root_dir]`
    pub fn scan_roots(&self) -> Vec<PathBuf> {
        if self.roots.is_empty() {
            vec![self.root_dir.clone()]
        } else {
            self.roots.clone()
        }
    }

    /// Compile `module_path_ignore_patterns`
    pub fn ignore_patterns(&self) -> Result<Vec<Regex>> {
        compile_patterns(&self.module_path_ignore_patterns)
    }

    /// Compile `unmocked_module_path_patterns`
    pub fn unmocked_patterns(&self) -> Result<Vec<Regex>> {
        compile_patterns(&self.unmocked_module_path_patterns)
    }

    /// Check settings that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.mocks_directory.is_empty() || self.mocks_directory.contains(['/', '\\']) {
            return Err(RuntimeError::Config(format!(
                "mocksDirectory must be a plain directory name, got '{}'",
                self.mocks_directory
            )));
        }
        if self.module_file_extensions.is_empty() {
            return Err(RuntimeError::Config(
                "moduleFileExtensions must not be empty".to_string(),
            ));
        }
        self.ignore_patterns()?;
        self.unmocked_patterns()?;
        Ok(())
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(|e| RuntimeError::Config(format!("invalid pattern '{}': {}", p, e))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.module_file_extensions, vec!["js", "json", "node"]);
        assert_eq!(config.mocks_directory, "__mocks__");
        assert!(!config.automock);
        assert_eq!(config.scan_roots(), vec![PathBuf::from(".")]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spacey-mock.json");
        std::fs::write(
            &path,
            r#"{
                "rootDir": "src",
                "automock": true,
                "moduleFileExtensions": ["js", "mjs"],
                "unmockedModulePathPatterns": ["/vendor/"]
            }"#,
        )
        .unwrap();

        let config = RuntimeConfig::from_file(&path).unwrap();
        assert_eq!(config.root_dir, dir.path().join("src"));
        assert!(config.automock);
        assert_eq!(config.module_file_extensions, vec!["js", "mjs"]);
        assert_eq!(config.mocks_directory, "__mocks__");
        assert_eq!(config.unmocked_patterns().unwrap().len(), 1);
    }

    #[test]
    fn test_from_package_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"name": "app", "jest": {"roots": ["lib"], "modulePathIgnorePatterns": ["/build/"]}}"#,
        )
        .unwrap();

        let config = RuntimeConfig::from_package_json(dir.path()).unwrap();
        assert_eq!(config.scan_roots(), vec![dir.path().join("lib")]);
        assert_eq!(config.ignore_patterns().unwrap().len(), 1);
    }

    #[test]
    fn test_package_json_without_jest_key() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), r#"{"name": "app"}"#).unwrap();
        let config = RuntimeConfig::from_package_json(dir.path()).unwrap();
        assert_eq!(config.root_dir, dir.path());
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let mut config = RuntimeConfig::default();
        config.module_path_ignore_patterns.push("(".to_string());
        assert!(matches!(config.validate(), Err(RuntimeError::Config(_))));
    }

    #[test]
    fn test_mocks_directory_must_be_a_name() {
        let mut config = RuntimeConfig::default();
        config.mocks_directory = "a/__mocks__".to_string();
        assert!(config.validate().is_err());
    }
}
