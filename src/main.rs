// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! spacey-mock CLI - inspect module resolution and manual mocks

use anyhow::Context;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use spacey_mock_runtime::{
    LoadOutcome, ModuleEvaluator, ModuleScope, RequestKind, Result, Runtime, RuntimeConfig,
    RuntimeError, VERSION,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "spacey-mock",
    about = "Inspect how modules resolve and which mocks replace them",
    version = VERSION,
    author = "Pegasus Heavy Industries"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Runtime configuration file (JSON)
    #[arg(short, long, global = true, conflicts_with = "root")]
    config: Option<PathBuf>,

    /// Project root (configuration is read from its package.json)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a request and show what requireMock would return
    Resolve {
        /// Requesting file
        from: PathBuf,
        /// Module request
        request: String,
    },
    /// List manual mocks
    Mocks,
    /// List modules declared with @providesModule
    Names,
}

/// Evaluator for a runtime that only resolves
struct ResolveOnly;

impl ModuleEvaluator for ResolveOnly {
    fn evaluate(&self, path: &Path, _scope: &ModuleScope<'_>) -> Result<LoadOutcome> {
        Err(RuntimeError::evaluation(
            path,
            "script evaluation is not available from the command line",
        ))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("spacey_mock=debug,spacey_mock_runtime=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("spacey_mock=warn,spacey_mock_runtime=warn")
            .init();
    }

    let config = load_config(cli.config.as_deref(), cli.root.as_deref())?;
    debug!("Using root {}", config.root_dir.display());

    let runtime = Runtime::create(config, Arc::new(ResolveOnly))
        .await
        .context("failed to scan project")?;

    match cli.command {
        Command::Resolve { from, request } => resolve(&runtime, &from, &request),
        Command::Mocks => {
            list_mocks(&runtime);
            Ok(())
        }
        Command::Names => {
            list_names(&runtime);
            Ok(())
        }
    }
}

fn load_config(config: Option<&Path>, root: Option<&Path>) -> anyhow::Result<RuntimeConfig> {
    if let Some(path) = config {
        return RuntimeConfig::from_file(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }

    let root = root.unwrap_or(Path::new("."));
    if root.join("package.json").is_file() {
        RuntimeConfig::from_package_json(root)
            .with_context(|| format!("failed to read {}/package.json", root.display()))
    } else {
        Ok(RuntimeConfig::new(root))
    }
}

fn resolve(runtime: &Runtime, from: &Path, request: &str) -> anyhow::Result<()> {
    let from = if from.is_absolute() {
        from.to_path_buf()
    } else {
        std::env::current_dir()?.join(from)
    };

    let resolution = match runtime.resolve(&from, request) {
        Ok(resolution) => resolution,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    };

    let kind = match &resolution.kind {
        RequestKind::Host => "host module",
        RequestKind::Path => "path",
        RequestKind::Named(_) => "named module",
        RequestKind::Package(_) => "package",
    };
    println!("{} {} ({})", "resolved".green().bold(), resolution.id, kind.dimmed());

    match runtime.mock_registry().find_mock(&resolution) {
        Some(mock) => println!("{} {}", "mock".cyan().bold(), mock.display()),
        None => println!("{} {}", "mock".cyan().bold(), "automock".yellow()),
    }
    Ok(())
}

fn list_mocks(runtime: &Runtime) {
    let registry = runtime.mock_registry();
    if registry.is_empty() {
        println!("{}", "No manual mocks found".dimmed());
        return;
    }

    for record in registry.records() {
        println!(
            "{} {} {}",
            record.name.cyan(),
            record.scope.display().dimmed(),
            record.path.display()
        );
    }

    let named = registry.named_entries();
    if !named.is_empty() {
        println!();
        println!("{}", "Root-level mocks by name:".bold());
        for (name, path) in named {
            println!("  {} {}", name.cyan(), path.display());
        }
    }
}

fn list_names(runtime: &Runtime) {
    let named = runtime.named_modules();
    if named.is_empty() {
        println!("{}", "No named modules found".dimmed());
        return;
    }

    for (name, path) in named.entries() {
        println!("{} {}", name.cyan(), path.display());
    }
}
