use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

use crate::assemble::ResolverConfig;
use crate::cli::Cli;
use crate::logging::{LoggingConfig, parse_level};
use crate::shell::global_script_candidates;
use crate::stdlib::StdlibResolver;

pub const STDLIB_DIRS_ENV: &str = "WORKSPACE_CLASSPATH_STDLIB_DIRS";
pub const LOG_ENV: &str = "WORKSPACE_CLASSPATH_LOG";

pub fn resolve_db_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(p) = cli.db.clone() {
        return Ok(p);
    }

    Ok(workspace_classpath_home()?.join("cache.lmdb"))
}

pub fn resolve_global_script(cli: &Cli) -> Option<PathBuf> {
    if let Some(p) = cli.global_script.clone() {
        return Some(p);
    }

    let config_dir = dirs::config_dir()?;
    global_script_candidates(&config_dir)
        .into_iter()
        .find(|p| p.is_file())
}

pub fn resolve_stdlib_dirs(cli: &Cli) -> Vec<PathBuf> {
    if !cli.stdlib_dirs.is_empty() {
        return cli.stdlib_dirs.clone();
    }

    if let Some(raw) = env::var_os(STDLIB_DIRS_ENV).filter(|v| !v.is_empty()) {
        return env::split_paths(&raw).collect();
    }

    StdlibResolver::default_search_dirs()
}

pub fn resolver_config(cli: &Cli) -> ResolverConfig {
    ResolverConfig {
        global_script: resolve_global_script(cli),
        stdlib_dirs: resolve_stdlib_dirs(cli),
        ..ResolverConfig::default()
    }
}

pub fn logging_config(cli: &Cli) -> LoggingConfig {
    let level = cli
        .log_level
        .clone()
        .or_else(|| env::var(LOG_ENV).ok())
        .map(|l| parse_level(&l))
        .unwrap_or(LoggingConfig::default().level);

    LoggingConfig {
        level,
        use_json: cli.log_json,
    }
}

/// Absolute, canonical workspace roots; the current directory when none are given.
pub fn resolve_roots(roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if roots.is_empty() {
        let cwd = env::current_dir().context("Failed to read current directory")?;
        return Ok(vec![canonical_root(&cwd)?]);
    }
    roots.iter().map(|r| canonical_root(r)).collect()
}

fn canonical_root(root: &Path) -> Result<PathBuf> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Workspace root does not exist: {}", root.display()))?;
    if !root.is_dir() {
        anyhow::bail!("Workspace root is not a directory: {}", root.display());
    }
    Ok(root)
}

fn workspace_classpath_home() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .or_else(dirs::cache_dir)
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow::anyhow!("Failed to resolve data directory"))?;
    Ok(base.join("workspace-classpath"))
}
