use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A single compiled artifact on the classpath, optionally paired with its sources jar.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClassPathEntry {
    pub compiled_jar: PathBuf,
    pub source_jar: Option<PathBuf>,
}

impl ClassPathEntry {
    pub fn new(compiled_jar: impl Into<PathBuf>) -> Self {
        Self {
            compiled_jar: compiled_jar.into(),
            source_jar: None,
        }
    }

    pub fn with_sources(compiled_jar: impl Into<PathBuf>, source_jar: impl Into<PathBuf>) -> Self {
        Self {
            compiled_jar: compiled_jar.into(),
            source_jar: Some(source_jar.into()),
        }
    }

    /// Pairs a jar with a `<name>-sources.jar` sibling when one exists on disk.
    pub fn with_sibling_sources(compiled_jar: impl Into<PathBuf>) -> Self {
        let compiled_jar = compiled_jar.into();
        let source_jar = sibling_sources_jar(&compiled_jar).filter(|p| p.is_file());
        Self {
            compiled_jar,
            source_jar,
        }
    }
}

fn sibling_sources_jar(jar: &Path) -> Option<PathBuf> {
    if jar.extension().is_none_or(|e| e != "jar") {
        return None;
    }
    let stem = jar.file_stem()?.to_str()?;
    Some(jar.with_file_name(format!("{stem}-sources.jar")))
}

/// The resolved classpath. An empty set is a valid result, distinct from a failure.
pub type ClassPath = BTreeSet<ClassPathEntry>;

pub fn compiled_paths(classpath: &ClassPath) -> Vec<&Path> {
    classpath.iter().map(|e| e.compiled_jar.as_path()).collect()
}

/// Joins compiled paths with the platform path-list separator (`:` or `;`).
pub fn join_compiled(classpath: &ClassPath) -> String {
    std::env::join_paths(compiled_paths(classpath))
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|_| {
            compiled_paths(classpath)
                .iter()
                .map(|p| p.to_string_lossy())
                .collect::<Vec<_>>()
                .join(path_list_separator())
        })
}

pub fn path_list_separator() -> &'static str {
    if cfg!(windows) { ";" } else { ":" }
}

/// Parses a path-list string (as printed by shell classpath scripts) into entries.
pub fn parse_path_list(raw: &str) -> ClassPath {
    raw.trim()
        .split(path_list_separator())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ClassPathEntry::new)
        .collect()
}
