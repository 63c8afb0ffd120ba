use anyhow::Result;
use ignore::{DirEntry, Walk, WalkBuilder};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::ignore_rules::{IgnorePattern, ignored_path_patterns};

pub const IGNORE_FILE_NAME: &str = ".gitignore";

pub fn default_m2_repository() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Failed to resolve home directory"))?;
    Ok(home.join(".m2").join("repository"))
}

/// `.../<artifact>/<version>/<artifact>-<version>.jar` -> `<version>`
pub fn extract_version_from_maven_path(jar_path: &Path) -> Option<String> {
    jar_path
        .parent()
        .and_then(|p| p.file_name())
        .map(|s| s.to_string_lossy().to_string())
}

/// Lazy walk over the files of one workspace root.
///
/// Directories are tested against the ignore patterns before they are opened;
/// a matching directory is never read. The root itself is always entered.
/// Unreadable entries are reported to the sink and skipped.
pub struct WorkspaceScan {
    walk: Walk,
    sink: Arc<dyn DiagnosticSink>,
}

impl WorkspaceScan {
    pub fn new(root: &Path, patterns: Vec<IgnorePattern>, sink: Arc<dyn DiagnosticSink>) -> Self {
        let patterns: Arc<[IgnorePattern]> = patterns.into();
        let filter_sink = Arc::clone(&sink);

        let walk = WalkBuilder::new(root)
            .hidden(false)
            .parents(false)
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .follow_links(false)
            .filter_entry(move |entry| should_enter(entry, &patterns, filter_sink.as_ref()))
            .build();

        Self { walk, sink }
    }
}

impl Iterator for WorkspaceScan {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            match self.walk.next()? {
                Ok(entry) => {
                    if entry.file_type().is_some_and(|t| t.is_file()) {
                        return Some(entry.into_path());
                    }
                }
                Err(err) => self.sink.report(Diagnostic::EntryUnreadable {
                    error: err.to_string(),
                }),
            }
        }
    }
}

/// Scans `root` honouring `<root>/.gitignore` plus the built-in defaults.
pub fn workspace_files(root: &Path, sink: Arc<dyn DiagnosticSink>) -> WorkspaceScan {
    let patterns = ignored_path_patterns(root, &root.join(IGNORE_FILE_NAME), sink.as_ref());
    WorkspaceScan::new(root, patterns, sink)
}

// `ignore` never hands the walk root to `filter_entry`, so the root is always entered.
fn should_enter(entry: &DirEntry, patterns: &[IgnorePattern], sink: &dyn DiagnosticSink) -> bool {
    if !entry.file_type().is_some_and(|t| t.is_dir()) {
        return true;
    }

    let path = entry.path();
    sink.report(Diagnostic::DirectoryVisited { path });
    match patterns.iter().find(|p| p.is_match(path)) {
        Some(pattern) => {
            sink.report(Diagnostic::DirectoryPruned {
                path,
                pattern: pattern.pattern(),
            });
            false
        }
        None => true,
    }
}
