//! Glob ignore matcher built from a `.gitignore`-style file.
//!
//! Each usable line becomes `<root>/**/<pattern>`; the `.git` directory is
//! always appended and cannot be re-enabled by the file.

use globset::{GlobBuilder, GlobMatcher};
use std::path::Path;

use crate::diagnostics::{Diagnostic, DiagnosticSink};

pub const DEFAULT_IGNORED: &[&str] = &[".git"];

#[derive(Debug, Clone)]
pub struct IgnorePattern {
    pattern: String,
    matcher: GlobMatcher,
}

impl IgnorePattern {
    pub fn compile(root: &Path, pattern: &str) -> Result<Self, globset::Error> {
        let glob = GlobBuilder::new(&glob_for(root, pattern))
            .literal_separator(true)
            .build()?;
        Ok(Self {
            pattern: pattern.to_string(),
            matcher: glob.compile_matcher(),
        })
    }

    /// The line this pattern was built from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, path: &Path) -> bool {
        self.matcher.is_match(path)
    }
}

/// Reads `ignore_file` and compiles its patterns relative to `root`.
///
/// A missing or unreadable file yields only the defaults. Lines that are not
/// valid globs are reported to `sink` and dropped.
pub fn ignored_path_patterns(
    root: &Path,
    ignore_file: &Path,
    sink: &dyn DiagnosticSink,
) -> Vec<IgnorePattern> {
    let mut lines = match std::fs::read_to_string(ignore_file) {
        Ok(content) => pattern_lines(&content),
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                sink.report(Diagnostic::EntryUnreadable {
                    error: format!("{}: {err}", ignore_file.display()),
                });
            }
            Vec::new()
        }
    };
    lines.extend(DEFAULT_IGNORED.iter().map(|s| s.to_string()));

    lines
        .iter()
        .filter_map(|line| match IgnorePattern::compile(root, line) {
            Ok(pattern) => {
                sink.report(Diagnostic::PatternAdded {
                    pattern: line,
                    source: ignore_file,
                });
                Some(pattern)
            }
            Err(err) => {
                sink.report(Diagnostic::PatternRejected {
                    pattern: line,
                    source: ignore_file,
                    reason: err.to_string(),
                });
                None
            }
        })
        .collect()
}

/// Usable pattern lines: trimmed, comments and blanks dropped, one trailing `/` removed.
pub fn pattern_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.strip_suffix('/').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn glob_for(root: &Path, pattern: &str) -> String {
    let root = root.to_string_lossy();
    let root = globset::escape(root.trim_end_matches(['/', '\\']));
    // Leading slash anchors the pattern at the root instead of any depth.
    match pattern.strip_prefix('/') {
        Some(anchored) => format!("{root}/{anchored}"),
        None => format!("{root}/**/{pattern}"),
    }
}
