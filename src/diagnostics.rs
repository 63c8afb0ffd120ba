//! Diagnostics sink injected into the ignore matcher and the workspace scanner.
//!
//! Neither component logs through process-wide state; callers hand them a
//! `DiagnosticSink`, normally `TracingSink`.

use std::path::Path;
use tracing::{debug, trace, warn};

#[derive(Debug)]
pub enum Diagnostic<'a> {
    PatternAdded {
        pattern: &'a str,
        source: &'a Path,
    },
    PatternRejected {
        pattern: &'a str,
        source: &'a Path,
        reason: String,
    },
    /// A directory was tested against the ignore patterns before descent.
    DirectoryVisited { path: &'a Path },
    DirectoryPruned { path: &'a Path, pattern: &'a str },
    EntryUnreadable { error: String },
}

pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic<'_>);
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic<'_>) {
        match diagnostic {
            Diagnostic::PatternAdded { pattern, source } => {
                debug!(pattern, source = %source.display(), "Adding ignore pattern");
            }
            Diagnostic::PatternRejected {
                pattern,
                source,
                reason,
            } => {
                warn!(pattern, source = %source.display(), reason = %reason, "Did not recognize ignore pattern");
            }
            Diagnostic::DirectoryVisited { path } => {
                trace!(path = %path.display(), "Entering directory");
            }
            Diagnostic::DirectoryPruned { path, pattern } => {
                debug!(path = %path.display(), pattern, "Skipping ignored directory");
            }
            Diagnostic::EntryUnreadable { error } => {
                warn!(error = %error, "Failed to read workspace entry, skipping");
            }
        }
    }
}
