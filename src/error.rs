use std::path::PathBuf;
use thiserror::Error;

/// Why a single resolver could not produce a classpath.
///
/// These never cross a composition boundary: `FirstNonEmpty`, `Aggregate` and
/// `WithExtra` turn them into "contributed nothing" and log them.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to execute {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}: {stderr}")]
    ToolFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unrecognized output from {tool}: {message}")]
    Output { tool: &'static str, message: String },

    #[error("standard library jar not found in {searched} location(s)")]
    StdlibNotFound { searched: usize },

    #[error("both sources failed: {first}; {second}")]
    BothFailed {
        first: Box<ResolveError>,
        second: Box<ResolveError>,
    },

    #[error("all {} classpath sources failed", errors.len())]
    AllFailed { errors: Vec<ResolveError> },
}

impl ResolveError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type ResolveResult<T> = std::result::Result<T, ResolveError>;
