use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

use crate::error::{ResolveError, ResolveResult};

/// Returns `$var` when set and non-empty, otherwise `default`.
pub fn tool_from_env(var: &str, default: &str) -> PathBuf {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Runs `program` in `working_dir` and returns its stdout, failing on a non-zero exit.
pub fn run_tool<I, S>(program: &Path, args: I, working_dir: &Path) -> ResolveResult<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = command(program)
        .args(args)
        .current_dir(working_dir)
        .output()
        .map_err(|source| ResolveError::Spawn {
            command: program.display().to_string(),
            source,
        })?;

    check_status(program, output)
}

fn check_status(program: &Path, output: Output) -> ResolveResult<String> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ResolveError::ToolFailed {
            command: program.display().to_string(),
            status: output.status.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    debug!(command = %program.display(), bytes = stdout.len(), "Tool finished");
    Ok(stdout)
}

fn command(program: &Path) -> Command {
    #[cfg(windows)]
    {
        let lower = program.to_string_lossy().to_ascii_lowercase();
        if lower.ends_with(".cmd") || lower.ends_with(".bat") {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(program);
            return cmd;
        }
    }

    Command::new(program)
}
