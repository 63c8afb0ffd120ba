use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::classify::ResolverDescriptor;
use crate::classpath::{ClassPath, parse_path_list};
use crate::error::ResolveResult;
use crate::exec::run_tool;
use crate::resolver::{BoxedResolver, ClassPathResolver, Empty, ResolverExt};

pub const SCRIPT_NAME: &str = "workspace-classpath";

#[cfg(windows)]
pub const SCRIPT_FILES: &[&str] = &["workspace-classpath.bat", "workspace-classpath.cmd"];
#[cfg(not(windows))]
pub const SCRIPT_FILES: &[&str] = &["workspace-classpath"];

pub fn detect(path: &Path) -> Option<ResolverDescriptor> {
    let name = path.file_name()?.to_str()?;
    SCRIPT_FILES
        .contains(&name)
        .then(|| ResolverDescriptor::Shell(path.to_path_buf()))
}

/// Runs a user-provided script whose stdout is a path-list classpath.
pub struct ShellResolver {
    script: PathBuf,
    working_dir: PathBuf,
}

impl ShellResolver {
    /// A script found inside a workspace runs in its own directory.
    pub fn for_script(script: PathBuf) -> Self {
        let working_dir = script
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            script,
            working_dir,
        }
    }

    /// The user-wide script, run from the first workspace root.
    ///
    /// Declines (resolves to nothing) when no script is configured or it does not exist.
    pub fn global(script: Option<&Path>, workspace_root: Option<&Path>) -> BoxedResolver {
        let Some(script) = script.filter(|s| s.is_file()) else {
            debug!("No global classpath script configured");
            return Empty.boxed();
        };
        let working_dir = workspace_root
            .map(Path::to_path_buf)
            .or_else(|| script.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            script: script.to_path_buf(),
            working_dir,
        }
        .boxed()
    }
}

impl ClassPathResolver for ShellResolver {
    fn resolver_type(&self) -> String {
        format!("Shell({})", self.script.display())
    }

    fn classpath(&self) -> ResolveResult<ClassPath> {
        info!(script = %self.script.display(), "Running classpath script");
        let stdout = run_tool(&self.script, std::iter::empty::<&str>(), &self.working_dir)?;
        Ok(parse_path_list(&stdout))
    }
}

/// Candidate locations of the global script under `config_dir`.
pub fn global_script_candidates(config_dir: &Path) -> Vec<PathBuf> {
    let dir = config_dir.join(SCRIPT_NAME);
    if cfg!(windows) {
        vec![dir.join("classpath.bat"), dir.join("classpath.cmd")]
    } else {
        vec![dir.join("classpath")]
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "workspace_classpath_shell_{}_{}_{}",
            std::process::id(),
            nanos,
            name
        ))
    }

    fn write_script(path: &Path, body: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(path.parent().unwrap())?;
        std::fs::write(path, body)?;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
        Ok(())
    }

    #[test]
    fn detect_matches_script_name_only() {
        assert!(detect(Path::new("/ws/workspace-classpath")).is_some());
        assert!(detect(Path::new("/ws/workspace-classpath.sh")).is_none());
        assert!(detect(Path::new("/ws/build.sh")).is_none());
    }

    #[test]
    fn script_stdout_becomes_classpath() -> anyhow::Result<()> {
        let base = temp_dir("script");
        let script = base.join("workspace-classpath");
        write_script(&script, "#!/bin/sh\necho \"$(pwd -P)/lib/a.jar:/opt/b.jar\"\n")?;

        let cp = ShellResolver::for_script(script).classpath()?;
        let paths: Vec<PathBuf> = cp.into_iter().map(|e| e.compiled_jar).collect();
        assert_eq!(paths.len(), 2);
        assert!(paths.contains(&PathBuf::from("/opt/b.jar")));
        assert!(paths.iter().any(|p| p.ends_with("lib/a.jar")));

        let _ = std::fs::remove_dir_all(base);
        Ok(())
    }

    #[test]
    fn global_declines_without_script() {
        let missing = temp_dir("missing").join("classpath");
        let resolver = ShellResolver::global(Some(&missing), None);
        assert_eq!(resolver.resolver_type(), "[]");
        assert!(resolver.classpath().unwrap().is_empty());
        assert_eq!(ShellResolver::global(None, None).resolver_type(), "[]");
    }

    #[test]
    fn global_runs_in_workspace_root() -> anyhow::Result<()> {
        let base = temp_dir("global");
        let script = base.join("config/classpath");
        let root = base.join("ws");
        std::fs::create_dir_all(&root)?;
        write_script(&script, "#!/bin/sh\necho \"$(pwd -P)/global.jar\"\n")?;

        let cp = ShellResolver::global(Some(&script), Some(&root)).classpath()?;
        let jar = cp.into_iter().next().unwrap().compiled_jar;
        assert_eq!(
            std::fs::canonicalize(jar.parent().unwrap())?,
            std::fs::canonicalize(&root)?
        );

        let _ = std::fs::remove_dir_all(base);
        Ok(())
    }
}
