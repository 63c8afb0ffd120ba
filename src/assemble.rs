//! Top-level assembly:
//!
//! `(GlobalShell or Aggregate(workspaces)) with Stdlib`, then `or Backup`.
//!
//! Workspace roots are scanned lazily, when the global script declines.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::cache::StorageHandle;
use crate::classify::{ResolverDescriptor, classify};
use crate::classpath::ClassPath;
use crate::diagnostics::DiagnosticSink;
use crate::error::ResolveResult;
use crate::resolver::{Backup, BoxedResolver, ClassPathResolver, ResolverExt, aggregate};
use crate::scan::workspace_files;
use crate::shell::ShellResolver;
use crate::stdlib::{STDLIB_ARTIFACT, StdlibResolver};

#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    /// User-wide classpath script; `None` or a missing file declines.
    pub global_script: Option<PathBuf>,
    pub stdlib_dirs: Vec<PathBuf>,
    /// What the terminal backup contributes; empty by default.
    pub backup: ClassPath,
}

/// Resolves one workspace root by scanning it for build descriptors.
pub struct WorkspaceResolver {
    root: PathBuf,
    storage: StorageHandle,
    sink: Arc<dyn DiagnosticSink>,
}

impl WorkspaceResolver {
    pub fn new(root: PathBuf, storage: StorageHandle, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            root,
            storage,
            sink,
        }
    }

    /// One descriptor per recognized build file under the root, sorted by path.
    pub fn discover(&self) -> Vec<ResolverDescriptor> {
        let mut descriptors: Vec<ResolverDescriptor> =
            workspace_files(&self.root, Arc::clone(&self.sink))
                .filter_map(|p| classify(&p))
                .collect();
        descriptors.sort_by(|a, b| a.path().cmp(b.path()));
        descriptors
    }
}

impl ClassPathResolver for WorkspaceResolver {
    fn resolver_type(&self) -> String {
        format!("Workspace({})", self.root.display())
    }

    fn classpath(&self) -> ResolveResult<ClassPath> {
        let descriptors = self.discover();
        info!(root = %self.root.display(), build_files = descriptors.len(), "Scanned workspace");
        aggregate(
            descriptors
                .into_iter()
                .map(|descriptor| descriptor.into_resolver(&self.storage)),
        )
        .classpath()
    }
}

pub fn default_classpath_resolver(
    workspace_roots: &[PathBuf],
    storage: StorageHandle,
    config: &ResolverConfig,
    sink: Arc<dyn DiagnosticSink>,
) -> BoxedResolver {
    let global = ShellResolver::global(
        config.global_script.as_deref(),
        workspace_roots.first().map(PathBuf::as_path),
    );
    let workspaces = aggregate(workspace_roots.iter().map(|root| {
        WorkspaceResolver::new(root.clone(), storage.clone(), Arc::clone(&sink)).boxed()
    }));
    let stdlib = StdlibResolver::new(STDLIB_ARTIFACT, config.stdlib_dirs.clone());

    global
        .or(workspaces)
        .with_extra(stdlib)
        .or(Backup::new(config.backup.clone()))
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::tests::RecordingSink;
    use std::fs;
    use std::path::Path;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "workspace_classpath_assemble_{}_{}_{}",
            std::process::id(),
            nanos,
            name
        ))
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn offline_config(base: &Path) -> ResolverConfig {
        ResolverConfig {
            global_script: Some(base.join("no-global-script")),
            stdlib_dirs: vec![base.join("no-stdlib")],
            backup: ClassPath::new(),
        }
    }

    #[test]
    fn gitignored_target_is_not_scanned_and_pom_is_maven() {
        let root = temp_dir("maven");
        touch(&root.join("pom.xml"));
        touch(&root.join("target/classes/com/example/App.class"));
        touch(&root.join("target/classes/META-INF/maven/pom.xml"));
        fs::write(root.join(".gitignore"), "target/\n").unwrap();

        let sink = Arc::new(RecordingSink::default());
        let resolver = WorkspaceResolver::new(root.clone(), None, sink.clone());

        assert_eq!(
            resolver.discover(),
            vec![ResolverDescriptor::Maven(root.join("pom.xml"))]
        );
        assert!(
            !sink
                .visited
                .lock()
                .unwrap()
                .iter()
                .any(|p| p.starts_with(root.join("target/classes")))
        );

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn every_build_file_in_a_shared_directory_is_classified() {
        let root = temp_dir("mixed");
        touch(&root.join("build.gradle"));
        touch(&root.join("pom.xml"));
        touch(&root.join("tools/build.gradle.kts"));

        let resolver = WorkspaceResolver::new(root.clone(), None, Arc::new(RecordingSink::default()));
        assert_eq!(
            resolver.discover(),
            vec![
                ResolverDescriptor::Gradle(root.join("build.gradle")),
                ResolverDescriptor::Maven(root.join("pom.xml")),
                ResolverDescriptor::Gradle(root.join("tools/build.gradle.kts")),
            ]
        );

        let _ = fs::remove_dir_all(root);
    }

    #[cfg(unix)]
    #[test]
    fn workspace_script_beside_failing_pom_still_contributes() {
        use std::os::unix::fs::PermissionsExt;

        let base = temp_dir("script_beside_pom");
        let root = base.join("ws");
        touch(&root.join("pom.xml"));
        // Present but not executable, so Maven fails.
        fs::write(root.join("mvnw"), "not executable").unwrap();
        let script = root.join("workspace-classpath");
        fs::write(&script, "#!/bin/sh\necho /deps/app.jar\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let workspace = WorkspaceResolver::new(root.clone(), None, Arc::new(RecordingSink::default()));
        assert_eq!(
            workspace.discover(),
            vec![
                ResolverDescriptor::Maven(root.join("pom.xml")),
                ResolverDescriptor::Shell(root.join("workspace-classpath")),
            ]
        );

        let resolver = default_classpath_resolver(
            &[root],
            None,
            &offline_config(&base),
            Arc::new(RecordingSink::default()),
        );
        let cp = resolver.classpath().unwrap();
        assert_eq!(
            cp.into_iter().map(|e| e.compiled_jar).collect::<Vec<_>>(),
            vec![PathBuf::from("/deps/app.jar")]
        );

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn empty_workspace_resolves_to_backup_default() {
        let base = temp_dir("empty");
        let root = base.join("ws");
        fs::create_dir_all(&root).unwrap();

        let resolver = default_classpath_resolver(
            &[root],
            None,
            &offline_config(&base),
            Arc::new(RecordingSink::default()),
        );
        assert_eq!(resolver.classpath().unwrap(), ClassPath::new());
        assert!(resolver.resolver_type().ends_with("or Backup"));

        let _ = fs::remove_dir_all(base);
    }

    #[cfg(unix)]
    #[test]
    fn failing_build_tools_still_yield_stdlib() {
        let base = temp_dir("stdlib");
        let root = base.join("ws");
        // A pom.xml with no working Maven anywhere: the Maven resolver fails.
        touch(&root.join("pom.xml"));
        fs::write(root.join("mvnw"), "not executable").unwrap();
        let stdlib_jar = base.join("stdlib/2.0.0/kotlin-stdlib-2.0.0.jar");
        touch(&stdlib_jar);

        let mut config = offline_config(&base);
        config.stdlib_dirs = vec![base.join("stdlib")];

        let resolver = default_classpath_resolver(
            &[root],
            None,
            &config,
            Arc::new(RecordingSink::default()),
        );
        let cp = resolver.classpath().unwrap();
        assert_eq!(
            cp.into_iter().map(|e| e.compiled_jar).collect::<Vec<_>>(),
            vec![stdlib_jar]
        );

        let _ = fs::remove_dir_all(base);
    }
}
