use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

use crate::cache::{StorageHandle, cached_classpath, descriptor_fingerprint};
use crate::classify::ResolverDescriptor;
use crate::classpath::{ClassPath, ClassPathEntry};
use crate::error::{ResolveError, ResolveResult};
use crate::exec::{run_tool, tool_from_env};
use crate::resolver::ClassPathResolver;

pub const POM_FILE: &str = "pom.xml";
pub const MVN_ENV: &str = "WORKSPACE_CLASSPATH_MVN";

const SCOPES: &[&str] = &["compile", "provided", "runtime", "test", "system", "import"];

pub fn detect(path: &Path) -> Option<ResolverDescriptor> {
    (path.file_name()? == POM_FILE).then(|| ResolverDescriptor::Maven(path.to_path_buf()))
}

/// Resolves a `pom.xml` with `mvn dependency:list`.
pub struct MavenResolver {
    pom: PathBuf,
    storage: StorageHandle,
}

impl MavenResolver {
    pub fn new(pom: PathBuf, storage: StorageHandle) -> Self {
        Self { pom, storage }
    }

    fn run_maven(&self) -> ResolveResult<ClassPath> {
        let project_dir = self.pom.parent().unwrap_or(Path::new("."));
        let output_file = dependency_list_file();
        let mvn = maven_command(project_dir);

        info!(pom = %self.pom.display(), mvn = %mvn.display(), "Resolving Maven dependencies");
        let result = run_tool(
            &mvn,
            [
                "--batch-mode".to_string(),
                "-f".to_string(),
                self.pom.to_string_lossy().to_string(),
                "dependency:list".to_string(),
                "-DincludeScope=test".to_string(),
                "-DoutputAbsoluteArtifactFilename=true".to_string(),
                format!("-DoutputFile={}", output_file.display()),
            ],
            project_dir,
        )
        .and_then(|_| {
            std::fs::read_to_string(&output_file).map_err(|e| ResolveError::io(&output_file, e))
        });
        let _ = std::fs::remove_file(&output_file);

        Ok(parse_dependency_list(&result?))
    }
}

impl ClassPathResolver for MavenResolver {
    fn resolver_type(&self) -> String {
        format!("Maven({})", self.pom.display())
    }

    fn classpath(&self) -> ResolveResult<ClassPath> {
        let key = format!("maven::{}", self.pom.display());
        let fingerprint = descriptor_fingerprint(&self.pom);
        cached_classpath(&self.storage, &key, fingerprint.as_deref(), || self.run_maven())
    }
}

/// A `mvnw` wrapper beside the pom wins over `$WORKSPACE_CLASSPATH_MVN` and `mvn`.
fn maven_command(project_dir: &Path) -> PathBuf {
    let wrapper = project_dir.join(if cfg!(windows) { "mvnw.cmd" } else { "mvnw" });
    if wrapper.is_file() {
        return wrapper;
    }
    tool_from_env(MVN_ENV, "mvn")
}

fn dependency_list_file() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "workspace-classpath-mvn-{}-{}.txt",
        std::process::id(),
        nanos
    ))
}

/// Parses `dependency:list` output lines of the form
/// `group:artifact:type[:classifier]:version:scope:/abs/path.jar[ -- module name]`.
pub fn parse_dependency_list(content: &str) -> ClassPath {
    content
        .lines()
        .filter_map(parse_artifact_line)
        .map(ClassPathEntry::with_sibling_sources)
        .collect()
}

fn parse_artifact_line(line: &str) -> Option<PathBuf> {
    let line = line.trim();
    let line = line.split(" -- ").next().unwrap_or(line).trim();
    let parts: Vec<&str> = line.split(':').collect();
    if parts.len() < 6 {
        return None;
    }

    // The path may itself contain ':' (Windows drive letters), so locate the scope.
    let scope_idx = (4..parts.len() - 1).find(|&i| SCOPES.contains(&parts[i]))?;
    let path = parts[scope_idx + 1..].join(":");
    let path = path.trim();
    path.ends_with(".jar").then(|| PathBuf::from(path))
}
