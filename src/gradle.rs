use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

use crate::cache::{StorageHandle, cached_classpath, descriptor_fingerprint};
use crate::classify::ResolverDescriptor;
use crate::classpath::{ClassPath, ClassPathEntry};
use crate::error::{ResolveError, ResolveResult};
use crate::exec::{run_tool, tool_from_env};
use crate::resolver::ClassPathResolver;

pub const BUILD_FILES: &[&str] = &["build.gradle", "build.gradle.kts"];
pub const GRADLE_ENV: &str = "WORKSPACE_CLASSPATH_GRADLE";

const TASK_NAME: &str = "workspaceClasspathPrint";
const LINE_PREFIX: &str = "workspace-classpath ";

const INIT_SCRIPT: &str = r#"
allprojects { project ->
    afterEvaluate {
        project.tasks.register('workspaceClasspathPrint') {
            doLast {
                ['compileClasspath', 'testCompileClasspath', 'runtimeClasspath'].each { name ->
                    def conf = project.configurations.findByName(name)
                    if (conf != null && conf.canBeResolved) {
                        conf.resolve().each { file ->
                            println "workspace-classpath ${file.absolutePath}"
                        }
                    }
                }
                def sourceSets = project.extensions.findByName('sourceSets')
                if (sourceSets != null) {
                    sourceSets.each { set ->
                        set.output.classesDirs.each { dir ->
                            println "workspace-classpath ${dir.absolutePath}"
                        }
                    }
                }
            }
        }
    }
}
"#;

pub fn detect(path: &Path) -> Option<ResolverDescriptor> {
    let name = path.file_name()?.to_str()?;
    BUILD_FILES
        .contains(&name)
        .then(|| ResolverDescriptor::Gradle(path.to_path_buf()))
}

/// Resolves a Gradle build through an init script that prints every resolved file.
pub struct GradleResolver {
    build_file: PathBuf,
    storage: StorageHandle,
}

impl GradleResolver {
    pub fn new(build_file: PathBuf, storage: StorageHandle) -> Self {
        Self {
            build_file,
            storage,
        }
    }

    fn run_gradle(&self) -> ResolveResult<ClassPath> {
        let project_dir = self.build_file.parent().unwrap_or(Path::new("."));
        let init_script = init_script_file();
        std::fs::write(&init_script, INIT_SCRIPT)
            .map_err(|e| ResolveError::io(&init_script, e))?;

        let gradle = gradle_command(project_dir);
        info!(build_file = %self.build_file.display(), gradle = %gradle.display(), "Resolving Gradle dependencies");
        let result = run_tool(
            &gradle,
            [
                "-I".to_string(),
                init_script.to_string_lossy().to_string(),
                "-q".to_string(),
                "--console=plain".to_string(),
                TASK_NAME.to_string(),
            ],
            project_dir,
        );
        let _ = std::fs::remove_file(&init_script);

        Ok(parse_task_output(&result?))
    }
}

impl ClassPathResolver for GradleResolver {
    fn resolver_type(&self) -> String {
        format!("Gradle({})", self.build_file.display())
    }

    fn classpath(&self) -> ResolveResult<ClassPath> {
        let key = format!("gradle::{}", self.build_file.display());
        let fingerprint = descriptor_fingerprint(&self.build_file);
        cached_classpath(&self.storage, &key, fingerprint.as_deref(), || self.run_gradle())
    }
}

/// Nearest `gradlew` in the project dir or any ancestor, else `$WORKSPACE_CLASSPATH_GRADLE`, else `gradle`.
fn gradle_command(project_dir: &Path) -> PathBuf {
    let wrapper_name = if cfg!(windows) { "gradlew.bat" } else { "gradlew" };
    project_dir
        .ancestors()
        .map(|dir| dir.join(wrapper_name))
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| tool_from_env(GRADLE_ENV, "gradle"))
}

fn init_script_file() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "workspace-classpath-init-{}-{}.gradle",
        std::process::id(),
        nanos
    ))
}

pub fn parse_task_output(stdout: &str) -> ClassPath {
    stdout
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix(LINE_PREFIX))
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(ClassPathEntry::with_sibling_sources)
        .collect()
}
