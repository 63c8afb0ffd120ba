use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::classpath::{ClassPath, ClassPathEntry};
use crate::error::{ResolveError, ResolveResult};
use crate::resolver::ClassPathResolver;
use crate::scan::{default_m2_repository, extract_version_from_maven_path};

pub const STDLIB_ARTIFACT: &str = "kotlin-stdlib";
const STDLIB_GROUP_PATH: &str = "org/jetbrains/kotlin";

/// Contributes the language standard library jar found in local repositories.
#[derive(Debug, Clone)]
pub struct StdlibResolver {
    artifact: String,
    search_dirs: Vec<PathBuf>,
}

impl StdlibResolver {
    pub fn new(artifact: impl Into<String>, search_dirs: Vec<PathBuf>) -> Self {
        Self {
            artifact: artifact.into(),
            search_dirs,
        }
    }

    /// `~/.m2/repository/org/jetbrains/kotlin/kotlin-stdlib`.
    pub fn default_search_dirs() -> Vec<PathBuf> {
        default_m2_repository()
            .map(|m2| vec![m2.join(STDLIB_GROUP_PATH).join(STDLIB_ARTIFACT)])
            .unwrap_or_default()
    }

    fn candidates(&self, dir: &Path) -> Vec<PathBuf> {
        let mut found = Vec::new();

        let flat = dir.join(format!("{}.jar", self.artifact));
        if flat.is_file() {
            found.push(flat);
        }

        let Ok(entries) = std::fs::read_dir(dir) else {
            return found;
        };
        for entry in entries.flatten() {
            let version_dir = entry.path();
            let Some(version) = version_dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let jar = version_dir.join(format!("{}-{version}.jar", self.artifact));
            if jar.is_file() {
                found.push(jar);
            }
        }
        found
    }
}

impl ClassPathResolver for StdlibResolver {
    fn resolver_type(&self) -> String {
        format!("Stdlib({})", self.artifact)
    }

    fn classpath(&self) -> ResolveResult<ClassPath> {
        let best = self
            .search_dirs
            .iter()
            .flat_map(|dir| self.candidates(dir))
            .max_by(|a, b| compare_jar_versions(a, b))
            .ok_or(ResolveError::StdlibNotFound {
                searched: self.search_dirs.len(),
            })?;

        debug!(jar = %best.display(), "Found standard library");
        Ok([ClassPathEntry::with_sibling_sources(best)].into_iter().collect())
    }
}

fn compare_jar_versions(a: &Path, b: &Path) -> Ordering {
    let va = extract_version_from_maven_path(a).unwrap_or_default();
    let vb = extract_version_from_maven_path(b).unwrap_or_default();
    compare_versions(&va, &vb)
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum VersionPart {
    Number(u64),
    Text(String),
}

/// Releases sort above qualified versions (`2.1.0` > `2.1.0-Beta1`), then numeric-aware.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let is_release = |v: &str| !v.is_empty() && v.chars().all(|c| c.is_ascii_digit() || c == '.');
    let parts = |v: &str| -> Vec<VersionPart> {
        v.split(['.', '-'])
            .filter(|s| !s.is_empty())
            .map(|s| match s.parse::<u64>() {
                Ok(n) => VersionPart::Number(n),
                Err(_) => VersionPart::Text(s.to_ascii_lowercase()),
            })
            .collect()
    };

    is_release(a)
        .cmp(&is_release(b))
        .then_with(|| parts(a).cmp(&parts(b)))
}
