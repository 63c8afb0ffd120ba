//! Build-file classifier.
//!
//! Every scanned path is offered to a fixed, ordered list of detectors; the
//! first one that recognizes the path decides which resolver owns it. Detection
//! only looks at the path, never at file contents.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cache::StorageHandle;
use crate::gradle::{self, GradleResolver};
use crate::maven::{self, MavenResolver};
use crate::resolver::{BoxedResolver, ResolverExt};
use crate::shell::{self, ShellResolver};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum ResolverDescriptor {
    Maven(PathBuf),
    Gradle(PathBuf),
    Shell(PathBuf),
}

pub type Detector = fn(&Path) -> Option<ResolverDescriptor>;

/// Maven first, then Gradle, then shell scripts.
pub const DETECTORS: &[Detector] = &[maven::detect, gradle::detect, shell::detect];

impl ResolverDescriptor {
    pub fn path(&self) -> &Path {
        match self {
            Self::Maven(p) | Self::Gradle(p) | Self::Shell(p) => p,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Maven(_) => "maven",
            Self::Gradle(_) => "gradle",
            Self::Shell(_) => "shell",
        }
    }

    pub fn into_resolver(self, storage: &StorageHandle) -> BoxedResolver {
        match self {
            Self::Maven(pom) => MavenResolver::new(pom, storage.clone()).boxed(),
            Self::Gradle(build_file) => GradleResolver::new(build_file, storage.clone()).boxed(),
            Self::Shell(script) => ShellResolver::for_script(script).boxed(),
        }
    }
}

pub fn classify(path: &Path) -> Option<ResolverDescriptor> {
    classify_with(path, DETECTORS)
}

/// First detector that accepts `path` wins; later detectors are not consulted.
pub fn classify_with(path: &Path, detectors: &[Detector]) -> Option<ResolverDescriptor> {
    detectors.iter().find_map(|detect| detect(path))
}
