//! The `ClassPathResolver` capability and the algebra used to compose resolvers.
//!
//! - `FirstNonEmpty`: try a preferred source, degrade to a fallback when it fails or declines
//! - `Aggregate`: union of every member that succeeds; fails only when all members fail
//! - `WithExtra`: always add an extra source (the standard library) on top of a base
//! - `Backup`: terminal resolver that always succeeds with a fixed classpath
//!
//! Composites own their children exclusively; a resolver tree has no sharing and no cycles.

use tracing::{debug, warn};

use crate::classpath::ClassPath;
use crate::error::{ResolveError, ResolveResult};

pub trait ClassPathResolver {
    /// Human-readable description used in diagnostics.
    fn resolver_type(&self) -> String;

    fn classpath(&self) -> ResolveResult<ClassPath>;

    fn classpath_or_empty(&self) -> ClassPath {
        match self.classpath() {
            Ok(classpath) => classpath,
            Err(err) => {
                warn!(resolver = %self.resolver_type(), error = %err, "Could not resolve classpath");
                ClassPath::new()
            }
        }
    }
}

pub type BoxedResolver = Box<dyn ClassPathResolver>;

impl ClassPathResolver for BoxedResolver {
    fn resolver_type(&self) -> String {
        (**self).resolver_type()
    }

    fn classpath(&self) -> ResolveResult<ClassPath> {
        (**self).classpath()
    }
}

pub trait ResolverExt: ClassPathResolver + Sized + 'static {
    fn boxed(self) -> BoxedResolver {
        Box::new(self)
    }

    /// Prefer `self`; use `fallback` when `self` fails or resolves to nothing.
    fn or(self, fallback: impl ClassPathResolver + 'static) -> FirstNonEmpty {
        FirstNonEmpty::new(self.boxed(), Box::new(fallback))
    }

    /// Always contribute `extra` in addition to `self`.
    fn with_extra(self, extra: impl ClassPathResolver + 'static) -> WithExtra {
        WithExtra::new(self.boxed(), Box::new(extra))
    }
}

impl<T: ClassPathResolver + 'static> ResolverExt for T {}

pub fn aggregate(members: impl IntoIterator<Item = BoxedResolver>) -> Aggregate {
    Aggregate::new(members.into_iter().collect())
}

/// Declines every request with an empty classpath.
#[derive(Debug, Default, Clone, Copy)]
pub struct Empty;

impl ClassPathResolver for Empty {
    fn resolver_type(&self) -> String {
        "[]".to_string()
    }

    fn classpath(&self) -> ResolveResult<ClassPath> {
        Ok(ClassPath::new())
    }
}

/// Last-resort resolver. Never fails.
#[derive(Debug, Default, Clone)]
pub struct Backup {
    entries: ClassPath,
}

impl Backup {
    pub fn new(entries: ClassPath) -> Self {
        Self { entries }
    }
}

impl ClassPathResolver for Backup {
    fn resolver_type(&self) -> String {
        "Backup".to_string()
    }

    fn classpath(&self) -> ResolveResult<ClassPath> {
        Ok(self.entries.clone())
    }
}

pub struct FirstNonEmpty {
    first: BoxedResolver,
    second: BoxedResolver,
}

impl FirstNonEmpty {
    pub fn new(first: BoxedResolver, second: BoxedResolver) -> Self {
        Self { first, second }
    }
}

impl ClassPathResolver for FirstNonEmpty {
    fn resolver_type(&self) -> String {
        format!("{} or {}", self.first.resolver_type(), self.second.resolver_type())
    }

    fn classpath(&self) -> ResolveResult<ClassPath> {
        let first = match self.first.classpath() {
            Ok(classpath) if !classpath.is_empty() => return Ok(classpath),
            Ok(classpath) => {
                debug!(resolver = %self.first.resolver_type(), "Declined, trying fallback");
                Ok(classpath)
            }
            Err(err) => {
                debug!(resolver = %self.first.resolver_type(), error = %err, "Failed, trying fallback");
                Err(err)
            }
        };

        match (first, self.second.classpath()) {
            (_, Ok(classpath)) => Ok(classpath),
            (Ok(empty), Err(err)) => {
                warn!(resolver = %self.second.resolver_type(), error = %err, "Fallback failed");
                Ok(empty)
            }
            (Err(first), Err(second)) => Err(ResolveError::BothFailed {
                first: Box::new(first),
                second: Box::new(second),
            }),
        }
    }
}

pub struct Aggregate {
    members: Vec<BoxedResolver>,
}

impl Aggregate {
    pub fn new(members: Vec<BoxedResolver>) -> Self {
        Self { members }
    }
}

impl ClassPathResolver for Aggregate {
    fn resolver_type(&self) -> String {
        if self.members.is_empty() {
            return "[]".to_string();
        }
        self.members
            .iter()
            .map(|m| m.resolver_type())
            .collect::<Vec<_>>()
            .join(" + ")
    }

    fn classpath(&self) -> ResolveResult<ClassPath> {
        let mut classpath = ClassPath::new();
        let mut errors = Vec::new();

        for member in &self.members {
            match member.classpath() {
                Ok(entries) => {
                    debug!(resolver = %member.resolver_type(), entries = entries.len(), "Resolved");
                    classpath.extend(entries);
                }
                Err(err) => {
                    warn!(resolver = %member.resolver_type(), error = %err, "Classpath source failed, skipping");
                    errors.push(err);
                }
            }
        }

        if !self.members.is_empty() && errors.len() == self.members.len() {
            return Err(ResolveError::AllFailed { errors });
        }
        Ok(classpath)
    }
}

pub struct WithExtra {
    base: BoxedResolver,
    extra: BoxedResolver,
}

impl WithExtra {
    pub fn new(base: BoxedResolver, extra: BoxedResolver) -> Self {
        Self { base, extra }
    }
}

impl ClassPathResolver for WithExtra {
    fn resolver_type(&self) -> String {
        format!("{} with {}", self.base.resolver_type(), self.extra.resolver_type())
    }

    fn classpath(&self) -> ResolveResult<ClassPath> {
        let base = self.base.classpath();
        let extra = self.extra.classpath();

        match (base, extra) {
            (Ok(mut base), Ok(extra)) => {
                base.extend(extra);
                Ok(base)
            }
            (Ok(base), Err(err)) => {
                warn!(resolver = %self.extra.resolver_type(), error = %err, "Extra classpath source failed");
                Ok(base)
            }
            (Err(err), Ok(extra)) => {
                warn!(resolver = %self.base.resolver_type(), error = %err, "Base classpath failed, keeping extra entries");
                Ok(extra)
            }
            (Err(first), Err(second)) => Err(ResolveError::BothFailed {
                first: Box::new(first),
                second: Box::new(second),
            }),
        }
    }
}
