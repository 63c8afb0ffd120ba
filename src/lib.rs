//! # workspace-classpath
//!
//! Resolves the JVM classpath of one or more workspace roots by discovering
//! the build files inside them and asking the matching build tools.
//!
//! ## Architecture
//!
//! - **resolver**: The resolver contract and its combinators (fallback, aggregate, decoration)
//! - **classpath**: Classpath entries and path-list helpers
//! - **ignore_rules**: `.gitignore` lines compiled into root-anchored globs
//! - **scan**: Pruning workspace walk built on `ignore`
//! - **classify**: Ordered build-file detectors (Maven, Gradle, shell)
//! - **maven** / **gradle** / **shell**: Build-tool backed resolvers
//! - **stdlib**: Standard library jar lookup used to decorate workspace results
//! - **assemble**: Top-level resolver wiring for a set of workspace roots
//! - **cache**: LMDB persistence for build-tool results, keyed by descriptor fingerprint
//! - **exec**: External tool invocation
//! - **diagnostics**: Scan events routed to `tracing`
//! - **error** / **logging** / **config** / **cli**: Ambient plumbing for the binary

pub mod assemble;
pub mod cache;
pub mod classify;
pub mod classpath;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod exec;
pub mod gradle;
pub mod ignore_rules;
pub mod logging;
pub mod maven;
pub mod resolver;
pub mod scan;
pub mod shell;
pub mod stdlib;
