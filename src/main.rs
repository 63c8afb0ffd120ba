use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use workspace_classpath::assemble::{WorkspaceResolver, default_classpath_resolver};
use workspace_classpath::cache::{PersistentCache, StorageHandle, clear_db};
use workspace_classpath::classify::ResolverDescriptor;
use workspace_classpath::classpath::{ClassPath, ClassPathEntry, join_compiled};
use workspace_classpath::cli::{Cli, Commands, OutputFormat};
use workspace_classpath::config::{
    logging_config, resolve_db_path, resolve_roots, resolver_config,
};
use workspace_classpath::diagnostics::{DiagnosticSink, TracingSink};
use workspace_classpath::ignore_rules::ignored_path_patterns;
use workspace_classpath::logging::init_logging;
use workspace_classpath::resolver::ClassPathResolver;
use workspace_classpath::scan::IGNORE_FILE_NAME;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(logging_config(&cli));

    match cli.command.clone() {
        Commands::Clear => {
            let db_path = resolve_db_path(&cli)?;
            clear_db(&db_path)?;
        }
        Commands::Stats => {
            let db_path = resolve_db_path(&cli)?;
            let cache = PersistentCache::open(db_path)?;
            let stats = cache.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Resolve { roots, format } => {
            let roots = resolve_roots(&roots)?;
            let storage = open_storage(&cli);
            let result = resolve(&cli, &roots, storage)?;
            print_resolve_output(&result, format)?;
        }
        Commands::Scan { root } => {
            let roots = resolve_roots(root.as_slice())?;
            let root = roots
                .into_iter()
                .next()
                .context("No workspace root to scan")?;
            let report = scan(&root);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn open_storage(cli: &Cli) -> StorageHandle {
    if cli.no_cache {
        return None;
    }
    let db_path = match resolve_db_path(cli) {
        Ok(p) => p,
        Err(err) => {
            warn!(error = %err, "Classpath cache disabled");
            return None;
        }
    };
    match PersistentCache::open(db_path.clone()) {
        Ok(cache) => Some(Arc::new(cache)),
        Err(err) => {
            warn!(db = %db_path.display(), error = %err, "Failed to open classpath cache; resolving without it");
            None
        }
    }
}

#[derive(Debug, Serialize)]
struct ResolveOutput {
    resolver: String,
    entries: Vec<ClassPathEntry>,
    duration_ms: u64,
}

#[derive(Debug, Serialize)]
struct ScanReport {
    root: String,
    build_files: Vec<ResolverDescriptor>,
    ignored_patterns: Vec<String>,
}

fn resolve(cli: &Cli, roots: &[PathBuf], storage: StorageHandle) -> Result<ResolveOutput> {
    let start = Instant::now();
    let sink: Arc<dyn DiagnosticSink> = Arc::new(TracingSink);
    let resolver = default_classpath_resolver(roots, storage, &resolver_config(cli), sink);

    let resolver_type = resolver.resolver_type();
    info!(resolver = %resolver_type, "Resolving classpath");
    let classpath = resolver
        .classpath()
        .with_context(|| format!("Failed to resolve classpath with {resolver_type}"))?;

    Ok(ResolveOutput {
        resolver: resolver_type,
        entries: classpath.into_iter().collect(),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

fn scan(root: &Path) -> ScanReport {
    let sink: Arc<dyn DiagnosticSink> = Arc::new(TracingSink);
    let ignored_patterns = ignored_path_patterns(root, &root.join(IGNORE_FILE_NAME), sink.as_ref())
        .iter()
        .map(|p| p.pattern().to_string())
        .collect();
    let build_files = WorkspaceResolver::new(root.to_path_buf(), None, sink).discover();

    ScanReport {
        root: root.to_string_lossy().to_string(),
        build_files,
        ignored_patterns,
    }
}

fn render_resolve_output(result: &ResolveOutput, format: OutputFormat) -> Result<String> {
    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
        OutputFormat::Text => {
            let mut out = String::new();
            out.push_str(&format!("resolver: {}\n", result.resolver));
            out.push_str(&format!("entries: {}\n", result.entries.len()));
            out.push_str(&format!("duration_ms: {}\n", result.duration_ms));
            for e in &result.entries {
                match &e.source_jar {
                    Some(src) => out.push_str(&format!(
                        "- {} (sources: {})\n",
                        e.compiled_jar.display(),
                        src.display()
                    )),
                    None => out.push_str(&format!("- {}\n", e.compiled_jar.display())),
                }
            }
            out
        }
        OutputFormat::Path => {
            let classpath: ClassPath = result.entries.iter().cloned().collect();
            join_compiled(&classpath)
        }
    };
    Ok(content)
}

fn print_resolve_output(result: &ResolveOutput, format: OutputFormat) -> Result<()> {
    let content = render_resolve_output(result, format)?;
    print!("{content}");
    if !content.ends_with('\n') {
        println!();
    }
    Ok(())
}
