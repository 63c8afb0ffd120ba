use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "workspace-classpath")]
#[command(about = "Resolve the JVM classpath of a workspace from its Maven, Gradle and shell build files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, value_name = "FILE", global = true)]
    pub db: Option<PathBuf>,

    /// Resolve without reading or writing the classpath cache.
    #[arg(long, global = true)]
    pub no_cache: bool,

    #[arg(long, value_name = "FILE", global = true)]
    pub global_script: Option<PathBuf>,

    /// Directory searched for the standard library jar (repeatable).
    #[arg(long = "stdlib-dir", value_name = "DIR", global = true)]
    pub stdlib_dirs: Vec<PathBuf>,

    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    Resolve {
        #[arg(value_name = "ROOT")]
        roots: Vec<PathBuf>,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    Scan {
        #[arg(value_name = "ROOT")]
        root: Option<PathBuf>,
    },
    Stats,
    Clear,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
    Path,
}
