//! CLI command definitions and handlers

pub mod build;
pub mod dump;
pub mod info;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const LONG_ABOUT: &str = r#"
Builds language-independent model (LIM) graphs from front-end symbol exports
and stores them in the compact LIM binary format.

QUICK START:
    1. limgraph build -i exports/ -o out/     Build out/<name>.lim
    2. limgraph info out/app.lim              Header and node statistics
    3. limgraph dump out/app.lim -o app.limml Text rendering of the graph

FILTERING:
    --external-hard-filter <FILE>   Excluded files are never read
    --external-soft-filter <FILE>   Excluded files produce filtered nodes

    Rule files hold one rule per line: '+regex' includes, '-regex'
    excludes, '#' starts a comment. The last matching rule wins.

LOGGING:
    LIMGRAPH_LOG overrides --verbosity with a tracing filter directive,
    e.g. LIMGRAPH_LOG=limgraph::builder=debug
"#;

/// LIM graph builder
#[derive(Parser, Debug)]
#[command(name = "limgraph")]
#[command(author, version)]
#[command(about = "Build and inspect LIM graphs")]
#[command(long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level when LIMGRAPH_LOG is unset
    #[arg(long, global = true, value_enum, default_value_t = Verbosity::Normal)]
    pub verbosity: Verbosity,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a graph from front-end exports
    #[command(visible_alias = "b")]
    Build(BuildArgs),

    /// Write the LIMML rendering of a saved graph
    #[command(visible_alias = "d")]
    Dump(DumpArgs),

    /// Show header properties and node counts of a saved graph
    Info(InfoArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Silent,
    Error,
    Warning,
    #[default]
    Normal,
    Debug,
}

impl Verbosity {
    /// Tracing filter directive for this level
    pub fn directive(self) -> &'static str {
        match self {
            Verbosity::Silent => "off",
            Verbosity::Error => "error",
            Verbosity::Warning => "warn",
            Verbosity::Normal => "info",
            Verbosity::Debug => "debug",
        }
    }
}

/// Arguments for the build command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:
    limgraph build -i app.json -o out/                 Single export
    limgraph build -i exports/ -o out/ --lim-name app  Every *.json under exports/
    limgraph build -i app.json -o out/ --dump-limml    Also write out/<name>.limml")]
pub struct BuildArgs {
    /// Front-end JSON export, or a directory of them
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory receiving the graph files
    #[arg(short, long)]
    pub output: PathBuf,

    /// Base name of the produced files (default: input file stem)
    #[arg(long)]
    pub lim_name: Option<String>,

    /// Build configuration recorded in the header
    #[arg(long)]
    pub configuration: Option<String>,

    /// Target platform recorded in the header
    #[arg(long)]
    pub platform: Option<String>,

    /// Rule file of files to skip entirely
    #[arg(long)]
    pub external_hard_filter: Option<PathBuf>,

    /// Rule file of files whose nodes are filtered
    #[arg(long)]
    pub external_soft_filter: Option<PathBuf>,

    /// Also write a LIMML dump
    #[arg(long)]
    pub dump_limml: bool,

    /// Also write the filtered companion graph
    #[arg(long)]
    pub filtered_output: bool,

    /// Configuration file (default: $LIMGRAPH_HOME/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the dump command
#[derive(Parser, Debug)]
pub struct DumpArgs {
    /// Saved graph
    pub lim: PathBuf,

    /// Filter state file to apply before dumping
    #[arg(short, long)]
    pub filter: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Dump filtered nodes too
    #[arg(long)]
    pub include_filtered: bool,
}

/// Arguments for the info command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Saved graph
    pub lim: PathBuf,

    /// JSON output
    #[arg(long)]
    pub json: bool,
}
