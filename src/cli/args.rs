use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the jscope binary.
#[derive(Parser, Debug)]
#[command(
    name = "jscope",
    version,
    about = "Build scope trees for Java-like sources and resolve every simple name"
)]
pub struct CliArgs {
    /// Source files or directories. Directories are searched for `*.java`.
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Skip files whose path matches this glob. May be repeated.
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Report only names that resolve to no declaration.
    #[arg(long = "unresolved-only")]
    pub unresolved_only: bool,

    /// Disable colored output.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Number of worker threads. Defaults to one per core.
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Print the scope tree of every file.
    #[arg(long = "show-scopes")]
    pub show_scopes: bool,

    /// Do not report a declaration that repeats a name in the same scope.
    #[arg(long = "allow-duplicates")]
    pub allow_duplicates: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
