//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Chronicle CLI - changelog-driven SQL migrations
#[derive(Parser, Debug)]
#[command(name = "chronicle")]
#[command(version)]
#[command(about = "Chronicle CLI - changelog-driven SQL migrations", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Base directory holding `scripts/` and `environments/`
    #[arg(short, long, global = true, env = "CHRONICLE_PATH", default_value = ".")]
    pub path: PathBuf,

    /// Environment to use (reads `environments/<env>.toml`)
    #[arg(short, long, global = true, env = "CHRONICLE_ENV", default_value = "development")]
    pub env: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the scripts directory and an environment file
    Init(InitArgs),

    /// Create a new migration script
    New(NewArgs),

    /// Show applied and pending migrations
    Status,

    /// Export a merged up-script for every pending migration
    Script(ScriptArgs),

    /// Display version information
    Version,
}

// =============================================================================
// Init Command
// =============================================================================

/// Arguments for the `init` command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Database URL written to the environment file
    #[arg(short, long)]
    pub url: Option<String>,

    /// Overwrite an existing environment file
    #[arg(short, long)]
    pub force: bool,
}

// =============================================================================
// New Command
// =============================================================================

/// Arguments for the `new` command
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Description of the change; words are joined with underscores
    #[arg(required = true, num_args = 1..)]
    pub description: Vec<String>,

    /// Number the script after the highest existing id instead of a timestamp
    #[arg(long)]
    pub sequence: bool,
}

// =============================================================================
// Script Command
// =============================================================================

/// Arguments for the `script` command
#[derive(Args, Debug)]
pub struct ScriptArgs {
    /// Write the script to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
