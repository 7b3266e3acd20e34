use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "retail-etl")]
#[command(about = "Clean a retail sales CSV: coerce column types and normalize values")]
pub struct CliConfig {
    /// Path to the JSON or TOML configuration file
    #[arg(short, long, default_value = "config.json")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Log CPU and memory usage after each stage
    #[arg(long)]
    pub monitor: bool,

    /// Resolve and validate the configuration without touching data files
    #[arg(long)]
    pub dry_run: bool,
}
