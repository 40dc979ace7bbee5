use clap::Parser;
use std::path::PathBuf;

/// With no flags, measures every fixed volume once, appends the result to
/// the history file and prints it.
#[derive(Parser)]
#[command(name = "disktrend")]
#[command(about = "Records free space on local volumes and charts it over time")]
#[command(version)]
pub struct Cli {
    /// Open the interactive dashboard instead of printing one capture
    #[arg(long, default_value_t = false)]
    pub graph: bool,

    /// Output the capture as JSON instead of text
    #[arg(long, default_value_t = false, conflicts_with = "graph")]
    pub json: bool,

    /// History file (defaults to ~/disk_monitor_history.json)
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Per-volume probe timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Config file (defaults to the platform config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Show debug logging
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}
