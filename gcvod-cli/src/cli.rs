use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "Download Gamechanger game video streams", long_about = None)]
pub struct Args {
    /// API token; falls back to the GC_TOKEN environment variable
    #[arg(long)]
    pub token: Option<String>,

    /// Account username; falls back to GC_USERNAME
    #[arg(long)]
    pub username: Option<String>,

    /// Account password; falls back to GC_PASSWORD
    #[arg(long)]
    pub password: Option<String>,

    /// Directory the per-event download folders are created under
    #[arg(long, default_value = "./videos")]
    pub output_dir: PathBuf,

    /// Per-request timeout in seconds; unset waits indefinitely
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Skip TLS certificate verification for stream hosts
    #[arg(long)]
    pub insecure: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
