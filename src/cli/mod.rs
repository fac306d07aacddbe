// CLI module for headline-cache
// Author: kelexine (https://github.com/kelexine)

use clap::Parser;
use std::path::PathBuf;

/// headline-cache - rate-limited news cache with synthetic fallback
#[derive(Parser, Debug)]
#[command(name = "headline-cache", version, about, long_about = None)]
pub struct Args {
    /// Config file (default: ~/.headline-cache/config.toml, if present)
    #[arg(short, long, env = "HEADLINE_CACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the bind address
    #[arg(long)]
    pub host: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Load the home page feeds before accepting requests
    #[arg(long)]
    pub warm: bool,
}
