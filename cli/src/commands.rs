pub mod fetch;
pub mod probe;
pub mod scan;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use probr_common::config::ProxyConfig;
use probr_common::target::Provider;

#[derive(Parser)]
#[command(name = "probr")]
#[command(about = "A reconnaissance tool for exposed Ollama endpoints.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Route every request through this HTTP proxy (host:port)
    #[arg(long, global = true)]
    pub proxy: Option<ProxyConfig>,

    /// JSON file of extra request headers (override the defaults)
    #[arg(long, global = true)]
    pub headers: Option<PathBuf>,

    /// Pause between probes, in milliseconds
    #[arg(long, global = true, default_value_t = 200)]
    pub delay: u64,

    /// Per-request network timeout, in seconds
    #[arg(long, global = true, default_value_t = 10)]
    pub timeout: u64,

    /// File receiving confirmed endpoints (truncated per run)
    #[arg(long, global = true, default_value = "results.txt")]
    pub output: PathBuf,

    /// File accumulating per-target error detail (never truncated)
    #[arg(long, global = true, default_value = "error.log")]
    pub error_log: PathBuf,

    /// Skip the startup banner
    #[arg(long, global = true)]
    pub no_banner: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fingerprint a single URL, then open a shell on a confirmed instance
    #[command(alias = "p")]
    Probe { url: String },
    /// Probe every candidate in a plain-text file, one target per line
    #[command(alias = "s")]
    Scan { file: PathBuf },
    /// Download a candidate list from an asset-search provider
    #[command(alias = "f")]
    Fetch { provider: Provider, key: String },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
