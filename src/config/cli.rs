use super::DEFAULT_CONFIG_FILE;
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "pages-deploy")]
#[command(about = "Provision a Cloudflare Pages project bound to a GitHub repository")]
pub struct Cli {
    /// TOML configuration file (defaults to ./pages-deploy.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Resolve the account and print the request without creating anything
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit log events as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl Cli {
    /// The explicit `--config`, else the default file if it exists in the working directory.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(|| {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            default.exists().then(|| default.to_path_buf())
        })
    }
}
