//! CLI for the nbuild fetch subsystem.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use nbuild_fetch::config;
use nbuild_fetch::DigestAlgorithm;
use std::path::{Path, PathBuf};

use commands::{run_checksum, run_fetch, run_get, FetchOverrides};

/// Top-level CLI for nbuild-fetch.
#[derive(Debug, Parser)]
#[command(name = "nbuild-fetch")]
#[command(about = "nbuild-fetch: verified, cached downloads of package sources", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/nbuild/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch every download listed in a batch manifest (TOML, or JSON by extension).
    Fetch {
        /// Path to the batch manifest.
        manifest: String,

        /// Download directory (default: <download_root>/<package>, else the current directory).
        #[arg(long, value_name = "DIR")]
        download_dir: Option<String>,

        /// Run up to N downloads concurrently (default from config, usually 1).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,

        /// Never trust an existing file whose request supplies no digest.
        #[arg(long)]
        strict: bool,
    },

    /// Fetch a single URL.
    Get {
        /// http, https or ftp URL.
        url: String,

        #[arg(long, value_name = "HEX")]
        md5: Option<String>,

        #[arg(long, value_name = "HEX")]
        sha1: Option<String>,

        #[arg(long, value_name = "HEX")]
        sha256: Option<String>,

        /// Download directory (default: current directory).
        #[arg(long, value_name = "DIR")]
        download_dir: Option<String>,

        /// Never trust an existing file when no digest is given.
        #[arg(long)]
        strict: bool,
    },

    /// Compute the digest of a local file.
    Checksum {
        /// Path to the file.
        path: String,

        /// md5, sha1 or sha256.
        #[arg(long, default_value = "sha256")]
        algorithm: DigestAlgorithm,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let load_config = || match cli.config.as_deref() {
            Some(path) => config::load_or_init_at(path),
            None => config::load_or_init(),
        };

        match &cli.command {
            CliCommand::Fetch {
                manifest,
                download_dir,
                jobs,
                strict,
            } => {
                let cfg = load_config()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let overrides = FetchOverrides {
                    download_dir: download_dir.as_deref().map(Path::new),
                    jobs: *jobs,
                    strict: *strict,
                };
                run_fetch(&cfg, Path::new(manifest), &overrides)?;
            }
            CliCommand::Get {
                url,
                md5,
                sha1,
                sha256,
                download_dir,
                strict,
            } => {
                let cfg = load_config()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let mut request = nbuild_fetch::DownloadRequest::new(url.clone());
                request.md5 = md5.clone();
                request.sha1 = sha1.clone();
                request.sha256 = sha256.clone();
                let overrides = FetchOverrides {
                    download_dir: download_dir.as_deref().map(Path::new),
                    jobs: None,
                    strict: *strict,
                };
                run_get(&cfg, &request, &overrides)?;
            }
            CliCommand::Checksum { path, algorithm } => {
                run_checksum(Path::new(path), *algorithm)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
