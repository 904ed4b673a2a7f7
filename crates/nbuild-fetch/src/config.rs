use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::fetch::FetchOptions;
use crate::retry::RetryPolicy;
use crate::transport::CurlOptions;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per download (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

fn default_jobs() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_stall_timeout() -> u64 {
    60
}

/// Global configuration loaded from `~/.config/nbuild/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Parent of the per-package download directories (`<root>/<package>`).
    #[serde(default)]
    pub download_root: Option<PathBuf>,
    /// Downloads run concurrently within one batch. 1 = strictly sequential.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Accept an existing file as cached when its request carries no digest.
    #[serde(default = "default_true")]
    pub trust_unverified_cache: bool,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// A transfer slower than 1 KiB/s for this long is aborted.
    #[serde(default = "default_stall_timeout")]
    pub stall_timeout_secs: u64,
    /// Hard limit for one transfer attempt (None = no limit).
    #[serde(default)]
    pub max_time_secs: Option<u64>,
    /// libcurl receive buffer size in bytes (None = library default).
    #[serde(default)]
    pub buffer_size: Option<usize>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            download_root: None,
            jobs: default_jobs(),
            trust_unverified_cache: true,
            connect_timeout_secs: default_connect_timeout(),
            stall_timeout_secs: default_stall_timeout(),
            max_time_secs: None,
            buffer_size: None,
            retry: None,
        }
    }
}

impl FetchConfig {
    pub fn curl_options(&self) -> CurlOptions {
        CurlOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            low_speed_time: Duration::from_secs(self.stall_timeout_secs),
            max_time: self.max_time_secs.map(Duration::from_secs),
            buffer_size: self.buffer_size,
            ..CurlOptions::default()
        }
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            jobs: self.jobs.max(1),
            trust_unverified: self.trust_unverified_cache,
            retry: self
                .retry
                .as_ref()
                .map(RetryPolicy::from_config)
                .unwrap_or_default(),
        }
    }

    /// Download directory for `package` under `download_root`, if a root is configured.
    /// `package` must be a single plain path component.
    pub fn package_download_dir(&self, package: &str) -> Result<Option<PathBuf>> {
        let mut components = Path::new(package).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => anyhow::bail!(
                "invalid package name {:?}: must be a single path component",
                package
            ),
        }
        Ok(self.download_root.as_ref().map(|root| root.join(package)))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("nbuild")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FetchConfig> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<FetchConfig> {
    if !path.exists() {
        let default_cfg = FetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: FetchConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = FetchConfig::default();
        assert_eq!(cfg.jobs, 1);
        assert!(cfg.trust_unverified_cache);
        assert_eq!(cfg.connect_timeout_secs, 30);
        assert_eq!(cfg.stall_timeout_secs, 60);
        assert!(cfg.download_root.is_none());
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg: FetchConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.jobs, 1);
        assert!(cfg.trust_unverified_cache);
        assert!(cfg.retry.is_none());
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            download_root = "/var/cache/nbuild"
            jobs = 4
            trust_unverified_cache = false
            connect_timeout_secs = 10
            max_time_secs = 600

            [retry]
            max_attempts = 3
            base_delay_secs = 0.5
            max_delay_secs = 15
        "#;
        let cfg: FetchConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.jobs, 4);
        assert!(!cfg.trust_unverified_cache);
        assert_eq!(
            cfg.package_download_dir("coreutils").unwrap(),
            Some(PathBuf::from("/var/cache/nbuild/coreutils"))
        );
        let retry = cfg.retry.as_ref().unwrap();
        assert_eq!(retry.max_attempts, 3);
        assert!((retry.base_delay_secs - 0.5).abs() < 1e-9);

        let curl = cfg.curl_options();
        assert_eq!(curl.connect_timeout, Duration::from_secs(10));
        assert_eq!(curl.max_time, Some(Duration::from_secs(600)));

        let opts = cfg.fetch_options();
        assert_eq!(opts.jobs, 4);
        assert!(!opts.trust_unverified);
        assert_eq!(opts.retry.max_attempts, 3);
    }

    #[test]
    fn load_or_init_writes_default_then_reads_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let first = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        let second = load_or_init_at(&path).unwrap();
        assert_eq!(first.jobs, second.jobs);
        assert_eq!(first.stall_timeout_secs, second.stall_timeout_secs);
    }

    #[test]
    fn package_name_cannot_escape_download_root() {
        let cfg = FetchConfig {
            download_root: Some(PathBuf::from("/var/cache/nbuild")),
            ..FetchConfig::default()
        };
        for bad in ["../x", "/etc", "a/b", "..", ".", ""] {
            assert!(cfg.package_download_dir(bad).is_err(), "{bad:?} accepted");
        }
        assert!(FetchConfig::default().package_download_dir("../x").is_err());
    }
}
