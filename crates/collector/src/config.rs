use clap::Parser;
use reqwest::Url;
use std::{path::PathBuf, time::Duration};

use crate::error::{CollectorError, Result};

/// Command line / environment settings for a collection run.
#[derive(Parser, Debug, Clone)]
#[command(name = "collect-inactive-cameras")]
#[command(about = "Snapshot offline cameras from a VSaaS watcher", long_about = None)]
pub struct CollectorArgs {
    /// API prefix, e.g. http://watcher.local/vsaas/api/v2
    #[arg(long, env = "VSAAS_BASE_URL")]
    pub base_url: String,

    /// Account login
    #[arg(long, env = "VSAAS_LOGIN")]
    pub login: String,

    /// Account password
    #[arg(long, env = "VSAAS_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Cameras requested per page
    #[arg(long, env = "PAGE_LIMIT", default_value_t = 100)]
    pub page_limit: usize,

    /// Directory receiving the daily snapshot files
    #[arg(long, env = "OUTPUT_DIR", default_value = "data_collection")]
    pub output_dir: PathBuf,

    #[arg(long, env = "CONNECT_TIMEOUT_SECS", default_value_t = 3)]
    pub connect_timeout_secs: u64,

    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Log every offline camera after the summary
    #[arg(long, env = "LIST_OFFLINE")]
    pub list_offline: bool,
}

#[derive(Clone)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct CollectorConfig {
    pub base_url: Url,
    pub credentials: Credentials,
    pub page_limit: usize,
    pub output_dir: PathBuf,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub list_offline: bool,
}

impl CollectorConfig {
    pub fn from_args(args: CollectorArgs) -> Result<Self> {
        let base_url = parse_base_url(&args.base_url)?;

        if args.page_limit == 0 {
            return Err(CollectorError::config("page limit must be at least 1"));
        }

        Ok(Self {
            base_url,
            credentials: Credentials {
                login: args.login,
                password: args.password,
            },
            page_limit: args.page_limit,
            output_dir: args.output_dir,
            connect_timeout: Duration::from_secs(args.connect_timeout_secs),
            request_timeout: Duration::from_secs(args.request_timeout_secs),
            list_offline: args.list_offline,
        })
    }
}

/// Parses the API prefix and makes sure it ends with `/` so that
/// `Url::join("cameras")` appends instead of replacing the last segment.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)
        .map_err(|e| CollectorError::config(format!("invalid VSAAS_BASE_URL {raw:?}: {e}")))?;

    if url.cannot_be_a_base() {
        return Err(CollectorError::config(format!(
            "VSAAS_BASE_URL {raw:?} cannot be used as a base URL"
        )));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
