//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! The client secret and refresh token are loaded from REDDIT_CLIENT_SECRET /
//! REDDIT_REFRESH_TOKEN or from `*_file` paths, never stored in the TOML.

use common::Secret;
use reddit_auth::{API_ENDPOINT, AuthorizationDuration, Credentials, Scope, TOKEN_ENDPOINT};
use reddit_client::{ListingQuery, Sort};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CLIENT_SECRET_ENV: &str = "REDDIT_CLIENT_SECRET";
pub const REFRESH_TOKEN_ENV: &str = "REDDIT_REFRESH_TOKEN";

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub client: ClientConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Reddit application registration
#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub user_agent: String,
    #[serde(default = "default_max_retry")]
    pub max_retry: u32,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
    /// Path to a file containing the client secret (alternative to REDDIT_CLIENT_SECRET)
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
    #[serde(skip)]
    pub refresh_token: Option<Secret<String>>,
    /// Path to a file containing a refresh token (alternative to REDDIT_REFRESH_TOKEN)
    #[serde(default)]
    pub refresh_token_file: Option<PathBuf>,
    /// Scopes requested by `--authorize-url`
    #[serde(default)]
    pub scopes: Vec<Scope>,
    #[serde(default)]
    pub duration: AuthorizationDuration,
    #[serde(default)]
    pub compact: bool,
}

#[derive(Debug, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token_url: default_token_url(),
        }
    }
}

/// Which listing to crawl and how far
#[derive(Debug, Deserialize)]
pub struct CrawlConfig {
    pub subreddit: String,
    #[serde(default)]
    pub sort: Option<Sort>,
    #[serde(default)]
    pub limit: Option<u32>,
    /// Start a backward crawl from this fullname.
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct MetricsConfig {
    /// Write the Prometheus exposition here after the run (textfile collector).
    #[serde(default)]
    pub textfile: Option<PathBuf>,
}

fn default_max_retry() -> u32 {
    reddit_client::DEFAULT_MAX_RETRY
}

fn default_api_url() -> String {
    API_ENDPOINT.to_owned()
}

fn default_token_url() -> String {
    TOKEN_ENDPOINT.to_owned()
}

fn default_max_pages() -> usize {
    10
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// Secret resolution order, for both the client secret and refresh token:
    /// 1. env var
    /// 2. `*_file` path from config
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.validate()?;

        config.client.client_secret = resolve_secret(
            CLIENT_SECRET_ENV,
            config.client.client_secret_file.as_deref(),
            "client_secret_file",
        )?;
        config.client.refresh_token = resolve_secret(
            REFRESH_TOKEN_ENV,
            config.client.refresh_token_file.as_deref(),
            "refresh_token_file",
        )?;

        Ok(config)
    }

    fn validate(&self) -> common::Result<()> {
        if self.client.client_id.trim().is_empty() {
            return Err(common::Error::Config("client_id must not be empty".into()));
        }
        // Reddit throttles or blocks generic user agents outright.
        if self.client.user_agent.trim().is_empty() {
            return Err(common::Error::Config("user_agent must not be empty".into()));
        }
        for (name, url) in [
            ("api_url", &self.endpoints.api_url),
            ("token_url", &self.endpoints.token_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(common::Error::Config(format!(
                    "{name} must start with http:// or https://, got: {url}"
                )));
            }
        }
        if self.crawl.subreddit.trim().is_empty() {
            return Err(common::Error::Config("subreddit must not be empty".into()));
        }
        if self.crawl.max_pages == 0 {
            return Err(common::Error::Config(
                "max_pages must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("reddit-crawler.toml")
    }

    pub fn credentials(&self) -> Credentials {
        let credentials = Credentials::new(
            self.client.client_id.clone(),
            self.client.redirect_uri.clone(),
            self.client.user_agent.clone(),
        );
        match &self.client.client_secret {
            Some(secret) => credentials.with_client_secret(secret.expose().clone()),
            None => credentials,
        }
    }

    pub fn listing_query(&self) -> ListingQuery {
        ListingQuery {
            sort: self.crawl.sort,
            before: self.crawl.before.clone(),
            after: None,
            count: None,
            limit: self.crawl.limit,
        }
    }
}

fn resolve_secret(
    env_key: &str,
    file: Option<&Path>,
    field: &str,
) -> common::Result<Option<Secret<String>>> {
    if let Ok(value) = std::env::var(env_key)
        && !value.is_empty()
    {
        return Ok(Some(Secret::new(value)));
    }
    let Some(file) = file else {
        return Ok(None);
    };
    let value = std::fs::read_to_string(file).map_err(|e| {
        common::Error::Config(format!("failed to read {field} {}: {e}", file.display()))
    })?;
    let value = value.trim().to_owned();
    Ok((!value.is_empty()).then(|| Secret::new(value)))
}
