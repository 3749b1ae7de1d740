//! Reddit listing crawler
//!
//! Batch CLI on top of `reddit-client`:
//! 1. Loads the TOML config and secrets
//! 2. Builds a session (refresh grant if a refresh token is configured,
//!    app-only otherwise)
//! 3. Crawls the configured subreddit listing, one JSON line per child on stdout
//! 4. Writes the Prometheus textfile if configured
//!
//! `--authorize-url` and `--exchange-code <code>` cover the one-time consent
//! flow that produces a refresh token.

mod config;
mod metrics;

use anyhow::{Context, Result, bail};
use futures_util::StreamExt;
use std::io::Write;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reddit_auth::{AuthorizationRequest, TokenResponse, generate_state};
use reddit_client::{ListingQuery, Session};

use crate::config::Config;

/// What the invocation should do.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Crawl,
    AuthorizeUrl,
    ExchangeCode(String),
}

#[derive(Debug, PartialEq, Eq)]
struct Cli {
    config: Option<String>,
    command: Command,
}

impl Cli {
    /// Simple flag parsing: `--config <path>`, `--authorize-url`,
    /// `--exchange-code <code>`. Unknown flags are rejected.
    fn parse(args: &[String]) -> Result<Self> {
        let mut config = None;
        let mut command = Command::Crawl;
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config" => {
                    config = Some(iter.next().context("--config requires a path")?.clone());
                }
                "--authorize-url" => command = Command::AuthorizeUrl,
                "--exchange-code" => {
                    let code = iter.next().context("--exchange-code requires a code")?;
                    command = Command::ExchangeCode(code.clone());
                }
                other => bail!("unknown argument: {other}"),
            }
        }
        Ok(Self { config, command })
    }
}

/// Totals for one crawl run.
#[derive(Debug, Default, PartialEq, Eq)]
struct CrawlSummary {
    pages: usize,
    children: usize,
}

fn build_session(config: &Config) -> Result<Session> {
    let mut builder = Session::builder(config.credentials())
        .max_retry(config.client.max_retry)
        .api_url(config.endpoints.api_url.clone())
        .token_url(config.endpoints.token_url.clone());
    if let Some(refresh_token) = &config.client.refresh_token {
        builder = builder.refresh_token(refresh_token.expose().clone());
    }
    builder.build().context("failed to build session")
}

fn authorize_url(config: &Config) -> Result<String> {
    let request = AuthorizationRequest {
        client_id: config.client.client_id.clone(),
        redirect_uri: config.client.redirect_uri.clone(),
        duration: config.client.duration,
        scopes: config.client.scopes.clone(),
        state: generate_state(),
        compact: config.client.compact,
    };
    Ok(request.url().context("failed to build authorization URL")?.to_string())
}

async fn exchange_code(session: &Session, config: &Config, code: &str) -> Result<String> {
    let token = session
        .token_provider()
        .obtain_from_code(code, &config.client.redirect_uri)
        .await
        .context("failed to exchange authorization code")?;
    info!(
        scopes = token.scope.len(),
        has_refresh_token = token.refresh_token.is_some(),
        "authorization code exchanged"
    );
    serde_json::to_string(&TokenResponse::from(&token)).context("failed to encode token")
}

/// Crawl `subreddit` from `query`, writing each child as a JSON line.
async fn crawl_to<W: Write>(
    session: &Session,
    subreddit: &str,
    query: ListingQuery,
    max_pages: usize,
    out: &mut W,
) -> Result<CrawlSummary> {
    let mut summary = CrawlSummary::default();
    let mut pages = std::pin::pin!(session.crawl_subreddit_links(subreddit, query));

    while let Some(page) = pages.next().await {
        let page = match page {
            Ok(page) => page,
            Err(e) => {
                error!(class = ?e.class(), error = %e, pages = summary.pages, "listing fetch failed");
                return Err(e).with_context(|| format!("failed to crawl r/{subreddit}"));
            }
        };
        summary.pages += 1;
        summary.children += page.children.len();
        for child in &page.children {
            serde_json::to_writer(&mut *out, child).context("failed to encode listing child")?;
            out.write_all(b"\n").context("failed to write output")?;
        }
        if summary.pages >= max_pages {
            info!(max_pages, "page limit reached");
            break;
        }
    }
    out.flush().context("failed to flush output")?;
    Ok(summary)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support.
    // Logs go to stderr; stdout carries the crawl output.
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    let prometheus_handle = metrics::install_recorder()?;

    let args: Vec<String> = std::env::args().collect();
    let cli = Cli::parse(&args)?;

    let config_path = Config::resolve_path(cli.config.as_deref());
    info!(path = %config_path.display(), "loading configuration");
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        api_url = %config.endpoints.api_url,
        subreddit = %config.crawl.subreddit,
        has_client_secret = config.client.client_secret.is_some(),
        has_refresh_token = config.client.refresh_token.is_some(),
        max_retry = config.client.max_retry,
        "configuration loaded"
    );

    let session = build_session(&config)?;

    match &cli.command {
        Command::AuthorizeUrl => {
            println!("{}", authorize_url(&config)?);
        }
        Command::ExchangeCode(code) => {
            println!("{}", exchange_code(&session, &config, code).await?);
        }
        Command::Crawl => {
            session.on_token(|_| info!("access token renewed"));
            let stdout = std::io::stdout();
            let mut out = std::io::BufWriter::new(stdout.lock());
            let summary = crawl_to(
                &session,
                &config.crawl.subreddit,
                config.listing_query(),
                config.crawl.max_pages,
                &mut out,
            )
            .await?;
            info!(pages = summary.pages, children = summary.children, "crawl finished");
        }
    }

    if let Some(path) = &config.metrics.textfile {
        metrics::write_textfile(&prometheus_handle, path)?;
        info!(path = %path.display(), "metrics written");
    }

    Ok(())
}
