//! embed-resolve - resolve a media URL the way the editor does
//!
//! Prints the provider endpoint and the proxied request for a URL, then
//! performs the request against the instance and prints the HTML that
//! would be inserted, or the reason it cannot be embedded.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use networking::{HttpClientConfig, ReqwestHttpClient};
use oembed::{EmbedConfig, MediaUrlResolver};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(version, about = "Resolve a media URL into embeddable HTML", long_about = None)]
struct Cli {
    /// Media URL, as a user would paste it
    url: String,

    /// TOML configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Page hosting the editor; overrides the configuration
    #[arg(long, env = "EMBED_PAGE_URL")]
    page_url: Option<String>,

    /// Only print the request that would be sent
    #[arg(long)]
    dry_run: bool,

    /// Debug logging for the embedding crates
    #[arg(long, short)]
    verbose: bool,
}

fn init_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("embed_resolve=debug,networking=debug,oembed=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<EmbedConfig> {
    let mut config = match &cli.config {
        Some(path) => EmbedConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => EmbedConfig::default(),
    };
    if let Some(page_url) = &cli.page_url {
        config.page_url = page_url.clone();
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<bool> {
    let config = load_config(&cli)?;
    let origin = config.local_origin().context("Invalid page URL")?;
    tracing::debug!("Resolving against {}", origin.origin);

    let client = ReqwestHttpClient::new(HttpClientConfig::new(origin.origin.as_str()))
        .context("Failed to create HTTP client")?;
    let resolver = MediaUrlResolver::new(&config, Arc::new(client))
        .context("Invalid provider configuration")?;

    let Some(endpoint) = resolver.providers().resolve(&cli.url) else {
        println!("Media provider not supported");
        return Ok(false);
    };
    println!("endpoint: {}", endpoint);
    println!("request:  {}", resolver.proxy_url(&cli.url)?);

    if cli.dry_run {
        return Ok(true);
    }

    match resolver.resolve_html(&cli.url).await {
        Ok(html) => {
            println!("{}", html);
            Ok(true)
        }
        Err(e) => {
            let reason = match e.reason() {
                "" => e.to_string(),
                reason => reason.to_string(),
            };
            println!("{}", reason);
            Ok(false)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
