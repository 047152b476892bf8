//! # urllist CLI Application
//!
//! Command-line entry point for the URL List link-metadata service.
//!
//! ## Subcommands
//!
//! - `serve`: Run the HTTP API consumed by the collection front end
//! - `resolve`: Resolve one or more URLs and print their previews
//!
//! Every option can also be supplied through an environment variable, which
//! is how the service is configured when it runs in a container.

mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use futures::StreamExt;
use tracing::instrument;
use urllist::api::{self, ServerConfig};
use urllist::metadata::{PendingUrlState, Resolver, ResolverConfig, normalize_input};

#[derive(Parser)]
#[command(author, version, about = "Link metadata resolution for URL List collections", long_about = None)]
struct Cli {
    /// Default log level when RUST_LOG is not set
    #[arg(long, global = true, env = "URLLIST_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, global = true, env = "URLLIST_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Export traces and metrics over OTLP
    #[arg(long, global = true, env = "URLLIST_OTLP")]
    otlp: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the metadata HTTP API
    Serve(ServeArgs),

    /// Resolve URLs and print their metadata
    Resolve(ResolveArgs),
}

#[derive(Args, Debug, Clone)]
struct ResolverArgs {
    /// Fetch timeout in seconds
    #[arg(long, env = "URLLIST_TIMEOUT_SECS", default_value = "15")]
    timeout_secs: u64,

    /// Maximum cached records (0 for unbounded)
    #[arg(long, env = "URLLIST_CACHE_CAPACITY", default_value = "10000")]
    cache_capacity: usize,

    /// Cache entry lifetime in seconds (omit to keep entries until evicted)
    #[arg(long, env = "URLLIST_CACHE_TTL_SECS")]
    cache_ttl_secs: Option<u64>,

    /// Maximum concurrent fetches per batch
    #[arg(long, env = "URLLIST_MAX_CONCURRENCY", default_value = "16")]
    max_concurrency: usize,

    /// Maximum response body bytes read per fetch
    #[arg(long, env = "URLLIST_MAX_BODY_BYTES", default_value = "2097152")]
    max_body_bytes: usize,

    /// Size parameter for favicon service URLs
    #[arg(long, env = "URLLIST_FAVICON_SIZE", default_value = "32")]
    favicon_size: u32,

    /// Leave the description empty instead of synthesizing "Visit ..."
    #[arg(long, env = "URLLIST_NO_SYNTHESIZED_DESCRIPTION")]
    no_synthesized_description: bool,
}

impl ResolverArgs {
    fn to_config(&self) -> ResolverConfig {
        ResolverConfig::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .cache_capacity(Some(self.cache_capacity).filter(|capacity| *capacity > 0))
            .cache_ttl(self.cache_ttl_secs.map(Duration::from_secs))
            .max_concurrency(self.max_concurrency)
            .max_body_bytes(self.max_body_bytes)
            .favicon_size(self.favicon_size)
            .synthesize_description(!self.no_synthesized_description)
            .build()
    }
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Interface to bind
    #[arg(long, env = "URLLIST_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8080")]
    port: u16,

    #[command(flatten)]
    resolver: ResolverArgs,
}

#[derive(Args, Debug)]
struct ResolveArgs {
    /// URLs to resolve; inputs without a scheme get https://
    #[arg(required = true)]
    urls: Vec<String>,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    #[command(flatten)]
    resolver: ResolverArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _otel =
        telemetry::init_tracing_subscriber(&cli.log_level, cli.log_dir.as_deref(), cli.otlp)?;

    match cli.command {
        Some(Commands::Serve(args)) => {
            serve_command(args).await?;
        }
        Some(Commands::Resolve(args)) => {
            resolve_command(args).await?;
        }
        None => {
            let _ = Cli::parse_from(["urllist", "--help"]);
        }
    }

    Ok(())
}

#[instrument]
async fn serve_command(args: ServeArgs) -> anyhow::Result<()> {
    let resolver = Arc::new(Resolver::new(args.resolver.to_config())?);
    let server_config = ServerConfig {
        host: args.host,
        port: args.port,
    };

    api::serve(&server_config, resolver).await?;
    Ok(())
}

#[instrument]
async fn resolve_command(args: ResolveArgs) -> anyhow::Result<()> {
    let resolver = Resolver::new(args.resolver.to_config())?;
    let urls: Vec<String> = args.urls.iter().map(|url| normalize_input(url)).collect();

    match args.format.as_str() {
        "json" => {
            let states = resolver.resolve_all(&urls).await;
            println!("{}", serde_json::to_string_pretty(&states)?);
        }
        _ => {
            let mut states = std::pin::pin!(resolver.resolve_unordered(urls));
            while let Some(state) = states.next().await {
                print_state(&state);
            }
        }
    }

    Ok(())
}

fn print_state(state: &PendingUrlState) {
    println!("{}", state.url);
    match &state.error {
        Some(error) => println!("   Error: {}", error),
        None => {
            println!("   Title: {}", state.title.as_deref().unwrap_or_default());
            if let Some(description) = &state.description {
                println!("   Description: {}", description);
            }
            println!("   Site: {}", state.site_name.as_deref().unwrap_or_default());
            println!("   Favicon: {}", state.favicon.as_deref().unwrap_or_default());
        }
    }
    println!();
}
