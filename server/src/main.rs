use anyhow::Result;
use axum::Router;
use clap::Parser;
use fetcher::{FetchConfig, DEFAULT_USER_AGENT};
use server::{build_app, ServerConfig};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};
use wordfreq_core::DEFAULT_TOP_K;

#[derive(Parser)]
#[command(name = "server")]
#[command(about = "Serve the word frequency visualizer")]
struct Args {
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Number of top words charted when the request does not say
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,
    /// Request timeout seconds (default: no timeout)
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// User-Agent sent with page and image requests
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
    /// Image downloads in flight at once for the image listing
    #[arg(long, default_value_t = 1)]
    image_concurrency: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = ServerConfig {
        fetch: FetchConfig {
            timeout: args.timeout_secs.map(Duration::from_secs),
            user_agent: args.user_agent,
            image_concurrency: args.image_concurrency,
            ..FetchConfig::default()
        },
        top_k: args.top_k,
    };
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
