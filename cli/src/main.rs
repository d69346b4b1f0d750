use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use fetcher::{FetchConfig, FetchedPage, Fetcher, RawDocument, DEFAULT_USER_AGENT};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;
use wordfreq_core::{chart_options, rank, ChartKind, Ranking, TokenCount, DEFAULT_TOP_K};

#[derive(Parser)]
#[command(name = "wordfreq")]
#[command(about = "Rank the words of a web page and chart them", long_about = None)]
struct Cli {
    /// Request timeout seconds (default: no timeout)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// User-Agent sent with page and image requests
    #[arg(long, global = true, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the most frequent words of a page or of a local HTML file
    Rank {
        /// Page to fetch
        #[arg(long, required_unless_present = "file", conflicts_with = "file")]
        url: Option<String>,
        /// Local HTML file to read instead of fetching
        #[arg(long)]
        file: Option<PathBuf>,
        /// How many words to list
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        k: usize,
        /// Print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write the ECharts options for a page's top words
    Chart {
        #[arg(long)]
        url: String,
        /// bar, word-cloud, line, scatter, funnel, pie or area
        #[arg(long, default_value = "bar")]
        kind: ChartKind,
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        k: usize,
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Download every image on a page, warning about each one that fails
    Images {
        #[arg(long)]
        url: String,
        /// Downloads in flight at once
        #[arg(long, default_value_t = 1)]
        concurrency: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();
    let config = FetchConfig {
        timeout: cli.timeout_secs.map(Duration::from_secs),
        user_agent: cli.user_agent,
        ..FetchConfig::default()
    };

    match cli.command {
        Commands::Rank { url, file, k, json } => {
            let page = match (url, file) {
                (_, Some(path)) => read_local(&path)?,
                (Some(url), None) => Fetcher::new(config)?.fetch(&url).await?,
                (None, None) => bail!("either --url or --file is required"),
            };
            let ranking = rank(&page.text, k);
            if json {
                println!("{}", serde_json::to_string_pretty(&ranking_json(&page, &ranking))?);
            } else {
                print!("{}", format_table(&ranking.top));
                eprintln!(
                    "{}: {} distinct words, {} counted",
                    page.url,
                    ranking.table.len(),
                    ranking.table.total()
                );
            }
        }
        Commands::Chart { url, kind, k, output } => {
            if !kind.is_chart() {
                bail!("`{kind}` is not a chart; use `wordfreq images --url {url}`");
            }
            let page = Fetcher::new(config)?.fetch(&url).await?;
            let ranking = rank(&page.text, k);
            let options = chart_options(kind, &ranking.top).ok_or_else(|| anyhow!("no chart for `{kind}`"))?;
            let rendered = serde_json::to_string_pretty(&options)?;
            match output {
                Some(path) => {
                    fs::write(&path, rendered).with_context(|| format!("writing {}", path.display()))?;
                    tracing::info!(path = %path.display(), %kind, "chart options written");
                }
                None => println!("{rendered}"),
            }
        }
        Commands::Images { url, concurrency } => {
            let fetcher = Fetcher::new(FetchConfig { image_concurrency: concurrency, ..config })?;
            let page = fetcher.fetch(&url).await?;
            if page.images.is_empty() {
                println!("no images on this page");
                return Ok(());
            }
            let outcomes = fetcher.fetch_images(&page.images).await;
            let mut failed = 0usize;
            for outcome in &outcomes {
                match outcome {
                    Ok(image) => println!(
                        "ok\t{}\t{}\t{} bytes",
                        image.url,
                        image.content_type.as_deref().unwrap_or("-"),
                        image.bytes.len()
                    ),
                    Err(err) => {
                        failed += 1;
                        eprintln!("warning: could not download image {}: {}", err.url, err.source);
                    }
                }
            }
            eprintln!("{} images, {} failed", outcomes.len(), failed);
        }
    }
    Ok(())
}

/// Read a saved page from disk. Relative image sources resolve against the file's location.
fn read_local(path: &Path) -> Result<FetchedPage> {
    let body = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let absolute = fs::canonicalize(path).with_context(|| format!("resolving {}", path.display()))?;
    let url = Url::from_file_path(&absolute).map_err(|_| anyhow!("cannot express {} as a URL", absolute.display()))?;
    Ok(RawDocument::new(url, None, body).into_page()?)
}

fn ranking_json(page: &FetchedPage, ranking: &Ranking) -> serde_json::Value {
    serde_json::json!({
        "url": page.url.as_str(),
        "encoding": page.encoding,
        "distinct_tokens": ranking.table.len(),
        "counted_tokens": ranking.table.total(),
        "top": ranking.top,
    })
}

fn format_table(top: &[TokenCount]) -> String {
    let width = top.iter().map(|t| t.token.chars().count()).max().unwrap_or(0).max(4);
    let mut out = format!("{:>4}  {:<width$}  {:>6}\n", "#", "word", "count");
    for (i, entry) in top.iter().enumerate() {
        out.push_str(&format!("{:>4}  {:<width$}  {:>6}\n", i + 1, entry.token, entry.count));
    }
    out
}
