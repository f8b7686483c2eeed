//! TweeFee CLI
//!
//! Command-line companion for a running TweeFee server:
//! - Post a batch of tweets (the producer side of the feed)
//! - Show the current history
//! - Check status
//! - Print a default config file

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tweefee::api::dto::HealthResponse;
use tweefee::{parse_batch, Tweet};

#[derive(Parser)]
#[command(name = "tweefee-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Feed and inspect a TweeFee server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Server base URL
    #[arg(long, default_value = "http://localhost:8888", global = true)]
    pub server_url: String,

    /// Logging level
    #[arg(long, default_value = "error", global = true)]
    pub logging: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Post a JSON array of tweets (newest-first) to the ingest API
    Post {
        /// File holding the batch, or "-" for stdin
        path: PathBuf,
        /// Url to post the tweets to (default: {server_url}/api)
        #[arg(long)]
        consumer_url: Option<String>,
        /// Only send the first N tweets of the file
        #[arg(short = 'n', long)]
        max_count: Option<usize>,
    },

    /// Print the tweets currently held by the server
    History,

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "tweefee_cli={}",
            cli.logging
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let client = reqwest::Client::new();
    let base = cli.server_url.trim_end_matches('/');

    match cli.command {
        Commands::Post {
            path,
            consumer_url,
            max_count,
        } => {
            let mut tweets = read_batch(&path)?;
            if let Some(n) = max_count {
                tweets.truncate(n);
            }

            let url = consumer_url.unwrap_or_else(|| format!("{}/api", base));
            tracing::info!(tweets = tweets.len(), url = %url, "Sending batch");

            let response = client
                .post(&url)
                .json(&tweets)
                .send()
                .await
                .with_context(|| format!("cannot send tweets to consumer at {}", url))?;

            if !response.status().is_success() {
                bail!("consumer answered {}", response.status());
            }
            println!("✓ Sent {} tweets to {}", tweets.len(), url);
        }

        Commands::History => {
            let url = format!("{}/api/history", base);
            let tweets: Vec<Tweet> = client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("cannot reach {}", url))?
                .error_for_status()?
                .json()
                .await?;

            if tweets.is_empty() {
                println!("History is empty");
            }
            for tweet in &tweets {
                println!("{:<20} @{:<16} {}", tweet.date, tweet.user.handle, one_line(&tweet.content));
            }
        }

        Commands::Status => {
            let url = format!("{}/health", base);
            let health: HealthResponse = client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("cannot reach {}", url))?
                .error_for_status()?
                .json()
                .await?;

            println!("TweeFee Status");
            println!("==============");
            println!("Status:      {}", health.status);
            println!("Version:     {}", health.version);
            println!(
                "Uptime:      {}s (since {})",
                health.uptime_seconds,
                health.started_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Clients:     {}", health.connections);
            println!(
                "History:     {}/{}",
                health.history_len, health.history_capacity
            );
        }

        Commands::Config { output } => {
            let content = tweefee::config::generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("✓ Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Read and validate a batch from a file or stdin
fn read_batch(path: &PathBuf) -> anyhow::Result<Vec<Tweet>> {
    let mut raw = Vec::new();
    if path.as_os_str() == "-" {
        std::io::stdin().read_to_end(&mut raw)?;
    } else {
        raw = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    }

    let tweets = parse_batch(&raw).with_context(|| format!("decoding {}", path.display()))?;
    Ok(tweets)
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
