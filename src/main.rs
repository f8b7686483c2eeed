//! TweeFee Server
//!
//! Run with: cargo run --bin tweefee -- --config config.toml
//!
//! # Configuration
//!
//! Settings are read from the TOML file given with `--config` (or the
//! default locations), then `TWEEFEE_*` environment variables, then the
//! command-line flags below. `RUST_LOG` overrides the log filter entirely.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tweefee::{serve, AppState, Config, LoggingConfig};

#[derive(Parser)]
#[command(name = "tweefee")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live tweet wall server")]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run on the given port
    #[arg(short, long)]
    port: Option<u16>,

    /// Origin host that has access to the ingest API
    #[arg(long)]
    api_allowed_host: Option<String>,

    /// Number of tweets stored in memory
    #[arg(long)]
    history_size: Option<usize>,

    /// Logging level
    #[arg(long)]
    logging: Option<String>,

    /// Run in debug mode (request tracing)
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (mut config, loaded) = match &args.config {
        Some(path) => {
            let config = Config::load_with_env(path)
                .with_context(|| format!("loading config from {}", path.display()))?;
            (config, None)
        }
        None => {
            let loaded = Config::load_default();
            (loaded.config.clone(), Some(loaded))
        }
    };
    apply_args(&mut config, args);
    config.validate()?;

    init_logging(&config.logging, config.server.debug);
    if let Some(loaded) = &loaded {
        loaded.log();
    }

    tracing::info!("TweeFee v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        history_size = config.server.history_size,
        ws_path = %config.server.ws_path,
        static_dir = %config.server.static_dir,
        "Starting server"
    );

    serve(AppState::new(config)).await?;
    Ok(())
}

fn apply_args(config: &mut Config, args: Args) {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.api_allowed_host {
        config.server.api_allowed_host = host;
    }
    if let Some(size) = args.history_size {
        config.server.history_size = size;
    }
    if let Some(level) = args.logging {
        config.logging.level = level;
    }
    if args.debug {
        config.server.debug = true;
    }
}

fn init_logging(logging: &LoggingConfig, debug: bool) {
    let default_filter = if debug {
        format!("tweefee={},tower_http=debug", logging.level)
    } else {
        format!("tweefee={}", logging.level)
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
