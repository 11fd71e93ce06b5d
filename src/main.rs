//! CLI binary for the key usage heatmap viewer.
//!
//! # Usage
//!
//! ```bash
//! key-heatmap                         # default capture daemon database
//! key-heatmap /path/to/key_stats.sqlite --port 8080
//! key-heatmap --normalizer percentile --percentile 0.9 --palette two-tone
//! key-heatmap --no-browser
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};

use key_heatmap::heatmap::{
    ColorMapper, LogNormalizer, Normalizer, PercentileClip, RainbowColor, TwoToneColor,
};
use key_heatmap::store::CounterStore;
use key_heatmap::viewer::server::{run_server, ServerConfig};

/// Count-to-ratio normalization strategy.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum NormalizerArg {
    /// Logarithmic compression against the batch maximum
    Log,
    /// Linear scaling clipped at a percentile threshold
    Percentile,
}

/// Ratio-to-color palette.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PaletteArg {
    /// Full-spectrum hue rotation, cold purple to red
    Rainbow,
    /// Red/green interpolation with fixed blue and alpha
    TwoTone,
}

#[derive(Parser, Debug)]
#[command(name = "key-heatmap")]
#[command(about = "Live keyboard usage heatmap served over SSE")]
#[command(version)]
struct Args {
    /// Path to the counter database written by the capture daemon
    /// (defaults to the daemon's own location under $HOME)
    #[arg(env = "KEY_STATS_DB")]
    db: Option<PathBuf>,

    /// Port for web server
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Snapshot push interval in milliseconds
    #[arg(long, default_value = "500")]
    interval_ms: u64,

    /// Normalization strategy
    #[arg(long, value_enum, default_value = "log")]
    normalizer: NormalizerArg,

    /// Percentile threshold for the percentile normalizer (0.0 - 1.0)
    #[arg(long, default_value = "0.95")]
    percentile: f64,

    /// Color palette
    #[arg(long, value_enum, default_value = "rainbow")]
    palette: PaletteArg,

    /// Don't open browser automatically
    #[arg(long)]
    no_browser: bool,
}

/// Default database location: where the capture daemon keeps its counters.
fn default_db_path() -> anyhow::Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .context("HOME is not set; pass the counter database path explicitly")?;
    Ok(PathBuf::from(home)
        .join("Library")
        .join("Application Support")
        .join("KaraStat")
        .join("key_stats.sqlite"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing - RUST_LOG takes precedence, fallback to info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let db_path = match args.db.clone() {
        Some(path) => path,
        None => default_db_path()?,
    };

    tracing::info!(
        db = %db_path.display(),
        port = args.port,
        interval_ms = args.interval_ms,
        normalizer = ?args.normalizer,
        palette = ?args.palette,
        "Starting key-heatmap"
    );

    let store = CounterStore::open(&db_path)
        .with_context(|| format!("cannot open counter database {}", db_path.display()))?;

    let normalizer: Box<dyn Normalizer> = match args.normalizer {
        NormalizerArg::Log => Box::new(LogNormalizer),
        NormalizerArg::Percentile => Box::new(PercentileClip::new(args.percentile)),
    };
    let palette: Box<dyn ColorMapper> = match args.palette {
        PaletteArg::Rainbow => Box::new(RainbowColor),
        PaletteArg::TwoTone => Box::new(TwoToneColor),
    };

    let config = ServerConfig {
        port: args.port,
        open_browser: !args.no_browser,
        push_interval: Duration::from_millis(args.interval_ms),
    };

    run_server(Arc::new(store), normalizer, palette, config).await
}
