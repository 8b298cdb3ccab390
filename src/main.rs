mod app;
mod crawl;
mod util;

use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use app::{BootstrapParams, PageRankApp};
use crawl::HttpGraphSource;

/// Interactive PageRank view of a seeded web crawl
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the crawl/rank service
    #[arg(long, env = "PAGERANK_API_BASE", default_value = "http://localhost:8000")]
    api_base: String,

    /// Startup query string, e.g. `url=https://example.com&hop=2&topK=200`
    #[arg(long)]
    query: Option<String>,

    /// Seed URL; starts a run immediately
    #[arg(long)]
    url: Option<String>,

    /// Hop limit (1, 2 or 3)
    #[arg(long)]
    hop: Option<String>,

    /// Nodes to draw (50, 100, 200, 300, 500 or 1000)
    #[arg(long = "top-k")]
    top_k: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn bootstrap(&self) -> BootstrapParams {
        let mut params = BootstrapParams::from_query(self.query.as_deref().unwrap_or_default());
        if let Some(url) = &self.url {
            params.set_seed_url(url);
        }
        if let Some(hop) = &self.hop {
            params.set_hop(hop);
        }
        if let Some(top_k) = &self.top_k {
            params.set_top_k(top_k);
        }
        params
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install log subscriber")?;

    let source = HttpGraphSource::new(&args.api_base)?;
    info!(endpoint = %source.endpoint(), "using crawl/rank service");
    let bootstrap = args.bootstrap();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "PageRank graph",
        options,
        Box::new(move |cc| Ok(Box::new(PageRankApp::new(cc, Arc::new(source), bootstrap)))),
    )
    .map_err(|error| anyhow!("failed to open window: {error}"))
}
