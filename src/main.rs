// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing, to stderr; RUST_LOG overrides the level)
// 2. Parse command-line arguments using clap
// 3. Dispatch to the crawl or graph handler
// 4. Exit with proper code:
//      0   = run finished (even if some accounts failed)
//      1   = crawl ran but nothing at all succeeded
//      2   = setup error (bad arguments, unusable data folder, ...)
//      130 = interrupted with Ctrl-C
// =============================================================================

mod account; // src/account/ - identifiers and cached records
mod cache; // src/cache.rs - one JSON file per account
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - run configuration
mod crawl; // src/crawl/ - the crawl orchestrator
mod error; // src/error.rs - error taxonomy
mod graph; // src/graph/ - graph assembly and output
mod listing; // src/listing.rs - paginated listing consumer
mod source; // src/source/ - where account data comes from

use anyhow::{Context, Result};
use clap::Parser;
use std::future::Future;
use std::io;
use std::path::Path;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use cache::FileCache;
use cli::{Cli, Commands, CrawlArgs, OutputFormat};
use crawl::{CrawlReport, Crawler};
use graph::GraphOptions;
use source::HtmlSource;

const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so `graph` output on stdout can be piped straight to a file
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("follow_graph=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Crawl(args) => handle_crawl(args, &cli.data_dir).await,
        Commands::Graph {
            format,
            include_followers,
        } => handle_graph(&cli.data_dir, *format, *include_followers),
    }
}

// Handles the 'crawl' subcommand
async fn handle_crawl(args: &CrawlArgs, data_dir: &Path) -> Result<i32> {
    let settings = args.settings()?;

    let cache = FileCache::open(data_dir, true)
        .with_context(|| format!("cannot use data folder {}", data_dir.display()))?;

    eprintln!("🔍 Crawling from @{}", settings.crawl.seed);
    eprintln!("📊 Max depth: {}", settings.crawl.max_depth);
    eprintln!("💾 Data folder: {}", cache.dir().display());

    // The session lives exactly as long as this crawl
    let mut source = HtmlSource::new(settings.source)?;
    let mut crawler = Crawler::new(&mut source, &cache, settings.crawl);

    // Dropping the crawl future cancels it at its next await point. Records
    // are only written by an atomic rename, so the cache stays consistent.
    let report = tokio::select! {
        report = crawler.run() => report?,
        _ = wait_for_interrupt(tokio::signal::ctrl_c()) => {
            warn!("interrupted; records stored so far are kept");
            return Ok(EXIT_INTERRUPTED);
        }
    };

    print_report(&report);

    if report.nothing_succeeded() {
        Ok(1)
    } else {
        Ok(0)
    }
}

// Resolves only when Ctrl-C actually arrives. If the handler can't be
// installed, the crawl just runs without it.
async fn wait_for_interrupt<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!(error = %e, "cannot listen for Ctrl-C; crawl will not be interruptible");
        std::future::pending::<()>().await;
    }
}

// Handles the 'graph' subcommand
fn handle_graph(data_dir: &Path, format: OutputFormat, include_followers: bool) -> Result<i32> {
    let cache = FileCache::open(data_dir, false)
        .with_context(|| format!("cannot read data folder {}", data_dir.display()))?;

    let (graph, skipped) = graph::assemble_from(&cache, &GraphOptions { include_followers })?;
    if !skipped.is_empty() {
        warn!(skipped = skipped.len(), "some cache files were unreadable and left out of the graph");
    }

    let output = match format {
        OutputFormat::Json => graph::render_json(&graph)?,
        OutputFormat::Dot => graph::render_dot(&graph),
    };
    println!("{}", output);

    Ok(0)
}

fn print_report(report: &CrawlReport) {
    eprintln!();
    eprintln!("📊 Summary:");
    eprintln!("   👣 Visited: {}", report.visited);
    eprintln!("   🌐 Fetched: {}", report.fetched);
    eprintln!("   💾 From cache: {}", report.from_cache);
    if report.refreshed > 0 || report.repaired > 0 {
        eprintln!("   🔁 Refreshed: {}, repaired: {}", report.refreshed, report.repaired);
    }
    eprintln!("   ❌ Failed: {}", report.failed.len());
    for (account, reason) in &report.failed {
        eprintln!("      @{}: {}", account, reason);
    }
    if !report.corrupt.is_empty() {
        eprintln!("   ⚠️  Corrupt cache entries (rerun with --repair): {}", report.corrupt.len());
        for account in &report.corrupt {
            eprintln!("      @{}", account);
        }
    }
}
