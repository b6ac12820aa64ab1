// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - crawl: walk the follow relation from a seed account into the data folder
// - graph: turn whatever is in the data folder into a directed graph
//
// Some options can also come from the environment (FOLLOW_GRAPH_*), which
// is handy in CI or when pointing at a mirror of the site.
// =============================================================================

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::account::AccountId;
use crate::config::{
    CrawlConfig, ListingPolicy, RefreshPolicy, SourceConfig, DEFAULT_USER_AGENT,
};
use crate::error::{CrawlError, Result};

#[derive(Parser, Debug)]
#[command(
    name = "follow-graph",
    version = "0.1.0",
    about = "Crawl who-follows-whom from a seed account and build a directed graph",
    long_about = "follow-graph crawls the accounts a seed account follows (and optionally its \
                  followers), caches one JSON record per account, and assembles the cache \
                  into a directed graph."
)]
pub struct Cli {
    /// Folder holding one JSON record per crawled account
    #[arg(long, global = true, env = "FOLLOW_GRAPH_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl accounts starting from a seed
    ///
    /// Example: follow-graph crawl rustlang --depth 2 --following
    Crawl(CrawlArgs),

    /// Assemble cached accounts into a graph and print it
    ///
    /// Example: follow-graph graph --format dot > follows.dot
    Graph {
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Also derive edges from cached follower lists
        #[arg(long)]
        include_followers: bool,
    },
}

#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Seed account (a leading '@' is fine)
    pub username: String,

    /// How many levels to crawl, counting the seed as level 1 (1 = just the seed)
    #[arg(long, default_value_t = 2)]
    pub depth: usize,

    /// Collect the accounts each account follows
    #[arg(long)]
    pub following: bool,

    /// Collect each account's followers
    #[arg(long)]
    pub followers: bool,

    /// Skip fetching profile pages
    #[arg(long)]
    pub no_profile: bool,

    /// Delay between listing page polls
    #[arg(long, default_value_t = 1000)]
    pub poll_interval_ms: u64,

    /// Give up on a listing after this many polls
    #[arg(long, default_value_t = 200)]
    pub max_polls: u32,

    /// Re-fetch cached accounts older than this many hours
    /// (default: cached accounts are never re-fetched)
    #[arg(long)]
    pub refresh_after_hours: Option<i64>,

    /// Re-fetch and overwrite cache entries that can't be parsed
    #[arg(long)]
    pub repair: bool,

    /// Per-request timeout
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Base URL for profile pages
    #[arg(long, env = "FOLLOW_GRAPH_PROFILE_BASE", default_value = "https://twitter.com/")]
    pub profile_base: String,

    /// Base URL for following/followers listing pages
    #[arg(long, env = "FOLLOW_GRAPH_LISTING_BASE", default_value = "https://mobile.twitter.com/")]
    pub listing_base: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Dot,
}

// Everything `crawl` needs, pulled out of the parsed arguments
pub struct CrawlSettings {
    pub crawl: CrawlConfig,
    pub source: SourceConfig,
}

impl CrawlArgs {
    pub fn settings(&self) -> Result<CrawlSettings> {
        let mut crawl = CrawlConfig::new(AccountId::parse(&self.username)?);
        crawl.max_depth = self.depth;
        crawl.want_profile = !self.no_profile;
        crawl.want_following = self.following;
        crawl.want_followers = self.followers;
        crawl.repair_corrupt = self.repair;
        crawl.refresh = match self.refresh_after_hours {
            Some(hours) => RefreshPolicy::OlderThan(chrono::Duration::try_hours(hours).ok_or_else(
                || CrawlError::InvalidConfig(format!("refresh age out of range: {} hours", hours)),
            )?),
            None => RefreshPolicy::Never,
        };
        crawl.listing = ListingPolicy {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_polls: self.max_polls,
        };
        crawl.validate()?;

        let mut source = SourceConfig::new(&self.profile_base, &self.listing_base)?;
        source.timeout = Duration::from_secs(self.timeout_secs);
        source.user_agent = self.user_agent.clone();

        Ok(CrawlSettings { crawl, source })
    }
}
