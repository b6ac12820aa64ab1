// src/config.rs
// =============================================================================
// Run configuration for a crawl, fixed for the lifetime of the run.
//
// Everything here is built from the parsed CLI (see cli.rs) and validated
// once before any network or disk work starts.
// =============================================================================

use std::time::Duration;
use url::Url;

use crate::account::AccountId;
use crate::error::{CrawlError, Result};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_MAX_POLLS: u32 = 200;
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) follow-graph/0.1";

// How often the listing consumer polls, and the hard ceiling on polls so a
// source that never reports exhaustion still terminates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingPolicy {
    pub poll_interval: Duration,
    pub max_polls: u32,
}

impl Default for ListingPolicy {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }
}

// What to do with an identifier that already has a cached record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Cached records are authoritative; never fetch the same account twice.
    #[default]
    Never,
    /// Re-fetch records older than the given age (or with no timestamp).
    OlderThan(chrono::Duration),
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub seed: AccountId,
    /// Levels to crawl, counting the seed as level 1. 1 fetches the seed only;
    /// 2 also fetches the accounts it follows, without expanding them.
    pub max_depth: usize,
    pub want_profile: bool,
    pub want_following: bool,
    pub want_followers: bool,
    pub refresh: RefreshPolicy,
    /// Re-fetch and overwrite cache entries that fail to parse.
    pub repair_corrupt: bool,
    pub listing: ListingPolicy,
}

impl CrawlConfig {
    pub fn new(seed: AccountId) -> Self {
        Self {
            seed,
            max_depth: 2,
            want_profile: true,
            want_following: false,
            want_followers: false,
            refresh: RefreshPolicy::Never,
            repair_corrupt: false,
            listing: ListingPolicy::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(CrawlError::InvalidConfig(
                "depth must be at least 1".to_string(),
            ));
        }
        if self.listing.max_polls == 0 {
            return Err(CrawlError::InvalidConfig(
                "max polls must be at least 1".to_string(),
            ));
        }
        if let RefreshPolicy::OlderThan(age) = self.refresh {
            if age < chrono::Duration::zero() {
                return Err(CrawlError::InvalidConfig(
                    "refresh age cannot be negative".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// Where the HTML data source points, and how it identifies itself
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub profile_base: Url,
    pub listing_base: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

impl SourceConfig {
    pub fn new(profile_base: &str, listing_base: &str) -> Result<Self> {
        Ok(Self {
            profile_base: parse_base(profile_base)?,
            listing_base: parse_base(listing_base)?,
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }
}

// Base URLs must end in '/' or Url::join drops their last path segment
fn parse_base(raw: &str) -> Result<Url> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };

    let url = Url::parse(&with_slash)
        .map_err(|e| CrawlError::InvalidConfig(format!("invalid base URL '{}': {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(CrawlError::InvalidConfig(format!(
            "base URL must be http or https: '{}'",
            raw
        )));
    }

    Ok(url)
}
