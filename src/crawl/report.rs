// src/crawl/report.rs
// Per-run tally of what the crawler did. Failures are kept per account so the
// CLI can list them; nothing here is persisted.

use crate::account::AccountId;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CrawlReport {
    /// Distinct accounts processed this run.
    pub visited: usize,
    /// Records fetched from the source and stored (includes refreshes and repairs).
    pub fetched: usize,
    /// Records adopted from the cache without fetching.
    pub from_cache: usize,
    /// Stale records re-fetched under the refresh policy.
    pub refreshed: usize,
    /// Corrupt records re-fetched because repair was enabled.
    pub repaired: usize,
    /// Accounts whose fetch failed; their branch was abandoned.
    pub failed: Vec<(AccountId, String)>,
    /// Accounts whose cache entry is unreadable and was left alone.
    pub corrupt: Vec<AccountId>,
}

impl CrawlReport {
    pub fn succeeded(&self) -> usize {
        self.fetched + self.from_cache
    }

    /// True when the run produced nothing usable but did hit problems.
    pub fn nothing_succeeded(&self) -> bool {
        self.succeeded() == 0 && (!self.failed.is_empty() || !self.corrupt.is_empty())
    }
}
