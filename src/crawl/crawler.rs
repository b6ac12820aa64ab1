// src/crawl/crawler.rs
// =============================================================================
// The crawl orchestrator: a depth-first walk over "who follows whom".
//
// How it works:
// 1. Push the seed onto a stack at depth 0
// 2. Pop an account; skip it if we already visited it this run
// 3. Mark it visited
// 4. Cached? Adopt the record as-is. Otherwise fetch it and store it.
// 5. If depth + 1 < max_depth, push the accounts it follows (in reverse, so
//    they pop in list order) at depth + 1
// 6. Repeat until the stack is empty
//
// This visits accounts in the same order as a recursive DFS, but the
// traversal state lives on the heap instead of the call stack.
//
// Failures:
// - A fetch that fails (network, HTTP status, parse) abandons that account's
//   branch only. Nothing is stored, so a later run retries it.
// - A corrupt cache entry (bad JSON, bad UTF-8, wrong name) is reported and
//   left alone unless repair is on.
// - A single record path that can't be read or replaced abandons that
//   branch. A data directory that can't take new files aborts the run.
//
// The crawler borrows the data source mutably for the whole run: one session,
// one request at a time.
// =============================================================================

use chrono::Utc;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::CrawlReport;
use crate::account::{AccountId, AccountRecord};
use crate::cache::FileCache;
use crate::config::{CrawlConfig, RefreshPolicy};
use crate::error::{CrawlError, Result};
use crate::listing;
use crate::source::{DataSource, ListingKind};

// An account waiting to be processed
#[derive(Debug, Clone)]
struct Frame {
    account: AccountId,
    depth: usize,
}

pub struct Crawler<'a, S: DataSource + ?Sized> {
    source: &'a mut S,
    cache: &'a FileCache,
    config: CrawlConfig,
}

impl<'a, S: DataSource + ?Sized> Crawler<'a, S> {
    pub fn new(source: &'a mut S, cache: &'a FileCache, config: CrawlConfig) -> Self {
        Self {
            source,
            cache,
            config,
        }
    }

    pub async fn run(&mut self) -> Result<CrawlReport> {
        self.config.validate()?;

        info!(
            seed = %self.config.seed,
            max_depth = self.config.max_depth,
            following = self.config.want_following,
            followers = self.config.want_followers,
            "starting crawl"
        );

        let mut report = CrawlReport::default();
        let mut visited: HashSet<AccountId> = HashSet::new();
        let mut stack = vec![Frame {
            account: self.config.seed.clone(),
            depth: 0,
        }];

        while let Some(frame) = stack.pop() {
            if !visited.insert(frame.account.clone()) {
                continue;
            }
            report.visited += 1;
            debug!(account = %frame.account, depth = frame.depth, "visiting");

            let resolved = self.resolve(&frame.account, &mut report).await;
            let record = match resolved {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(e) if e.is_branch_local() => {
                    warn!(account = %frame.account, error = %e, "abandoning branch");
                    report.failed.push((frame.account, e.to_string()));
                    continue;
                }
                Err(e) => return Err(e),
            };

            if frame.depth + 1 < self.config.max_depth {
                for next in record.following().iter().rev() {
                    if !visited.contains(next) {
                        stack.push(Frame {
                            account: next.clone(),
                            depth: frame.depth + 1,
                        });
                    }
                }
            }
        }

        info!(
            visited = report.visited,
            fetched = report.fetched,
            from_cache = report.from_cache,
            failed = report.failed.len(),
            corrupt = report.corrupt.len(),
            "crawl finished"
        );

        Ok(report)
    }

    // Returns the record to expand from, or None when the account's cache
    // entry is corrupt and we were told not to touch it.
    async fn resolve(
        &mut self,
        account: &AccountId,
        report: &mut CrawlReport,
    ) -> Result<Option<AccountRecord>> {
        if !self.cache.exists(account) {
            let record = self.fetch_and_store(account).await?;
            report.fetched += 1;
            return Ok(Some(record));
        }

        match self.cache.load(account) {
            Ok(record) if self.is_stale(&record) => {
                debug!(account = %account, "cached record is stale, refreshing");
                let record = self.fetch_and_store(account).await?;
                report.fetched += 1;
                report.refreshed += 1;
                Ok(Some(record))
            }
            Ok(record) => {
                debug!(account = %account, "using cached record");
                report.from_cache += 1;
                Ok(Some(record))
            }
            Err(e @ CrawlError::CorruptRecord { .. }) => {
                if !self.config.repair_corrupt {
                    warn!(account = %account, error = %e, "corrupt cache entry left in place");
                    report.corrupt.push(account.clone());
                    return Ok(None);
                }
                warn!(account = %account, error = %e, "repairing corrupt cache entry");
                let record = self.fetch_and_store(account).await?;
                report.fetched += 1;
                report.repaired += 1;
                Ok(Some(record))
            }
            // Removed between exists() and load()
            Err(CrawlError::NotFound(_)) => {
                let record = self.fetch_and_store(account).await?;
                report.fetched += 1;
                Ok(Some(record))
            }
            Err(e) => Err(e),
        }
    }

    fn is_stale(&self, record: &AccountRecord) -> bool {
        match self.config.refresh {
            RefreshPolicy::Never => false,
            RefreshPolicy::OlderThan(max_age) => record.is_older_than(max_age, Utc::now()),
        }
    }

    // Builds a complete record from the source, then stores it. Nothing is
    // written unless every requested part was fetched.
    async fn fetch_and_store(&mut self, account: &AccountId) -> Result<AccountRecord> {
        let mut record = AccountRecord::new(account.clone());

        if self.config.want_profile {
            record.profile = Some(self.source.fetch_profile(account).await?);
        }
        if self.config.want_following {
            record.following = Some(self.collect(account, ListingKind::Following).await?);
        }
        if self.config.want_followers {
            record.followers = Some(self.collect(account, ListingKind::Followers).await?);
        }
        record.fetched_at = Some(Utc::now());

        self.cache.store(&record)?;
        info!(
            account = %account,
            following = record.following().len(),
            followers = record.followers().len(),
            "fetched account"
        );

        Ok(record)
    }

    async fn collect(&mut self, account: &AccountId, kind: ListingKind) -> Result<Vec<AccountId>> {
        let policy = self.config.listing;
        let mut handle = self.source.open_listing(account, kind).await?;
        let mut ids = listing::consume(handle.as_mut(), &policy).await?;

        // A self-reference would only make the walk revisit itself
        ids.retain(|id| id != account);
        Ok(ids)
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why a stack instead of recursion?
//    - Deep or wide follow graphs can't overflow the call stack this way
//    - Async recursion in Rust needs boxing; a loop doesn't
//
// 2. Why is `visited` separate from the cache?
//    - The cache remembers across runs, `visited` only for this run
//    - A cached account still has to be expanded when we reach it
//
// 3. Why push children in reverse?
//    - A stack is last-in-first-out; reversing makes the first followed
//      account come out first, matching the listing order
// -----------------------------------------------------------------------------
