// src/error.rs
// =============================================================================
// Error types shared by the crawl, cache, and data source layers.
//
// How errors flow:
// - SourceUnavailable: one account's fetch failed. The crawler catches it,
//   logs it, and abandons that branch only.
// - NotFound: cache miss. Expected during a crawl, not a real failure.
// - CorruptRecord: a cache file could not be parsed. Skipped and logged.
// - RecordUnavailable: one account's file can't be read or replaced (a
//   directory squatting on <id>.json, bad permissions). Abandons that branch.
// - StorageUnavailable: the data directory is missing or unwritable. Fatal.
//
// main.rs wraps these in anyhow::Error when they reach the process boundary.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

use crate::account::AccountId;

pub type Result<T> = std::result::Result<T, CrawlError>;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("data source unavailable for '{account}': {reason}")]
    SourceUnavailable { account: String, reason: String },

    #[error("no cached record for '{0}'")]
    NotFound(AccountId),

    #[error("corrupt cache record {}: {reason}", .path.display())]
    CorruptRecord { path: PathBuf, reason: String },

    #[error("storage unavailable at {}: {reason}", .path.display())]
    StorageUnavailable { path: PathBuf, reason: String },

    // One record's file can't be read or replaced; other records are fine
    #[error("cannot access cache record {}: {source}", .path.display())]
    RecordUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid account identifier: '{0}'")]
    InvalidIdentifier(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrawlError {
    /// Builds a `SourceUnavailable` for the given account.
    pub fn source(account: &AccountId, reason: impl ToString) -> Self {
        CrawlError::SourceUnavailable {
            account: account.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn storage(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        CrawlError::StorageUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        CrawlError::CorruptRecord {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for failures that only abandon a single branch of the crawl.
    pub fn is_branch_local(&self) -> bool {
        matches!(
            self,
            CrawlError::SourceUnavailable { .. }
                | CrawlError::NotFound(_)
                | CrawlError::CorruptRecord { .. }
                | CrawlError::RecordUnavailable { .. }
                | CrawlError::InvalidIdentifier(_)
        )
    }
}
