// src/source/testing.rs
// =============================================================================
// A scripted, in-memory DataSource for tests.
//
// - Accounts and their follow lists are declared up front.
// - Listings reveal `page_size` ids per page and re-render everything loaded
//   so far on every extract (like an infinite-scroll list), so the consumer
//   sees duplicates.
// - Accounts can be marked as failing, or as "already fetched in an earlier
//   run" (any fetch of them is an error).
// - `endless` listings never report exhaustion.
// =============================================================================

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

use super::{DataSource, ListingHandle, ListingKind};
use crate::account::{AccountId, Profile};
use crate::error::{CrawlError, Result};

pub fn id(raw: &str) -> AccountId {
    AccountId::parse(raw).unwrap()
}

pub fn ids(raw: &[&str]) -> Vec<AccountId> {
    raw.iter().map(|r| id(r)).collect()
}

#[derive(Default)]
pub struct ScriptedSource {
    following: HashMap<AccountId, Vec<AccountId>>,
    followers: HashMap<AccountId, Vec<AccountId>>,
    failing: HashSet<AccountId>,
    forbidden: HashSet<AccountId>,
    endless: bool,
    page_size: usize,
    pub profile_fetches: HashMap<AccountId, u32>,
    pub listings_opened: Vec<(AccountId, ListingKind)>,
    pub advances: u32,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            page_size: 2,
            ..Default::default()
        }
    }

    pub fn follows(mut self, account: &str, following: &[&str]) -> Self {
        self.following.insert(id(account), ids(following));
        self
    }

    pub fn followed_by(mut self, account: &str, followers: &[&str]) -> Self {
        self.followers.insert(id(account), ids(followers));
        self
    }

    pub fn failing(mut self, account: &str) -> Self {
        self.failing.insert(id(account));
        self
    }

    /// Any fetch of `account` fails the test's expectations.
    pub fn forbid(mut self, account: &str) -> Self {
        self.forbidden.insert(id(account));
        self
    }

    pub fn endless(mut self) -> Self {
        self.endless = true;
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    pub fn fetch_count(&self, account: &str) -> u32 {
        self.profile_fetches.get(&id(account)).copied().unwrap_or(0)
    }

    fn check(&self, account: &AccountId) -> Result<()> {
        if self.forbidden.contains(account) {
            return Err(CrawlError::source(account, "fetched again after an earlier run"));
        }
        if self.failing.contains(account) {
            return Err(CrawlError::source(account, "scripted failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    async fn fetch_profile(&mut self, account: &AccountId) -> Result<Profile> {
        self.check(account)?;

        let count = self.profile_fetches.entry(account.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            return Err(CrawlError::source(account, "profile fetched twice"));
        }

        Ok(Profile {
            username: account.to_string(),
            ..Default::default()
        })
    }

    async fn open_listing<'a>(
        &'a mut self,
        account: &AccountId,
        kind: ListingKind,
    ) -> Result<Box<dyn ListingHandle + 'a>> {
        self.check(account)?;
        self.listings_opened.push((account.clone(), kind));

        let all = match kind {
            ListingKind::Following => self.following.get(account),
            ListingKind::Followers => self.followers.get(account),
        }
        .cloned()
        .unwrap_or_default();

        Ok(Box::new(ScriptedListing {
            all,
            loaded: self.page_size,
            page_size: self.page_size,
            endless: self.endless,
            advances: &mut self.advances,
        }))
    }
}

/// A listing over a fixed list, for consumer tests that don't need a source.
pub fn listing(all: Vec<AccountId>, page_size: usize, endless: bool, advances: &mut u32) -> impl ListingHandle + '_ {
    ScriptedListing {
        all,
        loaded: page_size,
        page_size,
        endless,
        advances,
    }
}

struct ScriptedListing<'a> {
    all: Vec<AccountId>,
    loaded: usize,
    page_size: usize,
    endless: bool,
    advances: &'a mut u32,
}

#[async_trait]
impl<'a> ListingHandle for ScriptedListing<'a> {
    async fn extract_visible(&mut self) -> Result<Vec<AccountId>> {
        let end = self.loaded.min(self.all.len());
        Ok(self.all[..end].to_vec())
    }

    async fn advance(&mut self) -> Result<bool> {
        *self.advances += 1;
        if self.endless {
            return Ok(true);
        }
        if self.loaded >= self.all.len() {
            return Ok(false);
        }
        self.loaded += self.page_size;
        Ok(true)
    }
}
