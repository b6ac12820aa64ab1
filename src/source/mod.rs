// src/source/mod.rs
// =============================================================================
// The external data source the crawler talks to.
//
// Two traits:
// - DataSource: one live session (one HTTP client, one browser tab, ...).
//   Fetches a profile, or opens a paginated listing for an account.
// - ListingHandle: an open, paginated listing. Shows what is currently
//   visible and can be asked to load the next page.
//
// Both take &mut self. While a listing is open it borrows the session
// exclusively, so there is never more than one outstanding request per
// session.
//
// Identifiers coming out of a source are always normalized through
// AccountId::parse before they reach the crawler.
// =============================================================================

mod html;
#[cfg(test)]
pub mod testing;

pub use html::HtmlSource;

use async_trait::async_trait;

use crate::account::{AccountId, Profile};
use crate::error::Result;

// Which side of the follow relation a listing shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingKind {
    /// Accounts this account follows
    Following,
    /// Accounts that follow this account
    Followers,
}

impl ListingKind {
    pub fn path_segment(self) -> &'static str {
        match self {
            ListingKind::Following => "following",
            ListingKind::Followers => "followers",
        }
    }
}

#[async_trait]
pub trait DataSource: Send {
    async fn fetch_profile(&mut self, account: &AccountId) -> Result<Profile>;

    async fn open_listing<'a>(
        &'a mut self,
        account: &AccountId,
        kind: ListingKind,
    ) -> Result<Box<dyn ListingHandle + 'a>>;
}

#[async_trait]
pub trait ListingHandle: Send {
    /// Identifiers currently rendered. May repeat ones from earlier calls.
    async fn extract_visible(&mut self) -> Result<Vec<AccountId>>;

    /// Loads the next page. Returns false once there is nothing more to load.
    async fn advance(&mut self) -> Result<bool>;
}
