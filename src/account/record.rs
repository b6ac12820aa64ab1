// src/account/record.rs
// =============================================================================
// What we persist per account.
//
// `following` / `followers` are Option<Vec<..>>:
//   None          -> list was not collected on this fetch
//   Some(vec![])  -> list was collected and is genuinely empty
// Files written without the field at all load as None.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AccountId;

// Profile metadata scraped from the account's page.
// Opaque to the crawler; only the data source fills it in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub id: Option<u64>,
    pub username: String,
    pub fullname: String,
    pub bio: String,
    pub location: String,
    pub url: String,
    pub avatar: String,
    pub background: String,
    pub verified: bool,
    pub tweets: u64,
    pub following: u64,
    pub followers: u64,
    pub likes: u64,
    /// Join date exactly as displayed on the page. Older records call it `date`.
    #[serde(alias = "date")]
    pub joined: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub username: AccountId,
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub following: Option<Vec<AccountId>>,
    #[serde(default)]
    pub followers: Option<Vec<AccountId>>,
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl AccountRecord {
    /// A record with nothing collected yet.
    pub fn new(username: AccountId) -> Self {
        Self {
            username,
            profile: None,
            following: None,
            followers: None,
            fetched_at: None,
        }
    }

    pub fn following(&self) -> &[AccountId] {
        self.following.as_deref().unwrap_or(&[])
    }

    pub fn followers(&self) -> &[AccountId] {
        self.followers.as_deref().unwrap_or(&[])
    }

    /// True when the record was fetched more than `max_age` ago, or carries
    /// no timestamp at all.
    pub fn is_older_than(&self, max_age: chrono::Duration, now: DateTime<Utc>) -> bool {
        match self.fetched_at {
            Some(at) => now - at > max_age,
            None => true,
        }
    }
}
