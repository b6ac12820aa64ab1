// src/account/id.rs
// =============================================================================
// The normalized account handle used as the key everywhere: cache file
// names, the visited set, graph nodes.
//
// Normalization rules (applied once, at the boundary where raw strings enter):
// 1. Trim surrounding whitespace
// 2. Strip ONE leading '@'
// 3. Lowercase (handles are case-insensitive on the source site)
// 4. Reject anything that isn't ASCII alphanumeric or '_'
//
// Rule 4 also guarantees the id is a safe file name (no '/', no '..').
// =============================================================================

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{CrawlError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(String);

impl AccountId {
    /// Normalizes a raw handle such as `"@Alice "` into `alice`.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let handle = trimmed.strip_prefix('@').unwrap_or(trimmed);

        if handle.is_empty()
            || !handle
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(CrawlError::InvalidIdentifier(raw.to_string()));
        }

        Ok(AccountId(handle.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountId {
    type Err = CrawlError;

    fn from_str(s: &str) -> Result<Self> {
        AccountId::parse(s)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Serialized as a bare string so cache files look like {"username": "alice"}
impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

// Deserializing re-runs normalization, so hand-edited or older files with
// "@Alice" still load as `alice`
impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        AccountId::parse(&raw).map_err(serde::de::Error::custom)
    }
}
