// src/account/mod.rs
// =============================================================================
// Account data model: the normalized identifier and the persisted record.
// =============================================================================

mod id;
mod record;

pub use id::AccountId;
pub use record::{AccountRecord, Profile};
