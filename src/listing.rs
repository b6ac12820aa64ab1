// src/listing.rs
// =============================================================================
// Paginated listing consumer.
//
// Drains a ListingHandle into one ordered, de-duplicated list of ids:
//
//   loop:
//     sleep(poll_interval)        <- pacing; the source needs time to settle
//     ids += extract_visible()    <- keep first-seen order, drop repeats
//     stop if max_polls reached   <- liveness ceiling
//     stop if !advance()          <- source says there is nothing more
//
// Each step is awaited before the next one starts, so ticks never overlap.
// =============================================================================

use std::collections::HashSet;
use tracing::{debug, warn};

use crate::account::AccountId;
use crate::config::ListingPolicy;
use crate::error::Result;
use crate::source::ListingHandle;

pub async fn consume(
    handle: &mut (dyn ListingHandle + '_),
    policy: &ListingPolicy,
) -> Result<Vec<AccountId>> {
    // `seen` answers "have we had this id?", `ids` keeps the order
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    let mut polls = 0u32;

    loop {
        // Give the page time to load the next batch
        tokio::time::sleep(policy.poll_interval).await;
        polls += 1;

        // Infinite scroll re-renders earlier items, so most of these
        // are usually repeats
        let visible = handle.extract_visible().await?;
        let before = ids.len();
        for id in visible {
            // insert() returns false if the id was already there
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }
        debug!(poll = polls, new = ids.len() - before, total = ids.len(), "listing poll");

        // Hard stop: some listings never say they are done
        if polls >= policy.max_polls {
            warn!(
                polls,
                collected = ids.len(),
                "listing never reported exhaustion; stopping at poll ceiling"
            );
            break;
        }

        // Ask for more; false means the end of the list
        if !handle.advance().await? {
            break;
        }
    }

    Ok(ids)
}
