// src/crawl/mod.rs
// =============================================================================
// This module handles crawling the follow relation.
//
// Features:
// - Depth-first traversal starting from a seed account
// - Per-run visited set, so cycles (a follows b follows a) terminate
// - Configurable depth limit
// - Reuses cached records instead of fetching the same account twice
// - One failing account doesn't stop the rest of the crawl
// =============================================================================

mod crawler;
mod report;

pub use crawler::Crawler;
pub use report::CrawlReport;
