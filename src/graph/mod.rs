// src/graph/mod.rs
// =============================================================================
// Builds a directed graph from whatever is in the account cache.
//
// Rules:
// - Nodes: every account that has a cached record. Nothing else.
// - Edges: for each record R and each u in R.following, emit u -> R
//   ("u is followed by R") only if u is itself a node. Edges toward
//   accounts we never crawled would dangle, so they are dropped.
// - With include_followers, each v in R.followers that is a node adds
//   R -> v ("R is followed by v"), which keeps the same direction.
// - Self-loops are dropped; duplicate edges collapse.
//
// The graph only depends on the cache contents. Nodes and edges are sorted
// sets, so the same cache always renders the same output byte for byte.
// =============================================================================

mod render;

pub use render::{render_dot, render_json};

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::account::{AccountId, AccountRecord};
use crate::cache::FileCache;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Edge {
    pub from: AccountId,
    pub to: AccountId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Graph {
    pub nodes: BTreeSet<AccountId>,
    pub edges: BTreeSet<Edge>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphOptions {
    pub include_followers: bool,
}

pub fn assemble(records: &[AccountRecord], options: &GraphOptions) -> Graph {
    // Collect the nodes first so edge checks can see every record
    let nodes: BTreeSet<AccountId> = records.iter().map(|r| r.username.clone()).collect();
    // A set, so an edge found twice is stored once
    let mut edges = BTreeSet::new();

    for record in records {
        // R follows u, so the edge runs u -> R
        for followed in record.following() {
            if followed != &record.username && nodes.contains(followed) {
                edges.insert(Edge {
                    from: followed.clone(),
                    to: record.username.clone(),
                });
            }
        }

        // v follows R: R -> v, the same direction as above
        if options.include_followers {
            for follower in record.followers() {
                if follower != &record.username && nodes.contains(follower) {
                    edges.insert(Edge {
                        from: record.username.clone(),
                        to: follower.clone(),
                    });
                }
            }
        }
    }

    Graph { nodes, edges }
}

/// Scans the cache and assembles it. Corrupt records are skipped (the scan
/// logs each one) and returned alongside the graph.
pub fn assemble_from(cache: &FileCache, options: &GraphOptions) -> Result<(Graph, Vec<PathBuf>)> {
    // Only an unreadable directory fails here; bad files end up in scan.corrupt
    let scan = cache.scan()?;
    Ok((assemble(&scan.records, options), scan.corrupt))
}
