// src/graph/render.rs
// Serializers for an assembled graph: plain JSON and Graphviz DOT.

use std::fmt::Write;

use super::Graph;

/// `{"nodes": [...], "edges": [{"from": .., "to": ..}]}`, pretty-printed.
pub fn render_json(graph: &Graph) -> serde_json::Result<String> {
    serde_json::to_string_pretty(graph)
}

pub fn render_dot(graph: &Graph) -> String {
    let mut out = String::from("digraph follows {\n");

    // Account ids are [a-z0-9_] only, so quoting is enough
    for node in &graph.nodes {
        let _ = writeln!(out, "  \"{}\";", node);
    }
    for edge in &graph.edges {
        let _ = writeln!(out, "  \"{}\" -> \"{}\";", edge.from, edge.to);
    }

    out.push_str("}\n");
    out
}
