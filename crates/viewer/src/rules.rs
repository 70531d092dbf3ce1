use std::collections::HashMap;

use connect::Connection;
use petgraph::Graph as PetGraph;
use petgraph::algo::has_path_connecting;
use petgraph::graph::NodeIndex;
use tracing::debug;

/// Rejects duplicate edges and edges that would close a cycle
pub fn is_valid_connection(candidate: &Connection, existing: &[Connection]) -> bool {
    if existing.contains(candidate) {
        debug!(source = %candidate.source, target = %candidate.target, "duplicate edge");
        return false;
    }

    let mut pg: PetGraph<&str, ()> = PetGraph::new();
    let mut indices: HashMap<&str, NodeIndex> = HashMap::new();
    let ids = existing
        .iter()
        .flat_map(|e| [e.source.as_str(), e.target.as_str()])
        .chain([candidate.source.as_str(), candidate.target.as_str()]);
    for id in ids {
        indices.entry(id).or_insert_with(|| pg.add_node(id));
    }
    for edge in existing {
        pg.add_edge(indices[edge.source.as_str()], indices[edge.target.as_str()], ());
    }
    let source = indices[candidate.source.as_str()];
    let target = indices[candidate.target.as_str()];

    // The new edge closes a cycle iff its target already reaches its source
    if has_path_connecting(&pg, target, source, None) {
        debug!(source = %candidate.source, target = %candidate.target, "edge would close a cycle");
        return false;
    }
    true
}
