//! Orphan classification.

use std::collections::HashSet;

use crate::model::TypeGraph;

/// Flag every entity that is neither the source nor the target of an edge.
/// Returns the number of orphans.
pub fn classify_orphans(graph: &mut TypeGraph) -> usize {
    let connected: HashSet<String> = graph
        .edges()
        .iter()
        .flat_map(|e| [e.from.clone(), e.to.clone()])
        .collect();

    let mut count = 0;
    for entity in graph.entities_mut() {
        entity.orphan = !connected.contains(&entity.full_name);
        if entity.orphan {
            count += 1;
        }
    }
    count
}
