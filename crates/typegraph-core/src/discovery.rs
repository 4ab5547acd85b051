//! Seed the graph with the types of the root namespaces.

use tracing::{debug, info};

use crate::criteria::CriteriaSet;
use crate::model::{EntityId, TypeGraph};
use crate::provider::TypeProvider;

/// Create a depth-0 entity for every included top-level type of every root
/// namespace. Field references are left empty; they are filled in by the
/// graph builder. Returns the ids of the created entities in order.
pub fn discover_roots<P>(provider: &P, criteria: &CriteriaSet, graph: &mut TypeGraph) -> Vec<EntityId>
where
    P: TypeProvider + ?Sized,
{
    let mut seeds = Vec::new();

    for namespace in provider.root_namespaces() {
        let defs = provider.top_level_types(namespace);
        info!(namespace = %namespace, types = defs.len(), "scanning namespace");

        for def in defs {
            if !criteria.decide(&def.namespace, &def.name).is_included() {
                debug!(namespace = %def.namespace, name = %def.name, "skipped");
                continue;
            }
            if graph.id_of(&def.named_ref().full_name()).is_some() {
                continue;
            }
            seeds.push(graph.insert(def, 0));
        }
    }

    seeds
}
