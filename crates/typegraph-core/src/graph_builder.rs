//! Resolve field types into references, discovering referenced types as we go.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Instant;

use tracing::{debug, info};

use crate::Result;
use crate::criteria::CriteriaSet;
use crate::discovery::discover_roots;
use crate::model::{Edge, EntityId, EntityKind, TypeGraph};
use crate::orphan::classify_orphans;
use crate::provider::TypeProvider;
use crate::ty::NamedRef;
use typegraph_error::Error;

/// Resolution state of an entity. Entities not yet in the state map are unvisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitState {
    /// Fields are being resolved.
    InProgress,
    /// Fields resolved. Terminal.
    Resolved,
}

pub struct GraphBuilder<'a, P: TypeProvider + ?Sized> {
    provider: &'a P,
    criteria: &'a CriteriaSet,
    graph: TypeGraph,
    states: HashMap<String, VisitState>,
    /// Keys that were looked up once and did not produce an entity.
    rejected: HashSet<String>,
}

impl<'a, P: TypeProvider + ?Sized> GraphBuilder<'a, P> {
    pub fn new(provider: &'a P, criteria: &'a CriteriaSet) -> Self {
        Self {
            provider,
            criteria,
            graph: TypeGraph::new(),
            states: HashMap::new(),
            rejected: HashSet::new(),
        }
    }

    /// Discover the root namespace types. Returns the seed entities.
    pub fn discover(&mut self) -> Vec<EntityId> {
        discover_roots(self.provider, self.criteria, &mut self.graph)
    }

    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    pub fn state(&self, full_name: &str) -> Option<VisitState> {
        self.states.get(full_name).copied()
    }

    /// Resolve the fields of `seeds` and of every entity discovered through them.
    ///
    /// Work is driven by a queue instead of recursion. An entity enters the state
    /// map as `InProgress` before its fields are looked at, so each entity is
    /// resolved at most once and cyclic type graphs terminate.
    pub fn resolve<I>(&mut self, seeds: I)
    where
        I: IntoIterator<Item = EntityId>,
    {
        let mut queue: VecDeque<EntityId> = seeds.into_iter().collect();

        while let Some(id) = queue.pop_front() {
            let key = self.graph.entity(id).full_name.clone();
            if self.states.contains_key(&key) {
                continue;
            }
            self.states.insert(key.clone(), VisitState::InProgress);

            // Interface methods are display only.
            if self.graph.entity(id).kind == EntityKind::Record {
                self.resolve_fields(id, &mut queue);
            }

            self.states.insert(key, VisitState::Resolved);
        }
    }

    fn resolve_fields(&mut self, id: EntityId, queue: &mut VecDeque<EntityId>) {
        let depth = self.graph.entity(id).depth + 1;
        let targets: Vec<Vec<NamedRef>> = self
            .graph
            .entity(id)
            .fields
            .iter()
            .map(|f| f.ty.named_types().into_iter().cloned().collect())
            .collect();

        for (index, names) in targets.into_iter().enumerate() {
            let mut references = Vec::new();
            for named in &names {
                let Some(target) = self.lookup_or_discover(named, depth, queue) else {
                    continue;
                };
                if !references.contains(&target) {
                    references.push(target);
                }
            }
            self.graph.entity_mut(id).fields[index].references = references;
        }
    }

    fn lookup_or_discover(
        &mut self,
        named: &NamedRef,
        depth: usize,
        queue: &mut VecDeque<EntityId>,
    ) -> Option<EntityId> {
        let key = named.full_name();
        if let Some(id) = self.graph.id_of(&key) {
            return Some(id);
        }
        if self.rejected.contains(&key) {
            return None;
        }

        if !self
            .criteria
            .decide(&named.namespace, &named.name)
            .is_included()
        {
            self.rejected.insert(key);
            return None;
        }

        let Some(def) = self.provider.definition(named) else {
            debug!(name = %key, "no record or interface definition");
            self.rejected.insert(key);
            return None;
        };

        let id = self.graph.insert(def, depth);
        debug!(name = %key, depth, "discovered through reference");
        queue.push_back(id);
        Some(id)
    }

    /// Derive the edges, flag orphans and hand back the finished graph.
    pub fn finish(mut self) -> TypeGraph {
        let edges = collect_edges(&self.graph);
        self.graph.set_edges(edges);
        classify_orphans(&mut self.graph);
        self.graph
    }
}

/// One edge per (field, referenced entity), in entity then field order.
pub fn collect_edges(graph: &TypeGraph) -> Vec<Edge> {
    let mut edges = Vec::new();
    for entity in graph.entities() {
        for field in &entity.fields {
            for &target in &field.references {
                edges.push(Edge::new(
                    entity.full_name.clone(),
                    field.name.clone(),
                    graph.entity(target).full_name.clone(),
                ));
            }
        }
    }
    edges
}

/// Run discovery, resolution and orphan classification.
///
/// Fails with `EmptyGraph` when no root type survives the criteria.
pub fn build_type_graph<P>(provider: &P, criteria: &CriteriaSet) -> Result<TypeGraph>
where
    P: TypeProvider + ?Sized,
{
    let start = Instant::now();
    let mut builder = GraphBuilder::new(provider, criteria);

    let seeds = builder.discover();
    if seeds.is_empty() {
        return Err(Error::empty_graph("no types to draw")
            .with_operation("graph::build")
            .with_context("namespaces", provider.root_namespaces().join(" ")));
    }

    builder.resolve(seeds);
    let graph = builder.finish();

    info!(
        entities = graph.len(),
        edges = graph.edges().len(),
        orphans = graph.orphans().count(),
        "Graph building: {:.2}s",
        start.elapsed().as_secs_f64()
    );

    Ok(graph)
}
