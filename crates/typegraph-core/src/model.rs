//! Entities, fields and edges of the type graph.

use std::collections::HashMap;

use serde::Serialize;

use crate::provider::{Shape, TypeDef};
use crate::ty::{TypeExpr, full_name};

/// Index of an entity inside its [`TypeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    Record,
    Interface,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub signature: String,
    pub ty: TypeExpr,
    /// Entities this field's type resolves to. A map field can reach two.
    pub references: Vec<EntityId>,
}

impl Field {
    /// The first entity this field refers to.
    pub fn reference(&self) -> Option<EntityId> {
        self.references.first().copied()
    }
}

/// A discovered record or interface type.
#[derive(Debug, Clone)]
pub struct Entity {
    pub full_name: String,
    pub name: String,
    pub namespace: String,
    pub kind: EntityKind,
    pub fields: Vec<Field>,
    /// Number of reference hops from a root namespace type.
    pub depth: usize,
    pub orphan: bool,
}

impl Entity {
    pub fn from_def(def: TypeDef, depth: usize) -> Self {
        let (kind, members) = match def.shape {
            Shape::Record(members) => (EntityKind::Record, members),
            Shape::Interface(members) => (EntityKind::Interface, members),
        };
        let fields = members
            .into_iter()
            .map(|m| Field {
                name: m.name,
                signature: m.signature,
                ty: m.ty,
                references: Vec::new(),
            })
            .collect();

        Self {
            full_name: full_name(&def.namespace, &def.name),
            name: def.name,
            namespace: def.namespace,
            kind,
            fields,
            depth,
            orphan: false,
        }
    }

    /// Last segment of the namespace, e.g. `model` for `example.com/app/model`.
    pub fn short_namespace(&self) -> &str {
        self.namespace
            .rsplit('/')
            .next()
            .unwrap_or(&self.namespace)
    }
}

/// A directed reference from a field of one entity to another entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    pub from: String,
    pub field: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, field: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            field: field.into(),
            to: to.into(),
        }
    }
}

/// All entities of a run, in discovery order, plus the derived edges.
#[derive(Debug, Default)]
pub struct TypeGraph {
    entities: Vec<Entity>,
    index: HashMap<String, EntityId>,
    edges: Vec<Edge>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity for `def`. A key that is already known is left untouched
    /// and its existing id returned.
    pub fn insert(&mut self, def: TypeDef, depth: usize) -> EntityId {
        let key = full_name(&def.namespace, &def.name);
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = EntityId(self.entities.len());
        self.entities.push(Entity::from_def(def, depth));
        self.index.insert(key, id);
        id
    }

    pub fn id_of(&self, full_name: &str) -> Option<EntityId> {
        self.index.get(full_name).copied()
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.0]
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.0]
    }

    pub fn get(&self, full_name: &str) -> Option<&Entity> {
        self.id_of(full_name).map(|id| self.entity(id))
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub(crate) fn set_edges(&mut self, edges: Vec<Edge>) {
        self.edges = edges;
    }

    pub(crate) fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn orphans(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.orphan)
    }

    /// Entities that go into the exported diagram.
    pub fn exported(&self, include_orphans: bool) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(move |e| include_orphans || !e.orphan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Member;

    fn def(namespace: &str, name: &str) -> TypeDef {
        TypeDef {
            namespace: namespace.to_string(),
            name: name.to_string(),
            shape: Shape::Record(vec![Member::new(
                "Name",
                "string",
                TypeExpr::basic("string"),
            )]),
        }
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut graph = TypeGraph::new();
        let first = graph.insert(def("app", "Customer"), 0);
        let again = graph.insert(def("app", "Customer"), 3);

        assert_eq!(first, again);
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.entity(first).depth, 0);
        assert_eq!(graph.get("app.Customer").unwrap().fields[0].name, "Name");
    }

    #[test]
    fn test_short_namespace() {
        let mut graph = TypeGraph::new();
        let id = graph.insert(def("example.com/app/model", "Order"), 0);
        assert_eq!(graph.entity(id).short_namespace(), "model");
        assert_eq!(graph.entity(id).full_name, "example.com/app/model.Order");

        let id = graph.insert(def("app", "Order"), 0);
        assert_eq!(graph.entity(id).short_namespace(), "app");
    }
}
