//! The type introspection seam.
//!
//! A provider exposes the top-level type definitions of a loaded program and
//! resolves named type references back to their definitions. The graph engine
//! only ever talks to this trait.

use std::collections::HashMap;

use crate::ty::{NamedRef, TypeExpr};

/// One field of a record or one method of an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    /// Human readable type, e.g. `[]*pkg2.Address` or `func(ctx context.Context) error`.
    pub signature: String,
    pub ty: TypeExpr,
}

impl Member {
    pub fn new(name: impl Into<String>, signature: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            signature: signature.into(),
            ty,
        }
    }
}

/// Structural description of a type definition, members in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Record(Vec<Member>),
    Interface(Vec<Member>),
}

impl Shape {
    pub fn members(&self) -> &[Member] {
        match self {
            Shape::Record(members) | Shape::Interface(members) => members,
        }
    }
}

/// A top-level type definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub namespace: String,
    pub name: String,
    pub shape: Shape,
}

impl TypeDef {
    pub fn named_ref(&self) -> NamedRef {
        NamedRef::new(self.namespace.clone(), self.name.clone())
    }
}

pub trait TypeProvider {
    /// Canonical names of the namespaces requested as scan roots.
    fn root_namespaces(&self) -> &[String];

    /// Type definitions declared at namespace scope, in a stable order.
    /// Definitions local to a function body are never reported.
    fn top_level_types(&self, namespace: &str) -> Vec<TypeDef>;

    /// Resolve a named type reference to its definition, if it is a record or
    /// interface the provider knows about.
    fn definition(&self, named: &NamedRef) -> Option<TypeDef>;
}

/// A provider over type definitions held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    roots: Vec<String>,
    namespaces: HashMap<String, Vec<TypeDef>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a namespace as a scan root.
    pub fn with_root(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespaces.entry(namespace.clone()).or_default();
        self.roots.push(namespace);
        self
    }

    /// Add a record type with its fields in declaration order.
    pub fn record<I>(self, namespace: &str, name: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = Member>,
    {
        self.define(namespace, name, Shape::Record(fields.into_iter().collect()))
    }

    pub fn interface<I>(self, namespace: &str, name: &str, methods: I) -> Self
    where
        I: IntoIterator<Item = Member>,
    {
        self.define(
            namespace,
            name,
            Shape::Interface(methods.into_iter().collect()),
        )
    }

    /// Add a definition. A repeated name keeps the first definition.
    pub fn define(mut self, namespace: &str, name: &str, shape: Shape) -> Self {
        let defs = self.namespaces.entry(namespace.to_string()).or_default();
        if !defs.iter().any(|d| d.name == name) {
            defs.push(TypeDef {
                namespace: namespace.to_string(),
                name: name.to_string(),
                shape,
            });
        }
        self
    }
}

impl TypeProvider for MemoryProvider {
    fn root_namespaces(&self) -> &[String] {
        &self.roots
    }

    fn top_level_types(&self, namespace: &str) -> Vec<TypeDef> {
        self.namespaces.get(namespace).cloned().unwrap_or_default()
    }

    fn definition(&self, named: &NamedRef) -> Option<TypeDef> {
        self.namespaces
            .get(&named.namespace)?
            .iter()
            .find(|d| d.name == named.name)
            .cloned()
    }
}
