//! Structured type expressions as reported by a type provider.

use std::fmt;

/// A reference to a named type: the namespace that defines it and its local name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamedRef {
    pub namespace: String,
    pub name: String,
}

impl NamedRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Globally unique key, e.g. `example.com/app/model.Order`.
    pub fn full_name(&self) -> String {
        full_name(&self.namespace, &self.name)
    }
}

impl fmt::Display for NamedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// Join a namespace and a local type name into an entity key.
pub fn full_name(namespace: &str, name: &str) -> String {
    format!("{namespace}.{name}")
}

/// Channel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// Normalised representation of a declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// A named type defined in some namespace.
    Named(NamedRef),
    /// A predeclared type (`int`, `string`, `error`) or a type parameter.
    Basic(String),
    Pointer(Box<TypeExpr>),
    Array(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Chan {
        dir: ChanDir,
        elem: Box<TypeExpr>,
    },
    /// Function or method signature. Never forms a reference.
    Func,
    /// Anonymous struct literal type.
    Struct,
    /// Anonymous interface literal type.
    Interface,
    /// Anything the provider could not resolve, kept as source text.
    Unresolved(String),
}

impl TypeExpr {
    pub fn named(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TypeExpr::Named(NamedRef::new(namespace, name))
    }

    pub fn basic(name: impl Into<String>) -> Self {
        TypeExpr::Basic(name.into())
    }

    pub fn pointer(inner: TypeExpr) -> Self {
        TypeExpr::Pointer(Box::new(inner))
    }

    pub fn slice(elem: TypeExpr) -> Self {
        TypeExpr::Slice(Box::new(elem))
    }

    pub fn array(elem: TypeExpr) -> Self {
        TypeExpr::Array(Box::new(elem))
    }

    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn chan(dir: ChanDir, elem: TypeExpr) -> Self {
        TypeExpr::Chan {
            dir,
            elem: Box::new(elem),
        }
    }

    /// Named types reachable by unwrapping pointers, arrays, slices, maps and
    /// channels. `[]*time.Time` yields `time.Time`; `map[K]V` yields `K` then `V`.
    pub fn named_types(&self) -> Vec<&NamedRef> {
        let mut out = Vec::new();
        self.collect_named(&mut out);
        out
    }

    fn collect_named<'a>(&'a self, out: &mut Vec<&'a NamedRef>) {
        match self {
            TypeExpr::Named(named) => out.push(named),
            TypeExpr::Pointer(inner)
            | TypeExpr::Array(inner)
            | TypeExpr::Slice(inner)
            | TypeExpr::Chan { elem: inner, .. } => inner.collect_named(out),
            TypeExpr::Map { key, value } => {
                key.collect_named(out);
                value.collect_named(out);
            }
            TypeExpr::Basic(_)
            | TypeExpr::Func
            | TypeExpr::Struct
            | TypeExpr::Interface
            | TypeExpr::Unresolved(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(ty: &TypeExpr) -> Vec<String> {
        ty.named_types().iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_named_is_returned_directly() {
        let ty = TypeExpr::named("app", "Customer");
        assert_eq!(names(&ty), vec!["app.Customer"]);
    }

    #[test]
    fn test_wrappers_are_unwrapped() {
        let ty = TypeExpr::slice(TypeExpr::pointer(TypeExpr::named("time", "Time")));
        assert_eq!(names(&ty), vec!["time.Time"]);

        let ty = TypeExpr::chan(
            ChanDir::Recv,
            TypeExpr::array(TypeExpr::named("app", "Event")),
        );
        assert_eq!(names(&ty), vec!["app.Event"]);
    }

    #[test]
    fn test_map_contributes_key_and_value() {
        let ty = TypeExpr::map(
            TypeExpr::named("time", "Time"),
            TypeExpr::slice(TypeExpr::named("time", "Duration")),
        );
        assert_eq!(names(&ty), vec!["time.Time", "time.Duration"]);
    }

    #[test]
    fn test_unnamed_types_contribute_nothing() {
        assert!(TypeExpr::basic("string").named_types().is_empty());
        assert!(TypeExpr::pointer(TypeExpr::Func).named_types().is_empty());
        assert!(TypeExpr::slice(TypeExpr::Struct).named_types().is_empty());
        assert!(TypeExpr::Unresolved("x.Y".into()).named_types().is_empty());
        assert!(
            TypeExpr::map(TypeExpr::basic("string"), TypeExpr::Interface)
                .named_types()
                .is_empty()
        );
    }

    #[test]
    fn test_full_name() {
        let named = NamedRef::new("example.com/app/model", "Order");
        assert_eq!(named.full_name(), "example.com/app/model.Order");
    }
}
