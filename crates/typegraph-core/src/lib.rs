//! Type graph construction engine.
//!
//! The pipeline is:
//! 1. [`criteria`]: compile include/exclude patterns and decide inclusion
//! 2. [`discovery`]: create entities for the types of the root namespaces
//! 3. [`graph_builder`]: resolve field types, pulling in referenced types
//! 4. [`orphan`]: flag entities that take part in no edge
//!
//! Everything language specific sits behind [`provider::TypeProvider`].
pub mod criteria;
pub mod discovery;
pub mod graph_builder;
pub mod model;
pub mod orphan;
pub mod provider;
pub mod ty;

pub use criteria::{Criteria, CriteriaSet, Decision};
pub use discovery::discover_roots;
pub use graph_builder::{GraphBuilder, VisitState, build_type_graph, collect_edges};
pub use orphan::classify_orphans;
pub use model::{Edge, Entity, EntityId, EntityKind, Field, TypeGraph};
pub use provider::{Member, MemoryProvider, Shape, TypeDef, TypeProvider};
pub use ty::{ChanDir, NamedRef, TypeExpr};

pub use typegraph_error::{Error, ErrorKind, Result};
