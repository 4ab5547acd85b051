//! Serialising the surviving entities and edges.

use std::fmt::Write;

use serde::Serialize;

use typegraph_core::{Edge, Entity, EntityKind, Error, ErrorKind, Result, TypeGraph};

use crate::dot::{DotBuilder, escape_html};

const RECORD_HEADER: &str = "#e0e0ff";
const INTERFACE_HEADER: &str = "#e0ffe0";
const FIELD_CELL: &str = "#f0f0ff";

/// Description format written for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Dot,
    Json,
}

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Keep entities that take part in no edge.
    pub include_orphans: bool,
    /// Shown in the graph caption, usually the command line.
    pub title: Option<String>,
    /// Link attached to the graph caption in SVG output.
    pub url: Option<String>,
}

/// Render the graph as a Graphviz digraph. Each entity becomes a table with one
/// row per field; edges leave from the row of the referencing field.
pub fn render_dot(graph: &TypeGraph, options: &ExportOptions) -> String {
    let caption = match &options.title {
        Some(title) => format!("\nGenerated by typegraph: {title}"),
        None => "\nGenerated by typegraph".to_string(),
    };

    let mut graph_attrs = vec![
        ("rankdir", "LR"),
        ("label", caption.as_str()),
        ("labeljust", "l"),
        ("fontsize", "12"),
        ("fontname", "Helvetica"),
        ("bgcolor", "#f8f8f8"),
    ];
    if let Some(url) = &options.url {
        graph_attrs.push(("URL", url.as_str()));
    }

    let mut dot = DotBuilder::new("structDiagram");
    dot.graph_style(&graph_attrs)
        .node_style(&[
            ("fontname", "Helvetica"),
            ("fontsize", "12"),
            ("shape", "plaintext"),
        ])
        .edge_style(&[("arrowsize", "1.5")])
        .blank();

    for entity in graph.exported(options.include_orphans) {
        dot.html_node(
            &entity.full_name,
            &entity_table(entity),
            &[("tooltip", entity.full_name.as_str())],
        );
    }

    dot.blank();
    for edge in graph.edges() {
        dot.port_edge(&edge.from, &edge.field, &edge.to);
    }

    dot.build()
}

fn entity_table(entity: &Entity) -> String {
    let header = match entity.kind {
        EntityKind::Record => RECORD_HEADER,
        EntityKind::Interface => INTERFACE_HEADER,
    };

    let mut html = String::new();
    html.push_str(
        r##"<TABLE BORDER="0" CELLBORDER="1" CELLSPACING="0" CELLPADDING="2" BGCOLOR="#ffffff">"##,
    );
    let _ = write!(
        html,
        r#"<TR><TD COLSPAN="2" BGCOLOR="{header}" ALIGN="CENTER">{}.{} </TD></TR>"#,
        escape_html(entity.short_namespace()),
        escape_html(&entity.name)
    );
    for field in &entity.fields {
        let name = escape_html(&field.name);
        let _ = write!(
            html,
            r#"<TR><TD PORT="X{name}" BGCOLOR="{FIELD_CELL}" ALIGN="LEFT">{name} </TD><TD PORT="{name}" BGCOLOR="{FIELD_CELL}" ALIGN="LEFT">{} </TD></TR>"#,
            escape_html(&field.signature)
        );
    }
    html.push_str("</TABLE>");
    html
}

#[derive(Serialize)]
struct JsonGraph<'a> {
    entities: Vec<JsonEntity<'a>>,
    edges: &'a [Edge],
}

#[derive(Serialize)]
struct JsonEntity<'a> {
    full_name: &'a str,
    name: &'a str,
    namespace: &'a str,
    kind: EntityKind,
    depth: usize,
    orphan: bool,
    fields: Vec<JsonField<'a>>,
}

#[derive(Serialize)]
struct JsonField<'a> {
    name: &'a str,
    signature: &'a str,
    /// Full names of the entities the field resolves to.
    references: Vec<&'a str>,
}

impl<'a> JsonEntity<'a> {
    fn new(graph: &'a TypeGraph, entity: &'a Entity) -> Self {
        let fields = entity
            .fields
            .iter()
            .map(|field| JsonField {
                name: &field.name,
                signature: &field.signature,
                references: field
                    .references
                    .iter()
                    .map(|&id| graph.entity(id).full_name.as_str())
                    .collect(),
            })
            .collect();

        Self {
            full_name: &entity.full_name,
            name: &entity.name,
            namespace: &entity.namespace,
            kind: entity.kind,
            depth: entity.depth,
            orphan: entity.orphan,
            fields,
        }
    }
}

/// Render the exported entities and all edges as pretty-printed JSON. Each
/// field lists the entities it refers to, so the document reads without the
/// edge list.
pub fn render_json(graph: &TypeGraph, options: &ExportOptions) -> Result<String> {
    let doc = JsonGraph {
        entities: graph
            .exported(options.include_orphans)
            .map(|entity| JsonEntity::new(graph, entity))
            .collect(),
        edges: graph.edges(),
    };
    serde_json::to_string_pretty(&doc).map_err(|err| {
        Error::new(ErrorKind::SerializationFailed, err.to_string())
            .with_operation("export::json")
            .set_source(err)
    })
}
