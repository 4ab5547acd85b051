use pretty_assertions::assert_eq;

use typegraph_core::{
    CriteriaSet, Member, MemoryProvider, TypeExpr, TypeGraph, TypeProvider, build_type_graph,
};
use typegraph_dot::{ExportOptions, render_dot, render_json};

fn shop_graph() -> TypeGraph {
    let provider = MemoryProvider::new()
        .with_root("example.com/app")
        .record(
            "example.com/app",
            "Order",
            [
                Member::new("Customer", "*Customer", TypeExpr::pointer(TypeExpr::named("example.com/app", "Customer"))),
                Member::new("Tags", "map[string]<-chan int", TypeExpr::map(TypeExpr::basic("string"), TypeExpr::basic("int"))),
            ],
        )
        .record(
            "example.com/app",
            "Customer",
            [Member::new("Name", "string", TypeExpr::basic("string"))],
        )
        .interface(
            "example.com/app",
            "Store",
            [Member::new("Load", "func(id string) error", TypeExpr::Func)],
        );
    let criteria = CriteriaSet::new().with_roots(provider.root_namespaces().to_vec());
    build_type_graph(&provider, &criteria).unwrap()
}

#[test]
fn dot_contains_tables_and_port_edges() {
    let graph = shop_graph();
    let dot = render_dot(
        &graph,
        &ExportOptions {
            include_orphans: false,
            title: Some("./app".to_string()),
            url: None,
        },
    );

    assert!(dot.starts_with("digraph \"structDiagram\" {\n"));
    assert!(dot.ends_with("}\n"));
    assert!(dot.contains("label=\"\\nGenerated by typegraph: ./app\""));
    assert!(!dot.contains("URL="));
    assert!(dot.contains("\"example.com/app.Order\" [label=<"));
    assert!(dot.contains(">app.Order </TD>"));
    assert!(dot.contains(r##"<TD PORT="Customer" BGCOLOR="#f0f0ff" ALIGN="LEFT">*Customer </TD>"##));
    assert!(dot.contains("map[string]&lt;-chan int"));
    assert!(dot.contains("\"example.com/app.Order\":\"Customer\" -> \"example.com/app.Customer\";"));
    // Store is an orphan and left out by default.
    assert!(!dot.contains("example.com/app.Store"));
}

#[test]
fn dot_keeps_orphans_on_request() {
    let graph = shop_graph();
    let dot = render_dot(
        &graph,
        &ExportOptions {
            include_orphans: true,
            title: None,
            url: Some("https://example.com/app".to_string()),
        },
    );

    assert!(dot.contains("URL=\"https://example.com/app\""));
    assert!(dot.contains("label=\"\\nGenerated by typegraph\""));
    assert!(dot.contains("\"example.com/app.Store\" [label=<"));
    assert!(dot.contains("BGCOLOR=\"#e0ffe0\" ALIGN=\"CENTER\">app.Store </TD>"));
}

#[test]
fn json_lists_exported_entities_and_edges() {
    let graph = shop_graph();
    let json = render_json(&graph, &ExportOptions::default()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let names: Vec<&str> = value["entities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["full_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["example.com/app.Order", "example.com/app.Customer"]);

    assert_eq!(value["entities"][0]["kind"], "Record");
    assert_eq!(value["entities"][0]["fields"][0]["signature"], "*Customer");
    assert_eq!(value["entities"][0]["orphan"], false);
    assert_eq!(
        value["entities"][0]["fields"][0]["references"],
        serde_json::json!(["example.com/app.Customer"])
    );
    assert_eq!(
        value["entities"][0]["fields"][1]["references"],
        serde_json::json!([])
    );
    assert_eq!(
        value["edges"],
        serde_json::json!([{
            "from": "example.com/app.Order",
            "field": "Customer",
            "to": "example.com/app.Customer",
        }])
    );

    let with_orphans = render_json(
        &graph,
        &ExportOptions {
            include_orphans: true,
            ..ExportOptions::default()
        },
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&with_orphans).unwrap();
    assert_eq!(value["entities"].as_array().unwrap().len(), 3);
    assert_eq!(value["entities"][2]["orphan"], true);
}
