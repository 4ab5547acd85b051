use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use typegraph_core::{
    CriteriaSet, Edge, ErrorKind, NamedRef, Shape, TypeProvider, build_type_graph,
};
use typegraph_go::{GoModule, GoProgram};

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn fixture() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write(root, "go.mod", "module example.com/shop\n\ngo 1.22\n");
    write(
        root,
        "pkg1/shipment.go",
        r#"
package pkg1

import (
    "time"

    "example.com/shop/pkg2"
)

type Shipment struct {
    Dest    pkg2.Address
    Sent    time.Time
    Parcels []*Parcel
}

type Parcel struct {
    Weight float64
}

type Tracked Shipment

func helper() {
    type scratch struct{ N int }
}
"#,
    );
    write(
        root,
        "pkg1/secret.go",
        r#"
package pkg1

type Secret struct{}
"#,
    );
    write(
        root,
        "pkg1/shipment_test.go",
        r#"
package pkg1

type TestOnly struct{}
"#,
    );
    write(
        root,
        "pkg2/address.go",
        r#"
package pkg2

type Address struct {
    Line1 string
}
"#,
    );
    dir
}

fn load(dir: &TempDir, roots: &[&str]) -> GoProgram {
    let module = GoModule::discover(dir.path())
        .unwrap()
        .with_goroot(None)
        .with_mod_cache(None);
    let roots: Vec<String> = roots.iter().map(|r| r.to_string()).collect();
    GoProgram::load_from(&module, dir.path(), &roots).expect("load")
}

#[test]
fn discovers_module_from_subdirectory() {
    let dir = fixture();
    let module = GoModule::discover(dir.path().join("pkg1")).unwrap();
    assert_eq!(module.path, "example.com/shop");
    assert_eq!(module.root, fs::canonicalize(dir.path()).unwrap());
}

#[test]
fn lists_top_level_types_in_file_order() {
    let dir = fixture();
    let program = load(&dir, &["./pkg1"]);

    assert_eq!(program.root_namespaces(), &["example.com/shop/pkg1".to_string()]);

    let names: Vec<String> = program
        .top_level_types("example.com/shop/pkg1")
        .into_iter()
        .map(|d| d.name)
        .collect();
    // secret.go sorts before shipment.go; test files and function-local types are skipped.
    assert_eq!(names, vec!["Secret", "Shipment", "Parcel", "Tracked"]);
}

#[test]
fn defined_type_takes_underlying_fields() {
    let dir = fixture();
    let program = load(&dir, &["./pkg1"]);

    let tracked = program
        .definition(&NamedRef::new("example.com/shop/pkg1", "Tracked"))
        .expect("Tracked");
    let Shape::Record(fields) = tracked.shape else {
        panic!("expected record");
    };
    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Dest", "Sent", "Parcels"]);
}

#[test]
fn imported_packages_are_loaded() {
    let dir = fixture();
    let program = load(&dir, &["example.com/shop/pkg1"]);

    let pkg2 = program.package("example.com/shop/pkg2").expect("pkg2 loaded");
    assert_eq!(pkg2.name, "pkg2");
    assert!(program.package("time").is_none());

    let address = program
        .definition(&NamedRef::new("example.com/shop/pkg2", "Address"))
        .expect("Address");
    assert_eq!(address.shape.members()[0].signature, "string");
}

#[test]
fn inclusion_rule_reaches_other_package() {
    let dir = fixture();
    let program = load(&dir, &["./pkg1"]);
    let criteria = CriteriaSet::from_patterns(["example.com/shop/pkg2:.*"], ["example.com/shop/pkg1:Secret"])
        .unwrap()
        .with_roots(program.root_namespaces().to_vec());

    let graph = build_type_graph(&program, &criteria).unwrap();

    assert!(graph.get("example.com/shop/pkg1.Secret").is_none());
    assert_eq!(graph.get("example.com/shop/pkg2.Address").unwrap().depth, 1);
    assert_eq!(
        graph.edges(),
        &[
            Edge::new("example.com/shop/pkg1.Shipment", "Dest", "example.com/shop/pkg2.Address"),
            Edge::new("example.com/shop/pkg1.Shipment", "Parcels", "example.com/shop/pkg1.Parcel"),
            Edge::new("example.com/shop/pkg1.Tracked", "Dest", "example.com/shop/pkg2.Address"),
            Edge::new("example.com/shop/pkg1.Tracked", "Parcels", "example.com/shop/pkg1.Parcel"),
        ]
    );
}

#[test]
fn unknown_root_fails_to_load() {
    let dir = fixture();
    let module = GoModule::discover(dir.path())
        .unwrap()
        .with_goroot(None)
        .with_mod_cache(None);

    let err = GoProgram::load_from(&module, dir.path(), &["example.com/shop/missing".to_string()])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LoadFailed);
    assert_eq!(err.context_value("namespace"), Some("example.com/shop/missing"));

    let err = GoProgram::load_from(&module, dir.path(), &["./nowhere".to_string()]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LoadFailed);
}

#[test]
fn root_without_go_files_fails_to_load() {
    let dir = fixture();
    fs::create_dir_all(dir.path().join("empty")).unwrap();
    let module = GoModule::discover(dir.path())
        .unwrap()
        .with_goroot(None)
        .with_mod_cache(None);

    let err = GoProgram::load_from(&module, dir.path(), &["./empty".to_string()]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LoadFailed);
    assert_eq!(err.context_value("namespace"), Some("example.com/shop/empty"));
}

#[test]
fn missing_go_mod_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = GoModule::discover(dir.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LoadFailed);
}

#[test]
fn ignored_generator_does_not_hide_package() {
    let dir = fixture();
    write(
        dir.path(),
        "model/gen.go",
        r#"//go:build ignore

package main

type Generator struct{}
"#,
    );
    write(
        dir.path(),
        "model/types.go",
        r#"
package model

type Order struct {
    ID string
}
"#,
    );
    let program = load(&dir, &["./model"]);

    let model = program.package("example.com/shop/model").expect("model");
    assert_eq!(model.name, "model");
    let names: Vec<String> = program
        .top_level_types("example.com/shop/model")
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names, vec!["Order"]);
}

#[test]
fn package_named_after_directory_wins() {
    let dir = fixture();
    // A stray file with another package clause sorts first.
    write(dir.path(), "store/a_tool.go", "package tool

type Tool struct{}
");
    write(dir.path(), "store/store.go", "package store

type Shelf struct{}
");
    let program = load(&dir, &["./store"]);

    let store = program.package("example.com/shop/store").expect("store");
    assert_eq!(store.name, "store");
    let names: Vec<String> = store.specs().iter().map(|s| s.name.clone()).collect();
    assert_eq!(names, vec!["Shelf"]);
}

#[test]
fn majority_package_name_wins() {
    let dir = fixture();
    write(dir.path(), "cmd/a.go", "package helper

type A struct{}
");
    write(dir.path(), "cmd/b.go", "package main

type B struct{}
");
    write(dir.path(), "cmd/c.go", "package main

type C struct{}
");
    let program = load(&dir, &["./cmd"]);

    let cmd = program.package("example.com/shop/cmd").expect("cmd");
    assert_eq!(cmd.name, "main");
    let names: Vec<String> = cmd.specs().iter().map(|s| s.name.clone()).collect();
    assert_eq!(names, vec!["B", "C"]);
}

#[test]
fn standard_library_root_resolves_under_goroot() {
    let dir = fixture();
    let goroot = tempfile::tempdir().unwrap();
    write(
        goroot.path(),
        "src/go/types/object.go",
        r#"
package types

type object struct {
    parent *Scope
    name   string
}

type Scope struct {
    parent *Scope
}
"#,
    );
    let module = GoModule::discover(dir.path())
        .unwrap()
        .with_goroot(Some(goroot.path().to_path_buf()))
        .with_mod_cache(None);
    let program = GoProgram::load_from(&module, dir.path(), &["go/types".to_string()]).unwrap();

    assert_eq!(program.root_namespaces(), &["go/types".to_string()]);
    let criteria = CriteriaSet::new().with_roots(program.root_namespaces().to_vec());
    let graph = build_type_graph(&program, &criteria).unwrap();
    assert_eq!(
        graph.edges(),
        &[
            Edge::new("go/types.object", "parent", "go/types.Scope"),
            Edge::new("go/types.Scope", "parent", "go/types.Scope"),
        ]
    );
}

#[test]
fn required_module_resolves_from_module_cache() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "go.mod",
        "module example.com/depot\n\ngo 1.22\n\nrequire github.com/Acme/widgets v1.2.0\n",
    );
    write(
        dir.path(),
        "app/app.go",
        r#"
package app

import "github.com/Acme/widgets/part"

type Bin struct {
    Parts []part.Part
}
"#,
    );
    let cache = tempfile::tempdir().unwrap();
    write(
        cache.path(),
        "github.com/!acme/widgets@v1.2.0/part/part.go",
        "package part\n\ntype Part struct {\n    Sku string\n}\n",
    );

    let module = GoModule::discover(dir.path())
        .unwrap()
        .with_goroot(None)
        .with_mod_cache(Some(cache.path().to_path_buf()));
    let program = GoProgram::load_from(&module, dir.path(), &["./app".to_string()]).unwrap();
    assert!(program.package("github.com/Acme/widgets/part").is_some());

    let criteria = CriteriaSet::from_patterns(["github.com/Acme/widgets/part:.*"], Vec::<&str>::new())
        .unwrap()
        .with_roots(program.root_namespaces().to_vec());
    let graph = build_type_graph(&program, &criteria).unwrap();
    assert_eq!(
        graph.edges(),
        &[Edge::new("example.com/depot/app.Bin", "Parts", "github.com/Acme/widgets/part.Part")]
    );
}
