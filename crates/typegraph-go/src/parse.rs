//! Extract package clauses, imports and type declarations from Go source.

use std::collections::{HashMap, HashSet};

use tree_sitter::{Node, Parser, Tree};

use typegraph_core::{ChanDir, Error, ErrorKind, Member, NamedRef, Result, TypeExpr};

/// Identifiers the Go universe scope predeclares as types.
const PREDECLARED: &[&str] = &[
    "any", "bool", "byte", "comparable", "complex64", "complex128", "error", "float32",
    "float64", "int", "int8", "int16", "int32", "int64", "rune", "string", "uint", "uint8",
    "uint16", "uint32", "uint64", "uintptr",
];

pub fn is_predeclared(name: &str) -> bool {
    PREDECLARED.contains(&name)
}

/// True when a build constraint in the file header carries the `ignore` tag,
/// as generator scripts kept next to a package do (`//go:build ignore`).
pub fn is_build_ignored(source: &[u8]) -> bool {
    let text = String::from_utf8_lossy(source);
    for line in text.lines() {
        let line = line.trim();
        if line.starts_with("package ") {
            break;
        }
        let Some(expr) = line
            .strip_prefix("//go:build")
            .or_else(|| line.strip_prefix("// +build"))
        else {
            continue;
        };
        if expr
            .split(|c: char| c.is_whitespace() || "()|&,".contains(c))
            .any(|tag| tag == "ignore")
        {
            return true;
        }
    }
    false
}

/// Create a parser for Go.
pub fn go_parser() -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|err| {
            Error::new(ErrorKind::ParseFailed, err.to_string())
                .with_operation("go::parser")
                .set_source(err)
        })?;
    Ok(parser)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Explicit name, including `.` and `_`.
    pub alias: Option<String>,
    pub path: String,
}

/// Shape of a top-level type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecShape {
    Record(Vec<Member>),
    Interface(Vec<Member>),
    /// `type T Other`: the underlying type is whatever `Other`'s is.
    Defined(NamedRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoTypeSpec {
    pub name: String,
    pub shape: SpecShape,
}

/// A parsed Go file.
pub struct SourceFile {
    pub path: String,
    pub package: String,
    pub imports: Vec<Import>,
    source: Vec<u8>,
    tree: Tree,
}

impl SourceFile {
    pub fn parse(parser: &mut Parser, path: impl Into<String>, source: Vec<u8>) -> Result<Self> {
        let path = path.into();
        let Some(tree) = parser.parse(&source, None) else {
            return Err(Error::parse_failed("tree-sitter returned no tree")
                .with_operation("go::parse_file")
                .with_context("path", path));
        };

        let root = tree.root_node();
        let mut package = String::new();
        let mut imports = Vec::new();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_clause" => {
                    let mut inner = child.walk();
                    if let Some(name) = child
                        .named_children(&mut inner)
                        .find(|n| n.kind() == "package_identifier")
                    {
                        package = node_text(name, &source).to_string();
                    }
                }
                "import_declaration" => collect_imports(child, &source, &mut imports),
                _ => {}
            }
        }
        drop(cursor);

        if package.is_empty() {
            return Err(Error::parse_failed("missing package clause")
                .with_operation("go::parse_file")
                .with_context("path", path));
        }

        Ok(Self {
            path,
            package,
            imports,
            source,
            tree,
        })
    }

    pub fn has_syntax_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Top-level struct, interface and defined types of this file.
    ///
    /// `qualifiers` maps the names imported packages are referred to by in this
    /// file to their import paths.
    pub fn type_specs(&self, namespace: &str, qualifiers: &HashMap<String, String>) -> Vec<GoTypeSpec> {
        let root = self.tree.root_node();
        let mut specs = Vec::new();
        let mut cursor = root.walk();
        for decl in root.named_children(&mut cursor) {
            if decl.kind() != "type_declaration" {
                continue;
            }
            let mut inner = decl.walk();
            for spec in decl.named_children(&mut inner) {
                // Aliases (`type A = B`) and other kinds are not definitions.
                if spec.kind() != "type_spec" {
                    continue;
                }
                let scope = TypeScope {
                    source: &self.source,
                    namespace,
                    qualifiers,
                    type_params: type_params(spec, &self.source),
                };
                if let Some(parsed) = scope.type_spec(spec) {
                    specs.push(parsed);
                }
            }
        }
        specs
    }
}

fn collect_imports(node: Node, source: &[u8], out: &mut Vec<Import>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "import_spec" => {
                let Some(path) = child.child_by_field_name("path") else {
                    continue;
                };
                out.push(Import {
                    alias: child
                        .child_by_field_name("name")
                        .map(|n| node_text(n, source).to_string()),
                    path: node_text(path, source)
                        .trim_matches(|c| c == '"' || c == '`')
                        .to_string(),
                });
            }
            "import_spec_list" => collect_imports(child, source, out),
            _ => {}
        }
    }
}

fn type_params(spec: Node, source: &[u8]) -> HashSet<String> {
    let mut names = HashSet::new();
    let Some(list) = spec.child_by_field_name("type_parameters") else {
        return names;
    };
    let mut cursor = list.walk();
    for decl in list.named_children(&mut cursor) {
        let mut inner = decl.walk();
        for name in decl.children_by_field_name("name", &mut inner) {
            names.insert(node_text(name, source).to_string());
        }
    }
    names
}

fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Collapse runs of whitespace so multi-line types print on one line.
fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Name resolution context for the types inside one type declaration.
struct TypeScope<'a> {
    source: &'a [u8],
    namespace: &'a str,
    qualifiers: &'a HashMap<String, String>,
    type_params: HashSet<String>,
}

impl<'a> TypeScope<'a> {
    fn text(&self, node: Node) -> &'a str {
        node_text(node, self.source)
    }

    fn type_spec(&self, spec: Node) -> Option<GoTypeSpec> {
        let name = self.text(spec.child_by_field_name("name")?).to_string();
        let ty = spec.child_by_field_name("type")?;

        let shape = match ty.kind() {
            "struct_type" => SpecShape::Record(self.struct_members(ty)),
            "interface_type" => SpecShape::Interface(self.interface_members(ty)),
            _ => match self.convert(ty) {
                TypeExpr::Named(named) => SpecShape::Defined(named),
                _ => return None,
            },
        };
        Some(GoTypeSpec { name, shape })
    }

    fn struct_members(&self, node: Node) -> Vec<Member> {
        let mut members = Vec::new();
        let mut cursor = node.walk();
        let Some(list) = node
            .named_children(&mut cursor)
            .find(|n| n.kind() == "field_declaration_list")
        else {
            return members;
        };

        let mut cursor = list.walk();
        for decl in list.named_children(&mut cursor) {
            if decl.kind() != "field_declaration" {
                continue;
            }
            let Some(ty) = decl.child_by_field_name("type") else {
                continue;
            };

            let mut inner = decl.walk();
            let names: Vec<Node> = decl.children_by_field_name("name", &mut inner).collect();
            if names.is_empty() {
                members.push(self.embedded_member(decl, ty));
                continue;
            }

            let signature = squash(self.text(ty));
            let expr = self.convert(ty);
            for name in names {
                members.push(Member::new(self.text(name), signature.clone(), expr.clone()));
            }
        }
        members
    }

    /// An embedded field is named after its type: `*pkg.Base` declares `Base`.
    fn embedded_member(&self, decl: Node, ty: Node) -> Member {
        let mut cursor = decl.walk();
        let is_pointer = decl.children(&mut cursor).any(|c| c.kind() == "*");
        let signature = self
            .source
            .get(decl.start_byte()..ty.end_byte())
            .map(|bytes| squash(&String::from_utf8_lossy(bytes)))
            .unwrap_or_default();

        let mut expr = self.convert(ty);
        if is_pointer {
            expr = TypeExpr::pointer(expr);
        }
        Member::new(self.embedded_name(ty), signature, expr)
    }

    fn embedded_name(&self, ty: Node) -> String {
        match ty.kind() {
            "qualified_type" => ty
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .unwrap_or_default(),
            "generic_type" => ty
                .child_by_field_name("type")
                .map(|n| self.embedded_name(n))
                .unwrap_or_default(),
            _ => self.text(ty).to_string(),
        }
    }

    fn interface_members(&self, node: Node) -> Vec<Member> {
        let mut members = Vec::new();
        let mut cursor = node.walk();
        for elem in node.named_children(&mut cursor) {
            if !matches!(elem.kind(), "method_elem" | "method_spec") {
                continue;
            }
            let Some(name) = elem.child_by_field_name("name") else {
                continue;
            };
            let params = elem
                .child_by_field_name("parameters")
                .map(|n| self.text(n))
                .unwrap_or("()");
            let mut signature = format!("func{params}");
            if let Some(result) = elem.child_by_field_name("result") {
                signature.push(' ');
                signature.push_str(self.text(result));
            }
            members.push(Member::new(self.text(name), squash(&signature), TypeExpr::Func));
        }
        members
    }

    fn convert(&self, node: Node) -> TypeExpr {
        match node.kind() {
            "type_identifier" => {
                let name = self.text(node);
                if self.type_params.contains(name) || is_predeclared(name) {
                    TypeExpr::basic(name)
                } else {
                    TypeExpr::named(self.namespace, name)
                }
            }
            "qualified_type" => {
                let package = node.child_by_field_name("package").map(|n| self.text(n));
                let name = node.child_by_field_name("name").map(|n| self.text(n));
                match (package.and_then(|p| self.qualifiers.get(p)), name) {
                    (Some(path), Some(name)) => TypeExpr::named(path.as_str(), name),
                    _ => TypeExpr::Unresolved(self.text(node).to_string()),
                }
            }
            // Instantiations collapse onto the generic type.
            "generic_type" => match node.child_by_field_name("type") {
                Some(base) => self.convert(base),
                None => TypeExpr::Unresolved(self.text(node).to_string()),
            },
            "pointer_type" | "parenthesized_type" => {
                let mut cursor = node.walk();
                let inner = node.named_children(&mut cursor).next();
                match (node.kind(), inner) {
                    ("pointer_type", Some(inner)) => TypeExpr::pointer(self.convert(inner)),
                    (_, Some(inner)) => self.convert(inner),
                    _ => TypeExpr::Unresolved(self.text(node).to_string()),
                }
            }
            "slice_type" => self.element(node, TypeExpr::slice),
            "array_type" | "implicit_length_array_type" => self.element(node, TypeExpr::array),
            "map_type" => {
                let key = node.child_by_field_name("key");
                let value = node.child_by_field_name("value");
                match (key, value) {
                    (Some(key), Some(value)) => TypeExpr::map(self.convert(key), self.convert(value)),
                    _ => TypeExpr::Unresolved(self.text(node).to_string()),
                }
            }
            "channel_type" => {
                let compact: String = self.text(node).split_whitespace().collect();
                let dir = if compact.starts_with("<-chan") {
                    ChanDir::Recv
                } else if compact.starts_with("chan<-") {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                match node.child_by_field_name("value") {
                    Some(value) => TypeExpr::chan(dir, self.convert(value)),
                    None => TypeExpr::Unresolved(self.text(node).to_string()),
                }
            }
            "function_type" => TypeExpr::Func,
            "struct_type" => TypeExpr::Struct,
            "interface_type" => TypeExpr::Interface,
            _ => TypeExpr::Unresolved(self.text(node).to_string()),
        }
    }

    fn element(&self, node: Node, wrap: fn(TypeExpr) -> TypeExpr) -> TypeExpr {
        match node.child_by_field_name("element") {
            Some(elem) => wrap(self.convert(elem)),
            None => TypeExpr::Unresolved(self.text(node).to_string()),
        }
    }
}
