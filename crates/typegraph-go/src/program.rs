//! Loading a Go program and exposing its types through [`TypeProvider`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use ignore::WalkBuilder;
use tracing::{debug, info, warn};

use typegraph_core::{Error, NamedRef, Result, Shape, TypeDef, TypeProvider};

use crate::module::{GoModule, default_package_name};
use crate::parse::{GoTypeSpec, SourceFile, SpecShape, go_parser, is_build_ignored};

/// Longest chain of `type A B` definitions followed to find a struct or interface.
const MAX_DEFINED_HOPS: usize = 16;

/// Type declarations of one Go package.
#[derive(Debug, Clone)]
pub struct GoPackage {
    pub import_path: String,
    /// Name from the package clause.
    pub name: String,
    pub dir: PathBuf,
    specs: Vec<GoTypeSpec>,
    index: HashMap<String, usize>,
}

impl GoPackage {
    pub fn specs(&self) -> &[GoTypeSpec] {
        &self.specs
    }

    pub fn spec(&self, name: &str) -> Option<&GoTypeSpec> {
        self.index.get(name).map(|&i| &self.specs[i])
    }
}

/// Files of a package, parsed but not yet converted.
struct ParsedPackage {
    import_path: String,
    dir: PathBuf,
    name: String,
    files: Vec<SourceFile>,
}

/// The root packages and every package they import, transitively, that could
/// be found on disk.
#[derive(Debug)]
pub struct GoProgram {
    roots: Vec<String>,
    packages: HashMap<String, GoPackage>,
}

impl GoProgram {
    /// Load `roots` (import paths or directories relative to the current
    /// directory) and everything they import.
    pub fn load(module: &GoModule, roots: &[String]) -> Result<Self> {
        let base = std::env::current_dir()?;
        Self::load_from(module, &base, roots)
    }

    /// Like [`GoProgram::load`], with relative roots resolved against `base`.
    pub fn load_from(module: &GoModule, base: &Path, roots: &[String]) -> Result<Self> {
        let start = Instant::now();
        let mut parser = go_parser()?;

        let mut root_paths = Vec::new();
        let mut queue = VecDeque::new();
        let mut seen = HashSet::new();
        for arg in roots {
            let (import_path, dir) = module.resolve_root(base, arg)?;
            if seen.insert(import_path.clone()) {
                root_paths.push(import_path.clone());
                queue.push_back((import_path, dir, true));
            }
        }

        let mut parsed = Vec::new();
        while let Some((import_path, dir, is_root)) = queue.pop_front() {
            let Some(package) = parse_package(&mut parser, &import_path, &dir)? else {
                if is_root {
                    return Err(Error::load_failed(import_path, "no Go source files")
                        .with_operation("go::load")
                        .with_context("dir", dir.display().to_string()));
                }
                debug!(import_path = %import_path, "no Go source files, skipped");
                continue;
            };

            for file in &package.files {
                for import in &file.imports {
                    if import.path == "C" || seen.contains(&import.path) {
                        continue;
                    }
                    seen.insert(import.path.clone());
                    match module.resolve_dir(&import.path) {
                        Some(dir) => queue.push_back((import.path.clone(), dir, false)),
                        None => debug!(import_path = %import.path, "import not found, skipped"),
                    }
                }
            }
            parsed.push(package);
        }

        let names: HashMap<&str, &str> = parsed
            .iter()
            .map(|p| (p.import_path.as_str(), p.name.as_str()))
            .collect();
        let packages: HashMap<String, GoPackage> = parsed
            .iter()
            .map(|p| (p.import_path.clone(), convert_package(p, &names)))
            .collect();

        info!(
            roots = root_paths.len(),
            packages = packages.len(),
            "Loading Go packages: {:.2}s",
            start.elapsed().as_secs_f64()
        );

        Ok(Self {
            roots: root_paths,
            packages,
        })
    }

    pub fn package(&self, import_path: &str) -> Option<&GoPackage> {
        self.packages.get(import_path)
    }

    pub fn packages(&self) -> impl Iterator<Item = &GoPackage> {
        self.packages.values()
    }

    /// Turn a declaration into a record or interface definition, following
    /// `type A B` chains to the underlying struct or interface.
    fn type_def(&self, namespace: &str, spec: &GoTypeSpec) -> Option<TypeDef> {
        let mut current = spec;
        for _ in 0..MAX_DEFINED_HOPS {
            let shape = match &current.shape {
                SpecShape::Record(members) => Shape::Record(members.clone()),
                SpecShape::Interface(members) => Shape::Interface(members.clone()),
                SpecShape::Defined(target) => {
                    current = self.package(&target.namespace)?.spec(&target.name)?;
                    continue;
                }
            };
            return Some(TypeDef {
                namespace: namespace.to_string(),
                name: spec.name.clone(),
                shape,
            });
        }
        debug!(namespace, name = %spec.name, "defined type chain too long");
        None
    }
}

impl TypeProvider for GoProgram {
    fn root_namespaces(&self) -> &[String] {
        &self.roots
    }

    fn top_level_types(&self, namespace: &str) -> Vec<TypeDef> {
        let Some(package) = self.package(namespace) else {
            return Vec::new();
        };
        package
            .specs
            .iter()
            .filter_map(|spec| self.type_def(namespace, spec))
            .collect()
    }

    fn definition(&self, named: &NamedRef) -> Option<TypeDef> {
        let spec = self.package(&named.namespace)?.spec(&named.name)?;
        self.type_def(&named.namespace, spec)
    }
}

/// Parse the non-test Go files directly inside `dir`. Returns `None` when there
/// are none.
///
/// Files excluded by an `ignore` build constraint are skipped. When the rest
/// disagree on the package clause, the package named after the directory
/// wins, else the name most files use.
fn parse_package(
    parser: &mut tree_sitter::Parser,
    import_path: &str,
    dir: &Path,
) -> Result<Option<ParsedPackage>> {
    let mut parsed = Vec::new();

    for path in go_files(dir)? {
        let source = fs::read(&path).map_err(|err| {
            Error::from(err)
                .with_operation("go::load")
                .with_context("path", path.display().to_string())
        })?;
        if is_build_ignored(&source) {
            debug!(path = %path.display(), "build constraint ignore, skipped");
            continue;
        }
        let file = SourceFile::parse(parser, path.display().to_string(), source)?;

        if file.has_syntax_errors() {
            warn!(path = %file.path, "syntax errors, types may be incomplete");
        }
        parsed.push(file);
    }

    let dir_name = dir.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let Some(name) = package_name(&parsed, dir_name) else {
        return Ok(None);
    };

    let files = parsed
        .into_iter()
        .filter(|file| {
            let keep = file.package == name;
            if !keep {
                debug!(path = %file.path, package = %file.package, "different package, skipped");
            }
            keep
        })
        .collect();

    Ok(Some(ParsedPackage {
        import_path: import_path.to_string(),
        dir: dir.to_path_buf(),
        name,
        files,
    }))
}

/// The package clause shared by the files of a directory.
fn package_name(files: &[SourceFile], dir_name: &str) -> Option<String> {
    if files.iter().any(|f| f.package == dir_name) {
        return Some(dir_name.to_string());
    }

    let mut counts: Vec<(&str, usize)> = Vec::new();
    for file in files {
        match counts.iter_mut().find(|(name, _)| *name == file.package) {
            Some((_, count)) => *count += 1,
            None => counts.push((file.package.as_str(), 1)),
        }
    }
    // Earliest file wins ties.
    counts
        .into_iter()
        .rev()
        .max_by_key(|&(_, count)| count)
        .map(|(name, _)| name.to_string())
}

/// `.go` files of a package directory, sorted, skipping tests and files the Go
/// tool ignores (leading `.` or `_`).
fn go_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .hidden(true)
        .max_depth(Some(1))
        .build();

    for entry in walker {
        let entry = entry.map_err(|e| {
            Error::load_failed(dir.display().to_string(), e.to_string()).with_operation("go::load")
        })?;
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        if !file_name.ends_with(".go") || file_name.ends_with("_test.go") || file_name.starts_with('_') {
            continue;
        }
        files.push(entry.into_path());
    }

    files.sort();
    Ok(files)
}

fn convert_package(package: &ParsedPackage, names: &HashMap<&str, &str>) -> GoPackage {
    let mut specs = Vec::new();
    let mut index = HashMap::new();

    for file in &package.files {
        let qualifiers = file_qualifiers(file, names);
        for spec in file.type_specs(&package.import_path, &qualifiers) {
            if index.contains_key(&spec.name) {
                debug!(path = %file.path, name = %spec.name, "duplicate type, keeping first");
                continue;
            }
            index.insert(spec.name.clone(), specs.len());
            specs.push(spec);
        }
    }

    GoPackage {
        import_path: package.import_path.clone(),
        name: package.name.clone(),
        dir: package.dir.clone(),
        specs,
        index,
    }
}

/// The names a file refers to its imports by.
fn file_qualifiers(file: &SourceFile, names: &HashMap<&str, &str>) -> HashMap<String, String> {
    let mut qualifiers = HashMap::new();
    for import in &file.imports {
        let qualifier = match import.alias.as_deref() {
            Some("_") | Some(".") => continue,
            Some(alias) => alias,
            None => names
                .get(import.path.as_str())
                .copied()
                .unwrap_or_else(|| default_package_name(&import.path)),
        };
        qualifiers.insert(qualifier.to_string(), import.path.clone());
    }
    qualifiers
}
