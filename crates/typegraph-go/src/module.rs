//! Mapping between Go import paths and directories.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use typegraph_core::{Error, ErrorKind, Result};

/// The Go module that contains the packages being scanned.
#[derive(Debug, Clone)]
pub struct GoModule {
    /// Directory holding `go.mod`.
    pub root: PathBuf,
    /// Module path from the `module` directive.
    pub path: String,
    /// `$GOROOT`, used to find standard library packages.
    pub goroot: Option<PathBuf>,
    /// `$GOMODCACHE`, where required modules are unpacked.
    pub mod_cache: Option<PathBuf>,
    /// `require` directives of `go.mod`.
    pub requires: Vec<Requirement>,
}

/// A module dependency pinned in `go.mod`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub path: String,
    pub version: String,
}

impl GoModule {
    /// Find the enclosing module of `start`, walking up to the first `go.mod`.
    pub fn discover(start: impl AsRef<Path>) -> Result<Self> {
        let start = start.as_ref();
        let start = fs::canonicalize(start).map_err(|err| {
            Error::new(ErrorKind::LoadFailed, err.to_string())
                .with_operation("go::discover_module")
                .with_context("dir", start.display().to_string())
                .set_source(err)
        })?;

        let Some(root) = start.ancestors().find(|dir| dir.join("go.mod").is_file()) else {
            return Err(Error::new(ErrorKind::LoadFailed, "no go.mod found")
                .with_operation("go::discover_module")
                .with_context("dir", start.display().to_string()));
        };

        let go_mod = root.join("go.mod");
        let text = fs::read_to_string(&go_mod).map_err(|err| {
            Error::from(err)
                .with_operation("go::discover_module")
                .with_context("path", go_mod.display().to_string())
        })?;
        let Some(path) = parse_module_path(&text) else {
            return Err(Error::new(ErrorKind::LoadFailed, "go.mod has no module directive")
                .with_operation("go::discover_module")
                .with_context("path", go_mod.display().to_string()));
        };

        let requires = parse_requires(&text);
        let goroot = go_env("GOROOT");
        let mod_cache = go_env("GOMODCACHE").or_else(|| {
            let gopath = std::env::var_os("GOPATH")?;
            std::env::split_paths(&gopath)
                .next()
                .map(|first| first.join("pkg").join("mod"))
        });

        debug!(
            module = %path,
            root = %root.display(),
            requires = requires.len(),
            goroot = ?goroot,
            mod_cache = ?mod_cache,
            "found module"
        );
        Ok(Self {
            root: root.to_path_buf(),
            path,
            goroot,
            mod_cache,
            requires,
        })
    }

    pub fn with_goroot(mut self, goroot: Option<PathBuf>) -> Self {
        self.goroot = goroot;
        self
    }

    pub fn with_mod_cache(mut self, mod_cache: Option<PathBuf>) -> Self {
        self.mod_cache = mod_cache;
        self
    }

    /// Directory of the package with the given import path, looking in the
    /// module itself, then its `vendor` directory, then `$GOROOT/src`, then the
    /// module cache entry of the longest matching `require`.
    pub fn resolve_dir(&self, import_path: &str) -> Option<PathBuf> {
        let local = if import_path == self.path {
            Some(self.root.clone())
        } else {
            import_path
                .strip_prefix(self.path.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .map(|rest| self.root.join(rest))
        };

        let candidates = [
            local,
            Some(self.root.join("vendor").join(import_path)),
            self.goroot
                .as_ref()
                .map(|goroot| goroot.join("src").join(import_path)),
            self.cached_dir(import_path),
        ];
        candidates.into_iter().flatten().find(|dir| dir.is_dir())
    }

    fn cached_dir(&self, import_path: &str) -> Option<PathBuf> {
        let cache = self.mod_cache.as_ref()?;
        let (require, rest) = self
            .requires
            .iter()
            .filter_map(|req| {
                let rest = import_path.strip_prefix(req.path.as_str())?;
                (rest.is_empty() || rest.starts_with('/')).then_some((req, rest))
            })
            .max_by_key(|(req, _)| req.path.len())?;

        let mut dir = cache.join(format!(
            "{}@{}",
            escape_module_path(&require.path),
            escape_module_path(&require.version)
        ));
        for part in rest.split('/').filter(|p| !p.is_empty()) {
            dir.push(part);
        }
        Some(dir)
    }

    /// Import path of a directory inside the module.
    pub fn import_path_for_dir(&self, dir: &Path) -> Option<String> {
        let rest = dir.strip_prefix(&self.root).ok()?;
        let mut path = self.path.clone();
        for part in rest.components() {
            path.push('/');
            path.push_str(part.as_os_str().to_str()?);
        }
        Some(path)
    }

    /// Turn a command-line namespace into `(import path, directory)`.
    ///
    /// Arguments starting with `.` or `/` are directories relative to `base`;
    /// anything else is an import path.
    pub fn resolve_root(&self, base: &Path, arg: &str) -> Result<(String, PathBuf)> {
        if arg.starts_with('.') || Path::new(arg).is_absolute() {
            let joined = base.join(arg);
            let dir = fs::canonicalize(&joined).map_err(|err| {
                Error::load_failed(arg, err.to_string())
                    .with_operation("go::resolve_root")
                    .with_context("dir", joined.display().to_string())
                    .set_source(err)
            })?;
            let Some(import_path) = self.import_path_for_dir(&dir) else {
                return Err(Error::load_failed(arg, "directory is outside the module")
                    .with_operation("go::resolve_root")
                    .with_context("module", self.root.display().to_string()));
            };
            return Ok((import_path, dir));
        }

        match self.resolve_dir(arg) {
            Some(dir) => Ok((arg.to_string(), dir)),
            None => Err(Error::load_failed(arg, "cannot find package")
                .with_operation("go::resolve_root")
                .with_context("module", self.path.clone())),
        }
    }
}

/// Read the module path out of a `go.mod` file.
pub fn parse_module_path(go_mod: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or("").trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let path = rest.trim().trim_matches('"').trim_matches('`');
        (!path.is_empty()).then(|| path.to_string())
    })
}

/// Collect the `require` directives of a `go.mod` file, single line or block.
pub fn parse_requires(go_mod: &str) -> Vec<Requirement> {
    let mut requires = Vec::new();
    let mut in_block = false;
    for line in go_mod.lines() {
        let line = line.split("//").next().unwrap_or("").trim();
        let spec = if in_block {
            if line.starts_with(')') {
                in_block = false;
                continue;
            }
            line
        } else {
            let Some(rest) = line.strip_prefix("require") else {
                continue;
            };
            let rest = rest.trim();
            if rest == "(" {
                in_block = true;
                continue;
            }
            rest
        };

        let mut parts = spec.split_whitespace();
        if let (Some(path), Some(version)) = (parts.next(), parts.next()) {
            requires.push(Requirement {
                path: path.trim_matches('"').to_string(),
                version: version.to_string(),
            });
        }
    }
    requires
}

/// Module cache spelling of a path or version: upper case letters become `!`
/// followed by the lower case letter.
pub fn escape_module_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            out.push('!');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// A Go environment setting: the environment variable when set, else what
/// `go env` reports.
fn go_env(var: &str) -> Option<PathBuf> {
    if let Some(value) = std::env::var_os(var).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(value));
    }
    let output = Command::new("go").args(["env", var]).output().ok()?;
    if !output.status.success() {
        debug!(var, status = %output.status, "go env failed");
        return None;
    }
    env_path(&output.stdout)
}

fn env_path(stdout: &[u8]) -> Option<PathBuf> {
    let text = String::from_utf8_lossy(stdout);
    let value = text.trim();
    (!value.is_empty()).then(|| PathBuf::from(OsString::from(value)))
}

/// Package name a Go import gets when it has no explicit alias and the package
/// itself was not loaded: the last path element, skipping a `/vN` major version.
pub fn default_package_name(import_path: &str) -> &str {
    let mut parts = import_path.rsplit('/');
    let last = parts.next().unwrap_or(import_path);
    let is_major_version = last.len() > 1
        && last.starts_with('v')
        && last[1..].chars().all(|c| c.is_ascii_digit());
    match (is_major_version, parts.next()) {
        (true, Some(prev)) => prev,
        _ => last,
    }
}
