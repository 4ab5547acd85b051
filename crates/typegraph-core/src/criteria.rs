//! Include/exclude rules.
//!
//! A rule is written `NAMESPACE_PATTERN:TYPE_PATTERN`. The text is split on the
//! last `:` so namespace patterns may themselves contain colons. Either half may
//! be empty, which matches anything. A rule without any `:` only constrains the
//! namespace.
//!
//! Patterns must match the whole namespace or type name, so `a.b:Foo` does not
//! match namespace `a.bc` or type `Foobar`.

use std::collections::HashSet;
use std::fmt;

use regex::Regex;
use tracing::debug;

use crate::Result;
use typegraph_error::Error;

/// A compiled namespace/type-name pattern pair.
#[derive(Clone)]
pub struct Criteria {
    source: String,
    namespace: Option<Regex>,
    type_name: Option<Regex>,
}

impl Criteria {
    /// Compile a rule of the form `namespace:type`.
    pub fn compile(pattern: &str) -> Result<Self> {
        let (namespace, type_name) = match pattern.rfind(':') {
            Some(idx) => (&pattern[..idx], &pattern[idx + 1..]),
            None => (pattern, ""),
        };

        Ok(Self {
            source: pattern.to_string(),
            namespace: compile_anchored(pattern, namespace)?,
            type_name: compile_anchored(pattern, type_name)?,
        })
    }

    /// The rule text as given by the user.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// True if both halves accept the given namespace and type name.
    pub fn matches(&self, namespace: &str, type_name: &str) -> bool {
        self.namespace
            .as_ref()
            .is_none_or(|expr| expr.is_match(namespace))
            && self
                .type_name
                .as_ref()
                .is_none_or(|expr| expr.is_match(type_name))
    }
}

impl fmt::Debug for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Criteria").field(&self.source).finish()
    }
}

fn compile_anchored(pattern: &str, half: &str) -> Result<Option<Regex>> {
    if half.is_empty() {
        return Ok(None);
    }
    Regex::new(&format!("^(?:{half})$"))
        .map(Some)
        .map_err(|err| {
            Error::pattern_compile_failed(pattern, err.to_string())
                .with_operation("criteria::compile")
                .with_context("expression", half)
        })
}

/// Outcome of evaluating the rules for one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Excluded,
    Included,
    /// No rule matched. Treated like `Excluded`.
    Unspecified,
}

impl Decision {
    pub fn is_included(self) -> bool {
        matches!(self, Decision::Included)
    }
}

/// The full rule set of a run: exclusions, inclusions and the root namespaces.
#[derive(Debug, Clone, Default)]
pub struct CriteriaSet {
    inclusions: Vec<Criteria>,
    exclusions: Vec<Criteria>,
    roots: HashSet<String>,
}

impl CriteriaSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every rule up front. The first malformed rule aborts.
    pub fn from_patterns<I, E>(includes: I, excludes: E) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let mut set = Self::new();
        for pattern in includes {
            set.add_inclusion(pattern.as_ref())?;
        }
        for pattern in excludes {
            set.add_exclusion(pattern.as_ref())?;
        }
        Ok(set)
    }

    pub fn add_inclusion(&mut self, pattern: &str) -> Result<()> {
        self.inclusions.push(Criteria::compile(pattern)?);
        Ok(())
    }

    pub fn add_exclusion(&mut self, pattern: &str) -> Result<()> {
        self.exclusions.push(Criteria::compile(pattern)?);
        Ok(())
    }

    /// Register the namespaces that were explicitly requested as scan roots.
    pub fn with_roots<I, S>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roots.extend(roots.into_iter().map(Into::into));
        self
    }

    pub fn is_root(&self, namespace: &str) -> bool {
        self.roots.contains(namespace)
    }

    pub fn inclusions(&self) -> &[Criteria] {
        &self.inclusions
    }

    pub fn exclusions(&self) -> &[Criteria] {
        &self.exclusions
    }

    /// Exclusions first, then root membership, then inclusions.
    pub fn decide(&self, namespace: &str, type_name: &str) -> Decision {
        if let Some(rule) = self
            .exclusions
            .iter()
            .find(|c| c.matches(namespace, type_name))
        {
            debug!(namespace, type_name, rule = rule.source(), "excluded");
            return Decision::Excluded;
        }

        if self.is_root(namespace) {
            return Decision::Included;
        }

        if self
            .inclusions
            .iter()
            .any(|c| c.matches(namespace, type_name))
        {
            return Decision::Included;
        }

        Decision::Unspecified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typegraph_error::ErrorKind;

    #[test]
    fn test_full_pattern_is_whole_string() {
        let c = Criteria::compile("a.b:Foo").unwrap();
        assert!(c.matches("a.b", "Foo"));
        assert!(!c.matches("a.bc", "Foo"));
        assert!(!c.matches("xa.b", "Foo"));
        assert!(!c.matches("a.b", "Foobar"));
        assert!(!c.matches("a.b", "MyFoo"));
    }

    #[test]
    fn test_namespace_only_pattern() {
        let c = Criteria::compile("a.b").unwrap();
        assert!(c.matches("a.b", "Anything"));
        assert!(c.matches("a.b", "Other"));
        assert!(!c.matches("a.b.c", "Anything"));
    }

    #[test]
    fn test_empty_halves_match_anything() {
        let c = Criteria::compile(":Foo").unwrap();
        assert!(c.matches("any/where", "Foo"));
        assert!(!c.matches("any/where", "Bar"));

        let c = Criteria::compile("pkg2:").unwrap();
        assert!(c.matches("pkg2", "Bar"));

        let c = Criteria::compile("").unwrap();
        assert!(c.matches("x", "y"));
    }

    #[test]
    fn test_split_on_last_colon() {
        let c = Criteria::compile("host:8080/pkg:T.*").unwrap();
        assert!(c.matches("host:8080/pkg", "Type"));
        assert!(!c.matches("host", "8080/pkg:Type"));
    }

    #[test]
    fn test_alternation_is_anchored_as_a_group() {
        let c = Criteria::compile(":A|AB").unwrap();
        assert!(c.matches("p", "A"));
        assert!(c.matches("p", "AB"));
        assert!(!c.matches("p", "ABC"));
        assert!(!c.matches("p", "XA"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Criteria::compile("pkg:(").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PatternCompileFailed);
        assert_eq!(err.context_value("pattern"), Some("pkg:("));

        let err = Criteria::compile("[:Foo").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PatternCompileFailed);
    }

    #[test]
    fn test_exclusion_beats_inclusion() {
        let set = CriteriaSet::from_patterns(["pkg2:.*"], ["pkg2:Secret"]).unwrap();
        assert_eq!(set.decide("pkg2", "Secret"), Decision::Excluded);
        assert_eq!(set.decide("pkg2", "Public"), Decision::Included);
    }

    #[test]
    fn test_root_namespace_is_implicitly_included() {
        let set = CriteriaSet::from_patterns(Vec::<&str>::new(), ["app:Hidden"])
            .unwrap()
            .with_roots(["app"]);
        assert_eq!(set.decide("app", "Order"), Decision::Included);
        assert_eq!(set.decide("app", "Hidden"), Decision::Excluded);
        assert_eq!(set.decide("lib", "Order"), Decision::Unspecified);
        assert!(!set.decide("lib", "Order").is_included());
    }

    #[test]
    fn test_first_bad_rule_aborts() {
        let err = CriteriaSet::from_patterns(["ok", "bad:("], Vec::<&str>::new()).unwrap_err();
        assert_eq!(err.context_value("pattern"), Some("bad:("));
    }
}
