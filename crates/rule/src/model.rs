//! Rule and pattern entity shapes plus the canonical YAML rendering
//! consumed by the external engine.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Language substituted when a rule declares none.
pub const GENERIC_LANGUAGE: &str = "generic";

const MODE_TAINT: &str = "taint";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
/// Severity associated with a rule.
pub enum Severity {
    #[default]
    Warning,
    Error,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Info => "INFO",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "info" => Ok(Severity::Info),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// Prefixes a metavariable name with its `$` sigil. Idempotent.
///
/// # Example
///
/// ```
/// use rule::normalize_metavariable;
/// assert_eq!(normalize_metavariable("X"), "$X");
/// assert_eq!(normalize_metavariable("$X"), "$X");
/// ```
pub fn normalize_metavariable(name: &str) -> String {
    if name.starts_with('$') {
        name.to_owned()
    } else {
        format!("${name}")
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One node of a rule's boolean condition tree. Exactly one condition
/// kind per node, enforced by the type itself.
pub enum Pattern {
    Pattern(String),
    PatternNot(String),
    PatternInside(String),
    PatternNotInside(String),
    PatternRegex(String),
    PatternNotRegex(String),
    FocusMetavariable(String),
    MetavariableRegex(MetavariableRegex),
    MetavariablePattern(MetavariablePattern),
    /// AND group: all children must match.
    Patterns(Vec<Pattern>),
    /// OR group: any child may match.
    PatternEither(Vec<Pattern>),
}

impl Serialize for Pattern {
    // Each node renders as a single-entry mapping keyed by the
    // condition kind, matching the engine's rule schema.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Pattern::Pattern(p) => map.serialize_entry("pattern", p)?,
            Pattern::PatternNot(p) => map.serialize_entry("pattern-not", p)?,
            Pattern::PatternInside(p) => map.serialize_entry("pattern-inside", p)?,
            Pattern::PatternNotInside(p) => map.serialize_entry("pattern-not-inside", p)?,
            Pattern::PatternRegex(p) => map.serialize_entry("pattern-regex", p)?,
            Pattern::PatternNotRegex(p) => map.serialize_entry("pattern-not-regex", p)?,
            Pattern::FocusMetavariable(m) => map.serialize_entry("focus-metavariable", m)?,
            Pattern::MetavariableRegex(m) => map.serialize_entry("metavariable-regex", m)?,
            Pattern::MetavariablePattern(m) => map.serialize_entry("metavariable-pattern", m)?,
            Pattern::Patterns(children) => map.serialize_entry("patterns", children)?,
            Pattern::PatternEither(children) => map.serialize_entry("pattern-either", children)?,
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Regex constraint on a captured metavariable.
pub struct MetavariableRegex {
    pub metavariable: String,
    pub regex: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Nested pattern constraint on a captured metavariable. The pattern
/// list is an implicit AND group.
pub struct MetavariablePattern {
    pub metavariable: String,
    pub patterns: Vec<Pattern>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
/// Path filters restricting where a rule applies.
pub struct RulePaths {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl RulePaths {
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// One named search rule. Either `patterns` (plain AND condition) or
/// the `pattern_sources`/`pattern_sinks` pair (taint mode) is rendered;
/// a non-empty source list marks the rule as taint-mode and wins.
pub struct Rule {
    pub id: String,
    pub severity: Severity,
    pub message: String,
    pub languages: Vec<String>,
    pub fix: Option<String>,
    pub fix_regex: Option<String>,
    pub options: BTreeMap<String, String>,
    pub metadata: BTreeMap<String, String>,
    pub paths: RulePaths,
    pub patterns: Vec<Pattern>,
    pub pattern_sources: Vec<Pattern>,
    pub pattern_sinks: Vec<Pattern>,
}

#[derive(Serialize)]
struct FixRegex<'a> {
    regex: &'a str,
    replacement: &'a str,
}

impl Serialize for Rule {
    // Canonical key order, independent of construction order:
    // id, severity, message, languages, paths, options, then exactly
    // one of {mode + sources + sinks} / {patterns} / neither, then
    // fix-regex or fix, then metadata. Optional sections are omitted
    // entirely when empty.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("severity", &self.severity)?;
        map.serialize_entry("message", &self.message)?;
        if self.languages.is_empty() {
            map.serialize_entry("languages", &[GENERIC_LANGUAGE])?;
        } else {
            map.serialize_entry("languages", &self.languages)?;
        }
        if !self.paths.is_empty() {
            map.serialize_entry("paths", &self.paths)?;
        }
        if !self.options.is_empty() {
            map.serialize_entry("options", &self.options)?;
        }
        if !self.pattern_sources.is_empty() {
            map.serialize_entry("mode", MODE_TAINT)?;
            map.serialize_entry("pattern-sources", &self.pattern_sources)?;
            map.serialize_entry("pattern-sinks", &self.pattern_sinks)?;
        } else if !self.patterns.is_empty() {
            map.serialize_entry("patterns", &self.patterns)?;
        }
        if let Some(regex) = &self.fix_regex {
            let nested = FixRegex {
                regex,
                replacement: self.fix.as_deref().unwrap_or(""),
            };
            map.serialize_entry("fix-regex", &nested)?;
        } else if let Some(fix) = &self.fix {
            map.serialize_entry("fix", fix)?;
        }
        if !self.metadata.is_empty() {
            map.serialize_entry("metadata", &self.metadata)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
/// The boundary artifact handed to the engine: a single `rules` list.
pub struct Document {
    pub rules: Vec<Rule>,
}

impl Document {
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
