//! Incremental construction of Opengrep-compatible search rules.
//!
//! A flat stream of builder operations is folded into a tree of
//! boolean pattern conditions through a stack of insertion scopes,
//! then rendered as a canonical YAML document the engine consumes.
//!
//! # Example
//!
//! ```
//! use rule::State;
//!
//! let mut state = State::new();
//! state
//!     .rule()
//!     .language("go")
//!     .pattern("foo($X)")
//!     .severity("info");
//! let yaml = state.document().to_yaml().unwrap();
//! assert!(yaml.contains("severity: INFO"));
//! assert!(yaml.contains("pattern: foo($X)"));
//! ```

mod builder;
mod model;

pub use builder::{RunSettings, State, DEFAULT_COMMAND, KNOWN_FORMATS};
pub use model::{
    normalize_metavariable, Document, MetavariablePattern, MetavariableRegex, Pattern, Rule,
    RulePaths, Severity, GENERIC_LANGUAGE,
};
