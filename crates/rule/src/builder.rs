//! Mutable construction state: an ordered rule list plus a stack of
//! open pattern scopes that routes each operation to the right nesting
//! level. No operation here fails; bad input is downgraded to an
//! accumulated warning so the builder always produces a valid document.

use crate::model::{
    normalize_metavariable, Document, MetavariablePattern, MetavariableRegex, Pattern, Rule,
    Severity,
};
use tracing::debug;

/// Engine invoked when no override is given.
pub const DEFAULT_COMMAND: &str = "opengrep";

/// Output formats the engine is known to accept. Unknown formats are
/// still forwarded; the engine reports them itself.
pub const KNOWN_FORMATS: [&str; 8] = [
    "json",
    "vim",
    "emacs",
    "sarif",
    "text",
    "gitlab-sast",
    "gitlab-secrets",
    "junit-xml",
];

#[derive(Debug, Clone)]
/// Builder-wide run configuration, independent of any single rule.
pub struct RunSettings {
    pub format: String,
    pub command: String,
    pub autofix: bool,
    pub verbose: bool,
    pub debug: bool,
    pub export: bool,
    /// Files or directories to scan.
    pub paths: Vec<String>,
    /// Literal snippets to scan in place of a file path.
    pub evals: Vec<String>,
    /// Extra rule files or directories to merge in.
    pub configs: Vec<String>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            format: "text".into(),
            command: DEFAULT_COMMAND.into(),
            autofix: false,
            verbose: false,
            debug: false,
            export: false,
            paths: Vec::new(),
            evals: Vec::new(),
            configs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
/// Which list on the current rule the bottom stack frame feeds.
enum Target {
    Patterns,
    Sources,
    Sinks,
    /// Sink for stray operations after an over-closed scope; contents
    /// are discarded on commit.
    Detached,
}

#[derive(Debug)]
enum FrameKind {
    Root(Target),
    All,
    Any,
    Metavariable(String),
}

#[derive(Debug)]
/// One open insertion scope. Frames own their pattern list; closing a
/// group seals the list into a node appended to the frame below, so no
/// two scopes ever alias the same storage.
struct Frame {
    kind: FrameKind,
    items: Vec<Pattern>,
}

impl Frame {
    fn root(target: Target) -> Self {
        Frame {
            kind: FrameKind::Root(target),
            items: Vec::new(),
        }
    }
}

/// Seals a closed group frame into its pattern node. Root frames have
/// no node form.
fn seal(frame: Frame) -> Option<Pattern> {
    match frame.kind {
        FrameKind::All => Some(Pattern::Patterns(frame.items)),
        FrameKind::Any => Some(Pattern::PatternEither(frame.items)),
        FrameKind::Metavariable(name) => Some(Pattern::MetavariablePattern(MetavariablePattern {
            metavariable: name,
            patterns: frame.items,
        })),
        FrameKind::Root(_) => None,
    }
}

#[derive(Debug, Default)]
/// Construction context for one invocation. Operations are chainable
/// and strictly ordered; see the crate docs for the stack discipline.
pub struct State {
    rules: Vec<Rule>,
    stack: Vec<Frame>,
    settings: RunSettings,
    warnings: Vec<String>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Flushes open scopes and renders the rule list. Flushing is
    /// idempotent, so repeated calls serialize identically.
    pub fn document(&mut self) -> Document {
        self.flush();
        Document {
            rules: self.rules.clone(),
        }
    }

    pub fn into_parts(mut self) -> (Document, RunSettings, Vec<String>) {
        let document = self.document();
        (document, self.settings, self.warnings)
    }

    fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    fn push_pattern(&mut self, node: Pattern) {
        match self.stack.last_mut() {
            Some(frame) => frame.items.push(node),
            None => self.warn("no open pattern scope to receive pattern".into()),
        }
    }

    fn open_group(&mut self, kind: FrameKind) {
        if self.stack.is_empty() {
            self.warn("no open pattern scope to receive pattern group".into());
            return;
        }
        self.stack.push(Frame { kind, items: Vec::new() });
    }

    /// Appends `items` to the target list on the current rule.
    fn commit(&mut self, target: Target, items: Vec<Pattern>) {
        let Some(rule) = self.rules.last_mut() else {
            return;
        };
        match target {
            Target::Patterns => rule.patterns.extend(items),
            Target::Sources => rule.pattern_sources.extend(items),
            Target::Sinks => rule.pattern_sinks.extend(items),
            Target::Detached => {}
        }
    }

    /// Unwinds all open groups into the bottom frame, commits the
    /// bottom frame into the current rule, and leaves a fresh frame
    /// with the same target so construction can continue.
    fn flush(&mut self) {
        while self.stack.len() > 1 {
            if let Some(frame) = self.stack.pop() {
                if let Some(node) = seal(frame) {
                    self.push_pattern(node);
                }
            }
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let target = match frame.kind {
            FrameKind::Root(target) => target,
            // Unreachable: group frames always sit above a root frame.
            _ => Target::Detached,
        };
        self.commit(target, frame.items);
        self.stack.push(Frame::root(target));
    }

    /// Returns the current rule for scalar field mutation, or records
    /// a warning when no rule has been started.
    fn rule_mut(&mut self, op: &str) -> Option<&mut Rule> {
        if self.rules.is_empty() {
            self.warn(format!("'{op}' before any rule is ignored"));
            return None;
        }
        self.rules.last_mut()
    }

    /// Starts a new rule, inheriting languages and severity from the
    /// previous one, and resets the stack to the rule's top-level
    /// pattern list.
    pub fn rule(&mut self) -> &mut Self {
        self.flush();
        let mut rule = Rule {
            id: format!("rule-{}", self.rules.len() + 1),
            ..Rule::default()
        };
        if let Some(prev) = self.rules.last() {
            rule.languages = prev.languages.clone();
            rule.severity = prev.severity;
        }
        debug!(id = %rule.id, "starting rule");
        self.rules.push(rule);
        self.stack = vec![Frame::root(Target::Patterns)];
        self
    }

    /// Adds a literal match pattern at the current scope.
    pub fn pattern(&mut self, pattern: &str) -> &mut Self {
        self.push_pattern(Pattern::Pattern(pattern.into()));
        self
    }

    pub fn pattern_not(&mut self, pattern: &str) -> &mut Self {
        self.push_pattern(Pattern::PatternNot(pattern.into()));
        self
    }

    pub fn pattern_inside(&mut self, pattern: &str) -> &mut Self {
        self.push_pattern(Pattern::PatternInside(pattern.into()));
        self
    }

    pub fn pattern_not_inside(&mut self, pattern: &str) -> &mut Self {
        self.push_pattern(Pattern::PatternNotInside(pattern.into()));
        self
    }

    pub fn pattern_regex(&mut self, regex: &str) -> &mut Self {
        self.push_pattern(Pattern::PatternRegex(regex.into()));
        self
    }

    pub fn pattern_not_regex(&mut self, regex: &str) -> &mut Self {
        self.push_pattern(Pattern::PatternNotRegex(regex.into()));
        self
    }

    pub fn focus_metavariable(&mut self, metavariable: &str) -> &mut Self {
        self.push_pattern(Pattern::FocusMetavariable(normalize_metavariable(
            metavariable,
        )));
        self
    }

    pub fn metavariable_regex(&mut self, metavariable: &str, regex: &str) -> &mut Self {
        self.push_pattern(Pattern::MetavariableRegex(MetavariableRegex {
            metavariable: normalize_metavariable(metavariable),
            regex: regex.into(),
        }));
        self
    }

    /// Opens an AND group; subsequent patterns nest under it until the
    /// matching [`pop`](State::pop).
    pub fn patterns(&mut self) -> &mut Self {
        self.open_group(FrameKind::All);
        self
    }

    /// Opens an OR group (`pattern-either`).
    pub fn pattern_either(&mut self) -> &mut Self {
        self.open_group(FrameKind::Any);
        self
    }

    /// Opens the nested pattern list of a `metavariable-pattern`
    /// constraint, itself an implicit AND group.
    pub fn metavariable_pattern(&mut self, metavariable: &str) -> &mut Self {
        self.open_group(FrameKind::Metavariable(normalize_metavariable(
            metavariable,
        )));
        self
    }

    /// Retargets construction at the current rule's taint source list,
    /// clearing any previous sources and abandoning open nesting.
    pub fn pattern_sources(&mut self) -> &mut Self {
        self.flush();
        if let Some(rule) = self.rules.last_mut() {
            rule.pattern_sources.clear();
            self.stack = vec![Frame::root(Target::Sources)];
        } else {
            self.warn("'pattern-sources' before any rule is ignored".into());
        }
        self
    }

    /// Retargets construction at the current rule's taint sink list.
    pub fn pattern_sinks(&mut self) -> &mut Self {
        self.flush();
        if let Some(rule) = self.rules.last_mut() {
            rule.pattern_sinks.clear();
            self.stack = vec![Frame::root(Target::Sinks)];
        } else {
            self.warn("'pattern-sinks' before any rule is ignored".into());
        }
        self
    }

    /// Closes the innermost open group. Closing the rule's own
    /// top-level scope is tolerated: the scope is committed and
    /// replaced with a detached sink, and a warning is recorded.
    pub fn pop(&mut self) -> &mut Self {
        if self.stack.len() > 1 {
            if let Some(frame) = self.stack.pop() {
                if let Some(node) = seal(frame) {
                    self.push_pattern(node);
                }
            }
        } else {
            self.flush();
            self.stack = vec![Frame::root(Target::Detached)];
            self.warn(
                "'pop' outside any pattern group; subsequent patterns are dropped until the next rule or group"
                    .into(),
            );
        }
        self
    }

    pub fn id(&mut self, id: &str) -> &mut Self {
        if let Some(rule) = self.rule_mut("id") {
            rule.id = id.into();
        }
        self
    }

    /// Sets the rule severity, falling back to the default with a
    /// warning when the value is not recognized.
    pub fn severity(&mut self, severity: &str) -> &mut Self {
        let parsed = match severity.parse::<Severity>() {
            Ok(parsed) => parsed,
            Err(_) => {
                self.warn(format!(
                    "unknown severity '{severity}', using default '{}'",
                    Severity::default()
                ));
                Severity::default()
            }
        };
        if let Some(rule) = self.rule_mut("severity") {
            rule.severity = parsed;
        }
        self
    }

    pub fn message(&mut self, message: &str) -> &mut Self {
        if let Some(rule) = self.rule_mut("message") {
            rule.message = message.into();
        }
        self
    }

    pub fn language(&mut self, language: &str) -> &mut Self {
        if let Some(rule) = self.rule_mut("language") {
            rule.languages.push(language.into());
        }
        self
    }

    pub fn fix(&mut self, fix: &str) -> &mut Self {
        if let Some(rule) = self.rule_mut("fix") {
            rule.fix = Some(fix.into());
        }
        self
    }

    pub fn fix_regex(&mut self, regex: &str) -> &mut Self {
        if let Some(rule) = self.rule_mut("fix-regex") {
            rule.fix_regex = Some(regex.into());
        }
        self
    }

    pub fn metadata(&mut self, key: &str, value: &str) -> &mut Self {
        if let Some(rule) = self.rule_mut("metadata") {
            rule.metadata.insert(key.into(), value.into());
        }
        self
    }

    pub fn option(&mut self, name: &str, value: &str) -> &mut Self {
        if let Some(rule) = self.rule_mut("option") {
            rule.options.insert(name.into(), value.into());
        }
        self
    }

    pub fn path_include(&mut self, path: &str) -> &mut Self {
        if let Some(rule) = self.rule_mut("path-include") {
            rule.paths.include.push(path.into());
        }
        self
    }

    pub fn path_exclude(&mut self, path: &str) -> &mut Self {
        if let Some(rule) = self.rule_mut("path-exclude") {
            rule.paths.exclude.push(path.into());
        }
        self
    }

    /// Sets the output format, warning when the engine is not known to
    /// accept it. The value is forwarded either way.
    pub fn format(&mut self, format: &str) -> &mut Self {
        if !KNOWN_FORMATS.contains(&format) {
            self.warn(format!("unknown output format '{format}'"));
        }
        self.settings.format = format.into();
        self
    }

    pub fn command(&mut self, command: &str) -> &mut Self {
        self.settings.command = command.into();
        self
    }

    pub fn autofix(&mut self) -> &mut Self {
        self.settings.autofix = true;
        self
    }

    pub fn verbose(&mut self) -> &mut Self {
        self.settings.verbose = true;
        self
    }

    pub fn debug(&mut self) -> &mut Self {
        self.settings.debug = true;
        self
    }

    pub fn export(&mut self) -> &mut Self {
        self.settings.export = true;
        self
    }

    pub fn path(&mut self, path: &str) -> &mut Self {
        self.settings.paths.push(path.into());
        self
    }

    pub fn eval(&mut self, code: &str) -> &mut Self {
        self.settings.evals.push(code.into());
        self
    }

    pub fn config(&mut self, path: &str) -> &mut Self {
        self.settings.configs.push(path.into());
        self
    }
}
