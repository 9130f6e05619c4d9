use rule::{MetavariablePattern, MetavariableRegex, Pattern, Severity, State};

#[test]
fn group_nesting_collects_leaves_in_insertion_order() {
    let mut state = State::new();
    state
        .rule()
        .patterns()
        .pattern_not("not this")
        .pattern_not_inside("not inside this")
        .pop();
    let doc = state.document();
    assert_eq!(
        doc.rules[0].patterns,
        vec![Pattern::Patterns(vec![
            Pattern::PatternNot("not this".into()),
            Pattern::PatternNotInside("not inside this".into()),
        ])]
    );
}

#[test]
fn nested_groups_close_back_to_parent_scope() {
    let mut state = State::new();
    state
        .rule()
        .pattern_either()
        .pattern("a")
        .metavariable_pattern("PKG")
        .pattern("pkgname")
        .pop()
        .pop()
        .pattern("after");
    let doc = state.document();
    assert_eq!(
        doc.rules[0].patterns,
        vec![
            Pattern::PatternEither(vec![
                Pattern::Pattern("a".into()),
                Pattern::MetavariablePattern(MetavariablePattern {
                    metavariable: "$PKG".into(),
                    patterns: vec![Pattern::Pattern("pkgname".into())],
                }),
            ]),
            Pattern::Pattern("after".into()),
        ]
    );
}

#[test]
fn unclosed_groups_are_sealed_when_the_document_is_built() {
    let mut state = State::new();
    state.rule().pattern_either().pattern("a").pattern("b");
    let doc = state.document();
    assert_eq!(
        doc.rules[0].patterns,
        vec![Pattern::PatternEither(vec![
            Pattern::Pattern("a".into()),
            Pattern::Pattern("b".into()),
        ])]
    );
}

#[test]
fn over_closing_keeps_recorded_patterns_and_warns() {
    let mut state = State::new();
    state
        .rule()
        .pattern("kept")
        .pop()
        .pattern("stray");
    let doc = state.document();
    assert_eq!(doc.rules[0].patterns, vec![Pattern::Pattern("kept".into())]);
    assert_eq!(state.warnings().len(), 1);
    assert!(state.warnings()[0].contains("pop"));
}

#[test]
fn detached_scope_discards_everything_until_next_rule() {
    let mut state = State::new();
    state
        .rule()
        .pattern("kept")
        .pop()
        .patterns()
        .pattern("lost")
        .pop()
        .rule()
        .pattern("fresh");
    let doc = state.document();
    assert_eq!(doc.rules[0].patterns, vec![Pattern::Pattern("kept".into())]);
    assert_eq!(doc.rules[1].patterns, vec![Pattern::Pattern("fresh".into())]);
    // Only the over-close itself warns; the nested group closes cleanly.
    assert_eq!(state.warnings().len(), 1);
}

#[test]
fn unknown_severity_falls_back_to_default_with_one_warning() {
    let mut state = State::new();
    state.rule().severity("bogus");
    let doc = state.document();
    assert_eq!(doc.rules[0].severity, Severity::Warning);
    assert_eq!(state.warnings().len(), 1);
    assert!(state.warnings()[0].contains("unknown severity 'bogus'"));
}

#[test]
fn new_rule_inherits_languages_and_severity() {
    let mut state = State::new();
    state
        .rule()
        .language("go")
        .language("python")
        .severity("error")
        .rule();
    let doc = state.document();
    let second = &doc.rules[1];
    assert_eq!(second.id, "rule-2");
    assert_eq!(second.languages, vec!["go", "python"]);
    assert_eq!(second.severity, Severity::Error);
}

#[test]
fn inherited_fields_are_copies_not_references() {
    let mut state = State::new();
    state.rule().language("go").rule().language("ruby");
    let doc = state.document();
    assert_eq!(doc.rules[0].languages, vec!["go"]);
    assert_eq!(doc.rules[1].languages, vec!["go", "ruby"]);
}

#[test]
fn metavariable_names_are_normalized_on_entry() {
    let mut state = State::new();
    state
        .rule()
        .focus_metavariable("X")
        .metavariable_regex("$Y", "^a+$");
    let doc = state.document();
    assert_eq!(
        doc.rules[0].patterns,
        vec![
            Pattern::FocusMetavariable("$X".into()),
            Pattern::MetavariableRegex(MetavariableRegex {
                metavariable: "$Y".into(),
                regex: "^a+$".into(),
            }),
        ]
    );
}

#[test]
fn sources_and_sinks_retarget_the_stack() {
    let mut state = State::new();
    state
        .rule()
        .pattern_sources()
        .pattern("src()")
        .pattern_sinks()
        .pattern("sink($A)");
    let doc = state.document();
    let rule = &doc.rules[0];
    assert_eq!(rule.pattern_sources, vec![Pattern::Pattern("src()".into())]);
    assert_eq!(rule.pattern_sinks, vec![Pattern::Pattern("sink($A)".into())]);
}

#[test]
fn switching_to_sinks_abandons_open_source_nesting() {
    let mut state = State::new();
    state
        .rule()
        .pattern_sources()
        .pattern_either()
        .pattern("a")
        .pattern_sinks()
        .pattern("sink($A)");
    let doc = state.document();
    let rule = &doc.rules[0];
    // The open OR group is sealed into the source list, not lost.
    assert_eq!(
        rule.pattern_sources,
        vec![Pattern::PatternEither(vec![Pattern::Pattern("a".into())])]
    );
    assert_eq!(rule.pattern_sinks, vec![Pattern::Pattern("sink($A)".into())]);
}

#[test]
fn repeated_pattern_sources_resets_the_list() {
    let mut state = State::new();
    state
        .rule()
        .pattern_sources()
        .pattern("old")
        .pattern_sources()
        .pattern("new");
    let doc = state.document();
    assert_eq!(
        doc.rules[0].pattern_sources,
        vec![Pattern::Pattern("new".into())]
    );
}

#[test]
fn operations_before_any_rule_warn_instead_of_failing() {
    let mut state = State::new();
    state.pattern("stray").message("stray").pop();
    assert!(state.document().rules.is_empty());
    assert!(!state.warnings().is_empty());
}

#[test]
fn unknown_format_is_forwarded_with_a_warning() {
    let mut state = State::new();
    state.rule().format("weird");
    assert_eq!(state.settings().format, "weird");
    assert_eq!(state.warnings().len(), 1);
    assert!(state.warnings()[0].contains("unknown output format 'weird'"));
}
