//! Command-line front end: translates the flat flag stream into
//! builder operations on a [`rule::State`].
//!
//! The stream is order-sensitive (group opens, pops and leaf patterns
//! interleave freely), so arguments are consumed left to right with a
//! shortcut table rather than a declarative parser.

use anyhow::{bail, Result};
use rule::State;

pub mod runner;
pub mod ui;

/// Expands a `-x` shortcut to its long flag name.
fn expand_shortcut(short: &str) -> Option<&'static str> {
    Some(match short {
        "af" => "autofix",
        "c" => "config",
        "e" => "eval",
        "f" => "format",
        "fm" => "focus-metavariable",
        "fr" => "fix-regex",
        "fx" => "fix",
        "i" => "path",
        "l" => "language",
        "m" => "message",
        "mp" => "metavariable-pattern",
        "mr" => "metavariable-regex",
        "p" => "pattern",
        "pe" => "pattern-either",
        "pi" => "pattern-inside",
        "pn" => "pattern-not",
        "pni" => "pattern-not-inside",
        "pnr" => "pattern-not-regex",
        "pr" => "pattern-regex",
        "ps" => "patterns",
        "psk" => "pattern-sinks",
        "pso" => "pattern-sources",
        "sv" => "severity",
        _ => return None,
    })
}

/// Resolves one argument to its canonical command name. Bare `^` is
/// an alias for `pop`; anything else must be `--long` or a shortcut.
fn canonical(arg: &str) -> Option<&str> {
    if let Some(long) = arg.strip_prefix("--") {
        (!long.is_empty()).then_some(long)
    } else if arg == "^" {
        Some("pop")
    } else if let Some(short) = arg.strip_prefix('-') {
        expand_shortcut(short)
    } else {
        None
    }
}

/// Splits a `key=value` argument; a missing `=` yields an empty value.
fn split_kv(value: &str) -> (&str, &str) {
    value.split_once('=').unwrap_or((value, ""))
}

/// Commands that take no value. Returns false when `cmd` is not one.
fn apply_flag(state: &mut State, cmd: &str) -> bool {
    match cmd {
        "autofix" => {
            state.autofix();
        }
        "debug" => {
            state.debug();
        }
        "export" => {
            state.export();
        }
        "pattern-either" => {
            state.pattern_either();
        }
        "pattern-sinks" => {
            state.pattern_sinks();
        }
        "pattern-sources" => {
            state.pattern_sources();
        }
        "patterns" => {
            state.patterns();
        }
        "pop" => {
            state.pop();
        }
        "rule" => {
            state.rule();
        }
        "semgrep" => {
            state.command("semgrep");
        }
        "verbose" => {
            state.verbose();
        }
        // Format names double as flags: `--json`, `--sarif`, ...
        format if rule::KNOWN_FORMATS.contains(&format) => {
            state.format(format);
        }
        _ => return false,
    }
    true
}

type ValueOp = fn(&mut State, &str);

/// Looks up a command that consumes the following argument as its
/// value, so unknown commands can be rejected before a value is
/// demanded.
fn value_flag(cmd: &str) -> Option<ValueOp> {
    let op: ValueOp = match cmd {
        "config" => |s, v| {
            s.config(v);
        },
        "eval" => |s, v| {
            s.eval(v);
        },
        "fix" => |s, v| {
            s.fix(v);
        },
        "fix-regex" => |s, v| {
            s.fix_regex(v);
        },
        "focus-metavariable" => |s, v| {
            s.focus_metavariable(v);
        },
        "format" => |s, v| {
            s.format(v);
        },
        "id" => |s, v| {
            s.id(v);
        },
        "language" => |s, v| {
            s.language(v);
        },
        "message" => |s, v| {
            s.message(v);
        },
        "metadata" => |s, v| {
            let (key, value) = split_kv(v);
            s.metadata(key, value);
        },
        "metavariable-pattern" => |s, v| {
            s.metavariable_pattern(v);
        },
        "metavariable-regex" => |s, v| {
            let (name, regex) = split_kv(v);
            s.metavariable_regex(name, regex);
        },
        "option" => |s, v| {
            let (name, value) = split_kv(v);
            s.option(name, value);
        },
        "path" => |s, v| {
            s.path(v);
        },
        "path-exclude" => |s, v| {
            s.path_exclude(v);
        },
        "path-include" => |s, v| {
            s.path_include(v);
        },
        "pattern" => |s, v| {
            s.pattern(v);
        },
        "pattern-inside" => |s, v| {
            s.pattern_inside(v);
        },
        "pattern-not" => |s, v| {
            s.pattern_not(v);
        },
        "pattern-not-inside" => |s, v| {
            s.pattern_not_inside(v);
        },
        "pattern-not-regex" => |s, v| {
            s.pattern_not_regex(v);
        },
        "pattern-regex" => |s, v| {
            s.pattern_regex(v);
        },
        "severity" => |s, v| {
            s.severity(v);
        },
        _ => return None,
    };
    Some(op)
}

/// Folds the argument stream into a builder, starting with one
/// implicit rule. Unknown commands and trailing value flags are hard
/// errors; everything else is the builder's permissive territory.
pub fn parse(args: &[String]) -> Result<State> {
    let mut state = State::new();
    state.rule();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let Some(cmd) = canonical(arg) else {
            bail!("invalid command: {arg}");
        };
        if apply_flag(&mut state, cmd) {
            continue;
        }
        let Some(op) = value_flag(cmd) else {
            bail!("unknown command --{cmd}");
        };
        let Some(value) = iter.next() else {
            bail!("missing value for --{cmd}");
        };
        op(&mut state, value);
    }

    Ok(state)
}
