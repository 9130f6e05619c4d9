//! Materializes the rule document on disk and drives the external
//! engine with inherited standard streams.

use anyhow::{Context, Result};
use rule::{Document, RunSettings, State};
use std::fs;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};
use tempfile::TempDir;
use tracing::{debug, warn};

/// One engine invocation: a temp dir holding the generated rules file
/// and any eval snippet inputs. The directory is removed on drop.
pub struct Runner {
    document: Document,
    settings: RunSettings,
    warnings: Vec<String>,
    tmp: TempDir,
    rules_path: PathBuf,
    eval_paths: Vec<PathBuf>,
}

impl Runner {
    pub fn new(state: State) -> Result<Self> {
        let (document, settings, warnings) = state.into_parts();
        let tmp = tempfile::Builder::new()
            .prefix("semsketch-")
            .tempdir()
            .context("failed to create temporary directory")?;
        let rules_path = tmp.path().join("rules.yaml");
        let mut runner = Runner {
            document,
            settings,
            warnings,
            tmp,
            rules_path,
            eval_paths: Vec::new(),
        };
        runner.prepare()?;
        Ok(runner)
    }

    fn prepare(&mut self) -> Result<()> {
        let yaml = self.render()?;
        fs::write(&self.rules_path, yaml).context("failed to write rules file")?;
        for (i, eval) in self.settings.evals.iter().enumerate() {
            let path = self.tmp.path().join(format!("eval-{i}"));
            fs::write(&path, eval).with_context(|| format!("failed to write eval input {i}"))?;
            self.eval_paths.push(path);
        }
        Ok(())
    }

    fn render(&self) -> Result<String> {
        self.document.to_yaml().context("failed to serialize rules")
    }

    /// Assembles the engine argument list. Eval inputs have no
    /// recognizable extension, so their presence forces
    /// `--scan-unknown-extensions`.
    pub fn engine_args(&self) -> Vec<String> {
        let mut args = vec![
            "scan".to_string(),
            "--no-rewrite-rule-ids".to_string(),
            "--disable-version-check".to_string(),
            format!("--{}", self.settings.format),
        ];

        for config in &self.settings.configs {
            args.push("--config".to_string());
            args.push(config.clone());
        }
        args.push("--config".to_string());
        args.push(self.rules_path.display().to_string());

        if !self.settings.evals.is_empty() {
            args.push("--scan-unknown-extensions".to_string());
        }
        if self.settings.autofix {
            args.push("--autofix".to_string());
        }
        if self.settings.verbose {
            args.push("--verbose".to_string());
        } else {
            args.push("--quiet".to_string());
        }

        args.extend(self.eval_paths.iter().map(|p| p.display().to_string()));
        args.extend(self.settings.paths.iter().cloned());
        args
    }

    /// Surfaces accumulated warnings, then either exports the document
    /// or spawns the engine. Returns the engine exit status, or `None`
    /// in export mode.
    pub fn run(self) -> Result<Option<ExitStatus>> {
        for warning in &self.warnings {
            warn!("{warning}");
        }

        let yaml = self.render()?;
        debug!("generated rules:\n{yaml}");
        debug!(
            "command: {} {}",
            self.settings.command,
            self.engine_args().join(" ")
        );

        if self.settings.export {
            print!("{yaml}");
            return Ok(None);
        }

        let status = Command::new(&self.settings.command)
            .args(self.engine_args())
            .status()
            .with_context(|| format!("failed to run '{}'", self.settings.command))?;
        Ok(Some(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner_for(build: impl FnOnce(&mut State)) -> Runner {
        let mut state = State::new();
        state.rule();
        build(&mut state);
        Runner::new(state).unwrap()
    }

    #[test]
    fn engine_args_carry_format_and_generated_config() {
        let runner = runner_for(|s| {
            s.pattern("foo").format("json").path("src/");
        });
        let args = runner.engine_args();
        assert_eq!(args[0], "scan");
        assert!(args.contains(&"--json".to_string()));
        assert!(args.contains(&"--quiet".to_string()));
        let config = args
            .iter()
            .position(|a| a == "--config")
            .expect("generated config flag");
        assert!(args[config + 1].ends_with("rules.yaml"));
        assert_eq!(args.last().unwrap(), "src/");
    }

    #[test]
    fn extra_configs_come_before_the_generated_one() {
        let runner = runner_for(|s| {
            s.config("extra.yaml");
        });
        let args = runner.engine_args();
        let configs: Vec<&String> = args
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == "--config")
            .map(|(i, _)| &args[i + 1])
            .collect();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0], "extra.yaml");
        assert!(configs[1].ends_with("rules.yaml"));
    }

    #[test]
    fn eval_snippets_enable_unknown_extension_scanning() {
        let runner = runner_for(|s| {
            s.pattern("foo").eval("foo()");
        });
        let args = runner.engine_args();
        assert!(args.contains(&"--scan-unknown-extensions".to_string()));
        assert!(args.iter().any(|a| a.ends_with("eval-0")));
        let written = std::fs::read_to_string(&runner.eval_paths[0]).unwrap();
        assert_eq!(written, "foo()");
    }

    #[test]
    fn verbose_replaces_quiet() {
        let runner = runner_for(|s| {
            s.verbose().autofix();
        });
        let args = runner.engine_args();
        assert!(args.contains(&"--verbose".to_string()));
        assert!(args.contains(&"--autofix".to_string()));
        assert!(!args.contains(&"--quiet".to_string()));
    }

    #[test]
    fn rules_file_holds_the_serialized_document() {
        let runner = runner_for(|s| {
            s.pattern("foo($X)");
        });
        let written = std::fs::read_to_string(&runner.rules_path).unwrap();
        assert!(written.starts_with("rules:"));
        assert!(written.contains("pattern: foo($X)"));
    }
}
