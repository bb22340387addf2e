//! The shared run contract for one checker on one file.

use super::{Checker, CheckerConfig};
use crate::config::Options;
use crate::exec::{ExecContext, Executor, ENV_LOOKUP};
use crate::models::{Diagnostic, Fields, Level, RunOutcome};
use crate::project::{expand_home, ProjectContext};
use crate::version::Version;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

const NOT_FOUND: &str = "Checker not found on PATH, unable to check";
const FAILED: &str = "Checker indicated failure of some kind";

/// Values computed at most once per run.
#[derive(Debug, Default)]
pub struct RunnerState {
    pub project: Option<ProjectContext>,
    pub version: Option<Version>,
    pub debug_lines: Vec<String>,
}

/// What a checker may consult while building its flags.
pub struct RunEnv<'a> {
    pub config: CheckerConfig,
    pub options: &'a Options,
    executor: &'a dyn Executor,
    exec: &'a ExecContext,
    state: RunnerState,
}

impl<'a> RunEnv<'a> {
    pub fn new(
        config: CheckerConfig,
        options: &'a Options,
        executor: &'a dyn Executor,
        exec: &'a ExecContext,
    ) -> Self {
        Self {
            config,
            options,
            executor,
            exec,
            state: RunnerState::default(),
        }
    }

    /// Project context for `filepath`, resolved on first use.
    pub fn project(&mut self, filepath: &Path) -> &ProjectContext {
        let (options, executor, exec) = (self.options, self.executor, self.exec);
        self.state.project.get_or_insert_with(|| {
            let venv_root = expand_home(&options.venv_root());
            ProjectContext::resolve(filepath, &venv_root, executor, exec)
        })
    }

    /// The tool's version, probed with `--version` on first use. Unknown
    /// versions read as `0`.
    pub fn probe_version(&mut self, checker: &dyn Checker) -> Version {
        if let Some(v) = &self.state.version {
            return v.clone();
        }
        let version = checker
            .version_pattern()
            .and_then(|re| {
                let args = vec![
                    ENV_LOOKUP.to_string(),
                    checker.command().to_string(),
                    "--version".to_string(),
                ];
                let inv = self.exec.invocation(args, checker.env_vars(&self.config));
                let out = self.executor.execute(&inv).ok()?;
                let caps = re.captures(out.stdout.trim_start())?;
                Version::parse(caps.name("version")?.as_str())
            })
            .unwrap_or_default();
        self.debug_line(format!("{} version: {}", checker.command(), version));
        self.state.version = Some(version.clone());
        version
    }

    /// The explicitly configured config file, or the first of `names`
    /// found in the project root.
    pub fn find_config_file(&mut self, filepath: &Path, names: &[&str]) -> Option<PathBuf> {
        if let Some(explicit) = &self.config.config_file {
            return Some(explicit.clone());
        }
        let root = self.project(filepath).root.clone();
        names
            .iter()
            .map(|name| root.join(name))
            .find(|candidate| candidate.exists())
    }

    pub fn debug_line(&mut self, line: String) {
        debug!("{}", line);
        self.state.debug_lines.push(line);
    }
}

/// Drives one checker through a single run.
pub struct Runner<'a> {
    checker: Box<dyn Checker>,
    env: RunEnv<'a>,
}

impl<'a> Runner<'a> {
    pub fn new(checker: Box<dyn Checker>, env: RunEnv<'a>) -> Self {
        Self { checker, env }
    }

    /// Full argument vector for `filepath`. A command override replaces
    /// everything; otherwise `env <command> <flags...> <target>`.
    pub fn build_arguments(&mut self, filepath: &Path) -> Vec<String> {
        if let Some(args) = self.env.config.override_arguments(filepath) {
            return args;
        }
        let mut args = vec![ENV_LOOKUP.to_string(), self.checker.command().to_string()];
        args.extend(self.checker.flags(filepath, &mut self.env));
        args.push(self.checker.target(filepath).to_string_lossy().into_owned());
        args
    }

    /// Run the checker. Never fails: problems with the tool itself come
    /// back as synthesized diagnostics.
    pub fn run(mut self, filepath: &Path) -> RunOutcome {
        let started = Instant::now();
        let name = self.checker.name();
        let display = filepath.to_string_lossy().into_owned();
        let mut outcome = RunOutcome::new(name);

        let program = self
            .env
            .config
            .command_override
            .as_ref()
            .and_then(|args| args.first().cloned())
            .unwrap_or_else(|| self.checker.command().to_string());
        if self.env.executor.resolve(&program, self.env.exec).is_none() {
            warn!(checker = name, program = %program, "checker not found on search path");
            outcome
                .diagnostics
                .push(Diagnostic::synthesized(Level::Error, name, NOT_FOUND, &display));
            return outcome;
        }

        let args = self.build_arguments(filepath);
        self.env
            .debug_line(format!("{} arguments: {}", name, shell_words::join(&args)));
        let inv = self
            .env
            .exec
            .invocation(args, self.checker.env_vars(&self.env.config));
        let output = match self.env.executor.execute(&inv) {
            Ok(output) => output,
            Err(e) => {
                warn!(checker = name, error = %e, "failed to spawn checker");
                outcome.diagnostics.push(Diagnostic::synthesized(
                    Level::Error,
                    name,
                    &format!("Failed to run checker: {}", e),
                    &display,
                ));
                return outcome;
            }
        };

        for line in output.stdout.lines().chain(output.stderr.lines()) {
            if let Some(diagnostic) = self.normalize(line, filepath) {
                outcome.diagnostics.push(diagnostic);
            }
        }

        let clean = output.status.is_some_and(|code| self.checker.accepts(code));
        if !clean {
            debug!(checker = name, status = ?output.status, "checker reported failure");
            outcome
                .diagnostics
                .push(Diagnostic::synthesized(Level::Warning, name, FAILED, &display));
            if self.env.options.report_checker_errors_inline() {
                for line in output.stderr.lines().filter(|l| !l.trim().is_empty()) {
                    outcome
                        .diagnostics
                        .push(Diagnostic::synthesized(Level::Warning, name, line, &display));
                }
            }
        }

        self.env.debug_line(format!(
            "{} took {:.2}s",
            name,
            started.elapsed().as_secs_f64()
        ));
        if self.env.options.debug() {
            for line in &self.env.state.debug_lines {
                outcome
                    .diagnostics
                    .push(Diagnostic::synthesized(Level::Info, name, line, &display));
            }
        }
        outcome
    }

    /// Parse, classify and prefix one output line. Lines that are not
    /// findings, and findings whose code is ignored, yield `None`.
    fn normalize(&self, line: &str, filepath: &Path) -> Option<Diagnostic> {
        let fields = self.checker.parse_line(line)?;
        let mut fields: Fields = self.checker.classify(fields, filepath)?;
        if let Some(desc) = fields.get("description").map(str::to_string) {
            fields.set("description", format!("{}: {}", self.checker.name(), desc));
        }
        let diagnostic = Diagnostic::from_fields(&fields)?;
        let config = &self.env.config;
        if config.is_ignored(&diagnostic.code()) || config.is_ignored(&diagnostic.error_number) {
            debug!(checker = self.checker.name(), code = %diagnostic.code(), "dropping ignored finding");
            return None;
        }
        Some(diagnostic)
    }
}
