//! Subprocess execution behind an explicit context.
//!
//! Checkers never touch the process-wide environment. The search path (with
//! any detected virtualenv prepended) lives in an `ExecContext` that is
//! threaded into every spawn, and spawning itself goes
//! through the `Executor` trait so runs can be driven by canned outputs.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Program used to look the checker up on the child's `PATH`.
pub const ENV_LOOKUP: &str = "/usr/bin/env";

/// Search path shared by every spawned process.
#[derive(Debug, Clone, Default)]
pub struct ExecContext {
    search_path: Vec<PathBuf>,
}

impl ExecContext {
    pub fn new(search_path: Vec<PathBuf>) -> Self {
        Self { search_path }
    }

    /// Start from the `PATH` this process was launched with.
    pub fn from_process_env() -> Self {
        let search_path = std::env::var_os("PATH")
            .map(|p| std::env::split_paths(&p).collect())
            .unwrap_or_default();
        Self::new(search_path)
    }

    /// Put `dir` in front of the search path, e.g. a virtualenv's `bin`.
    pub fn with_prepended(mut self, dir: PathBuf) -> Self {
        self.search_path.insert(0, dir);
        self
    }

    /// The search path joined into a `PATH` value. Entries that cannot be
    /// joined (they contain the separator) are skipped.
    pub fn path_var(&self) -> OsString {
        let usable: Vec<&PathBuf> = self
            .search_path
            .iter()
            .filter(|p| std::env::join_paths([p.as_os_str()]).is_ok())
            .collect();
        std::env::join_paths(usable).unwrap_or_default()
    }

    /// Build an invocation carrying this context's `PATH` and the
    /// checker-specific `env`.
    pub fn invocation(&self, args: Vec<String>, env: Vec<(String, String)>) -> Invocation {
        Invocation {
            args,
            env,
            path_var: self.path_var(),
            cwd: None,
        }
    }
}

/// One fully-specified process launch.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub path_var: OsString,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    /// The tool being run, skipping the `env` lookup wrapper.
    pub fn program(&self) -> Option<&str> {
        match self.args.first().map(String::as_str) {
            Some(ENV_LOOKUP) => self.args.get(1).map(String::as_str),
            other => other,
        }
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn new(status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// Spawns processes and resolves executables.
pub trait Executor: Send + Sync {
    /// Locate `program` on the context's search path, returning its full
    /// path only when it exists and is executable.
    fn resolve(&self, program: &str, ctx: &ExecContext) -> Option<PathBuf>;

    /// Run to completion, capturing stdout and stderr in full.
    fn execute(&self, invocation: &Invocation) -> io::Result<ToolOutput>;
}

/// Executor backed by real OS processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn resolve(&self, program: &str, ctx: &ExecContext) -> Option<PathBuf> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        which::which_in(program, Some(ctx.path_var()), cwd).ok()
    }

    fn execute(&self, invocation: &Invocation) -> io::Result<ToolOutput> {
        let (program, args) = invocation
            .args
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;
        debug!("Running {} {:?}", program, args);

        let mut command = Command::new(program);
        command
            .args(args)
            .env("PATH", &invocation.path_var)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = invocation.cwd.as_ref() {
            command.current_dir(dir);
        }

        let output = command.output()?;
        Ok(ToolOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
pub mod testing {
    //! Recording executor returning canned outputs keyed by program name.

    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockExecutor {
        installed: HashSet<String>,
        outputs: HashMap<String, ToolOutput>,
        spawn_errors: HashSet<String>,
        versions: HashMap<String, String>,
        calls: Mutex<Vec<Invocation>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Mark `program` as present and answer its runs with `output`.
        pub fn with_tool(mut self, program: &str, output: ToolOutput) -> Self {
            self.installed.insert(program.to_string());
            self.outputs.insert(program.to_string(), output);
            self
        }

        /// Mark `program` as present but make every launch of it fail,
        /// as when the file is not executable.
        pub fn with_spawn_error(mut self, program: &str) -> Self {
            self.installed.insert(program.to_string());
            self.spawn_errors.insert(program.to_string());
            self
        }

        /// Answer `program --version` with `text` on stdout.
        pub fn with_version(mut self, program: &str, text: &str) -> Self {
            self.versions.insert(program.to_string(), text.to_string());
            self
        }

        pub fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().map(|c| c.len()).unwrap_or_default()
        }
    }

    impl Executor for MockExecutor {
        fn resolve(&self, program: &str, _ctx: &ExecContext) -> Option<PathBuf> {
            let name = Path::new(program).file_name()?.to_string_lossy().to_string();
            self.installed
                .contains(&name)
                .then(|| PathBuf::from("/mock/bin").join(name))
        }

        fn execute(&self, invocation: &Invocation) -> io::Result<ToolOutput> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(invocation.clone());
            }
            let program = invocation.program().unwrap_or_default().to_string();
            if self.spawn_errors.contains(&program) {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "Permission denied",
                ));
            }
            if invocation.args.iter().any(|a| a == "--version") {
                if let Some(v) = self.versions.get(&program) {
                    return Ok(ToolOutput::new(0, v.clone(), ""));
                }
            }
            self.outputs.get(&program).cloned().ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("{} not mocked", program))
            })
        }
    }
}
