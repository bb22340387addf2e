//! Project discovery: VCS root, branch, and virtualenv matching.
//!
//! The project root scopes config-file lookups and mypy's cache directory.
//! Resolution order:
//! 1. Closest ancestor holding a VCS marker directory.
//! 2. First ancestor (from `/` down) whose name is also a virtualenv under
//!    the virtualenv base directory.
//! 3. The file's own directory.

use crate::exec::{ExecContext, Executor};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsKind {
    Git,
    Svn,
    Hg,
    Cvs,
    Jedi,
}

impl VcsKind {
    /// Marker directories in the order they are checked.
    pub const MARKERS: [(&'static str, VcsKind); 5] = [
        (".git", VcsKind::Git),
        (".svn", VcsKind::Svn),
        (".hg", VcsKind::Hg),
        (".cvs", VcsKind::Cvs),
        (".jedi", VcsKind::Jedi),
    ];

    /// Command printing the current branch, for kinds that have one.
    fn branch_command(&self) -> Option<&'static [&'static str]> {
        match self {
            VcsKind::Git => Some(&["git", "symbolic-ref", "--short", "HEAD"]),
            VcsKind::Hg => Some(&["hg", "branch"]),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    pub root: PathBuf,
    pub vcs: Option<VcsKind>,
    pub branch: Option<String>,
    pub virtualenv: Option<PathBuf>,
}

impl ProjectContext {
    /// Resolve the project for `filepath`. Branch lookup spawns a VCS
    /// command, so callers should keep the result around.
    pub fn resolve(
        filepath: &Path,
        venv_root: &Path,
        executor: &dyn Executor,
        exec: &ExecContext,
    ) -> Self {
        let filepath = absolute(filepath);
        let virtualenv = guess_virtualenv(&filepath, venv_root);
        if let Some((root, kind)) = find_vcs_root(&filepath) {
            let branch = vcs_branch_name(&root, kind, executor, exec);
            debug!(root = %root.display(), ?kind, ?branch, "found VCS root");
            return Self {
                root,
                vcs: Some(kind),
                branch,
                virtualenv: virtualenv.map(|(_, venv)| venv),
            };
        }
        if let Some((root, venv)) = virtualenv {
            debug!(root = %root.display(), venv = %venv.display(), "matched virtualenv");
            return Self {
                root,
                vcs: None,
                branch: None,
                virtualenv: Some(venv),
            };
        }
        Self {
            root: parent_dir(&filepath),
            vcs: None,
            branch: None,
            virtualenv: None,
        }
    }
}

/// If `dir` is a VCS root, the kind of VCS.
pub fn find_vcs_name(dir: &Path) -> Option<VcsKind> {
    VcsKind::MARKERS
        .iter()
        .find(|(marker, _)| dir.join(marker).is_dir())
        .map(|(_, kind)| *kind)
}

/// Walk upward from the file's directory to the first VCS root.
pub fn find_vcs_root(source_file: &Path) -> Option<(PathBuf, VcsKind)> {
    let start = parent_dir(source_file);
    start
        .ancestors()
        .find_map(|dir| find_vcs_name(dir).map(|kind| (dir.to_path_buf(), kind)))
}

/// Current branch in `vcs_root`, or `None` when the VCS has no branches,
/// the command fails, or it prints nothing.
pub fn vcs_branch_name(
    vcs_root: &Path,
    kind: VcsKind,
    executor: &dyn Executor,
    exec: &ExecContext,
) -> Option<String> {
    let args = kind.branch_command()?;
    let inv = exec
        .invocation(args.iter().map(|a| a.to_string()).collect(), Vec::new())
        .in_dir(vcs_root);
    let out = executor.execute(&inv).ok()?;
    let branch = out.stdout.trim();
    if branch.is_empty() {
        None
    } else {
        Some(branch.to_string())
    }
}

/// Match a directory on the file's path against the virtualenvs under
/// `venv_root`. Returns `(project_dir, virtualenv_path)` for the match
/// closest to the filesystem root.
pub fn guess_virtualenv(source_file: &Path, venv_root: &Path) -> Option<(PathBuf, PathBuf)> {
    let dir = parent_dir(&absolute(source_file));
    let mut used = PathBuf::new();
    for component in dir.components() {
        used.push(component.as_os_str());
        if let Component::Normal(name) = component {
            let candidate = venv_root.join(name);
            if candidate.exists() {
                return Some((used, candidate));
            }
        }
    }
    None
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if rest.is_empty() || rest.starts_with('/') {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest.trim_start_matches('/'));
            }
        }
    }
    PathBuf::from(path)
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
