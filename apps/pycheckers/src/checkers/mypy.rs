//! mypy, in Python 2 or Python 3 mode.
//!
//! Editors often check a shadow copy named `flycheck_<name>` next to the
//! real file. mypy is pointed at the original path and told about the
//! shadow with `--shadow-file`, so per-file settings in its config still
//! apply; findings are then matched back against the original name.

use super::{Checker, RunEnv};
use crate::models::Fields;
use crate::project::ProjectContext;
use crate::version::Version;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<filename>[^:]+):(?P<line_number>\d+):(?:(?P<column_number>\d+):)? (?P<level>[^:]+): (?P<description>.+)$",
    )
    .expect("mypy line pattern")
});

static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^mypy (?P<version>[0-9.]+)").expect("mypy version pattern"));

const SHADOW_PREFIX: &str = "flycheck_";

pub struct Mypy {
    name: &'static str,
    py2: bool,
}

impl Mypy {
    pub fn py2() -> Self {
        Self {
            name: "mypy2",
            py2: true,
        }
    }

    pub fn py3() -> Self {
        Self {
            name: "mypy3",
            py2: false,
        }
    }
}

/// The real file behind an editor shadow copy. Only the file name's
/// leading `flycheck_` is stripped; other paths come back unchanged.
pub fn original_path(filepath: &Path) -> PathBuf {
    let original = filepath
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_prefix(SHADOW_PREFIX))
        .filter(|n| !n.is_empty());
    match original {
        Some(name) => filepath.with_file_name(name),
        None => filepath.to_path_buf(),
    }
}

/// Per-branch incremental cache so switching branches does not thrash it.
pub fn cache_dir(project: &ProjectContext) -> PathBuf {
    project
        .root
        .join(".mypy_cache")
        .join("branches")
        .join(project.branch.as_deref().unwrap_or("HEAD"))
}

impl Checker for Mypy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn command(&self) -> &'static str {
        "mypy"
    }

    fn legacy_name(&self) -> Option<&'static str> {
        self.py2.then_some("mypy")
    }

    fn config_option(&self) -> Option<&'static str> {
        Some("mypy_config_file")
    }

    fn flags(&self, filepath: &Path, env: &mut RunEnv<'_>) -> Vec<String> {
        let mut args = vec!["--incremental".to_string()];
        let version = env.probe_version(self);
        if !version.is_unknown() && version < Version::from_parts(&[0, 660]) {
            args.push("--quick-and-dirty".to_string());
        }
        let cache = cache_dir(env.project(filepath));
        args.push(format!("--cache-dir={}", cache.display()));
        if self.py2 {
            args.push("--py2".to_string());
        }
        if let Some(config) = env.find_config_file(filepath, &["mypy.ini"]) {
            args.push("--config-file".to_string());
            args.push(config.to_string_lossy().into_owned());
        }
        if env.options.get_bool("mypy_no_implicit_optional", false) {
            args.push("--no-implicit-optional".to_string());
        }
        let original = original_path(filepath);
        if original != filepath {
            args.push("--shadow-file".to_string());
            args.push(filepath.to_string_lossy().into_owned());
            args.push(original.to_string_lossy().into_owned());
        }
        args
    }

    fn target(&self, filepath: &Path) -> PathBuf {
        original_path(filepath)
    }

    fn parse_line(&self, line: &str) -> Option<Fields> {
        Fields::capture(&LINE, line)
    }

    fn classify(&self, mut fields: Fields, filepath: &Path) -> Option<Fields> {
        let original = original_path(filepath);
        let basename = original.file_name()?.to_string_lossy().into_owned();
        let reported = Path::new(fields.get("filename")?).file_name()?.to_string_lossy();
        if reported != basename.as_str() {
            return None;
        }
        fields.set("filename", basename);

        let level = match fields.get("level")?.trim().to_uppercase().as_str() {
            "NOTE" => "INFO".to_string(),
            other => other.to_string(),
        };
        fields.set("level", level);
        Some(fields)
    }

    fn version_pattern(&self) -> Option<&'static Regex> {
        Some(&VERSION)
    }
}
