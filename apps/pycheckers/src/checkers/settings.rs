//! Per-checker settings resolved from the frozen options.

use super::Checker;
use crate::config::{OptionValue, Options};
use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Immutable settings for one checker run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckerConfig {
    /// `None` means no ignore flag is passed at all.
    pub ignore_codes: Option<BTreeSet<String>>,
    pub enable_codes: BTreeSet<String>,
    pub max_line_length: u32,
    /// Explicitly configured tool config file; known to exist.
    pub config_file: Option<PathBuf>,
    /// Replacement command line from `<name>_command`, already split.
    pub command_override: Option<Vec<String>>,
}

impl CheckerConfig {
    pub fn resolve(checker: &dyn Checker, options: &Options) -> Result<Self> {
        let config_file = match checker.config_option() {
            Some(key) => match options.get_path(key) {
                Some(path) if !path.exists() => {
                    return Err(Error::MissingConfigFile {
                        path,
                        checker: checker.name().to_string(),
                    })
                }
                other => other,
            },
            None => None,
        };

        let command = checker_option(checker, options, "command")
            .map(|(key, value)| (key, value.as_string()));
        let command_override = match command {
            Some((command_key, raw)) if !raw.trim().is_empty() => {
                let parts = shell_words::split(&raw).map_err(|e| Error::InvalidOption {
                    key: command_key,
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
                Some(parts).filter(|p| !p.is_empty())
            }
            _ => None,
        };

        Ok(Self {
            ignore_codes: resolve_ignore_codes(checker, options),
            enable_codes: options.enable_codes(),
            max_line_length: options.max_line_length()?,
            config_file,
            command_override,
        })
    }

    /// Comma-joined ignore codes, if any were configured.
    pub fn ignore_flag_value(&self) -> Option<String> {
        self.ignore_codes
            .as_ref()
            .map(|codes| codes.iter().cloned().collect::<Vec<_>>().join(","))
    }

    pub fn is_ignored(&self, code: &str) -> bool {
        self.ignore_codes
            .as_ref()
            .is_some_and(|codes| codes.contains(code))
    }

    /// Substitute `%f` in the override template with `target`.
    pub fn override_arguments(&self, target: &Path) -> Option<Vec<String>> {
        let template = self.command_override.as_ref()?;
        let target = target.to_string_lossy();
        Some(
            template
                .iter()
                .map(|part| {
                    if part == "%f" {
                        target.to_string()
                    } else {
                        part.clone()
                    }
                })
                .collect(),
        )
    }
}

/// The `<name>_<suffix>` option for `checker`, falling back to its legacy
/// name. Returns the key that matched along with the value.
fn checker_option<'o>(
    checker: &dyn Checker,
    options: &'o Options,
    suffix: &str,
) -> Option<(String, &'o OptionValue)> {
    std::iter::once(checker.name())
        .chain(checker.legacy_name())
        .map(|name| format!("{}_{}", name, suffix))
        .find_map(|key| options.get(&key).map(|value| (key, value)))
}

/// Ignore codes for `checker`:
/// 1. `<name>_ignore_codes` replaces the general list outright.
/// 2. Otherwise the general list, narrowed by scoped entries.
/// 3. Either way, limited to the codes the tool accepts.
fn resolve_ignore_codes(checker: &dyn Checker, options: &Options) -> Option<BTreeSet<String>> {
    let specific = checker_option(checker, options, "ignore_codes");
    let codes: BTreeSet<String> = match specific {
        Some((_, value)) => value.as_list().into_iter().collect(),
        None => scope_ignore_codes(&options.ignore_codes()?, checker.name(), checker.command()),
    };
    Some(match checker.acceptable_codes() {
        Some(allowed) => codes
            .into_iter()
            .filter(|c| allowed.contains(&c.as_str()))
            .collect(),
        None => codes,
    })
}

/// Apply the legacy scoping syntax to a general ignore list.
///
/// Unscoped entries apply to every checker. A scoped entry looks like
/// `(CODE:spec|spec...)` where each spec is `name`, `+name` or `-name`
/// (matching the checker name or command); the first matching spec decides
/// whether the code applies, and an entry with no matching spec does not.
pub fn scope_ignore_codes(entries: &[String], name: &str, command: &str) -> BTreeSet<String> {
    let positive = [
        name.to_string(),
        command.to_string(),
        format!("+{}", name),
        format!("+{}", command),
    ];
    let negative = [format!("-{}", name), format!("-{}", command)];

    let mut out = BTreeSet::new();
    for entry in entries {
        let Some(inner) = entry.strip_prefix('(') else {
            out.insert(entry.clone());
            continue;
        };
        let inner = inner.trim_end_matches(')');
        let Some((code, specs)) = inner.split_once(':') else {
            continue;
        };
        for spec in specs.split(&[',', '|'][..]).map(str::trim) {
            if positive.iter().any(|p| p == spec) {
                out.insert(code.trim().to_string());
                break;
            }
            if negative.iter().any(|n| n == spec) {
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::checker_for;
    use tempfile::tempdir;

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn set(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scoped_entries() {
        let entries = codes(&["E501", "(C0122:-bandit)", "(B101:bandit|+flake8)", "(W1:pep8)"]);
        assert_eq!(
            scope_ignore_codes(&entries, "bandit", "bandit"),
            set(&["B101", "E501"])
        );
        assert_eq!(
            scope_ignore_codes(&entries, "flake8", "flake8"),
            set(&["B101", "E501"])
        );
        assert_eq!(scope_ignore_codes(&entries, "pep8", "pep8"), set(&["E501", "W1"]));
        assert_eq!(scope_ignore_codes(&entries, "mypy3", "mypy"), set(&["E501"]));
    }

    #[test]
    fn test_checker_specific_list_replaces_general() {
        let mut options = Options::with_defaults();
        options.set("ignore_codes", OptionValue::Str("E501,W0611".into()));
        options.set("pylint_ignore_codes", OptionValue::Str("C0111".into()));
        let pylint = checker_for("pylint").unwrap();
        let cfg = CheckerConfig::resolve(pylint.as_ref(), &options).unwrap();
        assert_eq!(cfg.ignore_codes, Some(set(&["C0111"])));

        let flake8 = checker_for("flake8").unwrap();
        let cfg = CheckerConfig::resolve(flake8.as_ref(), &options).unwrap();
        assert_eq!(cfg.ignore_codes, Some(set(&["E501", "W0611"])));
        assert_eq!(cfg.ignore_flag_value().as_deref(), Some("E501,W0611"));
    }

    #[test]
    fn test_no_general_list_means_no_ignore_flag() {
        let options = Options::with_defaults();
        let flake8 = checker_for("flake8").unwrap();
        let cfg = CheckerConfig::resolve(flake8.as_ref(), &options).unwrap();
        assert_eq!(cfg.ignore_codes, None);
        assert_eq!(cfg.max_line_length, 79);
    }

    #[test]
    fn test_bandit_allow_list() {
        let mut options = Options::with_defaults();
        options.set("ignore_codes", OptionValue::Str("E501,B101,B999,B702".into()));
        let bandit = checker_for("bandit").unwrap();
        let cfg = CheckerConfig::resolve(bandit.as_ref(), &options).unwrap();
        assert_eq!(cfg.ignore_codes, Some(set(&["B101", "B702"])));
    }

    #[test]
    fn test_mypy2_reads_legacy_mypy_options() {
        let mut options = Options::with_defaults();
        options.set("mypy_ignore_codes", OptionValue::Str("misc".into()));
        options.set("mypy_command", OptionValue::Str("dmypy run -- %f".into()));
        let mypy2 = checker_for("mypy2").unwrap();
        let cfg = CheckerConfig::resolve(mypy2.as_ref(), &options).unwrap();
        assert_eq!(cfg.ignore_codes, Some(set(&["misc"])));
        assert_eq!(
            cfg.command_override,
            Some(codes(&["dmypy", "run", "--", "%f"]))
        );

        options.set("mypy2_ignore_codes", OptionValue::Str("attr-defined".into()));
        let cfg = CheckerConfig::resolve(mypy2.as_ref(), &options).unwrap();
        assert_eq!(cfg.ignore_codes, Some(set(&["attr-defined"])));

        let mypy3 = checker_for("mypy3").unwrap();
        let cfg = CheckerConfig::resolve(mypy3.as_ref(), &options).unwrap();
        assert_eq!(cfg.ignore_codes, None);
        assert_eq!(cfg.command_override, None);
    }

    #[test]
    fn test_missing_explicit_config_file_is_fatal() {
        let mut options = Options::with_defaults();
        options.set(
            "mypy_config_file",
            OptionValue::Str("/definitely/not/here/mypy.ini".into()),
        );
        let mypy = checker_for("mypy3").unwrap();
        let err = CheckerConfig::resolve(mypy.as_ref(), &options).unwrap_err();
        assert!(matches!(err, Error::MissingConfigFile { ref checker, .. } if checker == "mypy3"));
    }

    #[test]
    fn test_existing_config_file_and_command_override() {
        let tmp = tempdir().unwrap();
        let rc = tmp.path().join("pylintrc");
        std::fs::write(&rc, "[MASTER]\n").unwrap();
        let mut options = Options::with_defaults();
        options.set("pylint_rcfile", OptionValue::Str(rc.to_string_lossy().into()));
        options.set(
            "pylint_command",
            OptionValue::Str("tools/run-lint --format 'parseable' %f".into()),
        );
        let pylint = checker_for("pylint").unwrap();
        let cfg = CheckerConfig::resolve(pylint.as_ref(), &options).unwrap();
        assert_eq!(cfg.config_file, Some(rc));
        assert_eq!(
            cfg.override_arguments(Path::new("/src/a.py")).unwrap(),
            codes(&["tools/run-lint", "--format", "parseable", "/src/a.py"])
        );
    }
}
