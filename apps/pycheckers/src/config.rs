//! Options and per-directory config file discovery.
//!
//! Options start from CLI values and defaults, then every `.pycheckers`
//! (INI) or `.pycheckers.toml` file from the checked file's directory up to
//! the filesystem root is merged in. Rules:
//! - The closest file wins for ordinary keys.
//! - `extra_ignore_codes` is cumulative: each level appends to `ignore_codes`.
//! - Keys naming a tool config file (`*config_file`, `*rcfile`) resolve
//!   relative to the config file that set them.
//! - When `merge_configs` is false after a file is applied, the walk stops.
//!
//! Config file values override CLI values.

use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = ".pycheckers";
pub const TOML_CONFIG_FILE_NAME: &str = ".pycheckers.toml";

/// Checkers run when none are requested.
pub const DEFAULT_CHECKERS: &str = "pylint,mypy2,mypy3";
pub const DEFAULT_MAX_LINE_LENGTH: u32 = 79;
pub const DEFAULT_VENV_ROOT: &str = "~/.virtualenvs";

/// Keys that accumulate across config levels instead of being overridden.
const CUMULATIVE_KEYS: [&str; 1] = ["extra_ignore_codes"];

const TRUE_TOKENS: [&str; 6] = ["yes", "true", "t", "y", "on", "1"];
const FALSE_TOKENS: [&str; 6] = ["no", "false", "f", "n", "off", "0"];

pub fn is_true(v: &str) -> bool {
    TRUE_TOKENS.contains(&v.trim().to_ascii_lowercase().as_str())
}

pub fn is_false(v: &str) -> bool {
    FALSE_TOKENS.contains(&v.trim().to_ascii_lowercase().as_str())
}

/// Strict boolean parse used for CLI flags.
pub fn parse_bool(v: &str) -> std::result::Result<bool, String> {
    if is_true(v) {
        Ok(true)
    } else if is_false(v) {
        Ok(false)
    } else {
        Err(format!("Boolean value expected, got {:?}", v))
    }
}

/// Split a comma-separated code list, keeping commas inside parentheses so
/// scoped entries like `(B101:bandit,flake8)` stay whole.
pub fn split_list(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut depth = 0usize;
    for ch in s.chars() {
        match ch {
            '(' => {
                depth += 1;
                cur.push(ch);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                cur.push(ch);
            }
            ',' if depth == 0 => out.push(std::mem::take(&mut cur)),
            _ => cur.push(ch),
        }
    }
    out.push(cur);
    out.into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Str(String),
    Bool(bool),
    List(Vec<String>),
}

impl OptionValue {
    /// Interpret a raw config string, turning boolean-like tokens into bools.
    pub fn from_config_str(s: &str) -> Self {
        if is_false(s) {
            OptionValue::Bool(false)
        } else if is_true(s) {
            OptionValue::Bool(true)
        } else {
            OptionValue::Str(s.to_string())
        }
    }

    pub fn as_list(&self) -> Vec<String> {
        match self {
            OptionValue::Str(s) => split_list(s),
            OptionValue::List(v) => v.clone(),
            OptionValue::Bool(b) => vec![b.to_string()],
        }
    }

    pub fn as_string(&self) -> String {
        match self {
            OptionValue::Str(s) => s.clone(),
            OptionValue::List(v) => v.join(","),
            OptionValue::Bool(b) => b.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Option name to value. Frozen (shared by reference) once the config
/// cascade has been applied.
pub struct Options {
    values: BTreeMap<String, OptionValue>,
}

impl Options {
    /// Defaults for every option the checkers read.
    pub fn with_defaults() -> Self {
        let mut o = Self::default();
        o.set("checkers", OptionValue::Str(DEFAULT_CHECKERS.into()));
        o.set("enable_codes", OptionValue::List(Vec::new()));
        o.set(
            "max_line_length",
            OptionValue::Str(DEFAULT_MAX_LINE_LENGTH.to_string()),
        );
        o.set("merge_configs", OptionValue::Bool(true));
        o.set("multi_thread", OptionValue::Bool(true));
        o.set("venv_root", OptionValue::Str(DEFAULT_VENV_ROOT.into()));
        o.set("report_checker_errors_inline", OptionValue::Bool(true));
        o.set("mypy_no_implicit_optional", OptionValue::Bool(false));
        o.set("debug", OptionValue::Bool(false));
        o
    }

    pub fn set(&mut self, key: &str, value: OptionValue) {
        self.values.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    /// String value; lists are comma-joined.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).map(OptionValue::as_string)
    }

    /// Non-empty string value, e.g. an optional path.
    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get_str(key)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
    }

    /// Boolean value; unrecognized strings read as `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(OptionValue::Bool(b)) => *b,
            Some(OptionValue::Str(s)) if is_true(s) => true,
            Some(OptionValue::Str(s)) if is_false(s) => false,
            _ => default,
        }
    }

    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(OptionValue::as_list)
    }

    pub fn checkers(&self) -> Vec<String> {
        self.get_list("checkers")
            .unwrap_or_else(|| split_list(DEFAULT_CHECKERS))
    }

    /// General ignore list. `None` means no ignore flags are passed at all.
    pub fn ignore_codes(&self) -> Option<Vec<String>> {
        self.get_list("ignore_codes")
    }

    pub fn enable_codes(&self) -> BTreeSet<String> {
        self.get_list("enable_codes")
            .unwrap_or_default()
            .into_iter()
            .collect()
    }

    pub fn max_line_length(&self) -> Result<u32> {
        let raw = self
            .get_str("max_line_length")
            .unwrap_or_else(|| DEFAULT_MAX_LINE_LENGTH.to_string());
        raw.trim().parse::<u32>().map_err(|e| Error::InvalidOption {
            key: "max_line_length".into(),
            value: raw.clone(),
            reason: e.to_string(),
        })
    }

    pub fn merge_configs(&self) -> bool {
        self.get_bool("merge_configs", true)
    }

    pub fn multi_thread(&self) -> bool {
        self.get_bool("multi_thread", true)
    }

    pub fn debug(&self) -> bool {
        self.get_bool("debug", false)
    }

    pub fn report_checker_errors_inline(&self) -> bool {
        self.get_bool("report_checker_errors_inline", true)
    }

    pub fn venv_root(&self) -> String {
        self.get_str("venv_root")
            .unwrap_or_else(|| DEFAULT_VENV_ROOT.to_string())
    }

    pub fn venv_path(&self) -> Option<PathBuf> {
        self.get_path("venv_path")
    }
}

/// Default-section key/value pairs of one config file, in file order.
pub type ConfigEntries = Vec<(String, OptionValue)>;

/// Locate the config file in `dir`, preferring the INI form.
pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
    [CONFIG_FILE_NAME, TOML_CONFIG_FILE_NAME]
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// Load the default-section options of a config file.
pub fn load_config_file(path: &Path) -> Result<ConfigEntries> {
    let text = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    if path.file_name().and_then(|n| n.to_str()) == Some(TOML_CONFIG_FILE_NAME) {
        parse_toml_options(&text, path)
    } else {
        parse_ini_defaults(&text, path)
    }
}

/// Parse the `[DEFAULT]` section of an INI document. Keys are lower-cased
/// with `-` folded to `_`; `=` and `:` both separate; `#`/`;` start
/// comments; indented lines continue the previous value. Other sections
/// are ignored.
pub fn parse_ini_defaults(text: &str, path: &Path) -> Result<ConfigEntries> {
    let mut entries: ConfigEntries = Vec::new();
    let mut raw: Vec<(String, String)> = Vec::new();
    let mut section: Option<String> = None;
    let mut last_in_default = false;

    for (idx, line) in text.lines().enumerate() {
        let lineno = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }
        if line.starts_with(char::is_whitespace) && section.is_some() {
            if last_in_default {
                if let Some((_, v)) = raw.last_mut() {
                    v.push('\n');
                    v.push_str(trimmed);
                }
            }
            continue;
        }
        if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            section = Some(name.trim().to_string());
            last_in_default = false;
            continue;
        }
        let Some(current) = section.as_deref() else {
            return Err(Error::ConfigParse {
                path: path.to_path_buf(),
                line: lineno,
                message: "option outside of any section".into(),
            });
        };
        let Some(sep) = trimmed.find(&['=', ':'][..]) else {
            return Err(Error::ConfigParse {
                path: path.to_path_buf(),
                line: lineno,
                message: format!("expected key = value, got {:?}", trimmed),
            });
        };
        last_in_default = current == "DEFAULT";
        if !last_in_default {
            continue;
        }
        let key = normalize_key(&trimmed[..sep]);
        let value = trimmed[sep + 1..].trim().to_string();
        match raw.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => raw.push((key, value)),
        }
    }

    for (key, value) in raw {
        entries.push((key, OptionValue::from_config_str(&value)));
    }
    Ok(entries)
}

/// Parse top-level TOML keys. Strings get the same boolean folding as INI
/// values; integers become strings; string arrays become lists.
pub fn parse_toml_options(text: &str, path: &Path) -> Result<ConfigEntries> {
    let table: toml::Table = toml::from_str(text).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        line: e
            .span()
            .map(|s| text[..s.start.min(text.len())].lines().count().max(1))
            .unwrap_or(0),
        message: e.message().to_string(),
    })?;
    let mut entries = Vec::new();
    for (key, value) in table {
        let value = match value {
            toml::Value::String(s) => OptionValue::from_config_str(&s),
            toml::Value::Boolean(b) => OptionValue::Bool(b),
            toml::Value::Integer(i) => OptionValue::Str(i.to_string()),
            toml::Value::Float(f) => OptionValue::Str(f.to_string()),
            toml::Value::Array(items) => OptionValue::List(
                items
                    .into_iter()
                    .map(|v| match v {
                        toml::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            // tables belong to other tools sharing the file
            _ => continue,
        };
        entries.push((normalize_key(&key), value));
    }
    Ok(entries)
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace('-', "_")
}

fn is_config_path_key(key: &str) -> bool {
    key.ends_with("config_file") || key.ends_with("rcfile")
}

/// Merge config files from `source_file`'s directory upward into `options`.
/// Returns the config files that were applied, closest first.
pub fn apply_config_cascade(options: &mut Options, source_file: &Path) -> Result<Vec<PathBuf>> {
    let abs = std::path::absolute(source_file).unwrap_or_else(|_| source_file.to_path_buf());
    let start = abs.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut set_keys: BTreeSet<String> = BTreeSet::new();
    let mut applied = Vec::new();

    for dir in start.ancestors() {
        let Some(config_path) = find_config_file(dir) else {
            continue;
        };
        debug!(path = %config_path.display(), "applying config file");
        // cumulative keys extend this level's own ignore_codes, whatever
        // order the file lists them in
        let (extras, ordinary): (ConfigEntries, ConfigEntries) = load_config_file(&config_path)?
            .into_iter()
            .partition(|(key, _)| CUMULATIVE_KEYS.contains(&key.as_str()));
        for (key, value) in ordinary.into_iter().chain(extras) {
            let cumulative = CUMULATIVE_KEYS.contains(&key.as_str());
            if set_keys.contains(&key) && !cumulative {
                continue;
            }
            set_keys.insert(key.clone());

            if cumulative {
                let mut codes = options.ignore_codes().unwrap_or_default();
                codes.extend(value.as_list());
                options.set("ignore_codes", OptionValue::List(codes));
                continue;
            }
            let value = match value {
                OptionValue::Str(s) if is_config_path_key(&key) => {
                    let p = PathBuf::from(&s);
                    let resolved = if p.is_absolute() { p } else { dir.join(p) };
                    OptionValue::Str(resolved.to_string_lossy().into_owned())
                }
                other => other,
            };
            options.set(&key, value);
        }
        applied.push(config_path);

        if !options.merge_configs() {
            break;
        }
    }
    Ok(applied)
}
