//! Dotted numeric tool versions.
//!
//! Versions compare component-wise as integers, so `0.660 > 0.7` and
//! `3.10 > 3.9`. A missing or unparseable version is `0`, which sorts
//! below every real release.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(Vec<u64>);

impl Version {
    /// Parse the leading `[0-9.]+` run of `s`. Returns `None` when no
    /// numeric component is present.
    pub fn parse(s: &str) -> Option<Self> {
        let head: String = s
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        let parts: Vec<u64> = head
            .split('.')
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<u64>())
            .collect::<Result<_, _>>()
            .ok()?;
        if parts.is_empty() {
            None
        } else {
            Some(Self(parts))
        }
    }

    /// Parse a version known to be well formed, e.g. a flag threshold.
    pub fn from_parts(parts: &[u64]) -> Self {
        Self(parts.to_vec())
    }

    pub fn is_unknown(&self) -> bool {
        self.0.iter().all(|p| *p == 0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "0");
        }
        let joined = self
            .0
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{}", joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_not_lexicographic() {
        let old = Version::parse("0.7").unwrap();
        let new = Version::parse("0.660").unwrap();
        assert!(new > old);
        assert!(Version::parse("3.10.1").unwrap() > Version::parse("3.9").unwrap());
    }

    #[test]
    fn test_threshold_comparisons() {
        let threshold = Version::from_parts(&[3, 6, 0]);
        assert!(Version::parse("3.6.0").unwrap() >= threshold);
        assert!(Version::parse("3.7.9 (mccabe: 0.6.1)").unwrap() >= threshold);
        assert!(Version::parse("3.5").unwrap() < threshold);
    }

    #[test]
    fn test_unknown_version_sorts_low() {
        assert!(Version::parse("mypy").is_none());
        let unknown = Version::default();
        assert!(unknown.is_unknown());
        assert!(unknown < Version::from_parts(&[0, 1]));
        assert_eq!(unknown.to_string(), "0");
    }
}
