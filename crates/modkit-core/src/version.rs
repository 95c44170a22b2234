//! Module version parsing and comparison.
//!
//! Module versions are free-form strings with an optional numeric epoch:
//! `[epoch:]version`. Ordering rules:
//! - Epochs compare numerically first; a missing epoch is `0`
//! - The remainder is split into alternating non-digit / digit runs
//! - Non-digit runs compare ordinally, except that `.` sorts above every
//!   other character
//! - Digit runs compare numerically
//! - When one version runs out of runs first it is the smaller (`1.2 < 1.2.3`)

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A parsed module version with an optional epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ModuleVersion {
    original: String,
    epoch: u64,
    version: String,
}

impl ModuleVersion {
    pub fn parse(version: &str) -> Self {
        let (epoch, rest) = split_epoch(version);
        Self {
            original: version.to_string(),
            epoch,
            version: rest.to_string(),
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The version without its `epoch:` prefix.
    pub fn without_epoch(&self) -> &str {
        &self.version
    }

    /// Returns a copy of this version with the epoch increased by one.
    pub fn increment_epoch(&self) -> Self {
        Self::parse(&format!("{}:{}", self.epoch + 1, self.version))
    }

    fn tokens(&self) -> Vec<Token<'_>> {
        tokenize(&self.version)
    }
}

impl From<String> for ModuleVersion {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for ModuleVersion {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<ModuleVersion> for String {
    fn from(v: ModuleVersion) -> Self {
        v.original
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl PartialEq for ModuleVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ModuleVersion {}

impl Hash for ModuleVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with `Ord`: "1.0" and "1.00" are equal.
        self.epoch.hash(state);
        for token in self.tokens() {
            token.text.hash(state);
            normalize_number(token.number).hash(state);
        }
    }
}

impl Ord for ModuleVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.epoch != other.epoch {
            return self.epoch.cmp(&other.epoch);
        }
        if self.version == other.version {
            return Ordering::Equal;
        }
        compare_versions(&self.version, &other.version)
    }
}

impl PartialOrd for ModuleVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn split_epoch(version: &str) -> (u64, &str) {
    if let Some((epoch, rest)) = version.split_once(':') {
        if !epoch.is_empty() && epoch.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = epoch.parse::<u64>() {
                return (n, rest);
            }
        }
    }
    (0, version)
}

/// One non-digit run followed by one digit run (either may be empty).
struct Token<'a> {
    text: &'a str,
    number: &'a str,
}

fn tokenize(version: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = version;
    while !rest.is_empty() {
        let (text, after_text) = split_run(rest, |c| !c.is_ascii_digit());
        let (number, after_number) = split_run(after_text, |c| c.is_ascii_digit());
        tokens.push(Token { text, number });
        rest = after_number;
    }
    tokens
}

fn split_run(s: &str, pred: impl Fn(char) -> bool) -> (&str, &str) {
    let end = s.find(|c: char| !pred(c)).unwrap_or(s.len());
    s.split_at(end)
}

fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut first = a;
    let mut second = b;

    while !first.is_empty() && !second.is_empty() {
        let (text1, rest1) = split_run(first, |c| !c.is_ascii_digit());
        let (text2, rest2) = split_run(second, |c| !c.is_ascii_digit());
        let ord = compare_text(text1, text2);
        if ord != Ordering::Equal {
            return ord;
        }

        let (num1, rest1) = split_run(rest1, |c| c.is_ascii_digit());
        let (num2, rest2) = split_run(rest2, |c| c.is_ascii_digit());
        let ord = compare_numbers(num1, num2);
        if ord != Ordering::Equal {
            return ord;
        }

        first = rest1;
        second = rest2;
    }

    match (first.is_empty(), second.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, _) => Ordering::Greater,
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    match (a.starts_with('.'), b.starts_with('.')) {
        _ if a.is_empty() || b.is_empty() => a.cmp(b),
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) if a.len() == 1 && b.len() > 1 => Ordering::Greater,
        (true, true) if a.len() > 1 && b.len() == 1 => Ordering::Less,
        _ => a.cmp(b),
    }
}

fn normalize_number(digits: &str) -> &str {
    digits.trim_start_matches('0')
}

fn compare_numbers(a: &str, b: &str) -> Ordering {
    let a = normalize_number(a);
    let b = normalize_number(b);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> ModuleVersion {
        ModuleVersion::parse(s)
    }

    #[test]
    fn basic_ordering() {
        assert!(v("1.0") < v("2.0"));
        assert!(v("1.2") < v("1.10"));
    }

    #[test]
    fn shorter_is_smaller() {
        assert!(v("1.2") < v("1.2.3"));
    }

    #[test]
    fn leading_zeros_equal() {
        assert_eq!(v("1.0"), v("1.00"));
        assert_eq!(v("01.2"), v("1.2"));
    }

    #[test]
    fn epoch_dominates() {
        assert!(v("1:0.1") > v("99.0"));
        assert!(v("1:v0.31.13.4") < v("1:v1.0.2"));
        assert_eq!(v("2:1.0").epoch(), 2);
        assert_eq!(v("2:1.0").without_epoch(), "1.0");
    }

    #[test]
    fn non_numeric_epoch_is_part_of_version() {
        let ver = v("v:1.0");
        assert_eq!(ver.epoch(), 0);
        assert_eq!(ver.without_epoch(), "v:1.0");
    }

    #[test]
    fn dot_sorts_above_letters() {
        // "1.0.1" has a '.' where "1.0a" has an 'a'
        assert!(v("1.0a") < v("1.0.1"));
    }

    #[test]
    fn text_prefix_versions() {
        assert!(v("v1.2") < v("v1.3"));
        assert!(v("v1.2") > v("1.2"));
    }

    #[test]
    fn huge_numbers_do_not_overflow() {
        assert!(v("1.99999999999999999999999") > v("1.99999999999999999999998"));
    }

    #[test]
    fn increment_epoch() {
        assert_eq!(v("1.0").increment_epoch().to_string(), "1:1.0");
        assert_eq!(v("3:1.0").increment_epoch().to_string(), "4:1.0");
    }

    #[test]
    fn equal_versions_hash_equal() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(v("1.0"));
        assert!(set.contains(&v("1.00")));
    }

    #[test]
    fn display_keeps_original() {
        assert_eq!(v("1:v1.0.2").to_string(), "1:v1.0.2");
    }

    #[test]
    fn serde_as_plain_string() {
        let ver: ModuleVersion = serde_json::from_str("\"1.2.3\"").unwrap();
        assert_eq!(ver, v("1.2.3"));
        assert_eq!(serde_json::to_string(&ver).unwrap(), "\"1.2.3\"");
    }
}
