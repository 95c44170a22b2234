//! Game versions, compatibility ranges and version criteria.
//!
//! Game versions are `major[.minor[.patch[.build]]]`. A partial version
//! stands for every more specific version beneath it, so a module marked
//! compatible with `1.12` is compatible with `1.12.5`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use modkit_util::errors::ModkitError;

/// A possibly-partial game version. `Any` matches every release.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GameVersion {
    Any,
    Release(Vec<u32>),
}

type Tuple = [u32; 4];

impl GameVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self::Release(vec![major, minor, patch])
    }

    pub fn parse(s: &str) -> Result<Self, ModkitError> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("any") {
            return Ok(Self::Any);
        }
        let parts = s
            .split('.')
            .map(|p| p.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ModkitError::Generic {
                message: format!("Invalid game version '{s}': {e}"),
            })?;
        if parts.is_empty() || parts.len() > 4 {
            return Err(ModkitError::Generic {
                message: format!("Invalid game version '{s}': expected 1 to 4 components"),
            });
        }
        Ok(Self::Release(parts))
    }

    /// Lowest concrete release covered by this version.
    fn lower(&self) -> Tuple {
        self.fill(0)
    }

    /// Highest concrete release covered by this version.
    fn upper(&self) -> Tuple {
        self.fill(u32::MAX)
    }

    fn fill(&self, missing: u32) -> Tuple {
        let mut out = [missing; 4];
        if let Self::Release(parts) = self {
            for (slot, part) in out.iter_mut().zip(parts) {
                *slot = *part;
            }
        }
        out
    }
}

impl FromStr for GameVersion {
    type Err = ModkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for GameVersion {
    type Error = ModkitError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<GameVersion> for String {
    fn from(v: GameVersion) -> Self {
        v.to_string()
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Release(parts) => {
                let joined: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
                f.write_str(&joined.join("."))
            }
        }
    }
}

/// Inclusive compatibility range, each end optionally unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameVersionRange {
    pub min: Option<GameVersion>,
    pub max: Option<GameVersion>,
}

impl GameVersionRange {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn exactly(version: GameVersion) -> Self {
        Self {
            min: Some(version.clone()),
            max: Some(version),
        }
    }

    fn bounds(&self) -> (Tuple, Tuple) {
        let lo = match &self.min {
            Some(v) => v.lower(),
            None => [0; 4],
        };
        let hi = match &self.max {
            Some(v) => v.upper(),
            None => [u32::MAX; 4],
        };
        (lo, hi)
    }

    /// True if any release covered by `version` falls inside this range.
    pub fn intersects(&self, version: &GameVersion) -> bool {
        let (lo, hi) = self.bounds();
        version.lower() <= hi && lo <= version.upper()
    }
}

impl fmt::Display for GameVersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let min = self.min.as_ref().filter(|v| **v != GameVersion::Any);
        let max = self.max.as_ref().filter(|v| **v != GameVersion::Any);
        match (min, max) {
            (Some(lo), Some(hi)) if lo == hi => write!(f, "{lo}"),
            (Some(lo), Some(hi)) => write!(f, "{lo}–{hi}"),
            (Some(lo), None) => write!(f, "{lo}+"),
            (None, Some(hi)) => write!(f, "≤{hi}"),
            (None, None) => f.write_str("all versions"),
        }
    }
}

/// The set of game versions an install targets.
///
/// A module is compatible if its range covers any of these versions. Empty
/// criteria accept every module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameVersionCriteria {
    versions: Vec<GameVersion>,
}

impl GameVersionCriteria {
    pub fn new(versions: impl IntoIterator<Item = GameVersion>) -> Self {
        Self {
            versions: versions.into_iter().collect(),
        }
    }

    /// Criteria matching a single game version.
    pub fn single(version: GameVersion) -> Self {
        Self::new([version])
    }

    /// Criteria accepting everything.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn versions(&self) -> &[GameVersion] {
        &self.versions
    }

    pub fn accepts(&self, range: &GameVersionRange) -> bool {
        self.versions.is_empty() || self.versions.iter().any(|v| range.intersects(v))
    }
}

impl fmt::Display for GameVersionCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.versions.is_empty() {
            return f.write_str("any");
        }
        let joined: Vec<String> = self.versions.iter().map(|v| v.to_string()).collect();
        f.write_str(&joined.join(", "))
    }
}

/// Identity of the game an install belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub short_name: String,
}

impl Game {
    pub fn new(short_name: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new("KSP")
    }
}
