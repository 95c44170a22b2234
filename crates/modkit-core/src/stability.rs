use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Release maturity of a module version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseStatus {
    #[default]
    Stable,
    Testing,
    Development,
}

/// How unstable a module may be and still be offered as a candidate.
///
/// `overall` applies to every identifier without an entry in `overrides`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StabilityTolerance {
    #[serde(default)]
    pub overall: ReleaseStatus,
    #[serde(default)]
    pub overrides: BTreeMap<String, ReleaseStatus>,
}

impl StabilityTolerance {
    pub fn new(overall: ReleaseStatus) -> Self {
        Self {
            overall,
            overrides: BTreeMap::new(),
        }
    }

    /// Tolerance that accepts every release status.
    pub fn permissive() -> Self {
        Self::new(ReleaseStatus::Development)
    }

    pub fn with_override(mut self, identifier: impl Into<String>, level: ReleaseStatus) -> Self {
        self.overrides.insert(identifier.into(), level);
        self
    }

    pub fn level_for(&self, identifier: &str) -> ReleaseStatus {
        self.overrides
            .get(identifier)
            .copied()
            .unwrap_or(self.overall)
    }

    pub fn allows(&self, identifier: &str, status: ReleaseStatus) -> bool {
        status <= self.level_for(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_rejects_testing() {
        let tol = StabilityTolerance::default();
        assert!(tol.allows("Foo", ReleaseStatus::Stable));
        assert!(!tol.allows("Foo", ReleaseStatus::Testing));
    }

    #[test]
    fn override_widens_single_identifier() {
        let tol = StabilityTolerance::default().with_override("Foo", ReleaseStatus::Development);
        assert!(tol.allows("Foo", ReleaseStatus::Development));
        assert!(!tol.allows("Bar", ReleaseStatus::Development));
    }

    #[test]
    fn status_parses_lowercase() {
        let s: ReleaseStatus = serde_json::from_str("\"testing\"").unwrap();
        assert_eq!(s, ReleaseStatus::Testing);
    }
}
