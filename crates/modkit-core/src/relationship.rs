//! Relationship descriptors: the targets of `depends`, `conflicts`,
//! `suggests` and `recommends` edges.
//!
//! In registry JSON a descriptor is either a module reference
//! (`{"name": "Foo", "min_version": "1.0"}`) or a list of alternatives
//! (`{"any_of": [{"name": "Foo"}, {"name": "Bar"}]}`).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::module::Module;
use crate::version::ModuleVersion;

/// A version requirement on a referenced module.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VersionConstraint {
    #[default]
    Any,
    Exact(ModuleVersion),
    AtLeast(ModuleVersion),
    AtMost(ModuleVersion),
    Between(ModuleVersion, ModuleVersion),
}

impl VersionConstraint {
    /// Inclusive bounds check.
    pub fn allows(&self, version: &ModuleVersion) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(v) => v == version,
            Self::AtLeast(min) => min <= version,
            Self::AtMost(max) => version <= max,
            Self::Between(min, max) => min <= version && version <= max,
        }
    }
}

/// Reference to a module by identifier (or by a `provides` alias).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawModuleDescriptor", into = "RawModuleDescriptor")]
pub struct ModuleDescriptor {
    pub name: String,
    pub constraint: VersionConstraint,
    /// Skip suggests/recommends of whatever satisfies this edge.
    pub suppress_recommendations: bool,
}

#[derive(Serialize, Deserialize)]
struct RawModuleDescriptor {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<ModuleVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_version: Option<ModuleVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_version: Option<ModuleVersion>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    suppress_recommendations: bool,
}

impl From<RawModuleDescriptor> for ModuleDescriptor {
    fn from(raw: RawModuleDescriptor) -> Self {
        // An exact version wins over any min/max that came with it
        let constraint = match (raw.version, raw.min_version, raw.max_version) {
            (Some(v), _, _) => VersionConstraint::Exact(v),
            (None, Some(min), Some(max)) => VersionConstraint::Between(min, max),
            (None, Some(min), None) => VersionConstraint::AtLeast(min),
            (None, None, Some(max)) => VersionConstraint::AtMost(max),
            (None, None, None) => VersionConstraint::Any,
        };
        Self {
            name: raw.name,
            constraint,
            suppress_recommendations: raw.suppress_recommendations,
        }
    }
}

impl From<ModuleDescriptor> for RawModuleDescriptor {
    fn from(d: ModuleDescriptor) -> Self {
        let (version, min_version, max_version) = match d.constraint {
            VersionConstraint::Any => (None, None, None),
            VersionConstraint::Exact(v) => (Some(v), None, None),
            VersionConstraint::AtLeast(min) => (None, Some(min), None),
            VersionConstraint::AtMost(max) => (None, None, Some(max)),
            VersionConstraint::Between(min, max) => (None, Some(min), Some(max)),
        };
        Self {
            name: d.name,
            version,
            min_version,
            max_version,
            suppress_recommendations: d.suppress_recommendations,
        }
    }
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: VersionConstraint::Any,
            suppress_recommendations: false,
        }
    }

    pub fn with_constraint(mut self, constraint: VersionConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    pub fn within_bounds(&self, version: &ModuleVersion) -> bool {
        self.constraint.allows(version)
    }

    /// True if `module` satisfies this reference.
    ///
    /// The real module must be within bounds; a module that merely
    /// `provides` the name matches at any version.
    pub fn matches_module(&self, module: &Module) -> bool {
        if module.identifier == self.name {
            self.within_bounds(&module.version)
        } else {
            module.provides.iter().any(|p| *p == self.name)
        }
    }

    /// True if any module, DLL or DLC satisfies this reference.
    /// DLLs and DLC are externally managed and match every version.
    pub fn matches_any<'a>(
        &self,
        modules: impl IntoIterator<Item = &'a Module>,
        dlls: &BTreeSet<String>,
        dlc: &BTreeMap<String, ModuleVersion>,
    ) -> bool {
        dlls.contains(&self.name)
            || dlc.contains_key(&self.name)
            || modules.into_iter().any(|m| self.matches_module(m))
    }

    /// The installed DLC version this reference hits, if it is in bounds.
    pub fn matching_dlc<'d>(
        &self,
        dlc: &'d BTreeMap<String, ModuleVersion>,
    ) -> Option<&'d ModuleVersion> {
        dlc.get(&self.name).filter(|v| self.within_bounds(v))
    }

    /// Conflict-side matching: like [`Self::matches_any`], except that DLC
    /// only matches inside the version bounds.
    pub fn conflicts_with_any<'a>(
        &self,
        modules: impl IntoIterator<Item = &'a Module>,
        dlls: &BTreeSet<String>,
        dlc: &BTreeMap<String, ModuleVersion>,
    ) -> bool {
        dlls.contains(&self.name)
            || self.matching_dlc(dlc).is_some()
            || modules.into_iter().any(|m| self.matches_module(m))
    }
}

impl fmt::Display for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            VersionConstraint::Any => write!(f, "{}", self.name),
            VersionConstraint::Exact(v) => write!(f, "{} {v}", self.name),
            VersionConstraint::Between(min, max) => write!(f, "{} {min} -- {max}", self.name),
            VersionConstraint::AtLeast(min) => write!(f, "{} {min} or later", self.name),
            VersionConstraint::AtMost(max) => write!(f, "{} {max} or earlier", self.name),
        }
    }
}

/// Ordered alternatives; the first one that can be satisfied wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnyOfDescriptor {
    pub any_of: Vec<ModuleDescriptor>,
}

/// Target of a relationship edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationshipDescriptor {
    AnyOf(AnyOfDescriptor),
    Module(ModuleDescriptor),
}

impl RelationshipDescriptor {
    /// Unconstrained reference to `name`.
    pub fn module(name: impl Into<String>) -> Self {
        Self::Module(ModuleDescriptor::new(name))
    }

    pub fn constrained(name: impl Into<String>, constraint: VersionConstraint) -> Self {
        Self::Module(ModuleDescriptor::new(name).with_constraint(constraint))
    }

    pub fn any_of(alternatives: impl IntoIterator<Item = ModuleDescriptor>) -> Self {
        Self::AnyOf(AnyOfDescriptor {
            any_of: alternatives.into_iter().collect(),
        })
    }

    /// The module references this descriptor can be satisfied by, in order.
    pub fn targets(&self) -> &[ModuleDescriptor] {
        match self {
            Self::Module(m) => std::slice::from_ref(m),
            Self::AnyOf(a) => &a.any_of,
        }
    }

    pub fn suppresses_recommendations(&self) -> bool {
        self.targets().iter().any(|t| t.suppress_recommendations)
    }

    pub fn within_bounds(&self, name: &str, version: &ModuleVersion) -> bool {
        self.targets()
            .iter()
            .any(|t| t.name == name && t.within_bounds(version))
    }

    pub fn matches_module(&self, module: &Module) -> bool {
        self.targets().iter().any(|t| t.matches_module(module))
    }

    pub fn matches_any<'a>(
        &self,
        modules: impl IntoIterator<Item = &'a Module> + Clone,
        dlls: &BTreeSet<String>,
        dlc: &BTreeMap<String, ModuleVersion>,
    ) -> bool {
        self.targets()
            .iter()
            .any(|t| t.matches_any(modules.clone(), dlls, dlc))
    }

    pub fn conflicts_with_any<'a>(
        &self,
        modules: impl IntoIterator<Item = &'a Module> + Clone,
        dlls: &BTreeSet<String>,
        dlc: &BTreeMap<String, ModuleVersion>,
    ) -> bool {
        self.targets()
            .iter()
            .any(|t| t.conflicts_with_any(modules.clone(), dlls, dlc))
    }

    pub fn contains_any(&self, identifiers: &BTreeSet<String>) -> bool {
        self.targets().iter().any(|t| identifiers.contains(&t.name))
    }
}

impl fmt::Display for RelationshipDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.targets().iter().map(|t| t.to_string()).collect();
        f.write_str(&rendered.join(" OR "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> ModuleVersion {
        ModuleVersion::parse(s)
    }

    #[test]
    fn parse_constraint_forms() {
        let d: RelationshipDescriptor =
            serde_json::from_str(r#"{"name": "Foo", "min_version": "1.0", "max_version": "2.0"}"#)
                .unwrap();
        assert_eq!(
            d,
            RelationshipDescriptor::constrained("Foo", VersionConstraint::Between(v("1.0"), v("2.0")))
        );

        let d: RelationshipDescriptor = serde_json::from_str(r#"{"name": "Foo"}"#).unwrap();
        assert_eq!(d, RelationshipDescriptor::module("Foo"));
    }

    #[test]
    fn parse_any_of() {
        let d: RelationshipDescriptor =
            serde_json::from_str(r#"{"any_of": [{"name": "A"}, {"name": "B", "version": "1.0"}]}"#)
                .unwrap();
        assert_eq!(d.targets().len(), 2);
        assert_eq!(d.to_string(), "A OR B 1.0");
    }

    #[test]
    fn display_forms() {
        let cases = [
            (VersionConstraint::Any, "Foo"),
            (VersionConstraint::Exact(v("1.0")), "Foo 1.0"),
            (VersionConstraint::AtLeast(v("1.0")), "Foo 1.0 or later"),
            (VersionConstraint::AtMost(v("2.0")), "Foo 2.0 or earlier"),
            (VersionConstraint::Between(v("1.0"), v("2.0")), "Foo 1.0 -- 2.0"),
        ];
        for (constraint, expected) in cases {
            assert_eq!(RelationshipDescriptor::constrained("Foo", constraint).to_string(), expected);
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let c = VersionConstraint::Between(v("1.0"), v("2.0"));
        assert!(c.allows(&v("1.0")));
        assert!(c.allows(&v("2.0")));
        assert!(!c.allows(&v("2.0.1")));
    }

    #[test]
    fn provides_matches_any_version() {
        let mut provider = Module::new("RealThing", "0.1");
        provider.provides.push("Virtual".into());
        let d = ModuleDescriptor::new("Virtual").with_constraint(VersionConstraint::AtLeast(v("5.0")));
        assert!(d.matches_module(&provider));
    }

    #[test]
    fn dlc_and_dlls_match_any_version() {
        let d = RelationshipDescriptor::constrained("MakingHistory", VersionConstraint::AtLeast(v("9.0")));
        let dlc = BTreeMap::from([("MakingHistory".to_string(), v("1.1.0"))]);
        assert!(d.matches_any(std::iter::empty::<&Module>(), &BTreeSet::new(), &dlc));

        let dlls = BTreeSet::from(["ModuleManager".to_string()]);
        let d = RelationshipDescriptor::constrained("ModuleManager", VersionConstraint::Exact(v("4.0")));
        assert!(d.matches_any(std::iter::empty::<&Module>(), &dlls, &BTreeMap::new()));
    }

    #[test]
    fn conflicts_respect_dlc_bounds() {
        let d = RelationshipDescriptor::constrained("MakingHistory", VersionConstraint::AtMost(v("1.0")));
        let none = std::iter::empty::<&Module>();
        let newer = BTreeMap::from([("MakingHistory".to_string(), v("1.1.0"))]);
        assert!(!d.conflicts_with_any(none.clone(), &BTreeSet::new(), &newer));

        let older = BTreeMap::from([("MakingHistory".to_string(), v("1.0"))]);
        assert!(d.conflicts_with_any(none, &BTreeSet::new(), &older));
    }

    #[test]
    fn real_module_checks_version() {
        let m = Module::new("Foo", "1.5");
        let d = RelationshipDescriptor::constrained("Foo", VersionConstraint::AtLeast(v("2.0")));
        assert!(!d.matches_module(&m));
        assert!(!d.matches_any([&m], &BTreeSet::new(), &BTreeMap::new()));
    }
}
