//! Conflict detection over a finished module set, and the report kept when
//! conflicts are allowed through.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use modkit_core::module::{Module, ModuleKey};
use modkit_core::version::ModuleVersion;

/// Every conflict found in a resolution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConflictReport {
    pub conflicts: Vec<ModuleConflict>,
}

/// A module from the resolved list and something it cannot coexist with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleConflict {
    pub module: ModuleKey,
    /// Display form of the other side: a module, DLL or DLC.
    pub other: String,
}

impl ModuleConflict {
    pub fn description(&self) -> String {
        format!("{} conflicts with {}", self.module, self.other)
    }
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find conflicts between `selected` and everything else present.
    ///
    /// Each entry is keyed by a module from `selected`. A pair where both
    /// sides are selected is reported once from each side; a pair with an
    /// installed module, DLL or DLC only from the selected side. Releases of
    /// the same identifier are never compared.
    pub fn scan(
        selected: &[Module],
        installed: &[Module],
        dlls: &BTreeSet<String>,
        dlc: &BTreeMap<String, ModuleVersion>,
    ) -> Self {
        let mut report = Self::new();
        for module in selected {
            for other in selected.iter().chain(installed) {
                if module.conflicts_with(other).is_some() || other.conflicts_with(module).is_some() {
                    report.add(ModuleConflict {
                        module: module.key(),
                        other: other.to_string(),
                    });
                }
            }
            for conflict in &module.conflicts {
                for target in conflict.targets() {
                    if dlls.contains(&target.name) {
                        report.add(ModuleConflict {
                            module: module.key(),
                            other: target.name.clone(),
                        });
                    }
                    if let Some(version) = target.matching_dlc(dlc) {
                        report.add(ModuleConflict {
                            module: module.key(),
                            other: format!("{} {version}", target.name),
                        });
                    }
                }
            }
        }
        report
    }

    pub fn add(&mut self, conflict: ModuleConflict) {
        if !self.conflicts.contains(&conflict) {
            tracing::debug!("Conflict: {}", conflict.description());
            self.conflicts.push(conflict);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.conflicts.iter().map(ModuleConflict::description).collect()
    }

    /// Descriptions keyed by module; several conflicts of one module are
    /// joined with `"; "`.
    pub fn by_module(&self) -> BTreeMap<ModuleKey, String> {
        let mut map: BTreeMap<ModuleKey, String> = BTreeMap::new();
        for c in &self.conflicts {
            map.entry(c.module.clone())
                .and_modify(|d| {
                    d.push_str("; ");
                    d.push_str(&c.description());
                })
                .or_insert_with(|| c.description());
        }
        map
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conflicts.is_empty() {
            return write!(f, "No conflicts.");
        }
        writeln!(f, "Conflicts ({}):", self.conflicts.len())?;
        for c in &self.conflicts {
            writeln!(f, "  {c}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ModuleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modkit_core::relationship::{RelationshipDescriptor, VersionConstraint};

    fn conflicting(id: &str, with: &str) -> Module {
        let mut m = Module::new(id, "1.0");
        m.conflicts.push(RelationshipDescriptor::module(with));
        m
    }

    #[test]
    fn empty_report() {
        let report = ConflictReport::new();
        assert!(report.is_empty());
        assert_eq!(report.len(), 0);
        assert_eq!(report.to_string(), "No conflicts.");
    }

    #[test]
    fn selected_pair_reported_from_both_sides() {
        let selected = vec![conflicting("A", "B"), Module::new("B", "1.0")];
        let report = ConflictReport::scan(&selected, &[], &BTreeSet::new(), &BTreeMap::new());
        assert_eq!(
            report.descriptions(),
            vec!["A 1.0 conflicts with B 1.0", "B 1.0 conflicts with A 1.0"]
        );
        assert_eq!(report.by_module().len(), 2);
    }

    #[test]
    fn installed_side_not_keyed() {
        let selected = vec![conflicting("A", "B")];
        let installed = vec![Module::new("B", "1.0")];
        let report = ConflictReport::scan(&selected, &installed, &BTreeSet::new(), &BTreeMap::new());
        assert_eq!(report.len(), 1);
        assert!(report.to_string().contains("A 1.0 conflicts with B 1.0"));
    }

    #[test]
    fn version_bounded_conflict() {
        let mut a = Module::new("A", "1.0");
        a.conflicts.push(RelationshipDescriptor::constrained(
            "B",
            VersionConstraint::AtMost(ModuleVersion::parse("1.5")),
        ));
        let report = ConflictReport::scan(
            &[a.clone(), Module::new("B", "2.0")],
            &[],
            &BTreeSet::new(),
            &BTreeMap::new(),
        );
        assert!(report.is_empty());

        let report = ConflictReport::scan(&[a, Module::new("B", "1.5")], &[], &BTreeSet::new(), &BTreeMap::new());
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn dlc_conflict_outside_bounds_ignored() {
        let mut a = Module::new("A", "1.0");
        a.conflicts.push(RelationshipDescriptor::constrained(
            "MakingHistory",
            VersionConstraint::AtMost(ModuleVersion::parse("1.0")),
        ));
        let dlc = BTreeMap::from([("MakingHistory".to_string(), ModuleVersion::parse("1.1.0"))]);
        let report = ConflictReport::scan(&[a], &[], &BTreeSet::new(), &dlc);
        assert!(report.is_empty());
    }

    #[test]
    fn dll_and_dlc_conflicts() {
        let selected = vec![conflicting("A", "SomeDll"), conflicting("C", "MakingHistory")];
        let dlls = BTreeSet::from(["SomeDll".to_string()]);
        let dlc = BTreeMap::from([("MakingHistory".to_string(), ModuleVersion::parse("1.1.0"))]);
        let report = ConflictReport::scan(&selected, &[], &dlls, &dlc);
        assert_eq!(
            report.descriptions(),
            vec![
                "A 1.0 conflicts with SomeDll",
                "C 1.0 conflicts with MakingHistory 1.1.0"
            ]
        );
    }
}
