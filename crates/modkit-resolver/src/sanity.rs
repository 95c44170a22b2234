//! Consistency checks over explicit module sets.

use std::collections::{BTreeMap, BTreeSet};

use modkit_core::module::Module;
use modkit_core::registry::RegistryQuerier;
use modkit_core::relationship::RelationshipDescriptor;
use modkit_core::version::ModuleVersion;

use crate::error::ResolutionError;

/// Stateless validator for sets of modules, DLLs and DLC.
pub struct SanityChecker;

impl SanityChecker {
    /// True if every dependency is met and nothing conflicts.
    pub fn is_consistent<'a>(
        modules: impl IntoIterator<Item = &'a Module>,
        dlls: &BTreeSet<String>,
        dlc: &BTreeMap<String, ModuleVersion>,
    ) -> bool {
        let modules: Vec<&Module> = modules.into_iter().collect();
        Self::find_unsatisfied_depends(modules.iter().copied(), dlls, dlc).is_empty()
            && Self::find_conflicting(modules, dlls, dlc).is_empty()
    }

    /// Like [`Self::is_consistent`], but returns every problem found.
    pub fn enforce_consistency<'a>(
        modules: impl IntoIterator<Item = &'a Module>,
        dlls: &BTreeSet<String>,
        dlc: &BTreeMap<String, ModuleVersion>,
    ) -> Result<(), ResolutionError> {
        let modules: Vec<&Module> = modules.into_iter().collect();
        let mut problems: Vec<String> = Self::find_unsatisfied_depends(modules.iter().copied(), dlls, dlc)
            .into_iter()
            .map(|(m, d)| format!("{m} has an unsatisfied dependency: {d}"))
            .collect();
        problems.extend(
            Self::find_conflicting(modules, dlls, dlc)
                .into_iter()
                .map(|(m, c)| format!("{m} conflicts with {c}")),
        );
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ResolutionError::Inconsistent { problems })
        }
    }

    /// Every `(owner, depends)` pair not satisfied within the given set.
    pub fn find_unsatisfied_depends<'a>(
        modules: impl IntoIterator<Item = &'a Module>,
        dlls: &BTreeSet<String>,
        dlc: &BTreeMap<String, ModuleVersion>,
    ) -> Vec<(&'a Module, &'a RelationshipDescriptor)> {
        let modules: Vec<&Module> = modules.into_iter().collect();
        modules
            .iter()
            .copied()
            .flat_map(|m| m.depends.iter().map(move |d| (m, d)))
            .filter(|(_, d)| !d.matches_any(modules.iter().copied(), dlls, dlc))
            .collect()
    }

    /// Every `(owner, conflicts)` pair that matches another element of the
    /// set. Releases of the owner's own identifier are skipped.
    pub fn find_conflicting<'a>(
        modules: impl IntoIterator<Item = &'a Module>,
        dlls: &BTreeSet<String>,
        dlc: &BTreeMap<String, ModuleVersion>,
    ) -> Vec<(&'a Module, &'a RelationshipDescriptor)> {
        let modules: Vec<&Module> = modules.into_iter().collect();
        let mut found = Vec::new();
        for m in modules.iter().copied() {
            let others: Vec<&Module> = modules
                .iter()
                .copied()
                .filter(|o| o.identifier != m.identifier)
                .collect();
            for c in &m.conflicts {
                if c.conflicts_with_any(others.iter().copied(), dlls, dlc) {
                    found.push((m, c));
                }
            }
        }
        found
    }

    /// Identifiers that must be removed along with `to_remove` so that the
    /// rest of `current` stays consistent.
    ///
    /// Modules in `to_add` count toward satisfying dependencies but are
    /// never reported. Iterates until nothing else breaks. Empty input
    /// yields an empty result.
    pub fn find_reverse_dependencies<'a>(
        to_remove: &BTreeSet<String>,
        to_add: &[Module],
        current: impl IntoIterator<Item = &'a Module>,
        dlls: &BTreeSet<String>,
        dlc: &BTreeMap<String, ModuleVersion>,
    ) -> BTreeSet<String> {
        let current: Vec<&Module> = current.into_iter().collect();
        let mut removing = to_remove.clone();
        if removing.is_empty() {
            return removing;
        }
        loop {
            let hypothetical: Vec<&Module> = current
                .iter()
                .copied()
                .filter(|m| !to_add.iter().any(|a| a.identifier == m.identifier))
                .chain(to_add)
                .filter(|m| !removing.contains(&m.identifier))
                .collect();
            let broken: BTreeSet<String> =
                Self::find_unsatisfied_depends(hypothetical, dlls, dlc)
                    .into_iter()
                    .map(|(m, _)| m.identifier.clone())
                    .filter(|id| current.iter().any(|c| c.identifier == *id))
                    .filter(|id| !removing.contains(id))
                    .collect();
            if broken.is_empty() {
                return removing;
            }
            tracing::debug!("Removal also breaks: {:?}", broken);
            removing.extend(broken);
        }
    }
}

/// Sanity checks over a registry's own installed state.
pub trait RegistrySanity {
    /// Check that installed modules, DLLs and DLC are consistent.
    fn check_sanity(&self) -> Result<(), ResolutionError>;

    /// Reverse-dependency closure of removing `identifiers` from the
    /// installed set.
    fn find_reverse_dependencies(&self, identifiers: &BTreeSet<String>) -> BTreeSet<String>;
}

impl<R: RegistryQuerier + ?Sized> RegistrySanity for R {
    fn check_sanity(&self) -> Result<(), ResolutionError> {
        SanityChecker::enforce_consistency(self.installed_modules().values(), self.dlls(), self.dlc())
    }

    fn find_reverse_dependencies(&self, identifiers: &BTreeSet<String>) -> BTreeSet<String> {
        SanityChecker::find_reverse_dependencies(
            identifiers,
            &[],
            self.installed_modules().values(),
            self.dlls(),
            self.dlc(),
        )
    }
}
