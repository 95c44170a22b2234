//! In-memory registry snapshot.
//!
//! A registry holds every available release of every module, plus the
//! state of one game install: which modules are installed, which DLLs
//! were autodetected on disk, and which DLC the user owns. The resolver
//! only ever reads it through [`RegistryQuerier`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use modkit_util::errors::ModkitError;

use crate::game_version::GameVersionCriteria;
use crate::module::{Module, ModuleKey};
use crate::stability::StabilityTolerance;
use crate::version::ModuleVersion;

/// Read-only queries the relationship engine needs from a registry.
pub trait RegistryQuerier {
    /// Every known release of `identifier`, newest first.
    fn all_versions(&self, identifier: &str) -> &[Module];

    /// Identifiers of modules that list `name` in their `provides`.
    fn providers_of(&self, name: &str) -> Vec<&str>;

    fn installed_modules(&self) -> &BTreeMap<String, Module>;

    fn dlls(&self) -> &BTreeSet<String>;

    fn dlc(&self) -> &BTreeMap<String, ModuleVersion>;

    /// Releases of `identifier` within `tolerance` that are compatible
    /// with `criteria`, newest first.
    fn available_versions(
        &self,
        identifier: &str,
        tolerance: &StabilityTolerance,
        criteria: &GameVersionCriteria,
    ) -> Vec<&Module> {
        self.all_versions(identifier)
            .iter()
            .filter(|m| tolerance.allows(&m.identifier, m.release_status))
            .filter(|m| m.is_compatible(criteria))
            .collect()
    }

    /// Releases within `tolerance` that `criteria` rules out, newest first.
    fn incompatible_versions(
        &self,
        identifier: &str,
        tolerance: &StabilityTolerance,
        criteria: &GameVersionCriteria,
    ) -> Vec<&Module> {
        self.all_versions(identifier)
            .iter()
            .filter(|m| tolerance.allows(&m.identifier, m.release_status))
            .filter(|m| !m.is_compatible(criteria))
            .collect()
    }

    fn latest_available(
        &self,
        identifier: &str,
        tolerance: &StabilityTolerance,
        criteria: &GameVersionCriteria,
    ) -> Option<&Module> {
        self.available_versions(identifier, tolerance, criteria)
            .into_iter()
            .next()
    }

    fn module_by_version(&self, identifier: &str, version: &ModuleVersion) -> Option<&Module> {
        self.all_versions(identifier)
            .iter()
            .find(|m| m.version == *version)
    }

    fn is_known(&self, identifier: &str) -> bool {
        !self.all_versions(identifier).is_empty()
    }

    fn installed_module(&self, identifier: &str) -> Option<&Module> {
        self.installed_modules().get(identifier)
    }
}

/// Install state as stored next to a registry snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstalledState {
    #[serde(default)]
    pub installed: Vec<ModuleKey>,
    #[serde(default)]
    pub dlls: BTreeSet<String>,
    #[serde(default)]
    pub dlc: BTreeMap<String, ModuleVersion>,
}

impl InstalledState {
    pub fn from_json(content: &str) -> Result<Self, ModkitError> {
        serde_json::from_str(content).map_err(|e| ModkitError::Registry {
            message: format!("Failed to parse installed state: {e}"),
        })
    }

    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = modkit_util::fs::read_to_string(path, "installed state")?;
        Ok(Self::from_json(&content)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    available: BTreeMap<String, Vec<Module>>,
    provides_index: BTreeMap<String, BTreeSet<String>>,
    installed: BTreeMap<String, Module>,
    dlls: BTreeSet<String>,
    dlc: BTreeMap<String, ModuleVersion>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_modules(modules: impl IntoIterator<Item = Module>) -> Self {
        let mut registry = Self::new();
        for module in modules {
            registry.add_available(module);
        }
        registry
    }

    /// Parse a JSON array of module records.
    pub fn from_json(content: &str) -> Result<Self, ModkitError> {
        let modules: Vec<Module> = serde_json::from_str(content).map_err(|e| ModkitError::Registry {
            message: format!("Failed to parse registry snapshot: {e}"),
        })?;
        tracing::debug!("Loaded {} module records", modules.len());
        Ok(Self::from_modules(modules))
    }

    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = modkit_util::fs::read_to_string(path, "registry snapshot")?;
        Ok(Self::from_json(&content)?)
    }

    /// Add a release. A release with the same identifier and version
    /// replaces the existing one.
    pub fn add_available(&mut self, module: Module) {
        let identifier = module.identifier.clone();
        let versions = self.available.entry(identifier.clone()).or_default();
        let before = versions.len();
        versions.retain(|m| m.version != module.version);
        let replaced = versions.len() < before;
        let at = versions
            .iter()
            .position(|m| m.version < module.version)
            .unwrap_or(versions.len());
        versions.insert(at, module);

        if replaced {
            self.reindex_provides(&identifier);
        } else if let Some(added) = self.available.get(&identifier).and_then(|v| v.get(at)) {
            for alias in added.provides.iter().filter(|p| **p != identifier) {
                self.provides_index
                    .entry(alias.clone())
                    .or_default()
                    .insert(identifier.clone());
            }
        }
    }

    /// Rebuild `identifier`'s provides entries from its current releases.
    fn reindex_provides(&mut self, identifier: &str) {
        for providers in self.provides_index.values_mut() {
            providers.remove(identifier);
        }
        self.provides_index.retain(|_, providers| !providers.is_empty());

        let aliases: BTreeSet<String> = self
            .available
            .get(identifier)
            .into_iter()
            .flatten()
            .flat_map(|m| m.provides.iter())
            .filter(|p| p.as_str() != identifier)
            .cloned()
            .collect();
        for alias in aliases {
            self.provides_index
                .entry(alias)
                .or_default()
                .insert(identifier.to_string());
        }
    }

    pub fn available_identifiers(&self) -> impl Iterator<Item = &str> {
        self.available.keys().map(String::as_str)
    }

    /// Mark `module` as installed, replacing any installed release of the
    /// same identifier.
    pub fn register_module(&mut self, module: Module) {
        tracing::debug!("Registering installed module {module}");
        self.installed.insert(module.identifier.clone(), module);
    }

    pub fn deregister_module(&mut self, identifier: &str) -> Option<Module> {
        self.installed.remove(identifier)
    }

    pub fn set_dlls(&mut self, dlls: impl IntoIterator<Item = String>) {
        self.dlls = dlls.into_iter().collect();
    }

    pub fn set_dlc(&mut self, dlc: BTreeMap<String, ModuleVersion>) {
        self.dlc = dlc;
    }

    /// Apply an install state, looking each installed release up among the
    /// available ones.
    pub fn apply_installed_state(&mut self, state: &InstalledState) -> Result<(), ModkitError> {
        for key in &state.installed {
            let module = self
                .module_by_version(&key.identifier, &key.version)
                .cloned()
                .ok_or_else(|| ModkitError::Registry {
                    message: format!("Installed module {key} is not in the registry"),
                })?;
            self.register_module(module);
        }
        self.set_dlls(state.dlls.iter().cloned());
        self.set_dlc(state.dlc.clone());
        Ok(())
    }
}

impl RegistryQuerier for Registry {
    fn all_versions(&self, identifier: &str) -> &[Module] {
        self.available
            .get(identifier)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn providers_of(&self, name: &str) -> Vec<&str> {
        self.provides_index
            .get(name)
            .map(|ids| ids.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn installed_modules(&self) -> &BTreeMap<String, Module> {
        &self.installed
    }

    fn dlls(&self) -> &BTreeSet<String> {
        &self.dlls
    }

    fn dlc(&self) -> &BTreeMap<String, ModuleVersion> {
        &self.dlc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_version::GameVersion;
    use crate::stability::ReleaseStatus;

    fn registry() -> Registry {
        let json = r#"[
            {"identifier": "Foo", "version": "1.0"},
            {"identifier": "Foo", "version": "2.0", "release_status": "testing"},
            {"identifier": "Foo", "version": "1.5", "ksp_version": "1.10.0"},
            {"identifier": "Bar", "version": "1.0", "provides": ["Virtual"]},
            {"identifier": "Baz", "version": "1.0", "provides": ["Virtual", "Baz"]}
        ]"#;
        Registry::from_json(json).unwrap()
    }

    #[test]
    fn versions_sorted_newest_first() {
        let reg = registry();
        let versions: Vec<String> = reg
            .all_versions("Foo")
            .iter()
            .map(|m| m.version.to_string())
            .collect();
        assert_eq!(versions, ["2.0", "1.5", "1.0"]);
    }

    #[test]
    fn stability_and_criteria_filter() {
        let reg = registry();
        let crit = GameVersionCriteria::single(GameVersion::parse("1.12.5").unwrap());
        let stable = StabilityTolerance::default();
        let latest = reg.latest_available("Foo", &stable, &crit).unwrap();
        assert_eq!(latest.version.to_string(), "1.0");

        let testing = StabilityTolerance::new(ReleaseStatus::Testing);
        let latest = reg.latest_available("Foo", &testing, &crit).unwrap();
        assert_eq!(latest.version.to_string(), "2.0");

        let incompatible = reg.incompatible_versions("Foo", &stable, &crit);
        assert_eq!(incompatible.len(), 1);
        assert_eq!(incompatible[0].version.to_string(), "1.5");
    }

    #[test]
    fn provides_index_skips_self() {
        let reg = registry();
        assert_eq!(reg.providers_of("Virtual"), vec!["Bar", "Baz"]);
        assert!(reg.providers_of("Baz").is_empty());
    }

    #[test]
    fn replacing_release_drops_stale_provides() {
        let mut reg = registry();
        reg.add_available(Module::new("Bar", "1.0"));
        assert_eq!(reg.providers_of("Virtual"), vec!["Baz"]);
        assert_eq!(reg.all_versions("Bar").len(), 1);

        // another release still providing the alias keeps Bar listed
        let mut newer = Module::new("Bar", "2.0");
        newer.provides.push("Virtual".into());
        reg.add_available(newer);
        reg.add_available(Module::new("Bar", "1.0"));
        assert_eq!(reg.providers_of("Virtual"), vec!["Bar", "Baz"]);
    }

    #[test]
    fn installed_state_applies() {
        let mut reg = registry();
        let state = InstalledState::from_json(
            r#"{"installed": [{"identifier": "Bar", "version": "1.0"}], "dlls": ["MM"], "dlc": {"MakingHistory": "1.1.0"}}"#,
        )
        .unwrap();
        reg.apply_installed_state(&state).unwrap();
        assert!(reg.installed_module("Bar").is_some());
        assert!(reg.dlls().contains("MM"));
        assert!(reg.dlc().contains_key("MakingHistory"));
    }

    #[test]
    fn installed_state_rejects_unknown_module() {
        let mut reg = registry();
        let state = InstalledState {
            installed: vec![ModuleKey::new("Nope", "1.0")],
            ..Default::default()
        };
        let err = reg.apply_installed_state(&state).unwrap_err();
        assert!(err.to_string().contains("Nope 1.0"));
    }

    #[test]
    fn malformed_snapshot_is_registry_error() {
        let err = Registry::from_json("{not json").unwrap_err();
        assert!(matches!(err, ModkitError::Registry { .. }));
    }
}
