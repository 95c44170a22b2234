use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::game_version::{GameVersion, GameVersionCriteria, GameVersionRange};
use crate::relationship::RelationshipDescriptor;
use crate::stability::ReleaseStatus;
use crate::version::ModuleVersion;

/// What a module record represents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// Installable content.
    #[default]
    Package,
    /// Content-free dependency bundle (modpacks).
    Metapackage,
    /// Externally owned content; never installed by modkit.
    Dlc,
}

/// Identifier plus version: how reasons and reports refer to a module
/// without owning it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModuleKey {
    pub identifier: String,
    pub version: ModuleVersion,
}

impl ModuleKey {
    pub fn new(identifier: impl Into<String>, version: impl Into<ModuleVersion>) -> Self {
        Self {
            identifier: identifier.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.identifier, self.version)
    }
}

/// One release of a module, as listed in a registry snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub identifier: String,
    #[serde(default)]
    pub name: String,
    pub version: ModuleVersion,
    #[serde(default)]
    pub kind: ModuleKind,
    #[serde(default)]
    pub release_status: ReleaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ksp_version: Option<GameVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ksp_version_min: Option<GameVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ksp_version_max: Option<GameVersion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<RelationshipDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<RelationshipDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggests: Vec<RelationshipDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommends: Vec<RelationshipDescriptor>,
}

impl Module {
    /// A bare package with no relationships, compatible with every game version.
    pub fn new(identifier: impl Into<String>, version: impl Into<ModuleVersion>) -> Self {
        let identifier = identifier.into();
        Self {
            name: identifier.clone(),
            identifier,
            version: version.into(),
            kind: ModuleKind::Package,
            release_status: ReleaseStatus::Stable,
            ksp_version: None,
            ksp_version_min: None,
            ksp_version_max: None,
            depends: Vec::new(),
            conflicts: Vec::new(),
            provides: Vec::new(),
            suggests: Vec::new(),
            recommends: Vec::new(),
        }
    }

    pub fn key(&self) -> ModuleKey {
        ModuleKey {
            identifier: self.identifier.clone(),
            version: self.version.clone(),
        }
    }

    pub fn is_metapackage(&self) -> bool {
        self.kind == ModuleKind::Metapackage
    }

    pub fn is_dlc(&self) -> bool {
        self.kind == ModuleKind::Dlc
    }

    /// The identifier followed by every `provides` alias.
    pub fn provides_list(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.identifier.as_str()).chain(self.provides.iter().map(String::as_str))
    }

    pub fn compatibility(&self) -> GameVersionRange {
        match &self.ksp_version {
            Some(exact) => GameVersionRange::exactly(exact.clone()),
            None => GameVersionRange {
                min: self.ksp_version_min.clone(),
                max: self.ksp_version_max.clone(),
            },
        }
    }

    pub fn is_compatible(&self, criteria: &GameVersionCriteria) -> bool {
        criteria.accepts(&self.compatibility())
    }

    /// The first of our `conflicts` entries that `other` matches.
    ///
    /// Two releases of the same identifier never conflict with each other.
    pub fn conflicts_with(&self, other: &Module) -> Option<&RelationshipDescriptor> {
        if self.identifier == other.identifier {
            return None;
        }
        self.conflicts.iter().find(|c| c.matches_module(other))
    }
}

impl Hash for Module {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
        self.version.hash(state);
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.identifier, self.version)
    }
}
