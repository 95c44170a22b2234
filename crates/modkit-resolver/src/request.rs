use std::fmt;
use std::str::FromStr;

use modkit_core::module::Module;
use modkit_core::version::ModuleVersion;
use modkit_util::errors::ModkitError;

/// Something the user asked to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallRequest {
    /// A concrete release, used as-is.
    Module(Module),
    /// `identifier[=version]`, looked up in the registry.
    Identifier {
        identifier: String,
        version: Option<ModuleVersion>,
    },
}

impl InstallRequest {
    pub fn identifier(&self) -> &str {
        match self {
            Self::Module(m) => &m.identifier,
            Self::Identifier { identifier, .. } => identifier,
        }
    }
}

impl From<Module> for InstallRequest {
    fn from(module: Module) -> Self {
        Self::Module(module)
    }
}

impl FromStr for InstallRequest {
    type Err = ModkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (identifier, version) = match s.split_once('=') {
            Some((id, v)) => (id.trim(), Some(v.trim())),
            None => (s.trim(), None),
        };
        if identifier.is_empty() || version.is_some_and(str::is_empty) {
            return Err(ModkitError::Generic {
                message: format!("Invalid install request '{s}': expected identifier[=version]"),
            });
        }
        Ok(Self::Identifier {
            identifier: identifier.to_string(),
            version: version.map(ModuleVersion::parse),
        })
    }
}

impl fmt::Display for InstallRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module(m) => write!(f, "{m}"),
            Self::Identifier {
                identifier,
                version: Some(v),
            } => write!(f, "{identifier}={v}"),
            Self::Identifier { identifier, .. } => f.write_str(identifier),
        }
    }
}
