use std::fmt;

use serde::Serialize;

use modkit_core::module::ModuleKey;

/// Why a module is part of a resolution.
///
/// Parents are referenced by key so reasons never own modules; a module
/// can carry several reasons at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "parent", rename_all = "kebab-case")]
pub enum SelectionReason {
    UserRequested,
    Installed,
    Depends(ModuleKey),
    Suggested(ModuleKey),
    Recommended(ModuleKey),
}

impl SelectionReason {
    pub fn parent(&self) -> Option<&ModuleKey> {
        match self {
            Self::Depends(p) | Self::Suggested(p) | Self::Recommended(p) => Some(p),
            Self::UserRequested | Self::Installed => None,
        }
    }

    /// Suggested or recommended rather than required.
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::Suggested(_) | Self::Recommended(_))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::UserRequested => "Requested by user".to_string(),
            Self::Installed => "Currently installed".to_string(),
            Self::Depends(p) => format!("To satisfy dependency from {p}"),
            Self::Suggested(p) => format!("Suggested by {p}"),
            Self::Recommended(p) => format!("Recommended by {p}"),
        }
    }
}

impl fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
