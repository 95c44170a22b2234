use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use modkit_util::errors::ModkitError;

use crate::game_version::{Game, GameVersion, GameVersionCriteria};
use crate::stability::StabilityTolerance;

/// Global user configuration loaded from `~/.modkit/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub resolver: ResolverPreferences,

    #[serde(default)]
    pub stability: StabilityTolerance,

    #[serde(default)]
    pub game: GameConfig,
}

/// Soft-relationship preferences from `[resolver]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverPreferences {
    #[serde(default, rename = "with-recommends")]
    pub with_recommends: bool,
    #[serde(default, rename = "with-suggests")]
    pub with_suggests: bool,
    #[serde(default, rename = "with-all-suggests")]
    pub with_all_suggests: bool,
    #[serde(default, rename = "allow-incompatible")]
    pub allow_incompatible: bool,
}

/// Game identity and target versions from `[game]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_short_name", rename = "short-name")]
    pub short_name: String,
    #[serde(default)]
    pub versions: Vec<GameVersion>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            short_name: default_short_name(),
            versions: Vec::new(),
        }
    }
}

fn default_short_name() -> String {
    "KSP".to_string()
}

impl GameConfig {
    pub fn game(&self) -> Game {
        Game::new(self.short_name.clone())
    }

    pub fn criteria(&self) -> GameVersionCriteria {
        GameVersionCriteria::new(self.versions.iter().cloned())
    }
}

impl GlobalConfig {
    /// Load the global configuration from `~/.modkit/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &std::path::Path) -> miette::Result<Self> {
        match modkit_util::fs::read_optional(path, "global config")? {
            Some(content) => Self::parse(&content).map_err(Into::into),
            None => Ok(Self::default()),
        }
    }

    pub fn parse(content: &str) -> Result<Self, ModkitError> {
        toml::from_str(content).map_err(|e| ModkitError::Config {
            message: format!("Failed to parse global config: {e}"),
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the modkit data directory (`~/.modkit/`).
pub fn dirs_path() -> PathBuf {
    modkit_util::fs::home_dir().join(".modkit")
}
