//! Resolution policy.
//!
//! Options are plain values: start from a preset and apply overrides, each
//! of which returns a new value.

use modkit_core::config::GlobalConfig;
use modkit_core::stability::StabilityTolerance;

/// Named starting points for [`ResolutionOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// No soft relationships; ambiguity and conflicts are errors.
    Default,
    /// Like `Default`, and ignores the user's soft-relationship preferences.
    DependsOnly,
    /// Every soft relationship; problems are reported rather than raised.
    KitchenSink,
    /// Only looks for conflicts.
    Conflicts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionOptions {
    preset: Preset,
    with_suggests: bool,
    with_all_suggests: bool,
    with_recommends: bool,
    without_toomanyprovides_kraken: bool,
    without_enforce_consistency: bool,
    proceed_with_inconsistencies: bool,
    allow_incompatible: bool,
    stability: StabilityTolerance,
}

impl ResolutionOptions {
    fn base(preset: Preset) -> Self {
        Self {
            preset,
            with_suggests: false,
            with_all_suggests: false,
            with_recommends: false,
            without_toomanyprovides_kraken: false,
            without_enforce_consistency: false,
            proceed_with_inconsistencies: false,
            allow_incompatible: false,
            stability: StabilityTolerance::default(),
        }
    }

    pub fn default_opts() -> Self {
        Self::base(Preset::Default)
    }

    pub fn depends_only() -> Self {
        Self::base(Preset::DependsOnly)
    }

    pub fn kitchen_sink() -> Self {
        Self {
            with_suggests: true,
            with_all_suggests: true,
            with_recommends: true,
            without_toomanyprovides_kraken: true,
            without_enforce_consistency: true,
            proceed_with_inconsistencies: true,
            ..Self::base(Preset::KitchenSink)
        }
    }

    pub fn conflicts_opts() -> Self {
        Self {
            without_toomanyprovides_kraken: true,
            without_enforce_consistency: true,
            proceed_with_inconsistencies: true,
            ..Self::base(Preset::Conflicts)
        }
    }

    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Default => Self::default_opts(),
            Preset::DependsOnly => Self::depends_only(),
            Preset::KitchenSink => Self::kitchen_sink(),
            Preset::Conflicts => Self::conflicts_opts(),
        }
    }

    /// Build a preset, folding in the user's global preferences.
    ///
    /// `Default` and `KitchenSink` turn on any soft relationships the user
    /// enabled; `DependsOnly` and `Conflicts` ignore them. The stability
    /// tolerance always comes from the config.
    pub fn from_config(preset: Preset, config: &GlobalConfig) -> Self {
        let mut opts = Self::preset(preset).with_stability(config.stability.clone());
        if matches!(preset, Preset::Default | Preset::KitchenSink) {
            let prefs = &config.resolver;
            opts.with_suggests |= prefs.with_suggests;
            opts.with_all_suggests |= prefs.with_all_suggests;
            opts.with_recommends |= prefs.with_recommends;
            opts.allow_incompatible |= prefs.allow_incompatible;
        }
        opts
    }

    pub fn with_suggests(self, on: bool) -> Self {
        Self {
            with_suggests: on,
            ..self
        }
    }

    pub fn with_all_suggests(self, on: bool) -> Self {
        Self {
            with_all_suggests: on,
            ..self
        }
    }

    pub fn with_recommends(self, on: bool) -> Self {
        Self {
            with_recommends: on,
            ..self
        }
    }

    pub fn without_toomanyprovides_kraken(self, on: bool) -> Self {
        Self {
            without_toomanyprovides_kraken: on,
            ..self
        }
    }

    pub fn without_enforce_consistency(self, on: bool) -> Self {
        Self {
            without_enforce_consistency: on,
            ..self
        }
    }

    pub fn proceed_with_inconsistencies(self, on: bool) -> Self {
        Self {
            proceed_with_inconsistencies: on,
            ..self
        }
    }

    pub fn allow_incompatible(self, on: bool) -> Self {
        Self {
            allow_incompatible: on,
            ..self
        }
    }

    pub fn with_stability(self, stability: StabilityTolerance) -> Self {
        Self { stability, ..self }
    }

    pub fn preset_kind(&self) -> Preset {
        self.preset
    }

    /// Whether suggests of user-requested modules are followed.
    pub fn follows_suggests(&self) -> bool {
        self.with_suggests || self.with_all_suggests
    }

    pub fn follows_all_suggests(&self) -> bool {
        self.with_all_suggests
    }

    pub fn follows_recommends(&self) -> bool {
        self.with_recommends
    }

    pub fn tolerates_ambiguity(&self) -> bool {
        self.without_toomanyprovides_kraken
    }

    pub fn enforces_consistency(&self) -> bool {
        !self.without_enforce_consistency
    }

    pub fn proceeds_with_inconsistencies(&self) -> bool {
        self.proceed_with_inconsistencies
    }

    pub fn allows_incompatible(&self) -> bool {
        self.allow_incompatible
    }

    pub fn stability(&self) -> &StabilityTolerance {
        &self.stability
    }
}

impl Default for ResolutionOptions {
    fn default() -> Self {
        Self::default_opts()
    }
}
