//! Command dispatch and handler modules.

mod check;
mod resolve;
mod reverse_deps;
mod why;

use miette::Result;

use modkit_core::config::GlobalConfig;
use modkit_core::game_version::{Game, GameVersionCriteria};
use modkit_core::registry::{InstalledState, Registry};
use modkit_resolver::{InstallRequest, RelationshipResolver, ResolutionOptions};

use crate::cli::{Cli, Command, SnapshotArgs};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Resolve {
            snapshot,
            modules,
            remove,
            preset,
            proceed,
            tree,
            json,
        } => {
            let output = if json {
                resolve::Output::Json
            } else if tree {
                resolve::Output::Tree
            } else {
                resolve::Output::List
            };
            resolve::exec(&snapshot, &modules, &remove, preset.into(), proceed, output)
        }
        Command::Check { snapshot } => check::exec(&snapshot),
        Command::ReverseDeps { snapshot, modules } => reverse_deps::exec(&snapshot, &modules),
        Command::Why {
            snapshot,
            target,
            modules,
        } => why::exec(&snapshot, &target, &modules),
    }
}

/// User config plus the registry snapshot a command works on.
struct Session {
    config: GlobalConfig,
    registry: Registry,
    game: Game,
    criteria: GameVersionCriteria,
}

impl Session {
    fn load(args: &SnapshotArgs) -> Result<Self> {
        let config = GlobalConfig::load()?;
        let mut registry = Registry::from_path(&args.registry)?;
        if let Some(path) = &args.installed {
            let state = InstalledState::from_path(path)?;
            registry.apply_installed_state(&state)?;
        }
        let criteria = if args.game_versions.is_empty() {
            config.game.criteria()
        } else {
            GameVersionCriteria::new(args.game_versions.iter().cloned())
        };
        tracing::debug!("Resolving for {} {criteria}", config.game.short_name);
        Ok(Self {
            game: config.game.game(),
            criteria,
            config,
            registry,
        })
    }

    fn resolve(
        &self,
        modules: &[String],
        remove: &[String],
        options: &ResolutionOptions,
    ) -> Result<RelationshipResolver> {
        let requests = modules
            .iter()
            .map(|m| m.parse::<InstallRequest>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RelationshipResolver::new(
            &requests,
            remove,
            options,
            &self.registry,
            &self.game,
            &self.criteria,
        )?)
    }
}
