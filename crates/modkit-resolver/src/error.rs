use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

use modkit_core::module::ModuleKey;
use modkit_core::version::ModuleVersion;

/// One dependency that could not be satisfied, with the modules that
/// needed it, nearest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsatisfiedDependency {
    /// The relationship as rendered for users, including any game
    /// versions the only matching releases support.
    pub descriptor: String,
    pub chain: Vec<ModuleKey>,
}

impl UnsatisfiedDependency {
    /// `A 1.0 (needed for B 1.0, needed for C 1.0)`
    fn render_chain(&self) -> String {
        let Some((first, rest)) = self.chain.split_first() else {
            return String::new();
        };
        if rest.is_empty() {
            return first.to_string();
        }
        let parents: Vec<String> = rest.iter().map(|k| format!("needed for {k}")).collect();
        format!("{first} ({})", parents.join(", "))
    }
}

/// Typed failure of a resolution or consistency check.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum ResolutionError {
    #[error("{}", render_unsatisfied(.unsatisfied))]
    #[diagnostic(
        code(modkit::missing_dependency),
        help("Check that the game versions in ~/.modkit/config.toml match your install")
    )]
    MissingDependency { unsatisfied: Vec<UnsatisfiedDependency> },

    #[error("Too many mods provide {requested}: {}", join_keys(.candidates))]
    #[diagnostic(
        code(modkit::ambiguous_provider),
        help("Install one of the candidates explicitly")
    )]
    AmbiguousProvider {
        requested: String,
        candidates: Vec<ModuleKey>,
    },

    #[error("{needed_by} needs {descriptor}, but {found} is already selected")]
    #[diagnostic(code(modkit::version_mismatch))]
    VersionMismatch {
        descriptor: String,
        found: ModuleKey,
        needed_by: ModuleKey,
    },

    #[error("{}", .conflicts.join("; "))]
    #[diagnostic(
        code(modkit::conflict),
        help("Remove one side of the conflict, or resolve with --proceed to report it")
    )]
    Conflict { conflicts: Vec<String> },

    #[error("Module {identifier}{} not found", render_version(.version))]
    #[diagnostic(code(modkit::not_found))]
    NotFound {
        identifier: String,
        version: Option<ModuleVersion>,
    },

    #[error("Inconsistent module set: {}", .problems.join("; "))]
    #[diagnostic(code(modkit::inconsistent))]
    Inconsistent { problems: Vec<String> },
}

impl ResolutionError {
    pub(crate) fn missing(descriptor: String, chain: Vec<ModuleKey>) -> Self {
        Self::MissingDependency {
            unsatisfied: vec![UnsatisfiedDependency { descriptor, chain }],
        }
    }
}

/// Groups failures by dependency so each one is reported once, with every
/// chain that led to it.
fn render_unsatisfied(unsatisfied: &[UnsatisfiedDependency]) -> String {
    let mut groups: Vec<(&str, Vec<String>)> = Vec::new();
    for u in unsatisfied {
        let chain = u.render_chain();
        match groups.iter_mut().find(|(d, _)| *d == u.descriptor) {
            Some((_, chains)) => {
                if !chains.contains(&chain) {
                    chains.push(chain);
                }
            }
            None => groups.push((&u.descriptor, vec![chain])),
        }
    }
    let lines: Vec<String> = groups
        .into_iter()
        .map(|(descriptor, chains)| {
            format!(
                "Unsatisfied dependency {descriptor} needed for: {}",
                chains.join("; ")
            )
        })
        .collect();
    lines.join("\n")
}

fn join_keys(keys: &[ModuleKey]) -> String {
    let parts: Vec<String> = keys.iter().map(ToString::to_string).collect();
    parts.join(", ")
}

fn render_version(version: &Option<ModuleVersion>) -> String {
    match version {
        Some(v) => format!(" {v}"),
        None => String::new(),
    }
}

impl fmt::Display for UnsatisfiedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} needed for: {}", self.descriptor, self.render_chain())
    }
}
