use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for modkit operations outside the resolver itself.
#[derive(Debug, Error, Diagnostic)]
pub enum ModkitError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A registry snapshot or installed-state file could not be parsed.
    #[error("Registry error: {message}")]
    #[diagnostic(help("Registry snapshots are JSON arrays of module records"))]
    Registry { message: String },

    /// Invalid user configuration (e.g. `~/.modkit/config.toml`).
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check ~/.modkit/config.toml for syntax errors"))]
    Config { message: String },

    /// Dependency resolution failed (conflicts, missing deps, etc.).
    #[error("Relationship resolution failed: {message}")]
    Resolution { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type ModkitResult<T> = miette::Result<T>;
