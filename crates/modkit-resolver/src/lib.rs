//! Relationship resolution engine.
//!
//! Given modules to install and remove, a [`ResolutionOptions`] policy and a
//! registry snapshot, [`RelationshipResolver`] computes the consistent set
//! of modules that must be present, with a reason for each one.
//! [`SanityChecker`] validates arbitrary module sets against the same rules.
//!
//! Resolution is synchronous and never touches the filesystem or network.

pub mod conflict;
pub mod error;
pub mod graph;
pub mod options;
pub mod reason;
pub mod request;
pub mod resolver;
pub mod sanity;

pub use error::ResolutionError;
pub use options::ResolutionOptions;
pub use reason::SelectionReason;
pub use request::InstallRequest;
pub use resolver::RelationshipResolver;
pub use sanity::SanityChecker;
