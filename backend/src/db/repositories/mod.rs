//! Repository implementations module.
//!
//! Currently a single backend:
//! - `local`: in-memory implementation for unit testing and local
//!   development. A SQL-backed implementation would slot in beside it
//!   behind the same traits.
#[cfg(feature = "local-repo")]
pub mod local;

#[cfg(feature = "local-repo")]
pub use local::LocalRepository;
