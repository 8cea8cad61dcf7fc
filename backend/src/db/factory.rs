//! Factory for creating repository instances.

use std::str::FromStr;
use std::sync::Arc;

use super::repository::{FullRepository, RepositoryError, RepositoryResult};

/// Available repository backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory backend for tests and local deployments.
    Local,
}

impl FromStr for RepositoryType {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" | "memory" => Ok(RepositoryType::Local),
            other => Err(RepositoryError::configuration(format!(
                "unknown repository type `{}`",
                other
            ))),
        }
    }
}

/// Creates repository instances by type.
pub struct RepositoryFactory;

impl RepositoryFactory {
    #[cfg(feature = "local-repo")]
    pub fn create_local() -> Arc<super::repositories::LocalRepository> {
        Arc::new(super::repositories::LocalRepository::new())
    }

    /// Create a repository of the requested type.
    pub fn create(repo_type: RepositoryType) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            #[cfg(feature = "local-repo")]
            RepositoryType::Local => Ok(Self::create_local() as Arc<dyn FullRepository>),
            #[cfg(not(feature = "local-repo"))]
            RepositoryType::Local => Err(RepositoryError::configuration(
                "local repository backend is not compiled in",
            )),
        }
    }
}
