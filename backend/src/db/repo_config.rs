//! Repository configuration file support.
//!
//! Reads the repository selection from a TOML configuration file, e.g.:
//!
//! ```toml
//! [repository]
//! type = "local"
//! ```

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::factory::RepositoryType;
use super::repository::{RepositoryError, RepositoryResult};

/// Repository configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            repository: RepositorySettings {
                repo_type: "local".to_string(),
            },
        }
    }
}

impl RepositoryConfig {
    /// Load repository configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> RepositoryResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!(
                "cannot read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        toml::from_str(&contents)
            .map_err(|e| RepositoryError::configuration(format!("invalid config file: {}", e)))
    }

    /// Parsed repository type.
    pub fn repo_type(&self) -> RepositoryResult<RepositoryType> {
        RepositoryType::from_str(&self.repository.repo_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_local() {
        let config = RepositoryConfig::default();
        assert_eq!(config.repo_type().unwrap(), RepositoryType::Local);
    }

    #[test]
    fn test_parse_toml() {
        let config: RepositoryConfig = toml::from_str("[repository]\ntype = \"local\"\n").unwrap();
        assert_eq!(config.repo_type().unwrap(), RepositoryType::Local);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let config: RepositoryConfig =
            toml::from_str("[repository]\ntype = \"oracle\"\n").unwrap();
        assert!(config.repo_type().is_err());
    }
}
