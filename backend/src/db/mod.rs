//! Data access module for enrollment state.
//!
//! Abstracts storage behind the Repository pattern so different backends
//! can be swapped without touching the rule logic.
//!
//! The module includes:
//! - `services`: high-level operations combining policy, validation and
//!   commit (use these in your application!)
//! - `repository`: trait definitions for storage operations
//! - `repositories::local`: in-memory implementation for unit testing and
//!   local deployments
//! - `factory`: factory for creating repository instances
//!
//! # Recommended Usage
//!
//! **For new code, use the service layer:**
//! ```ignore
//! use enroll_rust::db::{factory::RepositoryFactory, services, RepositoryType};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryFactory::create(RepositoryType::Local)?;
//!     let healthy = services::health_check(repo.as_ref()).await?;
//!     assert!(healthy);
//!     Ok(())
//! }
//! ```

#[cfg(not(feature = "local-repo"))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

// ==================== Service Layer (Recommended for new code) ====================

pub use services::{
    add_student_sessions, available_offerings, current_period, health_check, is_enabled_to_enroll,
    is_schedule_full, remaining_quota_display, set_student_sessions, Actor,
};

// ==================== Repository Pattern Exports ====================

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
#[cfg(feature = "local-repo")]
pub use repositories::LocalRepository;
pub use repository::{
    CatalogRepository, EnrollmentRepository, FullRepository, NewMember, NewOffering, NewPeriod,
    RepositoryError, RepositoryResult, SessionChange,
};

use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock};

/// Global repository instance initialized once per process.
static REPOSITORY: OnceLock<Arc<dyn FullRepository>> = OnceLock::new();

fn create_selected_repository() -> RepositoryResult<Arc<dyn FullRepository>> {
    RepositoryFactory::create(RepositoryType::Local)
}

/// Initialize the global repository singleton for the selected backend.
pub fn init_repository() -> Result<()> {
    if REPOSITORY.get().is_some() {
        return Ok(());
    }

    let repo = create_selected_repository().map_err(|e| anyhow::Error::msg(e.to_string()))?;
    let _ = REPOSITORY.set(repo);
    Ok(())
}

/// Get a reference to the global repository instance.
pub fn get_repository() -> Result<&'static Arc<dyn FullRepository>> {
    if REPOSITORY.get().is_none() {
        let _ = init_repository();
    }

    REPOSITORY
        .get()
        .context("Repository not initialized. Call init_repository() first.")
}
