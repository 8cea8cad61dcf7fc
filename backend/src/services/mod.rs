//! Pure business rules: the enrollment-rule predicate set and the
//! time-window eligibility policy. Orchestration that touches a repository
//! lives in `crate::db::services`.

pub mod eligibility;
pub mod validation;
