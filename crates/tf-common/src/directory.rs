use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::{Candidate, Job};

/// Recruiter contact attached to a job posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recruiter {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TalentPoolRef {
    pub id: i64,
    pub domain_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRef {
    pub id: i64,
    pub talent_pool_id: i64,
    pub name: String,
}

/// Read-only candidate/job lookups. Owned by the external job-management
/// collaborator; the core only consumes snapshots.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Unknown id is a `NotFound` error, not an empty result.
    async fn get_job(&self, id: i64) -> Result<Job, CoreError>;
    async fn get_candidate(&self, id: i64) -> Result<Candidate, CoreError>;
    async fn list_applicants(&self, job_id: i64) -> Result<Vec<Candidate>, CoreError>;
    async fn list_candidates(&self) -> Result<Vec<Candidate>, CoreError>;
    async fn list_recruiters(&self, job_id: i64) -> Result<Vec<Recruiter>, CoreError>;
}

/// Domain → talent pool → skill hierarchy, used by the preference/filter
/// surface. Plain dependent queries; the core keeps no cache to
/// invalidate.
#[async_trait]
pub trait Taxonomy: Send + Sync {
    async fn list_domains(&self) -> Result<Vec<DomainRef>, CoreError>;
    async fn list_talent_pools(&self, domain_id: i64) -> Result<Vec<TalentPoolRef>, CoreError>;
    async fn list_skills(&self, talent_pool_ids: &[i64]) -> Result<Vec<SkillRef>, CoreError>;
}
