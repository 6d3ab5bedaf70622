use async_trait::async_trait;
use deadpool_postgres::PoolError;
use serde_json::Value;
use tokio_postgres::types::Json;
use tokio_postgres::Error as PgError;
use tracing::instrument;

use crate::db::pool::PgPool;
use crate::directory::{Directory, DomainRef, Recruiter, SkillRef, TalentPoolRef, Taxonomy};
use crate::error::CoreError;
use crate::{Candidate, Job};

#[derive(Debug, thiserror::Error)]
pub enum DirectoryFetchError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
    #[error("stored snapshot is malformed: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl From<DirectoryFetchError> for CoreError {
    fn from(value: DirectoryFetchError) -> Self {
        CoreError::Transport(value.to_string())
    }
}

/// Postgres-backed read-only directory. Jobs and candidates are stored as
/// JSONB snapshots written by the external job-management collaborator.
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn snapshot<T: serde::de::DeserializeOwned>(
        id: i64,
        row: &tokio_postgres::Row,
    ) -> Result<T, DirectoryFetchError> {
        let Json(mut value): Json<Value> = row.get(1);
        // The id column is authoritative; stale snapshots may predate it.
        if let Value::Object(map) = &mut value {
            map.insert("id".into(), Value::from(id));
        }
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl Directory for PgDirectory {
    #[instrument(skip(self))]
    async fn get_job(&self, id: i64) -> Result<Job, CoreError> {
        let client = self.pool.get().await.map_err(DirectoryFetchError::from)?;
        let row = client
            .query_opt("SELECT id, snapshot FROM tf.jobs WHERE id = $1", &[&id])
            .await
            .map_err(DirectoryFetchError::from)?
            .ok_or_else(|| CoreError::not_found(format!("job {id}")))?;
        Ok(Self::snapshot::<Job>(id, &row)?)
    }

    #[instrument(skip(self))]
    async fn get_candidate(&self, id: i64) -> Result<Candidate, CoreError> {
        let client = self.pool.get().await.map_err(DirectoryFetchError::from)?;
        let row = client
            .query_opt(
                "SELECT id, snapshot FROM tf.candidates WHERE id = $1",
                &[&id],
            )
            .await
            .map_err(DirectoryFetchError::from)?
            .ok_or_else(|| CoreError::not_found(format!("candidate {id}")))?;
        Ok(Self::snapshot::<Candidate>(id, &row)?)
    }

    #[instrument(skip(self))]
    async fn list_applicants(&self, job_id: i64) -> Result<Vec<Candidate>, CoreError> {
        let client = self.pool.get().await.map_err(DirectoryFetchError::from)?;
        let rows = client
            .query(
                "SELECT c.id, c.snapshot
                 FROM tf.candidates c
                 JOIN tf.job_applications a ON a.candidate_id = c.id
                 WHERE a.job_id = $1
                 ORDER BY c.id",
                &[&job_id],
            )
            .await
            .map_err(DirectoryFetchError::from)?;

        let mut candidates = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.get(0);
            candidates.push(Self::snapshot::<Candidate>(id, &row)?);
        }
        Ok(candidates)
    }

    #[instrument(skip(self))]
    async fn list_candidates(&self) -> Result<Vec<Candidate>, CoreError> {
        let client = self.pool.get().await.map_err(DirectoryFetchError::from)?;
        let rows = client
            .query("SELECT id, snapshot FROM tf.candidates ORDER BY id", &[])
            .await
            .map_err(DirectoryFetchError::from)?;

        let mut candidates = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.get(0);
            candidates.push(Self::snapshot::<Candidate>(id, &row)?);
        }
        Ok(candidates)
    }

    #[instrument(skip(self))]
    async fn list_recruiters(&self, job_id: i64) -> Result<Vec<Recruiter>, CoreError> {
        let client = self.pool.get().await.map_err(DirectoryFetchError::from)?;
        let rows = client
            .query(
                "SELECT recruiter_id, name, email FROM tf.job_recruiters
                 WHERE job_id = $1 ORDER BY recruiter_id",
                &[&job_id],
            )
            .await
            .map_err(DirectoryFetchError::from)?;

        Ok(rows
            .iter()
            .map(|row| Recruiter {
                id: row.get(0),
                name: row.get(1),
                email: row.get(2),
            })
            .collect())
    }
}

#[async_trait]
impl Taxonomy for PgDirectory {
    #[instrument(skip(self))]
    async fn list_domains(&self) -> Result<Vec<DomainRef>, CoreError> {
        let client = self.pool.get().await.map_err(DirectoryFetchError::from)?;
        let rows = client
            .query("SELECT id, name FROM tf.domains ORDER BY name", &[])
            .await
            .map_err(DirectoryFetchError::from)?;

        Ok(rows
            .iter()
            .map(|row| DomainRef {
                id: row.get(0),
                name: row.get(1),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn list_talent_pools(&self, domain_id: i64) -> Result<Vec<TalentPoolRef>, CoreError> {
        let client = self.pool.get().await.map_err(DirectoryFetchError::from)?;
        let rows = client
            .query(
                "SELECT id, domain_id, name FROM tf.talent_pools
                 WHERE domain_id = $1 ORDER BY name",
                &[&domain_id],
            )
            .await
            .map_err(DirectoryFetchError::from)?;

        Ok(rows
            .iter()
            .map(|row| TalentPoolRef {
                id: row.get(0),
                domain_id: row.get(1),
                name: row.get(2),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn list_skills(&self, talent_pool_ids: &[i64]) -> Result<Vec<SkillRef>, CoreError> {
        if talent_pool_ids.is_empty() {
            return Ok(Vec::new());
        }
        let client = self.pool.get().await.map_err(DirectoryFetchError::from)?;
        let rows = client
            .query(
                "SELECT id, talent_pool_id, name FROM tf.skills
                 WHERE talent_pool_id = ANY($1) ORDER BY name",
                &[&talent_pool_ids],
            )
            .await
            .map_err(DirectoryFetchError::from)?;

        Ok(rows
            .iter()
            .map(|row| SkillRef {
                id: row.get(0),
                talent_pool_id: row.get(1),
                name: row.get(2),
            })
            .collect())
    }
}
