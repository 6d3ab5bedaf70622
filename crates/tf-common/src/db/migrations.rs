use tracing::info;

use super::pool::PgPool;
use super::workflows::WorkflowStorageError;

/// Idempotent schema bootstrap, applied at startup.
const MIGRATIONS: &[&str] = &[
    "CREATE SCHEMA IF NOT EXISTS tf;",
    "CREATE TABLE IF NOT EXISTS tf.workflows (
        id BIGSERIAL PRIMARY KEY,
        job_id BIGINT NOT NULL,
        priority TEXT NOT NULL,
        description TEXT NOT NULL,
        status TEXT NOT NULL,
        created_by TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    );",
    "CREATE TABLE IF NOT EXISTS tf.workflow_phases (
        workflow_id BIGINT NOT NULL REFERENCES tf.workflows(id) ON DELETE CASCADE,
        phase_number INT NOT NULL,
        phase JSONB NOT NULL,
        PRIMARY KEY (workflow_id, phase_number)
    );",
    "CREATE TABLE IF NOT EXISTS tf.jobs (
        id BIGINT PRIMARY KEY,
        snapshot JSONB NOT NULL
    );",
    "CREATE TABLE IF NOT EXISTS tf.candidates (
        id BIGINT PRIMARY KEY,
        snapshot JSONB NOT NULL
    );",
    "CREATE TABLE IF NOT EXISTS tf.job_applications (
        job_id BIGINT NOT NULL,
        candidate_id BIGINT NOT NULL REFERENCES tf.candidates(id),
        PRIMARY KEY (job_id, candidate_id)
    );",
    "CREATE TABLE IF NOT EXISTS tf.job_recruiters (
        job_id BIGINT NOT NULL,
        recruiter_id BIGINT NOT NULL,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        PRIMARY KEY (job_id, recruiter_id)
    );",
    "CREATE TABLE IF NOT EXISTS tf.domains (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL
    );",
    "CREATE TABLE IF NOT EXISTS tf.talent_pools (
        id BIGSERIAL PRIMARY KEY,
        domain_id BIGINT NOT NULL REFERENCES tf.domains(id),
        name TEXT NOT NULL
    );",
    "CREATE TABLE IF NOT EXISTS tf.skills (
        id BIGSERIAL PRIMARY KEY,
        talent_pool_id BIGINT NOT NULL REFERENCES tf.talent_pools(id),
        name TEXT NOT NULL
    );",
];

pub async fn run_migrations(pool: &PgPool) -> Result<(), WorkflowStorageError> {
    let client = pool.get().await?;
    for statement in MIGRATIONS {
        client.batch_execute(statement).await?;
    }
    info!(statements = MIGRATIONS.len(), "schema migrations applied");
    Ok(())
}
