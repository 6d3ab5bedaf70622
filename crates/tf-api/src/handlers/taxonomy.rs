use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use tf_common::directory::{DomainRef, SkillRef, TalentPoolRef};
use tf_common::Candidate;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::SharedState;

pub async fn list_domains(
    State(state): State<SharedState>,
    _auth: AuthUser,
) -> Result<Json<Vec<DomainRef>>, ApiError> {
    Ok(Json(state.taxonomy.list_domains().await?))
}

pub async fn list_talent_pools(
    State(state): State<SharedState>,
    Path(domain_id): Path<i64>,
    _auth: AuthUser,
) -> Result<Json<Vec<TalentPoolRef>>, ApiError> {
    Ok(Json(state.taxonomy.list_talent_pools(domain_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct SkillsQuery {
    /// Comma-separated talent pool ids.
    pool_ids: String,
}

pub async fn list_skills(
    State(state): State<SharedState>,
    _auth: AuthUser,
    Query(query): Query<SkillsQuery>,
) -> Result<Json<Vec<SkillRef>>, ApiError> {
    let pool_ids = query
        .pool_ids
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            part.trim()
                .parse::<i64>()
                .map_err(|_| ApiError::BadRequest(format!("invalid pool id: {part}")))
        })
        .collect::<Result<Vec<i64>, ApiError>>()?;

    Ok(Json(state.taxonomy.list_skills(&pool_ids).await?))
}

pub async fn list_applicants(
    State(state): State<SharedState>,
    Path(job_id): Path<i64>,
    _auth: AuthUser,
) -> Result<Json<Vec<Candidate>>, ApiError> {
    Ok(Json(state.directory.list_applicants(job_id).await?))
}
