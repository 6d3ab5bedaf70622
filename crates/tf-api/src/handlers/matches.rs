use std::collections::HashMap;

use axum::{extract::State, Json};

use tf_common::api::match_request::MatchRequest;
use tf_common::api::match_response::MatchResponse;
use tf_common::Candidate;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::SharedState;

const DEFAULT_MATCH_LIMIT: usize = 50;
const MAX_MATCH_LIMIT: usize = 200;

/// Score and rank candidates for a job. The pool defaults to the job's
/// applicants; an explicit candidate filter overrides it.
pub async fn run_match(
    State(state): State<SharedState>,
    _auth: AuthUser,
    Json(request): Json<MatchRequest>,
) -> Result<Json<Vec<MatchResponse>>, ApiError> {
    let job = state.directory.get_job(request.job_id).await?;

    let pool: Vec<Candidate> = match &request.candidate_ids {
        Some(ids) => {
            let mut pool = Vec::with_capacity(ids.len());
            for id in ids {
                pool.push(state.directory.get_candidate(*id).await?);
            }
            pool
        }
        None => state.directory.list_applicants(request.job_id).await?,
    };

    let limit = request
        .limit
        .unwrap_or(DEFAULT_MATCH_LIMIT)
        .min(MAX_MATCH_LIMIT);
    let results = state
        .engine
        .rank_top(&job, &pool, &request.preference, limit)?;

    let by_id: HashMap<i64, &Candidate> = pool
        .iter()
        .filter_map(|candidate| candidate.id.map(|id| (id, candidate)))
        .collect();

    let responses = results
        .iter()
        .map(|result| MatchResponse::from_result(result, by_id.get(&result.candidate_id).copied()))
        .collect();

    Ok(Json(responses))
}
