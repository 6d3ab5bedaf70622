use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::components::score_components;
use super::scoring::{composite_score, ComponentScores};
use super::weights::Preference;
use crate::error::CoreError;
use crate::{Candidate, Job};

/// Ranked match for one candidate against one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_id: i64,
    pub composite_score: u8,
    pub component_scores: ComponentScores,
}

/// Scores and ranks candidates against a job. Scoring is pure: identical
/// inputs always produce identical ordering and scores.
#[derive(Debug, Clone, Default)]
pub struct MatchingEngine;

impl MatchingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Rank the whole pool, descending by composite score, ties broken by
    /// candidate id. Candidates without an id cannot be ranked and are
    /// skipped. An empty pool is an empty result, not an error.
    pub fn rank(
        &self,
        job: &Job,
        pool: &[Candidate],
        preference: &Preference,
    ) -> Result<Vec<MatchResult>, CoreError> {
        let weights = preference.normalize()?;

        let mut results: Vec<MatchResult> = pool
            .iter()
            .filter_map(|candidate| {
                let candidate_id = candidate.id?;
                let components = score_components(job, candidate);
                let authoritative = candidate
                    .evaluation
                    .as_ref()
                    .and_then(|eval| eval.composite);
                let composite = composite_score(&components, &weights, authoritative);

                Some(MatchResult {
                    candidate_id,
                    composite_score: composite,
                    component_scores: components,
                })
            })
            .collect();

        results.sort_by(|a, b| {
            match b.composite_score.cmp(&a.composite_score) {
                Ordering::Equal => a.candidate_id.cmp(&b.candidate_id),
                other => other,
            }
        });

        Ok(results)
    }

    /// Top-`limit` entries after ranking. `limit == 0` is an input error.
    pub fn rank_top(
        &self,
        job: &Job,
        pool: &[Candidate],
        preference: &Preference,
        limit: usize,
    ) -> Result<Vec<MatchResult>, CoreError> {
        if limit == 0 {
            return Err(CoreError::validation("limit", "must be greater than zero"));
        }
        let mut results = self.rank(job, pool, preference)?;
        results.truncate(limit);
        Ok(results)
    }
}
