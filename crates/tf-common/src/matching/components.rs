use std::collections::HashSet;

use crate::matching::scoring::ComponentScores;
use crate::{Candidate, Job};

/// Score awarded when a requirement is absent on the job side, so the
/// component cannot discriminate between candidates.
const NO_REQUIREMENT: u8 = 100;
/// Neutral score when the candidate side is unknown.
const UNKNOWN: u8 = 50;

/// Compute the four component scores for one candidate against one job.
/// An upstream evaluation snapshot, when present, wins over recomputation.
pub fn score_components(job: &Job, candidate: &Candidate) -> ComponentScores {
    if let Some(components) = candidate
        .evaluation
        .as_ref()
        .and_then(|eval| eval.components.clone())
    {
        return components;
    }

    ComponentScores {
        skills: score_skills(job, candidate),
        experience: score_experience(job, candidate),
        years_of_exp: score_years(job, candidate),
        location: score_location(job, candidate),
    }
}

fn normalize_terms<'a>(terms: impl IntoIterator<Item = &'a str>) -> HashSet<String> {
    terms
        .into_iter()
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}

fn overlap_percentage(required: &HashSet<String>, possessed: &HashSet<String>) -> u8 {
    if required.is_empty() {
        return NO_REQUIREMENT;
    }
    let matched = required.intersection(possessed).count();
    ((matched as f64 / required.len() as f64) * 100.0).round() as u8
}

/// Required-skill overlap percentage.
fn score_skills(job: &Job, candidate: &Candidate) -> u8 {
    let required = normalize_terms(job.required_skills.iter().map(String::as_str));
    let possessed = normalize_terms(
        candidate
            .skills
            .iter()
            .chain(candidate.skill_tags.iter())
            .map(String::as_str),
    );
    overlap_percentage(&required, &possessed)
}

/// Overlap of the candidate's experience-history terms against the job's
/// description terms (title words, domain, required skills).
fn score_experience(job: &Job, candidate: &Candidate) -> u8 {
    let mut job_terms: Vec<&str> = job
        .title
        .split_whitespace()
        .chain(job.required_skills.iter().map(String::as_str))
        .collect();
    if let Some(domain) = job.domain.as_deref() {
        job_terms.push(domain);
    }
    let job_terms = normalize_terms(job_terms);

    if job_terms.is_empty() {
        return NO_REQUIREMENT;
    }
    if candidate.experience.is_empty() {
        return UNKNOWN;
    }

    let candidate_terms = normalize_terms(candidate.experience.iter().flat_map(|entry| {
        entry
            .title
            .split_whitespace()
            .chain(entry.keywords.iter().map(String::as_str))
            .chain(entry.summary.iter().flat_map(|s| s.split_whitespace()))
    }));

    overlap_percentage(&job_terms, &candidate_terms)
}

/// Tiered comparison of total experience years against the job's minimum.
fn score_years(job: &Job, candidate: &Candidate) -> u8 {
    let required = match job.min_experience_years {
        Some(years) => years,
        None => return NO_REQUIREMENT,
    };
    let actual = match candidate.total_experience_years() {
        Some(years) => years,
        None => return UNKNOWN,
    };

    const BUFFER: f64 = 0.5;
    if actual >= required + BUFFER * 4.0 {
        100
    } else if actual >= required + BUFFER * 2.0 {
        90
    } else if actual >= required + BUFFER {
        80
    } else if actual >= required {
        70
    } else if actual + BUFFER >= required {
        40
    } else {
        0
    }
}

/// Exact city match, same region, remote-friendly ladder.
fn score_location(job: &Job, candidate: &Candidate) -> u8 {
    if job.locations.is_empty() && job.region.is_none() {
        return NO_REQUIREMENT;
    }

    let city = candidate.city.as_deref().map(str::to_lowercase);
    if let Some(city) = city.as_deref() {
        if job
            .locations
            .iter()
            .any(|location| location.to_lowercase() == city)
        {
            return 100;
        }
    }

    match (job.region.as_deref(), candidate.region.as_deref()) {
        (Some(job_region), Some(candidate_region))
            if job_region.eq_ignore_ascii_case(candidate_region) =>
        {
            return 60;
        }
        _ => {}
    }

    if job.remote_friendly {
        return 50;
    }
    if candidate.city.is_none() && candidate.region.is_none() {
        return UNKNOWN;
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CandidateEvaluation, ExperienceEntry};

    fn base_job() -> Job {
        Job {
            id: Some(1),
            title: "Senior Rust Engineer".into(),
            domain: Some("fintech".into()),
            required_skills: vec!["Rust".into(), "PostgreSQL".into()],
            locations: vec!["Berlin".into()],
            region: Some("EU".into()),
            min_experience_years: Some(5.0),
            ..Job::default()
        }
    }

    fn base_candidate() -> Candidate {
        Candidate {
            id: Some(7),
            skills: vec!["rust".into(), "postgresql".into()],
            experience: vec![ExperienceEntry {
                title: "Rust Engineer".into(),
                keywords: vec!["fintech".into(), "postgresql".into()],
                years: 6.0,
                ..ExperienceEntry::default()
            }],
            city: Some("berlin".into()),
            region: Some("EU".into()),
            ..Candidate::default()
        }
    }

    #[test]
    fn full_match_scores_high_on_every_component() {
        let scores = score_components(&base_job(), &base_candidate());
        assert_eq!(scores.skills, 100);
        assert_eq!(scores.location, 100);
        assert!(scores.years_of_exp >= 80);
        assert!(scores.experience >= 50);
    }

    #[test]
    fn skill_overlap_is_a_percentage_of_requirements() {
        let mut candidate = base_candidate();
        candidate.skills = vec!["rust".into()];
        candidate.skill_tags.clear();

        let scores = score_components(&base_job(), &candidate);
        assert_eq!(scores.skills, 50);
    }

    #[test]
    fn missing_job_requirements_score_as_unconstrained() {
        let mut job = base_job();
        job.required_skills.clear();
        job.min_experience_years = None;
        job.locations.clear();
        job.region = None;

        let scores = score_components(&job, &base_candidate());
        assert_eq!(scores.skills, 100);
        assert_eq!(scores.years_of_exp, 100);
        assert_eq!(scores.location, 100);
    }

    #[test]
    fn unknown_candidate_side_scores_neutrally() {
        let mut candidate = base_candidate();
        candidate.experience.clear();
        candidate.city = None;
        candidate.region = None;

        let scores = score_components(&base_job(), &candidate);
        assert_eq!(scores.years_of_exp, 50);
        assert_eq!(scores.experience, 50);
        // Whereabouts unknown is neutral, unlike a known mismatch.
        assert_eq!(scores.location, 50);
    }

    #[test]
    fn known_location_mismatch_scores_zero() {
        let mut candidate = base_candidate();
        candidate.city = Some("Osaka".into());
        candidate.region = Some("APAC".into());

        let scores = score_components(&base_job(), &candidate);
        assert_eq!(scores.location, 0);
    }

    #[test]
    fn years_tiers_mirror_the_buffer_ladder() {
        let job = base_job(); // requires 5 years
        let with_years = |years: f64| Candidate {
            experience: vec![ExperienceEntry {
                title: "Engineer".into(),
                years,
                ..ExperienceEntry::default()
            }],
            ..base_candidate()
        };

        assert_eq!(score_years(&job, &with_years(8.0)), 100);
        assert_eq!(score_years(&job, &with_years(6.0)), 90);
        assert_eq!(score_years(&job, &with_years(5.5)), 80);
        assert_eq!(score_years(&job, &with_years(5.0)), 70);
        assert_eq!(score_years(&job, &with_years(4.7)), 40);
        assert_eq!(score_years(&job, &with_years(2.0)), 0);
    }

    #[test]
    fn remote_friendly_jobs_keep_distant_candidates_in_play() {
        let mut job = base_job();
        job.remote_friendly = true;
        let mut candidate = base_candidate();
        candidate.city = Some("Lisbon".into());
        candidate.region = Some("South".into());

        assert_eq!(score_location(&job, &candidate), 50);
    }

    #[test]
    fn upstream_components_win_over_recomputation() {
        let supplied = ComponentScores {
            skills: 11,
            experience: 22,
            years_of_exp: 33,
            location: 44,
        };
        let mut candidate = base_candidate();
        candidate.evaluation = Some(CandidateEvaluation {
            composite: None,
            components: Some(supplied.clone()),
        });

        assert_eq!(score_components(&base_job(), &candidate), supplied);
    }
}
