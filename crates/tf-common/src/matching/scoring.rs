use serde::{Deserialize, Serialize};

use crate::matching::weights::NormalizedWeights;

/// Per-component scores on a 0..=100 integer scale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub skills: u8,
    pub experience: u8,
    pub years_of_exp: u8,
    pub location: u8,
}

impl ComponentScores {
    pub fn mean(&self) -> f64 {
        (self.skills as f64
            + self.experience as f64
            + self.years_of_exp as f64
            + self.location as f64)
            / 4.0
    }
}

/// Composite score for one candidate.
///
/// An authoritative upstream score wins verbatim. With a zero weight sum
/// there is nothing to average, so the authoritative score (or 0) is used.
/// When the caller set all sliders to effectively the same value, the
/// composite is the plain arithmetic mean of the components, computed
/// directly so four independent divisions cannot drift the result away
/// from "all equal importance". Otherwise it is the weighted average
/// normalized by the actual weight sum.
pub fn composite_score(
    components: &ComponentScores,
    weights: &NormalizedWeights,
    authoritative: Option<u8>,
) -> u8 {
    if let Some(score) = authoritative {
        return score;
    }

    let total_weight = weights.sum();
    if total_weight == 0.0 {
        return 0;
    }

    if weights.is_balanced() {
        return components.mean().round() as u8;
    }

    let weighted = components.skills as f64 * weights.skills
        + components.experience as f64 * weights.experience
        + components.years_of_exp as f64 * weights.years_of_exp
        + components.location as f64 * weights.location;

    (weighted / total_weight).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::weights::Preference;

    fn components(skills: u8, experience: u8, years: u8, location: u8) -> ComponentScores {
        ComponentScores {
            skills,
            experience,
            years_of_exp: years,
            location,
        }
    }

    #[test]
    fn equal_weights_use_the_plain_mean() {
        let weights = Preference::default().normalize().unwrap();
        let score = composite_score(&components(80, 60, 40, 20), &weights, None);
        assert_eq!(score, 50);
    }

    #[test]
    fn equal_weights_ignore_magnitude() {
        // All sliders at 10 and all at 90 mean the same thing: simple mean.
        for value in [10.0, 90.0] {
            let weights = Preference {
                skills_vs_description: value,
                experience_vs_description: value,
                years_of_experience: value,
                location: value,
            }
            .normalize()
            .unwrap();
            assert_eq!(composite_score(&components(80, 60, 40, 20), &weights, None), 50);
        }
    }

    #[test]
    fn weighted_average_normalizes_by_weight_sum() {
        let weights = Preference {
            skills_vs_description: 80.0,
            experience_vs_description: 80.0,
            years_of_experience: 20.0,
            location: 20.0,
        }
        .normalize()
        .unwrap();

        // round((90*0.8 + 70*0.8 + 50*0.2 + 40*0.2) / 2.0) = 73
        let score = composite_score(&components(90, 70, 50, 40), &weights, None);
        assert_eq!(score, 73);
    }

    #[test]
    fn authoritative_score_wins_verbatim() {
        let weights = Preference {
            skills_vs_description: 80.0,
            experience_vs_description: 20.0,
            years_of_experience: 20.0,
            location: 20.0,
        }
        .normalize()
        .unwrap();

        let score = composite_score(&components(61, 61, 61, 61), &weights, Some(73));
        assert_eq!(score, 73);
    }

    #[test]
    fn zero_weight_sum_falls_back_to_authoritative_or_zero() {
        let weights = Preference {
            skills_vs_description: 0.0,
            experience_vs_description: 0.0,
            years_of_experience: 0.0,
            location: 0.0,
        }
        .normalize()
        .unwrap();

        // All-zero sliders are also "balanced"; the zero-sum rule comes first.
        assert_eq!(composite_score(&components(80, 80, 80, 80), &weights, None), 0);
        assert_eq!(
            composite_score(&components(80, 80, 80, 80), &weights, Some(42)),
            42
        );
    }
}
