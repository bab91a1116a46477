use std::str::FromStr;

use crate::eligibility::{self, Dimension};
use crate::models::{Scholarship, ScoredScholarship, UserProfile};

/// Recommendations must score strictly above this.
pub const RECOMMEND_THRESHOLD: u8 = 50;

/// Whether recommendations also drop scholarships the profile is not
/// fully eligible for, or rely on the match score alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecommendPolicy {
    #[default]
    ScoreOnly,
    EligibleOnly,
}

impl FromStr for RecommendPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "score" | "score-only" => Ok(RecommendPolicy::ScoreOnly),
            "eligible" | "eligible-only" => Ok(RecommendPolicy::EligibleOnly),
            other => Err(format!("unknown recommendation policy: {other}")),
        }
    }
}

/// Share of declared constraints the profile satisfies, as a percentage
/// rounded half up. A scholarship declaring nothing scores 100.
pub fn score(scholarship: &Scholarship, profile: &UserProfile) -> u8 {
    let mut factors = 0u32;
    let mut satisfied = 0u32;

    for dimension in Dimension::ALL {
        if let Some(passed) = eligibility::check(dimension, &scholarship.eligibility, profile) {
            factors += 1;
            if passed {
                satisfied += 1;
            }
        }
    }

    if factors == 0 {
        return 100;
    }

    ((200 * satisfied + factors) / (2 * factors)) as u8
}

pub fn recommend<'a>(scholarships: &'a [Scholarship], profile: &UserProfile) -> Vec<ScoredScholarship<'a>> {
    let mut scored: Vec<ScoredScholarship<'a>> = scholarships
        .iter()
        .map(|scholarship| ScoredScholarship {
            scholarship,
            score: score(scholarship, profile),
        })
        .filter(|entry| entry.score > RECOMMEND_THRESHOLD)
        .collect();

    // sort_by is stable, so equal scores keep catalog order
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    tracing::debug!(
        candidates = scholarships.len(),
        recommended = scored.len(),
        "scored scholarships"
    );

    scored
}

/// Recommendation entry point for callers that may not have a profile.
/// Without one, featured scholarships are returned unscored in catalog
/// order (their `score` is reported as 100).
pub fn recommend_for<'a>(
    scholarships: &'a [Scholarship],
    profile: Option<&UserProfile>,
    policy: RecommendPolicy,
) -> Vec<ScoredScholarship<'a>> {
    let Some(profile) = profile else {
        return featured(scholarships)
            .map(|scholarship| ScoredScholarship {
                scholarship,
                score: 100,
            })
            .collect();
    };

    let mut recommended = recommend(scholarships, profile);

    if policy == RecommendPolicy::EligibleOnly {
        recommended.retain(|entry| eligibility::is_eligible(entry.scholarship, profile));
    }

    recommended
}

pub fn featured(scholarships: &[Scholarship]) -> impl Iterator<Item = &Scholarship> {
    scholarships.iter().filter(|scholarship| scholarship.is_featured())
}
