use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Scholarship, StudyLevel};

pub const DEADLINE_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchCriteria {
    pub keyword: String,
    pub study_level: Option<StudyLevel>,
    pub min_amount: f64,
    /// `None` leaves the range open-ended.
    pub max_amount: Option<f64>,
    pub deadline_within_30_days: bool,
}

impl SearchCriteria {
    /// Upper bound of the amount slider offered to users.
    pub const AMOUNT_SLIDER_MAX: f64 = 50_000.0;
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            study_level: None,
            min_amount: 0.0,
            max_amount: None,
            deadline_within_30_days: false,
        }
    }
}

/// Scholarships matching every criterion, in catalog order.
pub fn search<'a>(
    scholarships: &'a [Scholarship],
    criteria: &SearchCriteria,
    now: DateTime<Utc>,
) -> Vec<&'a Scholarship> {
    let keyword = criteria.keyword.trim().to_lowercase();

    let results: Vec<&Scholarship> = scholarships
        .iter()
        .filter(|scholarship| matches_keyword(scholarship, &keyword))
        .filter(|scholarship| matches_study_level(scholarship, criteria.study_level))
        .filter(|scholarship| matches_amount(scholarship, criteria.min_amount, criteria.max_amount))
        .filter(|scholarship| !criteria.deadline_within_30_days || deadline_within(scholarship, now, DEADLINE_WINDOW_DAYS))
        .collect();

    tracing::debug!(
        keyword = %keyword,
        candidates = scholarships.len(),
        matched = results.len(),
        "searched scholarships"
    );

    results
}

// `keyword` is expected trimmed and lowercased.
fn matches_keyword(scholarship: &Scholarship, keyword: &str) -> bool {
    if keyword.is_empty() {
        return true;
    }

    [&scholarship.name, &scholarship.provider, &scholarship.description]
        .iter()
        .any(|text| text.to_lowercase().contains(keyword))
}

fn matches_study_level(scholarship: &Scholarship, level: Option<StudyLevel>) -> bool {
    let Some(level) = level else {
        return true;
    };

    match scholarship.eligibility.study_level.as_deref() {
        None | Some([]) => true,
        Some(levels) => levels.contains(&level),
    }
}

fn matches_amount(scholarship: &Scholarship, min: f64, max: Option<f64>) -> bool {
    let value = scholarship.amount.value;
    value >= min && max.map_or(true, |max| value <= max)
}

/// True when the deadline falls in `[now, now + days]`.
pub fn deadline_within(scholarship: &Scholarship, now: DateTime<Utc>, days: i64) -> bool {
    scholarship.deadline >= now && scholarship.deadline <= now + Duration::days(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Amount, AmountType, Eligibility};
    use chrono::TimeZone;

    fn listing(id: &str, name: &str, value: f64, deadline: DateTime<Utc>) -> Scholarship {
        Scholarship {
            id: id.to_string(),
            name: name.to_string(),
            provider: "Scholarship Provider".to_string(),
            description: "Funding for students.".to_string(),
            eligibility: Eligibility::default(),
            amount: Amount {
                value,
                currency: "USD".to_string(),
                kind: AmountType::Annual,
            },
            deadline,
            application_link: None,
            tags: None,
            featured: None,
        }
    }

    fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn default_criteria_keep_everything_in_order() {
        let catalog = vec![
            listing("1", "Alpha", 8000.0, day(2020, 1, 1)),
            listing("2", "Beta", 90000.0, day(2030, 1, 1)),
            listing("3", "Gamma", 150.0, day(2024, 6, 1)),
        ];

        let results = search(&catalog, &SearchCriteria::default(), day(2024, 1, 1));
        let ids: Vec<&str> = results.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn keyword_matches_any_text_field_ignoring_case() {
        let mut by_provider = listing("2", "Community Grant", 1000.0, day(2024, 2, 1));
        by_provider.provider = "STEM Futures Trust".to_string();
        let mut by_description = listing("3", "Open Award", 1000.0, day(2024, 2, 1));
        by_description.description = "Backing stem cell research.".to_string();
        let catalog = vec![
            listing("1", "Women in STEM Scholarship", 1000.0, day(2024, 2, 1)),
            by_provider,
            by_description,
            listing("4", "Arts Award", 1000.0, day(2024, 2, 1)),
        ];

        for keyword in ["stem", "STEM", "  Stem "] {
            let criteria = SearchCriteria {
                keyword: keyword.to_string(),
                ..SearchCriteria::default()
            };
            let ids: Vec<&str> = search(&catalog, &criteria, day(2024, 1, 1))
                .iter()
                .map(|s| s.id.as_str())
                .collect();
            assert_eq!(ids, vec!["1", "2", "3"]);
        }
    }

    #[test]
    fn study_level_accepts_unrestricted_scholarships() {
        let mut graduate_only = listing("1", "Grad Award", 1000.0, day(2024, 2, 1));
        graduate_only.eligibility.study_level = Some(vec![StudyLevel::Graduate]);
        let mut undergrad_only = listing("2", "Undergrad Award", 1000.0, day(2024, 2, 1));
        undergrad_only.eligibility.study_level = Some(vec![StudyLevel::Undergraduate]);
        let open = listing("3", "Open Award", 1000.0, day(2024, 2, 1));
        let mut empty_levels = listing("4", "Any Level Award", 1000.0, day(2024, 2, 1));
        empty_levels.eligibility.study_level = Some(Vec::new());
        let catalog = vec![graduate_only, undergrad_only, open, empty_levels];

        let criteria = SearchCriteria {
            study_level: Some(StudyLevel::Graduate),
            ..SearchCriteria::default()
        };
        let ids: Vec<&str> = search(&catalog, &criteria, day(2024, 1, 1))
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "3", "4"]);
    }

    #[test]
    fn amount_range_is_inclusive() {
        let catalog = vec![
            listing("low", "Low", 8000.0, day(2024, 2, 1)),
            listing("edge", "Edge", 10000.0, day(2024, 2, 1)),
            listing("high", "High", 30000.0, day(2024, 2, 1)),
            listing("top", "Top", 25000.0, day(2024, 2, 1)),
        ];

        let criteria = SearchCriteria {
            min_amount: 10000.0,
            max_amount: Some(25000.0),
            ..SearchCriteria::default()
        };
        let ids: Vec<&str> = search(&catalog, &criteria, day(2024, 1, 1))
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["edge", "top"]);
    }

    #[test]
    fn deadline_window_covers_next_thirty_days() {
        let now = day(2024, 1, 1);
        let catalog = vec![
            listing("soon", "Soon", 1000.0, day(2024, 1, 20)),
            listing("later", "Later", 1000.0, day(2024, 3, 1)),
            listing("past", "Past", 1000.0, day(2023, 12, 31)),
            listing("today", "Today", 1000.0, now),
            listing("edge", "Edge", 1000.0, now + Duration::days(30)),
        ];

        let criteria = SearchCriteria {
            deadline_within_30_days: true,
            ..SearchCriteria::default()
        };
        let ids: Vec<&str> = search(&catalog, &criteria, now)
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["soon", "today", "edge"]);
    }

    #[test]
    fn criteria_deserialize_with_defaults() {
        let criteria: SearchCriteria = serde_json::from_str(r#"{"keyword":"health"}"#).unwrap();
        assert_eq!(criteria.keyword, "health");
        assert_eq!(criteria.min_amount, 0.0);
        assert!(criteria.max_amount.is_none());
        assert!(!criteria.deadline_within_30_days);
    }
}
