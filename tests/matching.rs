//! End-to-end checks of eligibility, scoring and search over the public API.

use chrono::{DateTime, TimeZone, Utc};
use scholarship_match::seed;
use scholarship_match::{
    is_eligible, recommend, score, search, AcademicInfo, Amount, AmountType, Eligibility,
    PersonalInfo, Scholarship, SearchCriteria, StudyLevel, UserProfile,
};

fn profile(gpa: f64, major: &str, level: StudyLevel, citizenship: &str) -> UserProfile {
    UserProfile {
        user_id: String::new(),
        academic_info: AcademicInfo {
            gpa,
            major: major.to_string(),
            study_level: level,
            institution: None,
        },
        personal_info: PersonalInfo {
            citizenship: citizenship.to_string(),
            financial_background: None,
            extracurriculars: None,
        },
    }
}

fn profiles() -> Vec<UserProfile> {
    vec![
        profile(0.0, "History", StudyLevel::Undergraduate, "Brazil"),
        profile(2.9, "Computer Science", StudyLevel::Graduate, "United States"),
        profile(4.0, "Medicine", StudyLevel::Doctorate, "Kenya"),
        profile(3.5, "Fine Arts", StudyLevel::Undergraduate, ""),
    ]
}

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

fn listing(id: &str, value: f64, deadline: DateTime<Utc>) -> Scholarship {
    Scholarship {
        id: id.to_string(),
        name: format!("Listing {id}"),
        provider: "Provider".to_string(),
        description: String::new(),
        eligibility: Eligibility::default(),
        amount: Amount {
            value,
            currency: "USD".to_string(),
            kind: AmountType::OneTime,
        },
        deadline,
        application_link: None,
        tags: None,
        featured: None,
    }
}

fn ids(scholarships: &[&Scholarship]) -> Vec<String> {
    scholarships.iter().map(|s| s.id.clone()).collect()
}

#[test]
fn unconstrained_scholarships_are_open_to_everyone() {
    let open = listing("open", 1000.0, date(2024, 5, 1));
    for profile in profiles() {
        assert!(is_eligible(&open, &profile));
        assert_eq!(score(&open, &profile), 100);
    }
}

#[test]
fn all_sentinel_is_universal() {
    let mut open = listing("open", 1000.0, date(2024, 5, 1));
    open.eligibility.nationality = Some(vec!["All".to_string()]);
    open.eligibility.field_of_study = Some(vec!["All".to_string()]);

    for profile in profiles() {
        assert!(is_eligible(&open, &profile));
    }
}

#[test]
fn gpa_minimum_is_inclusive() {
    let mut award = listing("gpa", 1000.0, date(2024, 5, 1));
    award.eligibility.min_gpa = Some(3.0);

    assert!(is_eligible(&award, &profile(3.0, "Law", StudyLevel::Graduate, "Peru")));
    assert!(!is_eligible(&award, &profile(2.0, "Law", StudyLevel::Graduate, "Peru")));
}

#[test]
fn scores_stay_within_bounds_across_sample_catalog() {
    let catalog = seed::sample_scholarships();
    for profile in profiles() {
        for scholarship in &catalog {
            let value = score(scholarship, &profile);
            assert!(value <= 100);
            if is_eligible(scholarship, &profile) {
                assert_eq!(value, 100);
            }
        }
    }
}

#[test]
fn recommendations_respect_threshold_and_unconstrained_catalog_passes() {
    let catalog = seed::sample_scholarships();
    for profile in profiles() {
        assert!(recommend(&catalog, &profile).iter().all(|entry| entry.score > 50));
    }

    let unconstrained: Vec<Scholarship> = catalog
        .iter()
        .cloned()
        .map(|mut scholarship| {
            scholarship.eligibility = Eligibility::default();
            scholarship
        })
        .collect();
    for profile in profiles() {
        let recommended = recommend(&unconstrained, &profile);
        assert_eq!(recommended.len(), unconstrained.len());
        assert!(recommended.iter().all(|entry| entry.score == 100));
        let order: Vec<&str> = recommended.iter().map(|entry| entry.scholarship.id.as_str()).collect();
        let expected: Vec<&str> = unconstrained.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, expected);
    }
}

#[test]
fn sample_profile_ranking_is_stable() {
    let catalog = seed::sample_scholarships();
    let recommended = recommend(&catalog, &seed::sample_profile());

    let order: Vec<(&str, u8)> = recommended
        .iter()
        .map(|entry| (entry.scholarship.id.as_str(), entry.score))
        .collect();
    assert_eq!(
        order,
        vec![("1", 100), ("2", 100), ("5", 100), ("8", 100), ("3", 67), ("7", 67)]
    );
}

#[test]
fn default_search_returns_catalog_unchanged() {
    let mut catalog = seed::sample_scholarships();
    catalog.push(listing("large", 120000.0, date(2031, 1, 1)));

    let results = search(&catalog, &SearchCriteria::default(), date(2024, 1, 1));
    let expected: Vec<&Scholarship> = catalog.iter().collect();
    assert_eq!(ids(&results), ids(&expected));
}

#[test]
fn deadline_flag_keeps_only_next_thirty_days() {
    let catalog = vec![
        listing("soon", 1000.0, date(2024, 1, 20)),
        listing("spring", 1000.0, date(2024, 3, 1)),
    ];
    let criteria = SearchCriteria {
        deadline_within_30_days: true,
        ..SearchCriteria::default()
    };

    let results = search(&catalog, &criteria, date(2024, 1, 1));
    assert_eq!(ids(&results), vec!["soon".to_string()]);
}

#[test]
fn amount_range_selects_inclusive_band() {
    let catalog = vec![
        listing("8000", 8000.0, date(2024, 5, 1)),
        listing("10000", 10000.0, date(2024, 5, 1)),
        listing("30000", 30000.0, date(2024, 5, 1)),
    ];
    let criteria = SearchCriteria {
        min_amount: 10000.0,
        max_amount: Some(25000.0),
        ..SearchCriteria::default()
    };

    let results = search(&catalog, &criteria, date(2024, 1, 1));
    assert_eq!(ids(&results), vec!["10000".to_string()]);
}

#[test]
fn keyword_search_ignores_case() {
    let catalog = seed::sample_scholarships();

    for keyword in ["stem", "STEM", "Stem"] {
        let criteria = SearchCriteria {
            keyword: keyword.to_string(),
            ..SearchCriteria::default()
        };
        let results = search(&catalog, &criteria, date(2024, 1, 1));
        assert!(results.iter().any(|s| s.name == "Women in STEM Scholarship"));
    }
}
