use crate::models::{Eligibility, Scholarship, UserProfile, ALL_SENTINEL};

/// The independent constraint dimensions a scholarship may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    StudyLevel,
    Gpa,
    Nationality,
    FieldOfStudy,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::StudyLevel,
        Dimension::Gpa,
        Dimension::Nationality,
        Dimension::FieldOfStudy,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::StudyLevel => "study level",
            Dimension::Gpa => "minimum GPA",
            Dimension::Nationality => "nationality",
            Dimension::FieldOfStudy => "field of study",
        }
    }
}

/// Evaluates one dimension. Returns `None` when the scholarship does not
/// declare a constraint on it, otherwise whether the profile satisfies it.
pub fn check(dimension: Dimension, eligibility: &Eligibility, profile: &UserProfile) -> Option<bool> {
    let academic = &profile.academic_info;

    match dimension {
        Dimension::StudyLevel => eligibility
            .study_level
            .as_deref()
            .filter(|levels| !levels.is_empty())
            .map(|levels| levels.contains(&academic.study_level)),
        Dimension::Gpa => eligibility
            .min_gpa
            .filter(|min| min.is_finite())
            .map(|min| academic.gpa >= min),
        Dimension::Nationality => restricted(eligibility.nationality.as_deref()).map(|countries| {
            countries
                .iter()
                .any(|country| country == &profile.personal_info.citizenship)
        }),
        Dimension::FieldOfStudy => restricted(eligibility.field_of_study.as_deref()).map(|fields| {
            let major = academic.major.to_lowercase();
            fields.iter().any(|field| field.to_lowercase() == major)
        }),
    }
}

// Empty lists and lists carrying the "All" sentinel place no restriction.
fn restricted(values: Option<&[String]>) -> Option<&[String]> {
    values.filter(|values| {
        !values.is_empty() && !values.iter().any(|value| value == ALL_SENTINEL)
    })
}

pub fn is_eligible(scholarship: &Scholarship, profile: &UserProfile) -> bool {
    Dimension::ALL
        .iter()
        .all(|dimension| check(*dimension, &scholarship.eligibility, profile) != Some(false))
}

/// Declared dimensions the profile fails, in evaluation order.
pub fn failed_dimensions(scholarship: &Scholarship, profile: &UserProfile) -> Vec<Dimension> {
    Dimension::ALL
        .into_iter()
        .filter(|dimension| check(*dimension, &scholarship.eligibility, profile) == Some(false))
        .collect()
}
