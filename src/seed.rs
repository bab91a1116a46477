use chrono::{DateTime, TimeZone, Utc};

use crate::models::{
    AcademicInfo, Amount, AmountType, Eligibility, FinancialBackground, PersonalInfo,
    SavedScholarship, Scholarship, ScholarshipStatus, StudyLevel, UserProfile,
};

pub const SAMPLE_USER_ID: &str = "user-123";

struct Listing {
    id: &'static str,
    name: &'static str,
    provider: &'static str,
    description: &'static str,
    min_gpa: f64,
    fields: &'static [&'static str],
    levels: &'static [StudyLevel],
    value: f64,
    deadline: (i32, u32, u32),
    slug: &'static str,
    tags: &'static [&'static str],
    featured: bool,
}

const LISTINGS: &[Listing] = &[
    Listing {
        id: "1",
        name: "Global Excellence Scholarship",
        provider: "International Education Foundation",
        description: "A prestigious scholarship for outstanding international students pursuing higher education abroad.",
        min_gpa: 3.7,
        fields: &["All"],
        levels: &[StudyLevel::Undergraduate, StudyLevel::Graduate],
        value: 20000.0,
        deadline: (2023, 12, 15),
        slug: "global-excellence",
        tags: &["International", "Merit-based", "Full Coverage"],
        featured: true,
    },
    Listing {
        id: "2",
        name: "Women in STEM Scholarship",
        provider: "TechForward Foundation",
        description: "Supporting women pursuing degrees in Science, Technology, Engineering, and Mathematics fields.",
        min_gpa: 3.5,
        fields: &["Computer Science", "Engineering", "Mathematics", "Physics"],
        levels: &[StudyLevel::Undergraduate, StudyLevel::Graduate],
        value: 15000.0,
        deadline: (2024, 1, 31),
        slug: "women-in-stem",
        tags: &["STEM", "Women", "Diversity"],
        featured: true,
    },
    Listing {
        id: "3",
        name: "Future Leaders Grant",
        provider: "Global Leadership Initiative",
        description: "Providing financial support to students with demonstrated leadership potential and community involvement.",
        min_gpa: 3.2,
        fields: &["Business", "Public Policy", "International Relations"],
        levels: &[StudyLevel::Undergraduate, StudyLevel::Graduate],
        value: 10000.0,
        deadline: (2024, 2, 28),
        slug: "future-leaders",
        tags: &["Leadership", "Community Service"],
        featured: false,
    },
    Listing {
        id: "4",
        name: "Environmental Studies Fellowship",
        provider: "Green Planet Foundation",
        description: "Supporting the next generation of environmental scientists, conservationists, and policy experts.",
        min_gpa: 3.4,
        fields: &["Environmental Science", "Conservation", "Sustainable Development"],
        levels: &[StudyLevel::Graduate, StudyLevel::Doctorate],
        value: 25000.0,
        deadline: (2024, 3, 15),
        slug: "environmental-fellowship",
        tags: &["Environment", "Research", "Sustainability"],
        featured: false,
    },
    Listing {
        id: "5",
        name: "First Generation Student Scholarship",
        provider: "Breakthrough Education Alliance",
        description: "Dedicated to supporting first-generation college students achieve their academic dreams.",
        min_gpa: 3.0,
        fields: &["All"],
        levels: &[StudyLevel::Undergraduate],
        value: 8000.0,
        deadline: (2024, 4, 1),
        slug: "first-gen-scholarship",
        tags: &["First Generation", "Need-based", "Inclusive"],
        featured: false,
    },
    Listing {
        id: "6",
        name: "Global Health Research Grant",
        provider: "World Health Initiative",
        description: "Funding for graduate and doctoral students conducting research in global health challenges.",
        min_gpa: 3.6,
        fields: &["Medicine", "Public Health", "Epidemiology", "Health Policy"],
        levels: &[StudyLevel::Graduate, StudyLevel::Doctorate],
        value: 30000.0,
        deadline: (2024, 2, 15),
        slug: "global-health",
        tags: &["Health", "Research", "Global Impact"],
        featured: false,
    },
    Listing {
        id: "7",
        name: "Creative Arts Excellence Award",
        provider: "Arts Forward Foundation",
        description: "Recognizing and supporting outstanding talent in various creative disciplines.",
        min_gpa: 3.2,
        fields: &["Fine Arts", "Music", "Theater", "Film", "Creative Writing"],
        levels: &[StudyLevel::Undergraduate, StudyLevel::Graduate],
        value: 12000.0,
        deadline: (2024, 3, 31),
        slug: "arts-excellence",
        tags: &["Arts", "Creative", "Portfolio-based"],
        featured: false,
    },
    Listing {
        id: "8",
        name: "Tech Innovation Scholarship",
        provider: "FutureTech Industries",
        description: "Supporting students developing innovative solutions using technology.",
        min_gpa: 3.5,
        fields: &["Computer Science", "Data Science", "Artificial Intelligence", "Software Engineering"],
        levels: &[StudyLevel::Undergraduate, StudyLevel::Graduate],
        value: 18000.0,
        deadline: (2024, 1, 15),
        slug: "tech-innovation",
        tags: &["Technology", "Innovation", "Entrepreneurship"],
        featured: true,
    },
];

fn end_of_day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 23, 59, 59)
        .single()
        .unwrap_or_default()
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// The demo catalog used by `seed` and by offline runs.
pub fn sample_scholarships() -> Vec<Scholarship> {
    LISTINGS
        .iter()
        .map(|listing| {
            let (year, month, day) = listing.deadline;
            Scholarship {
                id: listing.id.to_string(),
                name: listing.name.to_string(),
                provider: listing.provider.to_string(),
                description: listing.description.to_string(),
                eligibility: Eligibility {
                    nationality: Some(owned(&["All"])),
                    min_gpa: Some(listing.min_gpa),
                    field_of_study: Some(owned(listing.fields)),
                    study_level: Some(listing.levels.to_vec()),
                },
                amount: Amount {
                    value: listing.value,
                    currency: "USD".to_string(),
                    kind: AmountType::Annual,
                },
                deadline: end_of_day(year, month, day),
                application_link: Some(format!("https://example.com/{}", listing.slug)),
                tags: Some(owned(listing.tags)),
                featured: listing.featured.then_some(true),
            }
        })
        .collect()
}

pub fn sample_profile() -> UserProfile {
    UserProfile {
        user_id: SAMPLE_USER_ID.to_string(),
        academic_info: AcademicInfo {
            gpa: 3.8,
            major: "Computer Science".to_string(),
            study_level: StudyLevel::Undergraduate,
            institution: Some("Example University".to_string()),
        },
        personal_info: PersonalInfo {
            citizenship: "United States".to_string(),
            financial_background: Some(FinancialBackground::Medium),
            extracurriculars: Some(owned(&["Coding Club", "Volunteer Work"])),
        },
    }
}

pub fn sample_saved() -> Vec<SavedScholarship> {
    vec![
        SavedScholarship {
            scholarship_id: "1".to_string(),
            user_id: SAMPLE_USER_ID.to_string(),
            date_added: Utc.with_ymd_and_hms(2023, 10, 1, 10, 30, 0).single().unwrap_or_default(),
            status: ScholarshipStatus::Planning,
            notes: Some("Need to prepare essay and get recommendation letters".to_string()),
        },
        SavedScholarship {
            scholarship_id: "4".to_string(),
            user_id: SAMPLE_USER_ID.to_string(),
            date_added: Utc.with_ymd_and_hms(2023, 10, 5, 14, 45, 0).single().unwrap_or_default(),
            status: ScholarshipStatus::Applied,
            notes: Some("Submitted application, waiting for response".to_string()),
        },
    ]
}
