use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Eligibility value meaning "no restriction on this dimension".
pub const ALL_SENTINEL: &str = "All";

/// Upper bound of the GPA scale profiles are recorded on.
pub const GPA_SCALE_MAX: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudyLevel {
    Undergraduate,
    Graduate,
    Doctorate,
}

impl StudyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudyLevel::Undergraduate => "Undergraduate",
            StudyLevel::Graduate => "Graduate",
            StudyLevel::Doctorate => "Doctorate",
        }
    }
}

impl fmt::Display for StudyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudyLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "undergraduate" => Ok(StudyLevel::Undergraduate),
            "graduate" => Ok(StudyLevel::Graduate),
            "doctorate" => Ok(StudyLevel::Doctorate),
            other => Err(format!("unknown study level: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinancialBackground {
    Low,
    Medium,
    High,
}

impl FinancialBackground {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinancialBackground::Low => "Low",
            FinancialBackground::Medium => "Medium",
            FinancialBackground::High => "High",
        }
    }
}

impl FromStr for FinancialBackground {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "low" => Ok(FinancialBackground::Low),
            "medium" => Ok(FinancialBackground::Medium),
            "high" => Ok(FinancialBackground::High),
            other => Err(format!("unknown financial background: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicInfo {
    pub gpa: f64,
    pub major: String,
    pub study_level: StudyLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub citizenship: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_background: Option<FinancialBackground>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracurriculars: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub user_id: String,
    pub academic_info: AcademicInfo,
    pub personal_info: PersonalInfo,
}

impl UserProfile {
    /// Rejects profiles whose GPA is not a finite value on the 0.0 to 4.0 scale.
    pub fn validate(&self) -> Result<(), String> {
        let gpa = self.academic_info.gpa;
        if !gpa.is_finite() || !(0.0..=GPA_SCALE_MAX).contains(&gpa) {
            return Err(format!("GPA must be between 0.0 and {GPA_SCALE_MAX:.1}, got {gpa}"));
        }
        Ok(())
    }
}

/// Hard constraints declared by a scholarship. `None` means the scholarship
/// does not restrict that dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<Vec<String>>,
    #[serde(default, rename = "minGPA", skip_serializing_if = "Option::is_none")]
    pub min_gpa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_level: Option<Vec<StudyLevel>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmountType {
    #[serde(rename = "one-time")]
    OneTime,
    #[serde(rename = "annual")]
    Annual,
    #[serde(rename = "semester")]
    Semester,
}

impl AmountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmountType::OneTime => "one-time",
            AmountType::Annual => "annual",
            AmountType::Semester => "semester",
        }
    }
}

impl FromStr for AmountType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "one-time" | "onetime" => Ok(AmountType::OneTime),
            "annual" => Ok(AmountType::Annual),
            "semester" => Ok(AmountType::Semester),
            other => Err(format!("unknown amount type: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amount {
    pub value: f64,
    pub currency: String,
    #[serde(rename = "type")]
    pub kind: AmountType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scholarship {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub description: String,
    #[serde(default)]
    pub eligibility: Eligibility,
    pub amount: Amount,
    pub deadline: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

impl Scholarship {
    pub fn is_featured(&self) -> bool {
        self.featured.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScholarshipStatus {
    #[serde(rename = "Planning to Apply")]
    Planning,
    Applied,
    Accepted,
    Rejected,
}

impl ScholarshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScholarshipStatus::Planning => "Planning to Apply",
            ScholarshipStatus::Applied => "Applied",
            ScholarshipStatus::Accepted => "Accepted",
            ScholarshipStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ScholarshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScholarshipStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "planning to apply" | "planning" => Ok(ScholarshipStatus::Planning),
            "applied" => Ok(ScholarshipStatus::Applied),
            "accepted" => Ok(ScholarshipStatus::Accepted),
            "rejected" => Ok(ScholarshipStatus::Rejected),
            other => Err(format!("unknown scholarship status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedScholarship {
    pub scholarship_id: String,
    pub user_id: String,
    pub date_added: DateTime<Utc>,
    pub status: ScholarshipStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredScholarship<'a> {
    pub scholarship: &'a Scholarship,
    pub score: u8,
}

#[derive(Debug, Clone)]
pub struct StatusSummary {
    pub status: ScholarshipStatus,
    pub count: usize,
}
