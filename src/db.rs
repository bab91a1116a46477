use std::io::Read;
use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{
    AcademicInfo, Amount, AmountType, Eligibility, FinancialBackground, PersonalInfo,
    SavedScholarship, Scholarship, ScholarshipStatus, StudyLevel, UserProfile,
};
use crate::seed;
use crate::store::ScholarshipStore;

const SCHOLARSHIP_COLUMNS: &str = "id, name, provider, description, nationality, min_gpa, \
     field_of_study, study_level, amount_value, amount_currency, amount_type, deadline, \
     application_link, tags, featured";

const SAVED_COLUMNS: &str = "user_id, scholarship_id, date_added, status, notes";

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Loads the demo catalog, profile and saved list. Safe to run repeatedly.
pub async fn seed(store: &dyn ScholarshipStore) -> anyhow::Result<usize> {
    let scholarships = seed::sample_scholarships();
    for scholarship in &scholarships {
        store.upsert_scholarship(scholarship).await?;
    }

    store.upsert_profile(&seed::sample_profile()).await?;

    for saved in seed::sample_saved() {
        match store
            .save_scholarship(&saved.user_id, &saved.scholarship_id)
            .await
        {
            Ok(_) | Err(StoreError::AlreadySaved { .. }) => {}
            Err(err) => return Err(err.into()),
        }
        store
            .update_status(&saved.user_id, &saved.scholarship_id, saved.status)
            .await?;
        store
            .update_notes(&saved.user_id, &saved.scholarship_id, saved.notes)
            .await?;
    }

    Ok(scholarships.len())
}

#[derive(serde::Deserialize)]
struct CsvRow {
    id: Option<String>,
    name: String,
    provider: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    nationality: String,
    min_gpa: Option<f64>,
    #[serde(default)]
    field_of_study: String,
    #[serde(default)]
    study_level: String,
    amount: f64,
    currency: String,
    amount_type: String,
    deadline: DateTime<Utc>,
    application_link: Option<String>,
    #[serde(default)]
    tags: String,
    featured: Option<bool>,
}

// List cells are `;`-separated; an empty cell declares nothing.
fn split_list(cell: &str) -> Option<Vec<String>> {
    let values: Vec<String> = cell
        .split(';')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();

    (!values.is_empty()).then_some(values)
}

pub fn parse_csv<R: Read>(reader: R) -> anyhow::Result<Vec<Scholarship>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut scholarships = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("malformed CSV record {}", index + 1))?;

        let study_level = split_list(&row.study_level)
            .map(|levels| {
                levels
                    .iter()
                    .map(|level| StudyLevel::from_str(level))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("record {} ({})", index + 1, row.name))?;

        let kind = AmountType::from_str(&row.amount_type)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("record {} ({})", index + 1, row.name))?;

        if row.amount <= 0.0 {
            anyhow::bail!("record {} ({}) has a non-positive amount", index + 1, row.name);
        }

        let id = row
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        scholarships.push(Scholarship {
            id,
            name: row.name,
            provider: row.provider,
            description: row.description,
            eligibility: Eligibility {
                nationality: split_list(&row.nationality),
                min_gpa: row.min_gpa,
                field_of_study: split_list(&row.field_of_study),
                study_level,
            },
            amount: Amount {
                value: row.amount,
                currency: row.currency,
                kind,
            },
            deadline: row.deadline,
            application_link: row.application_link.filter(|link| !link.is_empty()),
            tags: split_list(&row.tags),
            featured: row.featured,
        });
    }

    Ok(scholarships)
}

pub async fn import_csv(store: &dyn ScholarshipStore, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let scholarships = parse_csv(file)?;

    for scholarship in &scholarships {
        store.upsert_scholarship(scholarship).await?;
    }

    Ok(scholarships.len())
}

/// Postgres-backed store in the `scholarship_match` schema.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn parse_column<T: FromStr<Err = String>>(value: &str) -> StoreResult<T> {
    value.parse().map_err(StoreError::InvalidValue)
}

fn scholarship_from_row(row: &PgRow) -> StoreResult<Scholarship> {
    let study_level = row
        .try_get::<Option<Vec<String>>, _>("study_level")?
        .map(|levels| {
            levels
                .iter()
                .map(|level| parse_column::<StudyLevel>(level))
                .collect::<StoreResult<Vec<_>>>()
        })
        .transpose()?;

    Ok(Scholarship {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        provider: row.try_get("provider")?,
        description: row.try_get("description")?,
        eligibility: Eligibility {
            nationality: row.try_get("nationality")?,
            min_gpa: row.try_get("min_gpa")?,
            field_of_study: row.try_get("field_of_study")?,
            study_level,
        },
        amount: Amount {
            value: row.try_get("amount_value")?,
            currency: row.try_get("amount_currency")?,
            kind: parse_column(row.try_get::<&str, _>("amount_type")?)?,
        },
        deadline: row.try_get("deadline")?,
        application_link: row.try_get("application_link")?,
        tags: row.try_get("tags")?,
        featured: row.try_get("featured")?,
    })
}

fn profile_from_row(row: &PgRow) -> StoreResult<UserProfile> {
    let financial_background = row
        .try_get::<Option<&str>, _>("financial_background")?
        .map(parse_column::<FinancialBackground>)
        .transpose()?;

    Ok(UserProfile {
        user_id: row.try_get("user_id")?,
        academic_info: AcademicInfo {
            gpa: row.try_get("gpa")?,
            major: row.try_get("major")?,
            study_level: parse_column(row.try_get::<&str, _>("study_level")?)?,
            institution: row.try_get("institution")?,
        },
        personal_info: PersonalInfo {
            citizenship: row.try_get("citizenship")?,
            financial_background,
            extracurriculars: row.try_get("extracurriculars")?,
        },
    })
}

fn saved_from_row(row: &PgRow) -> StoreResult<SavedScholarship> {
    Ok(SavedScholarship {
        scholarship_id: row.try_get("scholarship_id")?,
        user_id: row.try_get("user_id")?,
        date_added: row.try_get("date_added")?,
        status: parse_column(row.try_get::<&str, _>("status")?)?,
        notes: row.try_get("notes")?,
    })
}

#[async_trait]
impl ScholarshipStore for PgStore {
    async fn list_scholarships(&self) -> StoreResult<Vec<Scholarship>> {
        let query = format!(
            "SELECT {SCHOLARSHIP_COLUMNS} FROM scholarship_match.scholarships ORDER BY position"
        );
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        rows.iter().map(scholarship_from_row).collect()
    }

    async fn get_scholarship(&self, id: &str) -> StoreResult<Option<Scholarship>> {
        let query = format!(
            "SELECT {SCHOLARSHIP_COLUMNS} FROM scholarship_match.scholarships WHERE id = $1"
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(scholarship_from_row).transpose()
    }

    async fn upsert_scholarship(&self, scholarship: &Scholarship) -> StoreResult<()> {
        let study_level: Option<Vec<String>> = scholarship
            .eligibility
            .study_level
            .as_ref()
            .map(|levels| levels.iter().map(|level| level.as_str().to_string()).collect());

        sqlx::query(
            r#"
            INSERT INTO scholarship_match.scholarships
            (id, name, provider, description, nationality, min_gpa, field_of_study, study_level,
             amount_value, amount_currency, amount_type, deadline, application_link, tags, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                provider = EXCLUDED.provider,
                description = EXCLUDED.description,
                nationality = EXCLUDED.nationality,
                min_gpa = EXCLUDED.min_gpa,
                field_of_study = EXCLUDED.field_of_study,
                study_level = EXCLUDED.study_level,
                amount_value = EXCLUDED.amount_value,
                amount_currency = EXCLUDED.amount_currency,
                amount_type = EXCLUDED.amount_type,
                deadline = EXCLUDED.deadline,
                application_link = EXCLUDED.application_link,
                tags = EXCLUDED.tags,
                featured = EXCLUDED.featured
            "#,
        )
        .bind(&scholarship.id)
        .bind(&scholarship.name)
        .bind(&scholarship.provider)
        .bind(&scholarship.description)
        .bind(&scholarship.eligibility.nationality)
        .bind(scholarship.eligibility.min_gpa)
        .bind(&scholarship.eligibility.field_of_study)
        .bind(study_level)
        .bind(scholarship.amount.value)
        .bind(&scholarship.amount.currency)
        .bind(scholarship.amount.kind.as_str())
        .bind(scholarship.deadline)
        .bind(&scholarship.application_link)
        .bind(&scholarship.tags)
        .bind(scholarship.featured)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        let row = sqlx::query(
            "SELECT user_id, gpa, major, study_level, institution, citizenship, \
             financial_background, extracurriculars \
             FROM scholarship_match.profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        profile.validate().map_err(StoreError::InvalidValue)?;
        let academic = &profile.academic_info;
        let personal = &profile.personal_info;

        sqlx::query(
            r#"
            INSERT INTO scholarship_match.profiles
            (user_id, gpa, major, study_level, institution, citizenship, financial_background, extracurriculars)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO UPDATE
            SET gpa = EXCLUDED.gpa,
                major = EXCLUDED.major,
                study_level = EXCLUDED.study_level,
                institution = EXCLUDED.institution,
                citizenship = EXCLUDED.citizenship,
                financial_background = EXCLUDED.financial_background,
                extracurriculars = EXCLUDED.extracurriculars
            "#,
        )
        .bind(&profile.user_id)
        .bind(academic.gpa)
        .bind(&academic.major)
        .bind(academic.study_level.as_str())
        .bind(&academic.institution)
        .bind(&personal.citizenship)
        .bind(personal.financial_background.map(|background| background.as_str()))
        .bind(&personal.extracurriculars)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save_scholarship(&self, user_id: &str, scholarship_id: &str) -> StoreResult<SavedScholarship> {
        if self.get_scholarship(scholarship_id).await?.is_none() {
            return Err(StoreError::not_found("scholarship", scholarship_id));
        }

        let query = format!(
            r#"
            INSERT INTO scholarship_match.saved_scholarships
            (user_id, scholarship_id, date_added, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, scholarship_id) DO NOTHING
            RETURNING {SAVED_COLUMNS}
            "#
        );
        let row = sqlx::query(&query)
            .bind(user_id)
            .bind(scholarship_id)
            .bind(Utc::now())
            .bind(ScholarshipStatus::Planning.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => saved_from_row(&row),
            None => Err(StoreError::AlreadySaved {
                user_id: user_id.to_string(),
                scholarship_id: scholarship_id.to_string(),
            }),
        }
    }

    async fn remove_saved(&self, user_id: &str, scholarship_id: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            "DELETE FROM scholarship_match.saved_scholarships \
             WHERE user_id = $1 AND scholarship_id = $2",
        )
        .bind(user_id)
        .bind(scholarship_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_status(
        &self,
        user_id: &str,
        scholarship_id: &str,
        status: ScholarshipStatus,
    ) -> StoreResult<SavedScholarship> {
        let query = format!(
            "UPDATE scholarship_match.saved_scholarships SET status = $3 \
             WHERE user_id = $1 AND scholarship_id = $2 RETURNING {SAVED_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(user_id)
            .bind(scholarship_id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("saved scholarship", scholarship_id))?;

        saved_from_row(&row)
    }

    async fn update_notes(
        &self,
        user_id: &str,
        scholarship_id: &str,
        notes: Option<String>,
    ) -> StoreResult<SavedScholarship> {
        let query = format!(
            "UPDATE scholarship_match.saved_scholarships SET notes = $3 \
             WHERE user_id = $1 AND scholarship_id = $2 RETURNING {SAVED_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(user_id)
            .bind(scholarship_id)
            .bind(notes)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("saved scholarship", scholarship_id))?;

        saved_from_row(&row)
    }

    async fn list_saved(&self, user_id: &str) -> StoreResult<Vec<SavedScholarship>> {
        let query = format!(
            "SELECT {SAVED_COLUMNS} FROM scholarship_match.saved_scholarships \
             WHERE user_id = $1 ORDER BY date_added, scholarship_id"
        );
        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(saved_from_row).collect()
    }
}
