use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::models::{SavedScholarship, Scholarship, ScholarshipStatus, UserProfile};

/// Persistence seam for the catalog, profiles and saved scholarships.
#[async_trait]
pub trait ScholarshipStore: Send + Sync {
    async fn list_scholarships(&self) -> StoreResult<Vec<Scholarship>>;
    async fn get_scholarship(&self, id: &str) -> StoreResult<Option<Scholarship>>;
    async fn upsert_scholarship(&self, scholarship: &Scholarship) -> StoreResult<()>;

    async fn get_profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>>;
    async fn upsert_profile(&self, profile: &UserProfile) -> StoreResult<()>;

    /// Records a new saved scholarship with status "Planning to Apply".
    async fn save_scholarship(&self, user_id: &str, scholarship_id: &str) -> StoreResult<SavedScholarship>;
    async fn remove_saved(&self, user_id: &str, scholarship_id: &str) -> StoreResult<bool>;
    async fn update_status(
        &self,
        user_id: &str,
        scholarship_id: &str,
        status: ScholarshipStatus,
    ) -> StoreResult<SavedScholarship>;
    async fn update_notes(
        &self,
        user_id: &str,
        scholarship_id: &str,
        notes: Option<String>,
    ) -> StoreResult<SavedScholarship>;
    async fn list_saved(&self, user_id: &str) -> StoreResult<Vec<SavedScholarship>>;

    async fn is_saved(&self, user_id: &str, scholarship_id: &str) -> StoreResult<bool> {
        Ok(self.saved_status(user_id, scholarship_id).await?.is_some())
    }

    async fn saved_ids(&self, user_id: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .list_saved(user_id)
            .await?
            .into_iter()
            .map(|saved| saved.scholarship_id)
            .collect())
    }

    async fn saved_status(&self, user_id: &str, scholarship_id: &str) -> StoreResult<Option<ScholarshipStatus>> {
        Ok(self
            .list_saved(user_id)
            .await?
            .into_iter()
            .find(|saved| saved.scholarship_id == scholarship_id)
            .map(|saved| saved.status))
    }
}

/// In-process store, used for offline runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    scholarships: RwLock<Vec<Scholarship>>,
    profiles: RwLock<HashMap<String, UserProfile>>,
    saved: RwLock<Vec<SavedScholarship>>,
}

impl MemoryStore {
    pub fn new(scholarships: Vec<Scholarship>) -> Self {
        Self {
            scholarships: RwLock::new(scholarships),
            ..Self::default()
        }
    }

    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profiles
            .get_mut()
            .insert(profile.user_id.clone(), profile);
        self
    }

    pub fn with_saved(mut self, saved: Vec<SavedScholarship>) -> Self {
        self.saved.get_mut().extend(saved);
        self
    }

    async fn modify_saved<F>(&self, user_id: &str, scholarship_id: &str, apply: F) -> StoreResult<SavedScholarship>
    where
        F: FnOnce(&mut SavedScholarship) + Send,
    {
        let mut saved = self.saved.write().await;
        let record = saved
            .iter_mut()
            .find(|record| record.user_id == user_id && record.scholarship_id == scholarship_id)
            .ok_or_else(|| StoreError::not_found("saved scholarship", scholarship_id))?;

        apply(record);
        Ok(record.clone())
    }
}

#[async_trait]
impl ScholarshipStore for MemoryStore {
    async fn list_scholarships(&self) -> StoreResult<Vec<Scholarship>> {
        Ok(self.scholarships.read().await.clone())
    }

    async fn get_scholarship(&self, id: &str) -> StoreResult<Option<Scholarship>> {
        Ok(self
            .scholarships
            .read()
            .await
            .iter()
            .find(|scholarship| scholarship.id == id)
            .cloned())
    }

    async fn upsert_scholarship(&self, scholarship: &Scholarship) -> StoreResult<()> {
        let mut scholarships = self.scholarships.write().await;
        match scholarships.iter_mut().find(|existing| existing.id == scholarship.id) {
            Some(existing) => *existing = scholarship.clone(),
            None => scholarships.push(scholarship.clone()),
        }
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        profile.validate().map_err(StoreError::InvalidValue)?;
        self.profiles
            .write()
            .await
            .insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    async fn save_scholarship(&self, user_id: &str, scholarship_id: &str) -> StoreResult<SavedScholarship> {
        if self.get_scholarship(scholarship_id).await?.is_none() {
            return Err(StoreError::not_found("scholarship", scholarship_id));
        }

        let mut saved = self.saved.write().await;
        if saved
            .iter()
            .any(|record| record.user_id == user_id && record.scholarship_id == scholarship_id)
        {
            return Err(StoreError::AlreadySaved {
                user_id: user_id.to_string(),
                scholarship_id: scholarship_id.to_string(),
            });
        }

        let record = SavedScholarship {
            scholarship_id: scholarship_id.to_string(),
            user_id: user_id.to_string(),
            date_added: Utc::now(),
            status: ScholarshipStatus::Planning,
            notes: None,
        };
        saved.push(record.clone());
        Ok(record)
    }

    async fn remove_saved(&self, user_id: &str, scholarship_id: &str) -> StoreResult<bool> {
        let mut saved = self.saved.write().await;
        let before = saved.len();
        saved.retain(|record| !(record.user_id == user_id && record.scholarship_id == scholarship_id));
        Ok(saved.len() < before)
    }

    async fn update_status(
        &self,
        user_id: &str,
        scholarship_id: &str,
        status: ScholarshipStatus,
    ) -> StoreResult<SavedScholarship> {
        self.modify_saved(user_id, scholarship_id, |record| record.status = status)
            .await
    }

    async fn update_notes(
        &self,
        user_id: &str,
        scholarship_id: &str,
        notes: Option<String>,
    ) -> StoreResult<SavedScholarship> {
        self.modify_saved(user_id, scholarship_id, |record| record.notes = notes)
            .await
    }

    async fn list_saved(&self, user_id: &str) -> StoreResult<Vec<SavedScholarship>> {
        Ok(self
            .saved
            .read()
            .await
            .iter()
            .filter(|saved| saved.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AcademicInfo, PersonalInfo, StudyLevel};
    use crate::scoring::{self, RecommendPolicy};
    use crate::seed;

    fn store() -> MemoryStore {
        MemoryStore::new(seed::sample_scholarships()).with_profile(seed::sample_profile())
    }

    #[tokio::test]
    async fn save_starts_in_planning_and_rejects_duplicates() {
        let store = store();

        let saved = store.save_scholarship("user-1", "2").await.unwrap();
        assert_eq!(saved.status, ScholarshipStatus::Planning);
        assert!(saved.notes.is_none());

        let duplicate = store.save_scholarship("user-1", "2").await;
        assert!(matches!(duplicate, Err(StoreError::AlreadySaved { .. })));

        // another user may save the same scholarship
        assert!(store.save_scholarship("user-2", "2").await.is_ok());
    }

    #[tokio::test]
    async fn save_requires_known_scholarship() {
        let result = store().save_scholarship("user-1", "missing").await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn status_changes_in_any_order_and_keep_date_added() {
        let store = store();
        let created = store.save_scholarship("user-1", "3").await.unwrap();

        for status in [
            ScholarshipStatus::Accepted,
            ScholarshipStatus::Planning,
            ScholarshipStatus::Rejected,
            ScholarshipStatus::Applied,
        ] {
            let updated = store.update_status("user-1", "3", status).await.unwrap();
            assert_eq!(updated.status, status);
            assert_eq!(updated.date_added, created.date_added);
        }

        assert_eq!(
            store.saved_status("user-1", "3").await.unwrap(),
            Some(ScholarshipStatus::Applied)
        );
    }

    #[tokio::test]
    async fn updating_unsaved_scholarship_is_not_found() {
        let result = store()
            .update_status("user-1", "3", ScholarshipStatus::Applied)
            .await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn saved_lists_are_scoped_per_user() {
        let store = store().with_saved(seed::sample_saved());
        store.save_scholarship("someone-else", "5").await.unwrap();

        let ids = store.saved_ids(seed::SAMPLE_USER_ID).await.unwrap();
        assert_eq!(ids, vec!["1".to_string(), "4".to_string()]);
        assert!(!store.is_saved(seed::SAMPLE_USER_ID, "5").await.unwrap());

        assert!(store.remove_saved(seed::SAMPLE_USER_ID, "1").await.unwrap());
        assert!(!store.remove_saved(seed::SAMPLE_USER_ID, "1").await.unwrap());
        assert_eq!(store.list_saved(seed::SAMPLE_USER_ID).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn notes_can_be_set_and_cleared() {
        let store = store();
        store.save_scholarship("user-1", "6").await.unwrap();

        let noted = store
            .update_notes("user-1", "6", Some("ask for transcript".to_string()))
            .await
            .unwrap();
        assert_eq!(noted.notes.as_deref(), Some("ask for transcript"));

        let cleared = store.update_notes("user-1", "6", None).await.unwrap();
        assert!(cleared.notes.is_none());
    }

    #[tokio::test]
    async fn profiles_and_scholarships_upsert_by_id() {
        let store = store();
        let mut profile = store.get_profile(seed::SAMPLE_USER_ID).await.unwrap().unwrap();
        profile.academic_info.gpa = 3.1;
        store.upsert_profile(&profile).await.unwrap();
        assert_eq!(
            store.get_profile(seed::SAMPLE_USER_ID).await.unwrap().unwrap().academic_info.gpa,
            3.1
        );
        assert!(store.get_profile("nobody").await.unwrap().is_none());

        let mut scholarship = store.get_scholarship("1").await.unwrap().unwrap();
        scholarship.featured = Some(false);
        store.upsert_scholarship(&scholarship).await.unwrap();
        let catalog = store.list_scholarships().await.unwrap();
        assert_eq!(catalog.len(), seed::sample_scholarships().len());
        assert_eq!(catalog[0].featured, Some(false));
    }

    #[tokio::test]
    async fn out_of_scale_gpa_is_rejected() {
        let store = store();
        let mut profile = seed::sample_profile();
        profile.academic_info.gpa = 9.5;

        let result = store.upsert_profile(&profile).await;
        assert!(matches!(result, Err(StoreError::InvalidValue(_))));
        assert_eq!(
            store.get_profile(seed::SAMPLE_USER_ID).await.unwrap().unwrap().academic_info.gpa,
            3.8
        );
    }

    #[tokio::test]
    async fn new_profile_drives_recommendations() {
        let store = store();
        let catalog = store.list_scholarships().await.unwrap();
        assert!(store.get_profile("user-7").await.unwrap().is_none());

        let profile = UserProfile {
            user_id: "user-7".to_string(),
            academic_info: AcademicInfo {
                gpa: 3.9,
                major: "Medicine".to_string(),
                study_level: StudyLevel::Graduate,
                institution: None,
            },
            personal_info: PersonalInfo {
                citizenship: "Kenya".to_string(),
                financial_background: None,
                extracurriculars: None,
            },
        };
        store.upsert_profile(&profile).await.unwrap();

        let stored = store.get_profile("user-7").await.unwrap();
        assert_eq!(stored.as_ref(), Some(&profile));

        let scored = scoring::recommend_for(&catalog, stored.as_ref(), RecommendPolicy::ScoreOnly);
        let featured = scoring::recommend_for(&catalog, None, RecommendPolicy::ScoreOnly);
        assert!(!scored.is_empty());
        assert!(scored.iter().all(|entry| entry.score > scoring::RECOMMEND_THRESHOLD));
        let scored_ids: Vec<&str> = scored.iter().map(|entry| entry.scholarship.id.as_str()).collect();
        let featured_ids: Vec<&str> = featured.iter().map(|entry| entry.scholarship.id.as_str()).collect();
        assert_ne!(scored_ids, featured_ids);
    }
}
