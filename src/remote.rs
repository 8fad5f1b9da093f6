//! Remote strategy: the food log and goals live behind an HTTP API.

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::backend::{GoalsBackend, LogBackend};
use crate::error::{QuestError, Result};
use crate::http::{is_not_found, ApiClient};
use crate::models::{FoodEntry, NutritionGoals, UserProfile};

pub const FOOD_LOG_PATH: &str = "/api/food/log";
pub const PROFILE_PATH: &str = "/api/users/profile";
pub const GOALS_PATH: &str = "/api/users/goals";

fn entry_path(id: &str) -> String {
    format!("{FOOD_LOG_PATH}/{id}")
}

/// Map a 404 on an entry route to [`QuestError::NotFound`].
fn entry_error(id: &str, err: anyhow::Error) -> QuestError {
    if is_not_found(&err) {
        QuestError::NotFound(id.to_string())
    } else {
        QuestError::Persistence(err)
    }
}

#[derive(Clone)]
pub struct RemoteLog {
    api: ApiClient,
}

impl RemoteLog {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl LogBackend for RemoteLog {
    async fn fetch(&self, _date: NaiveDate) -> Result<Vec<FoodEntry>> {
        Ok(self.api.get(FOOD_LOG_PATH).await?)
    }

    async fn create(&self, entry: &FoodEntry) -> Result<FoodEntry> {
        Ok(self.api.post(FOOD_LOG_PATH, &entry.body()).await?)
    }

    async fn update(&self, entry: &FoodEntry) -> Result<FoodEntry> {
        self.api
            .put(&entry_path(&entry.id), &entry.body())
            .await
            .map_err(|e| entry_error(&entry.id, e))
    }

    async fn delete(&self, entry: &FoodEntry) -> Result<()> {
        self.api
            .delete(&entry_path(&entry.id))
            .await
            .map_err(|e| entry_error(&entry.id, e))
    }
}

#[derive(Clone)]
pub struct RemoteGoals {
    api: ApiClient,
}

impl RemoteGoals {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// The profile document, or `None` before onboarding.
    async fn profile_document(&self) -> Result<Option<Value>> {
        match self.api.get::<Value>(PROFILE_PATH).await {
            Ok(doc) => Ok(Some(doc)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// The physiology part of a profile document.
///
/// Documents without `age` or `activityLevel` predate onboarding and yield
/// `None`. A document that has them but does not decode is an error, so a
/// bad record is never mistaken for a missing one.
fn profile_from_document(doc: Value) -> Result<Option<UserProfile>> {
    if doc.get("age").is_none() && doc.get("activityLevel").is_none() {
        return Ok(None);
    }
    let profile = serde_json::from_value::<UserProfile>(doc).context("decoding profile document")?;
    Ok(Some(profile))
}

/// Goals embedded in a profile document, when all four fields are numbers.
fn goals_from_document(doc: &Value) -> Option<NutritionGoals> {
    let num = |k: &str| doc.get(k).and_then(Value::as_f64);
    Some(NutritionGoals {
        daily_calorie_goal: num("daily_calorie_goal")?,
        daily_protein_goal: num("daily_protein_goal")?,
        daily_carb_goal: num("daily_carb_goal")?,
        daily_fat_goal: num("daily_fat_goal")?,
    })
}

#[async_trait]
impl GoalsBackend for RemoteGoals {
    async fn load_goals(&self) -> Result<Option<NutritionGoals>> {
        Ok(self
            .profile_document()
            .await?
            .as_ref()
            .and_then(goals_from_document))
    }

    async fn save_goals(&self, goals: &NutritionGoals) -> Result<()> {
        Ok(self.api.put_unit(GOALS_PATH, goals).await?)
    }

    async fn load_profile(&self) -> Result<Option<UserProfile>> {
        match self.profile_document().await? {
            Some(doc) => profile_from_document(doc),
            None => Ok(None),
        }
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        Ok(self.api.put_unit(PROFILE_PATH, profile).await?)
    }

    async fn load_state(&self) -> Result<(Option<NutritionGoals>, Option<UserProfile>)> {
        let Some(doc) = self.profile_document().await? else {
            return Ok((None, None));
        };
        let goals = goals_from_document(&doc);
        Ok((goals, profile_from_document(doc)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityLevel;
    use serde_json::json;

    #[test]
    fn goals_need_all_four_fields() {
        let doc = json!({
            "email": "a@b.c",
            "daily_calorie_goal": 2100,
            "daily_protein_goal": 140.5,
            "daily_carb_goal": 230,
            "daily_fat_goal": 65
        });
        let goals = goals_from_document(&doc).unwrap();
        assert_eq!(goals.daily_calorie_goal, 2100.0);
        assert_eq!(goals.daily_protein_goal, 140.5);

        let partial = json!({ "daily_calorie_goal": 2100 });
        assert!(goals_from_document(&partial).is_none());
    }

    #[test]
    fn profile_document_decoding() {
        let pre_onboarding = json!({ "email": "a@b.c" });
        assert_eq!(profile_from_document(pre_onboarding).unwrap(), None);

        let onboarded = json!({
            "email": "a@b.c",
            "age": 31,
            "gender": "female",
            "height": 170,
            "weight": 64.5,
            "activityLevel": "very_active",
            "goal": "gain"
        });
        let profile = profile_from_document(onboarded).unwrap().unwrap();
        assert_eq!(profile.age, 31);
        assert_eq!(profile.activity_level, ActivityLevel::VeryActive);

        let unknown_level = json!({
            "age": 31,
            "gender": "female",
            "height": 170,
            "weight": 64.5,
            "activityLevel": "extreme"
        });
        let err = profile_from_document(unknown_level).unwrap_err();
        assert!(matches!(err, QuestError::Persistence(_)));

        let bad_gender = json!({
            "age": 31,
            "gender": "robot",
            "height": 170,
            "weight": 64.5,
            "activityLevel": "light"
        });
        assert!(profile_from_document(bad_gender).is_err());
    }

    #[test]
    fn only_404_maps_to_not_found() {
        let err = entry_error("abc", anyhow::anyhow!("connection reset"));
        assert!(matches!(err, QuestError::Persistence(_)));
    }
}
