//! Persistence ports. One adapter is wired per deployment at startup.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{FoodEntry, NutritionGoals, UserProfile};

/// Where food entries live.
///
/// Implementations report storage failures as
/// [`QuestError::Persistence`](crate::error::QuestError::Persistence) and a
/// missing record as [`QuestError::NotFound`](crate::error::QuestError::NotFound).
#[async_trait]
pub trait LogBackend: Send + Sync {
    /// Entries that may belong to `date`. Remote services return everything
    /// the caller owns; filtering by local date happens in the store.
    async fn fetch(&self, date: NaiveDate) -> Result<Vec<FoodEntry>>;

    /// Persist a new entry and return it as stored. A remote service may
    /// replace the client-side `id` and `timestamp`.
    async fn create(&self, entry: &FoodEntry) -> Result<FoodEntry>;

    /// Replace an existing entry and return it as stored.
    async fn update(&self, entry: &FoodEntry) -> Result<FoodEntry>;

    async fn delete(&self, entry: &FoodEntry) -> Result<()>;
}

/// Where the profile and nutrition goals live.
#[async_trait]
pub trait GoalsBackend: Send + Sync {
    async fn load_goals(&self) -> Result<Option<NutritionGoals>>;

    /// Idempotent: saving the same goals twice leaves the same state.
    async fn save_goals(&self, goals: &NutritionGoals) -> Result<()>;

    async fn load_profile(&self) -> Result<Option<UserProfile>>;

    async fn save_profile(&self, profile: &UserProfile) -> Result<()>;

    /// Goals and profile read together. Adapters that keep both in one
    /// record override this to read it once.
    async fn load_state(&self) -> Result<(Option<NutritionGoals>, Option<UserProfile>)> {
        let goals = self.load_goals().await?;
        let profile = self.load_profile().await?;
        Ok((goals, profile))
    }
}
