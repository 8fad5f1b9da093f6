//! Calorie target calculation and a date-scoped food log.
//!
//! [`calculator`] turns a [`UserProfile`] into a daily calorie target.
//! [`LogStore`] keeps the day's [`FoodEntry`] values consistent with one
//! persistence adapter, either [`local`] slots or the [`remote`] API, and
//! [`ProgressView`] projects the totals against [`NutritionGoals`].
//! [`FoodCatalog`] offers searchable common foods to log by serving.

pub mod auth;
pub mod backend;
pub mod calculator;
pub mod catalog;
pub mod config;
pub mod daily;
pub mod entry;
pub mod error;
pub mod http;
pub mod local;
pub mod models;
pub mod progress;
pub mod remote;
pub mod store;

pub use catalog::{CatalogItem, FoodCatalog};
pub use config::{QuestConfig, Strategy};
pub use daily::{aggregate, DailyLog};
pub use entry::normalize;
pub use error::{QuestError, Result};
pub use models::{
    ActivityLevel, Amount, FoodEntry, FoodPatch, FoodSubmission, Gender, Goal, Macros,
    NutritionGoals, UserProfile,
};
pub use progress::ProgressView;
pub use store::{GoalsStore, LogStore, Tracker};
