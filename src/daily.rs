//! Date-scoped projection of the food log.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::error::{QuestError, Result};
use crate::models::{FoodEntry, Macros, NutritionGoals};

/// Entries for one calendar day and their summed macros.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyLog {
    pub date: NaiveDate,
    pub consumed: Macros,
    /// In the order they were given
    pub entries: Vec<FoodEntry>,
}

impl DailyLog {
    /// Calories consumed as a percentage of the calorie goal.
    ///
    /// Not bounded at 100. A missing or non-positive goal is a
    /// [`QuestError::Configuration`] rather than an infinite or NaN ratio.
    pub fn progress(&self, goals: Option<&NutritionGoals>) -> Result<f64> {
        let goals = goals.ok_or_else(no_target)?;
        percentage(self.consumed.calories, calorie_goal(goals)?)
    }
}

/// `YYYY-MM-DD` key for a date.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Calendar date of `timestamp` in the log owner's local timezone.
pub fn local_date(timestamp: &DateTime<Utc>) -> NaiveDate {
    timestamp.with_timezone(&Local).date_naive()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Entries logged on `date` (local time), summed.
pub fn aggregate<'a, I>(entries: I, date: NaiveDate) -> DailyLog
where
    I: IntoIterator<Item = &'a FoodEntry>,
{
    aggregate_in(entries, date, &Local)
}

/// [`aggregate`] with an explicit timezone for the day boundary.
pub fn aggregate_in<'a, I, Tz>(entries: I, date: NaiveDate, tz: &Tz) -> DailyLog
where
    I: IntoIterator<Item = &'a FoodEntry>,
    Tz: TimeZone,
{
    let entries: Vec<FoodEntry> = entries
        .into_iter()
        .filter(|e| e.timestamp.with_timezone(tz).date_naive() == date)
        .cloned()
        .collect();
    let consumed = Macros {
        calories: sum(entries.iter().map(|e| e.calories)),
        protein: sum(entries.iter().map(|e| e.protein)),
        carbs: sum(entries.iter().map(|e| e.carbs)),
        fat: sum(entries.iter().map(|e| e.fat)),
    };

    DailyLog {
        date,
        consumed,
        entries,
    }
}

/// Sum in ascending order so the total does not depend on entry order.
fn sum(values: impl Iterator<Item = f64>) -> f64 {
    let mut values: Vec<f64> = values.collect();
    values.sort_by(f64::total_cmp);
    values.into_iter().sum()
}

pub(crate) fn no_target() -> QuestError {
    QuestError::Configuration("no target set".to_string())
}

pub(crate) fn calorie_goal(goals: &NutritionGoals) -> Result<f64> {
    if !goals.daily_calorie_goal.is_finite() || goals.daily_calorie_goal <= 0.0 {
        return Err(QuestError::Configuration(format!(
            "daily calorie goal must be positive, got {}",
            goals.daily_calorie_goal
        )));
    }
    Ok(goals.daily_calorie_goal)
}

pub(crate) fn percentage(consumed: f64, target: f64) -> Result<f64> {
    if target <= 0.0 {
        return Err(no_target());
    }
    Ok(consumed / target * 100.0)
}
