use serde::Serialize;

use crate::daily::{calorie_goal, no_target, percentage, DailyLog};
use crate::error::Result;
use crate::models::{Macros, NutritionGoals};

/// Read-only projection handed to presentation layers.
///
/// Built from a [`DailyLog`] on every read; never cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressView {
    pub consumed: Macros,
    pub target: NutritionGoals,
    /// Calories consumed as a percentage of the calorie goal, unbounded
    pub percentage: f64,
    /// Negative once the goal is exceeded
    pub remaining_calories: f64,
    /// Per-macro percentages; `None` where that goal is zero
    pub macro_percentages: MacroProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroProgress {
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

impl ProgressView {
    /// Fails with a configuration error when there is no positive calorie goal.
    pub fn compute(log: &DailyLog, goals: Option<&NutritionGoals>) -> Result<Self> {
        let target = *goals.ok_or_else(no_target)?;
        let target_calories = calorie_goal(&target)?;
        let consumed = log.consumed;

        let ratio = |value: f64, goal: f64| percentage(value, goal).ok();

        Ok(Self {
            consumed,
            target,
            percentage: percentage(consumed.calories, target_calories)?,
            remaining_calories: target_calories - consumed.calories,
            macro_percentages: MacroProgress {
                protein: ratio(consumed.protein, target.daily_protein_goal),
                carbs: ratio(consumed.carbs, target.daily_carb_goal),
                fat: ratio(consumed.fat, target.daily_fat_goal),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daily::aggregate_in;
    use crate::error::QuestError;
    use crate::models::FoodEntry;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn log_with(calories: f64, protein: f64) -> DailyLog {
        let entry = FoodEntry {
            id: "1".into(),
            food_name: "Chicken".into(),
            quantity: "150 g".into(),
            calories,
            protein,
            carbs: 0.0,
            fat: 5.0,
            timestamp: Utc.with_ymd_and_hms(2025, 1, 5, 12, 0, 0).unwrap(),
        };
        aggregate_in([&entry], NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(), &Utc)
    }

    #[test]
    fn computes_percentages_and_remaining() {
        let goals = NutritionGoals {
            daily_calorie_goal: 2000.0,
            daily_protein_goal: 150.0,
            daily_carb_goal: 0.0,
            daily_fat_goal: 50.0,
        };
        let view = ProgressView::compute(&log_with(500.0, 75.0), Some(&goals)).unwrap();
        assert_eq!(view.percentage, 25.0);
        assert_eq!(view.remaining_calories, 1500.0);
        assert_eq!(view.macro_percentages.protein, Some(50.0));
        assert_eq!(view.macro_percentages.carbs, None);
        assert_eq!(view.macro_percentages.fat, Some(10.0));
        assert_eq!(view.target, goals);
    }

    #[test]
    fn over_target_goes_negative() {
        let goals = NutritionGoals {
            daily_calorie_goal: 400.0,
            daily_protein_goal: 0.0,
            daily_carb_goal: 0.0,
            daily_fat_goal: 0.0,
        };
        let view = ProgressView::compute(&log_with(500.0, 0.0), Some(&goals)).unwrap();
        assert_eq!(view.percentage, 125.0);
        assert_eq!(view.remaining_calories, -100.0);
    }

    #[test]
    fn missing_target_is_reported() {
        let err = ProgressView::compute(&log_with(500.0, 0.0), None).unwrap_err();
        assert!(matches!(err, QuestError::Configuration(ref m) if m == "no target set"));
    }
}
