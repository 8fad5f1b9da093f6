//! Validation boundary for food submissions.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{QuestError, Result};
use crate::models::{Amount, FoodEntry, FoodPatch, FoodSubmission};

/// Validate a submission and stamp it with an id and the current instant.
pub fn normalize(input: FoodSubmission) -> Result<FoodEntry> {
    normalize_at(input, Utc::now())
}

/// [`normalize`] with an explicit creation instant.
pub fn normalize_at(input: FoodSubmission, now: DateTime<Utc>) -> Result<FoodEntry> {
    let food_name = required_text("food_name", &input.food_name)?;
    let quantity = required_text("quantity", &input.quantity)?;
    let calories = match input.calories.as_ref() {
        Some(amount) => parse_amount("calories", amount)?,
        None => return Err(QuestError::validation("calories", "is required")),
    };
    let protein = optional_amount("protein", input.protein.as_ref())?;
    let carbs = optional_amount("carbs", input.carbs.as_ref())?;
    let fat = optional_amount("fat", input.fat.as_ref())?;

    let id = match input.id {
        Some(id) if !id.trim().is_empty() => id,
        _ => Uuid::new_v4().to_string(),
    };

    Ok(FoodEntry {
        id,
        food_name,
        quantity,
        calories,
        protein,
        carbs,
        fat,
        timestamp: now,
    })
}

/// Apply a validated patch to `entry`, keeping its `id` and `timestamp`.
///
/// Nothing is applied unless every present field is valid.
pub fn apply_patch(entry: &FoodEntry, patch: &FoodPatch) -> Result<FoodEntry> {
    let mut updated = entry.clone();
    if let Some(name) = &patch.food_name {
        updated.food_name = required_text("food_name", name)?;
    }
    if let Some(quantity) = &patch.quantity {
        updated.quantity = required_text("quantity", quantity)?;
    }
    if let Some(v) = &patch.calories {
        updated.calories = parse_amount("calories", v)?;
    }
    if let Some(v) = &patch.protein {
        updated.protein = parse_amount("protein", v)?;
    }
    if let Some(v) = &patch.carbs {
        updated.carbs = parse_amount("carbs", v)?;
    }
    if let Some(v) = &patch.fat {
        updated.fat = parse_amount("fat", v)?;
    }
    Ok(updated)
}

fn required_text(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(QuestError::validation(field, "is required"));
    }
    Ok(trimmed.to_string())
}

fn optional_amount(field: &'static str, value: Option<&Amount>) -> Result<f64> {
    match value {
        Some(Amount::Text(s)) if s.trim().is_empty() => Ok(0.0),
        Some(amount) => parse_amount(field, amount),
        None => Ok(0.0),
    }
}

fn parse_amount(field: &'static str, value: &Amount) -> Result<f64> {
    let n = match value {
        Amount::Number(n) => *n,
        Amount::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| QuestError::validation(field, format!("{s:?} is not a number")))?,
    };
    if !n.is_finite() {
        return Err(QuestError::validation(field, "must be a finite number"));
    }
    if n < 0.0 {
        return Err(QuestError::validation(field, "must not be negative"));
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 30, 0).unwrap()
    }

    #[test]
    fn normalizes_full_submission() {
        let input = FoodSubmission::new("  Oatmeal ", "1 bowl", 350.5).with_macros(12.0, 60.25, 6.0);
        let entry = normalize_at(input, at()).unwrap();
        assert_eq!(entry.food_name, "Oatmeal");
        assert_eq!(entry.quantity, "1 bowl");
        assert_eq!(entry.calories, 350.5);
        assert_eq!(entry.protein, 12.0);
        assert_eq!(entry.carbs, 60.25);
        assert_eq!(entry.fat, 6.0);
        assert_eq!(entry.timestamp, at());
        assert!(Uuid::parse_str(&entry.id).is_ok());
    }

    #[test]
    fn calorie_only_entry_defaults_macros_to_zero() {
        let entry = normalize_at(FoodSubmission::new("Apple", "1", "95"), at()).unwrap();
        assert_eq!(entry.calories, 95.0);
        assert_eq!(entry.macros().protein, 0.0);
        assert_eq!(entry.carbs, 0.0);
        assert_eq!(entry.fat, 0.0);
    }

    #[test]
    fn blank_macro_text_counts_as_absent() {
        let mut input = FoodSubmission::new("Tea", "1 cup", 2.0);
        input.protein = Some(Amount::from(" "));
        let entry = normalize_at(input, at()).unwrap();
        assert_eq!(entry.protein, 0.0);
    }

    #[test]
    fn keeps_remote_id() {
        let mut input = FoodSubmission::new("Rice", "200 g", 260.0);
        input.id = Some("64f1c0ffee".to_string());
        let entry = normalize_at(input, at()).unwrap();
        assert_eq!(entry.id, "64f1c0ffee");
    }

    #[test]
    fn rejects_empty_name_and_quantity() {
        let err = normalize_at(FoodSubmission::new("   ", "1", 10.0), at()).unwrap_err();
        assert!(matches!(err, QuestError::Validation { field: "food_name", .. }));

        let err = normalize_at(FoodSubmission::new("Egg", "", 10.0), at()).unwrap_err();
        assert!(matches!(err, QuestError::Validation { field: "quantity", .. }));
    }

    #[test]
    fn rejects_negative_and_non_numeric_values() {
        let err = normalize_at(FoodSubmission::new("Egg", "1", -1.0), at()).unwrap_err();
        assert!(matches!(err, QuestError::Validation { field: "calories", .. }));

        let input = FoodSubmission::new("Egg", "1", 70.0).with_macros("six", 0.0, 5.0);
        let err = normalize_at(input, at()).unwrap_err();
        assert!(matches!(err, QuestError::Validation { field: "protein", .. }));

        let input = FoodSubmission::new("Egg", "1", 70.0).with_macros(6.0, 0.0, "-5");
        let err = normalize_at(input, at()).unwrap_err();
        assert!(matches!(err, QuestError::Validation { field: "fat", .. }));

        let input = FoodSubmission::new("Egg", "1", f64::NAN);
        assert!(normalize_at(input, at()).is_err());
    }

    #[test]
    fn missing_calories_is_rejected() {
        let input = FoodSubmission {
            food_name: "Egg".into(),
            quantity: "1".into(),
            ..Default::default()
        };
        let err = normalize_at(input, at()).unwrap_err();
        assert!(matches!(err, QuestError::Validation { field: "calories", .. }));
    }

    #[test]
    fn patch_keeps_identity_and_rejects_bad_fields() {
        let entry = normalize_at(FoodSubmission::new("Egg", "1", 70.0), at()).unwrap();
        let patch = FoodPatch {
            quantity: Some("2".into()),
            calories: Some(140.0.into()),
            ..Default::default()
        };
        let updated = apply_patch(&entry, &patch).unwrap();
        assert_eq!(updated.id, entry.id);
        assert_eq!(updated.timestamp, entry.timestamp);
        assert_eq!(updated.quantity, "2");
        assert_eq!(updated.calories, 140.0);
        assert_eq!(updated.food_name, "Egg");

        let bad = FoodPatch {
            calories: Some(Amount::from("-3")),
            ..Default::default()
        };
        assert!(apply_patch(&entry, &bad).is_err());
    }
}
