use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Biological sex used by the Mifflin-St Jeor equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

/// Self-reported activity level, mapped to a fixed TDEE multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    Light,
    /// Moderate exercise 3-5 days/week
    Moderate,
    /// Hard exercise 6-7 days/week
    Active,
    /// Very hard exercise or a physical job
    VeryActive,
}

/// What the user wants to do with their weight.
///
/// Unrecognized values deserialize as [`Goal::Maintain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Lose,
    #[default]
    Maintain,
    Gain,
}

impl<'de> Deserialize<'de> for Goal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref() {
            Some("lose") => Goal::Lose,
            Some("gain") => Goal::Gain,
            _ => Goal::Maintain,
        })
    }
}

/// Physiological profile captured during onboarding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Age in years
    pub age: u32,
    pub gender: Gender,
    /// Height in cm
    pub height: f64,
    /// Weight in kg
    pub weight: f64,
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub goal: Goal,
}

/// Daily targets. Derived from a [`UserProfile`] once, then freely editable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionGoals {
    /// Calories (kcal)
    pub daily_calorie_goal: f64,
    /// Protein (g)
    pub daily_protein_goal: f64,
    /// Carbs (g)
    pub daily_carb_goal: f64,
    /// Fat (g)
    pub daily_fat_goal: f64,
}

/// Calories and macros, either for one entry or summed over a day.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Macros {
    /// Calories (kcal)
    pub calories: f64,
    /// Protein (g)
    pub protein: f64,
    /// Carbs (g)
    pub carbs: f64,
    /// Fat (g)
    pub fat: f64,
}

/// A single logged food item in its canonical, validated shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    /// Opaque identifier, client-generated or server-assigned
    pub id: String,
    pub food_name: String,
    /// Free-form description such as "1 bowl"
    pub quantity: String,
    /// Calories (kcal)
    pub calories: f64,
    /// Protein (g)
    pub protein: f64,
    /// Carbs (g)
    pub carbs: f64,
    /// Fat (g)
    pub fat: f64,
    pub timestamp: DateTime<Utc>,
}

impl FoodEntry {
    pub fn macros(&self) -> Macros {
        Macros {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
        }
    }

    /// The request body shape used by the remote log service.
    pub fn body(&self) -> FoodBody<'_> {
        FoodBody {
            food_name: &self.food_name,
            quantity: &self.quantity,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
        }
    }
}

/// `POST`/`PUT` body for the remote log service.
#[derive(Debug, Clone, Serialize)]
pub struct FoodBody<'a> {
    pub food_name: &'a str,
    pub quantity: &'a str,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// A numeric form field: either a JSON number or text typed by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl From<f64> for Amount {
    fn from(v: f64) -> Self {
        Amount::Number(v)
    }
}

impl From<&str> for Amount {
    fn from(v: &str) -> Self {
        Amount::Text(v.to_string())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Number(n) => write!(f, "{n}"),
            Amount::Text(s) => f.write_str(s),
        }
    }
}

/// Unvalidated food submission from the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodSubmission {
    #[serde(default)]
    pub food_name: String,
    #[serde(default)]
    pub quantity: String,
    pub calories: Option<Amount>,
    pub protein: Option<Amount>,
    pub carbs: Option<Amount>,
    pub fat: Option<Amount>,
    /// Set when a remote authority already assigned the id
    #[serde(default)]
    pub id: Option<String>,
}

impl FoodSubmission {
    pub fn new(food_name: &str, quantity: &str, calories: impl Into<Amount>) -> Self {
        Self {
            food_name: food_name.to_string(),
            quantity: quantity.to_string(),
            calories: Some(calories.into()),
            ..Default::default()
        }
    }

    pub fn with_macros(
        mut self,
        protein: impl Into<Amount>,
        carbs: impl Into<Amount>,
        fat: impl Into<Amount>,
    ) -> Self {
        self.protein = Some(protein.into());
        self.carbs = Some(carbs.into());
        self.fat = Some(fat.into());
        self
    }
}

/// Partial update of an existing entry. Absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodPatch {
    pub food_name: Option<String>,
    pub quantity: Option<String>,
    pub calories: Option<Amount>,
    pub protein: Option<Amount>,
    pub carbs: Option<Amount>,
    pub fat: Option<Amount>,
}
