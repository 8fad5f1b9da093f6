//! Daily calorie target from a user's physiology.
//!
//! Basal metabolic rate uses the Mifflin-St Jeor equation, scaled by a fixed
//! activity multiplier to get TDEE, then shifted by 500 kcal for a weight
//! loss or gain goal.

use crate::error::{QuestError, Result};
use crate::models::{ActivityLevel, Gender, Goal, NutritionGoals, UserProfile};

pub const MIN_AGE: u32 = 13;
/// cm
pub const MIN_HEIGHT: f64 = 100.0;
/// kg
pub const MIN_WEIGHT: f64 = 30.0;

/// Daily surplus/deficit for `gain`/`lose` (roughly 0.5 kg per week).
pub const GOAL_ADJUSTMENT_KCAL: f64 = 500.0;

pub const DEFAULT_PROTEIN_GOAL: f64 = 150.0;
pub const DEFAULT_CARB_GOAL: f64 = 200.0;
pub const DEFAULT_FAT_GOAL: f64 = 60.0;

impl ActivityLevel {
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

/// Basal metabolic rate in kcal/day.
pub fn bmr(profile: &UserProfile) -> f64 {
    let base = 10.0 * profile.weight + 6.25 * profile.height - 5.0 * f64::from(profile.age);
    match profile.gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

/// Total daily energy expenditure in kcal/day.
pub fn tdee(profile: &UserProfile) -> f64 {
    bmr(profile) * profile.activity_level.multiplier()
}

/// Rounded daily calorie target for the profile's goal.
///
/// Total over well-typed input; range checks belong to [`UserProfile::validate`].
pub fn daily_calorie_target(profile: &UserProfile) -> i64 {
    let tdee = tdee(profile);
    let target = match profile.goal {
        Goal::Lose => tdee - GOAL_ADJUSTMENT_KCAL,
        Goal::Gain => tdee + GOAL_ADJUSTMENT_KCAL,
        Goal::Maintain => tdee,
    };
    target.round() as i64
}

impl UserProfile {
    /// Range checks from the onboarding form.
    pub fn validate(&self) -> Result<()> {
        if self.age < MIN_AGE {
            return Err(QuestError::validation(
                "age",
                format!("must be at least {MIN_AGE} years old"),
            ));
        }
        if !self.height.is_finite() || self.height < MIN_HEIGHT {
            return Err(QuestError::validation(
                "height",
                format!("must be at least {MIN_HEIGHT} cm"),
            ));
        }
        if !self.weight.is_finite() || self.weight < MIN_WEIGHT {
            return Err(QuestError::validation(
                "weight",
                format!("must be at least {MIN_WEIGHT} kg"),
            ));
        }
        Ok(())
    }
}

impl NutritionGoals {
    /// Calorie goal from [`daily_calorie_target`], macro goals from defaults.
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            daily_calorie_goal: daily_calorie_target(profile) as f64,
            daily_protein_goal: DEFAULT_PROTEIN_GOAL,
            daily_carb_goal: DEFAULT_CARB_GOAL,
            daily_fat_goal: DEFAULT_FAT_GOAL,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("daily_calorie_goal", self.daily_calorie_goal),
            ("daily_protein_goal", self.daily_protein_goal),
            ("daily_carb_goal", self.daily_carb_goal),
            ("daily_fat_goal", self.daily_fat_goal),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(QuestError::validation(field, "must be a non-negative number"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(gender: Gender, activity_level: ActivityLevel, goal: Goal) -> UserProfile {
        UserProfile {
            age: 25,
            gender,
            height: 175.0,
            weight: 70.0,
            activity_level,
            goal,
        }
    }

    #[test]
    fn male_moderate_maintain() {
        let p = profile(Gender::Male, ActivityLevel::Moderate, Goal::Maintain);
        assert_eq!(bmr(&p), 1673.75);
        assert_eq!(daily_calorie_target(&p), 2594);
    }

    #[test]
    fn female_constant_is_161_below_base() {
        let male = profile(Gender::Male, ActivityLevel::Moderate, Goal::Maintain);
        let female = profile(Gender::Female, ActivityLevel::Moderate, Goal::Maintain);
        assert_eq!(bmr(&male) - bmr(&female), 166.0);
        // (1673.75 - 166) * 1.55 = 2337.0125
        assert_eq!(daily_calorie_target(&female), 2337);
    }

    #[test]
    fn lose_and_gain_shift_by_500() {
        let p = profile(Gender::Male, ActivityLevel::Sedentary, Goal::Maintain);
        let tdee = tdee(&p);
        let lose = UserProfile {
            goal: Goal::Lose,
            ..p.clone()
        };
        let gain = UserProfile {
            goal: Goal::Gain,
            ..p.clone()
        };
        assert_eq!(daily_calorie_target(&lose), (tdee - 500.0).round() as i64);
        assert_eq!(daily_calorie_target(&gain), (tdee + 500.0).round() as i64);
    }

    #[test]
    fn every_activity_level_has_its_multiplier() {
        let expected = [
            (ActivityLevel::Sedentary, 2009),
            (ActivityLevel::Light, 2301),
            (ActivityLevel::Moderate, 2594),
            (ActivityLevel::Active, 2887),
            (ActivityLevel::VeryActive, 3180),
        ];
        for (level, target) in expected {
            let p = profile(Gender::Male, level, Goal::Maintain);
            assert_eq!(daily_calorie_target(&p), target, "{level:?}");
        }
    }

    #[test]
    fn unknown_goal_parses_as_maintain() {
        let p: UserProfile = serde_json::from_value(serde_json::json!({
            "age": 25,
            "gender": "male",
            "height": 175,
            "weight": 70,
            "activityLevel": "moderate",
            "goal": "bulk"
        }))
        .unwrap();
        assert_eq!(p.goal, Goal::Maintain);
        assert_eq!(daily_calorie_target(&p), 2594);

        let missing: UserProfile = serde_json::from_value(serde_json::json!({
            "age": 25,
            "gender": "male",
            "height": 175,
            "weight": 70,
            "activityLevel": "moderate"
        }))
        .unwrap();
        assert_eq!(missing.goal, Goal::Maintain);
    }

    #[test]
    fn gender_is_strict() {
        let res: std::result::Result<UserProfile, _> = serde_json::from_value(serde_json::json!({
            "age": 25,
            "gender": "other",
            "height": 175,
            "weight": 70,
            "activityLevel": "moderate",
            "goal": "maintain"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn profile_validation_limits() {
        let ok = profile(Gender::Female, ActivityLevel::Light, Goal::Lose);
        assert!(ok.validate().is_ok());

        let young = UserProfile { age: 12, ..ok.clone() };
        assert!(matches!(
            young.validate(),
            Err(QuestError::Validation { field: "age", .. })
        ));

        let short = UserProfile {
            height: 99.0,
            ..ok.clone()
        };
        assert!(matches!(
            short.validate(),
            Err(QuestError::Validation { field: "height", .. })
        ));

        let light = UserProfile {
            weight: 29.5,
            ..ok.clone()
        };
        assert!(matches!(
            light.validate(),
            Err(QuestError::Validation { field: "weight", .. })
        ));
    }

    #[test]
    fn goals_from_profile() {
        let p = profile(Gender::Male, ActivityLevel::Moderate, Goal::Maintain);
        let goals = NutritionGoals::from_profile(&p);
        assert_eq!(goals.daily_calorie_goal, 2594.0);
        assert_eq!(goals.daily_protein_goal, DEFAULT_PROTEIN_GOAL);
        assert!(goals.validate().is_ok());

        let bad = NutritionGoals {
            daily_fat_goal: -1.0,
            ..goals
        };
        assert!(matches!(
            bad.validate(),
            Err(QuestError::Validation {
                field: "daily_fat_goal",
                ..
            })
        ));
    }
}
