//! Daily calorie math: Mifflin-St Jeor style BMR, activity scaling and the
//! goal offset.

use serde::{Deserialize, Serialize};

use crate::wizard::model::{Gender, Goal, Profile};

/// Calories added to or removed from TDEE for a gain or loss goal.
pub const GOAL_OFFSET_KCAL: f64 = 500.0;

/// Basal metabolic rate in kcal/day.
pub fn compute_bmr(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> f64 {
    let sex_term = match gender {
        Gender::Male => 5.0,
        Gender::Female => -161.0,
    };
    9.99 * weight_kg + 6.25 * height_cm - 4.92 * f64::from(age) + sex_term
}

/// Daily target from BMR, activity multiplier and goal.
pub fn compute_target(bmr: f64, activity_multiplier: f64, goal: Goal) -> f64 {
    let tdee = bmr * activity_multiplier;
    match goal {
        Goal::Loss => tdee - GOAL_OFFSET_KCAL,
        Goal::Maintain => tdee,
        Goal::Gain => tdee + GOAL_OFFSET_KCAL,
    }
}

/// Everything the user gets back once the wizard completes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalorieReport {
    pub goal: Goal,
    pub bmr: f64,
    pub tdee: f64,
    pub target: f64,
}

impl CalorieReport {
    pub fn from_profile(profile: &Profile) -> Self {
        let bmr = compute_bmr(profile.weight, profile.height, profile.age, profile.gender);
        let multiplier = profile.activity.multiplier();
        Self {
            goal: profile.goal,
            bmr,
            tdee: bmr * multiplier,
            target: compute_target(bmr, multiplier, profile.goal),
        }
    }

    /// Target rounded to whole kilocalories for display. Halves go to the
    /// even neighbour, so 2000.5 shows as 2000.
    pub fn kcal(&self) -> i64 {
        self.target.round_ties_even() as i64
    }
}
