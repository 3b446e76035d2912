//! Answer types collected by the wizard.

use serde::{Deserialize, Serialize};

use super::step::Step;

/// What the user wants to do with their weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Loss,
    Maintain,
    Gain,
}

impl Goal {
    pub const ALL: [Goal; 3] = [Goal::Loss, Goal::Maintain, Goal::Gain];

    /// Wire code used in button payloads and free-text input.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Loss => "loss",
            Self::Maintain => "maintain",
            Self::Gain => "gain",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|g| g.code().eq_ignore_ascii_case(code))
    }
}

impl std::fmt::Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|g| g.code().eq_ignore_ascii_case(code))
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Physical activity level. Each level maps to a fixed TDEE multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Office work, little movement.
    Sedentary,
    /// Housework, light walking.
    Light,
    /// 3-5 workouts a week.
    Moderate,
    /// 6-7 workouts a week.
    High,
    /// Physical labour plus training.
    VeryHigh,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::High,
        ActivityLevel::VeryHigh,
    ];

    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::Light => 1.375,
            Self::Moderate => 1.55,
            Self::High => 1.725,
            Self::VeryHigh => 1.9,
        }
    }

    /// The multiplier as it appears in button payloads, e.g. `"1.375"`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sedentary => "1.2",
            Self::Light => "1.375",
            Self::Moderate => "1.55",
            Self::High => "1.725",
            Self::VeryHigh => "1.9",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.code() == code)
    }
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A single validated answer, tagged by the step that collects it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Answer {
    Goal(Goal),
    Gender(Gender),
    Age(u32),
    Height(f64),
    Weight(f64),
    Activity(ActivityLevel),
}

impl Answer {
    pub fn step(&self) -> Step {
        match self {
            Self::Goal(_) => Step::Goal,
            Self::Gender(_) => Step::Gender,
            Self::Age(_) => Step::Age,
            Self::Height(_) => Step::Height,
            Self::Weight(_) => Step::Weight,
            Self::Activity(_) => Step::Activity,
        }
    }
}

/// Partially filled answers for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Answers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<Goal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// Centimetres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Kilograms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<ActivityLevel>,
}

impl Answers {
    /// Store an answer, overwriting whatever an earlier pass left there.
    pub fn record(&mut self, answer: Answer) {
        match answer {
            Answer::Goal(v) => self.goal = Some(v),
            Answer::Gender(v) => self.gender = Some(v),
            Answer::Age(v) => self.age = Some(v),
            Answer::Height(v) => self.height = Some(v),
            Answer::Weight(v) => self.weight = Some(v),
            Answer::Activity(v) => self.activity = Some(v),
        }
    }

    /// Whether the answer for `step` is present.
    pub fn has(&self, step: Step) -> bool {
        match step {
            Step::Goal => self.goal.is_some(),
            Step::Gender => self.gender.is_some(),
            Step::Age => self.age.is_some(),
            Step::Height => self.height.is_some(),
            Step::Weight => self.weight.is_some(),
            Step::Activity => self.activity.is_some(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Freeze into a complete profile. Returns the first missing step.
    pub fn to_profile(&self) -> Result<Profile, Step> {
        Ok(Profile {
            goal: self.goal.ok_or(Step::Goal)?,
            gender: self.gender.ok_or(Step::Gender)?,
            age: self.age.ok_or(Step::Age)?,
            height: self.height.ok_or(Step::Height)?,
            weight: self.weight.ok_or(Step::Weight)?,
            activity: self.activity.ok_or(Step::Activity)?,
        })
    }
}

/// Fully collected answers: the calculator's input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub goal: Goal,
    pub gender: Gender,
    pub age: u32,
    pub height: f64,
    pub weight: f64,
    pub activity: ActivityLevel,
}
