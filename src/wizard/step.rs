//! The step chain: an ordered table of step descriptors.
//!
//! Navigation is a lookup in [`STEPS`]: the predecessor of a step is the
//! entry before it, the successor the entry after it. Adding or reordering a
//! step is a change to the table only.

use serde::{Deserialize, Serialize};

use super::model::{ActivityLevel, Answer, Gender, Goal};
use crate::error::ValidationError;

/// One stage of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Goal,
    Gender,
    Age,
    Height,
    Weight,
    Activity,
}

/// How the user provides the answer for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Picked from a fixed set of buttons.
    Choice,
    /// Typed as a number.
    Numeric,
}

/// Static description of a step.
pub struct StepDescriptor {
    pub step: Step,
    /// Prompt identifier; also the image key.
    pub key: &'static str,
    pub kind: InputKind,
    parse: fn(&str) -> Option<Answer>,
}

/// The wizard, in order.
pub static STEPS: [StepDescriptor; 6] = [
    StepDescriptor {
        step: Step::Goal,
        key: "goal",
        kind: InputKind::Choice,
        parse: parse_goal,
    },
    StepDescriptor {
        step: Step::Gender,
        key: "gender",
        kind: InputKind::Choice,
        parse: parse_gender,
    },
    StepDescriptor {
        step: Step::Age,
        key: "age",
        kind: InputKind::Numeric,
        parse: parse_age,
    },
    StepDescriptor {
        step: Step::Height,
        key: "height",
        kind: InputKind::Numeric,
        parse: parse_height,
    },
    StepDescriptor {
        step: Step::Weight,
        key: "weight",
        kind: InputKind::Numeric,
        parse: parse_weight,
    },
    StepDescriptor {
        step: Step::Activity,
        key: "activity",
        kind: InputKind::Choice,
        parse: parse_activity,
    },
];

impl Step {
    pub fn first() -> Step {
        STEPS[0].step
    }

    fn index(&self) -> usize {
        // The table holds every variant exactly once.
        STEPS
            .iter()
            .position(|d| d.step == *self)
            .unwrap_or_default()
    }

    pub fn descriptor(&self) -> &'static StepDescriptor {
        &STEPS[self.index()]
    }

    pub fn key(&self) -> &'static str {
        self.descriptor().key
    }

    pub fn kind(&self) -> InputKind {
        self.descriptor().kind
    }

    /// The step before this one, if any.
    pub fn predecessor(&self) -> Option<Step> {
        self.index().checked_sub(1).map(|i| STEPS[i].step)
    }

    /// The step after this one, if any.
    pub fn successor(&self) -> Option<Step> {
        STEPS.get(self.index() + 1).map(|d| d.step)
    }

    /// Steps strictly before this one.
    pub fn preceding(&self) -> impl Iterator<Item = Step> {
        STEPS[..self.index()].iter().map(|d| d.step)
    }

    /// Validate raw user input for this step.
    pub fn parse(&self, raw_input: &str) -> Result<Answer, ValidationError> {
        (self.descriptor().parse)(raw_input.trim()).ok_or_else(|| ValidationError {
            step: *self,
            raw_input: raw_input.to_string(),
        })
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

fn parse_goal(s: &str) -> Option<Answer> {
    Goal::from_code(s).map(Answer::Goal)
}

fn parse_gender(s: &str) -> Option<Answer> {
    Gender::from_code(s).map(Answer::Gender)
}

fn parse_age(s: &str) -> Option<Answer> {
    parse_whole_number(s).map(Answer::Age)
}

fn parse_height(s: &str) -> Option<Answer> {
    parse_decimal(s).map(Answer::Height)
}

fn parse_weight(s: &str) -> Option<Answer> {
    parse_decimal(s).map(Answer::Weight)
}

fn parse_activity(s: &str) -> Option<Answer> {
    ActivityLevel::from_code(s).map(Answer::Activity)
}

/// Base-10 digits only, no sign.
fn parse_whole_number(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Digits with at most one `.` or `,` separator.
fn parse_decimal(s: &str) -> Option<f64> {
    let mut separators = 0;
    let mut digits = 0;
    for b in s.bytes() {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' | b',' => separators += 1,
            _ => return None,
        }
    }
    if digits == 0 || separators > 1 {
        return None;
    }
    s.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_is_linear() {
        let expected = [
            Step::Goal,
            Step::Gender,
            Step::Age,
            Step::Height,
            Step::Weight,
            Step::Activity,
        ];
        let mut current = Step::first();
        for next in &expected[1..] {
            assert_eq!(current.successor(), Some(*next));
            assert_eq!(next.predecessor(), Some(current));
            current = *next;
        }
        assert_eq!(Step::Activity.successor(), None);
        assert_eq!(Step::Goal.predecessor(), None);
    }

    #[test]
    fn preceding_lists_earlier_steps() {
        let before: Vec<Step> = Step::Height.preceding().collect();
        assert_eq!(before, vec![Step::Goal, Step::Gender, Step::Age]);
        assert_eq!(Step::Goal.preceding().count(), 0);
    }

    #[test]
    fn display_matches_serde() {
        for d in &STEPS {
            let json = serde_json::to_string(&d.step).unwrap();
            assert_eq!(format!("\"{}\"", d.step), json);
        }
    }

    #[test]
    fn input_kinds() {
        assert_eq!(Step::Goal.kind(), InputKind::Choice);
        assert_eq!(Step::Age.kind(), InputKind::Numeric);
        assert_eq!(Step::Weight.kind(), InputKind::Numeric);
        assert_eq!(Step::Activity.kind(), InputKind::Choice);
    }

    #[test]
    fn age_accepts_digits_only() {
        assert_eq!(Step::Age.parse("30").unwrap(), Answer::Age(30));
        assert_eq!(Step::Age.parse(" 0 ").unwrap(), Answer::Age(0));
        for bad in ["", "abc", "-5", "30.5", "+30", "3 0", "99999999999"] {
            let err = Step::Age.parse(bad).unwrap_err();
            assert_eq!(err.step, Step::Age);
            assert_eq!(err.raw_input, bad);
        }
    }

    #[test]
    fn decimals_accept_one_separator() {
        assert_eq!(Step::Height.parse("180").unwrap(), Answer::Height(180.0));
        assert_eq!(Step::Height.parse("180.5").unwrap(), Answer::Height(180.5));
        assert_eq!(Step::Weight.parse("72,3").unwrap(), Answer::Weight(72.3));
        assert_eq!(Step::Weight.parse(".5").unwrap(), Answer::Weight(0.5));
        assert_eq!(Step::Weight.parse("5.").unwrap(), Answer::Weight(5.0));
        for bad in [".", "1.2.3", "1,2.3", "-70", "70kg", "1e3", ""] {
            assert!(Step::Weight.parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn choice_steps_accept_codes() {
        assert_eq!(Step::Goal.parse("loss").unwrap(), Answer::Goal(Goal::Loss));
        assert_eq!(
            Step::Gender.parse("Female").unwrap(),
            Answer::Gender(Gender::Female)
        );
        assert_eq!(
            Step::Activity.parse("1.725").unwrap(),
            Answer::Activity(ActivityLevel::High)
        );
        assert!(Step::Goal.parse("male").is_err());
        assert!(Step::Activity.parse("2").is_err());
    }

    #[test]
    fn parsed_answer_belongs_to_its_step() {
        let inputs = ["gain", "male", "40", "170", "65", "1.2"];
        for (d, input) in STEPS.iter().zip(inputs) {
            assert_eq!(d.step.parse(input).unwrap().step(), d.step);
        }
    }
}
