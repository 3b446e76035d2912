//! User-facing texts and button labels for the wizard.

use super::event::{
    BACK_ACTION, HOME_ACTION, START_ACTION, activity_action, gender_action, goal_action,
};
use super::model::{ActivityLevel, Gender, Goal};
use super::step::{InputKind, Step};
use crate::nutrition::CalorieReport;

/// Caption under the welcome image.
pub const WELCOME_CAPTION: &str = "Вітаю в моєму телеграм-боті. Тут ти зможеш підрахувати кількість калорій та отримувати актуальні новини та поради";

/// Shorter greeting used when no welcome image is available.
pub const WELCOME_TEXT: &str = "Вітаю в боті! Тут ти зможеш підрахувати калорії та отримувати новини.";

pub const START_HINT: &str = "Натисни кнопку, щоб розпочати:";
pub const NEXT_ACTION: &str = "Що бажаєте далі?";
pub const FAILURE_TEXT: &str = "Щось пішло не так. Спробуйте почати спочатку.";

pub const START_LABEL: &str = "🚀 Почнемо";
pub const AGAIN_LABEL: &str = "🔄 Порахувати ще раз";
pub const BACK_LABEL: &str = "⬅️ Назад";
pub const HOME_LABEL: &str = "🏠 На початок";

/// A button as (label, payload).
pub type Choice = (&'static str, String);

/// The question asked at `step`.
pub fn question(step: Step) -> &'static str {
    match step {
        Step::Goal => "Яка Ваша ціль?",
        Step::Gender => "Оберіть стать:",
        Step::Age => "Скільки Вам років?",
        Step::Height => "Який Ваш зріст (см)?",
        Step::Weight => "Яка Ваша вага (кг)?",
        Step::Activity => "Оцініть свій рівень активності:",
    }
}

pub fn goal_label(goal: Goal) -> &'static str {
    match goal {
        Goal::Loss => "Схуднути",
        Goal::Maintain => "Норма калорій",
        Goal::Gain => "Набрати",
    }
}

pub fn gender_label(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "Чоловік",
        Gender::Female => "Жінка",
    }
}

pub fn activity_label(level: ActivityLevel) -> &'static str {
    match level {
        ActivityLevel::Sedentary => "Малорухливий (офісна робота)",
        ActivityLevel::Light => "Легка (справи по дому)",
        ActivityLevel::Moderate => "Помірна (3–5 тренувань/тиждень)",
        ActivityLevel::High => "Висока (6–7 тренувань/тиждень)",
        ActivityLevel::VeryHigh => "Дуже висока (фізична робота + тренування)",
    }
}

/// Answer buttons for a choice step, with how many go on one row.
/// Numeric steps have none.
pub fn choices(step: Step) -> (Vec<Choice>, usize) {
    match step {
        Step::Goal => (
            Goal::ALL
                .into_iter()
                .map(|g| (goal_label(g), goal_action(g)))
                .collect(),
            1,
        ),
        Step::Gender => (
            Gender::ALL
                .into_iter()
                .map(|g| (gender_label(g), gender_action(g)))
                .collect(),
            2,
        ),
        Step::Activity => (
            ActivityLevel::ALL
                .into_iter()
                .map(|a| (activity_label(a), activity_action(a)))
                .collect(),
            2,
        ),
        Step::Age | Step::Height | Step::Weight => (Vec::new(), 1),
    }
}

/// Navigation buttons shown under every step.
pub fn navigation() -> Vec<Choice> {
    vec![
        (BACK_LABEL, BACK_ACTION.to_string()),
        (HOME_LABEL, HOME_ACTION.to_string()),
    ]
}

pub fn start_choice() -> Choice {
    (START_LABEL, START_ACTION.to_string())
}

/// Buttons offered after a result.
pub fn after_result() -> Vec<Choice> {
    vec![
        (AGAIN_LABEL, START_ACTION.to_string()),
        (HOME_LABEL, HOME_ACTION.to_string()),
    ]
}

/// Explains why input was rejected at `step`.
pub fn invalid_input_hint(step: Step) -> &'static str {
    match (step.kind(), step) {
        (InputKind::Numeric, Step::Age) => "Введіть вік цілим числом, наприклад 30.",
        (InputKind::Numeric, _) => "Введіть число, наприклад 72.5.",
        (InputKind::Choice, _) => "Оберіть один із варіантів нижче.",
    }
}

fn purpose(goal: Goal) -> &'static str {
    match goal {
        Goal::Loss => "для схуднення",
        Goal::Maintain => "для підтримки",
        Goal::Gain => "для набору",
    }
}

/// The final message with the daily target.
pub fn result_text(report: &CalorieReport) -> String {
    format!(
        "Ваша добова норма {}: {} ккал.",
        purpose(report.goal),
        report.kcal()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::event::{Event, EventParser};
    use crate::wizard::step::STEPS;

    #[test]
    fn every_step_has_a_question() {
        for d in &STEPS {
            assert!(!question(d.step).is_empty());
        }
    }

    #[test]
    fn choice_buttons_parse_back_to_events() {
        for d in &STEPS {
            let (buttons, per_row) = choices(d.step);
            assert!(per_row >= 1);
            match d.kind {
                InputKind::Choice => assert!(!buttons.is_empty(), "{} has no buttons", d.step),
                InputKind::Numeric => assert!(buttons.is_empty()),
            }
            for (_, action) in buttons {
                let event = EventParser::parse_action(&action).unwrap();
                assert!(matches!(
                    event,
                    Event::ChooseGoal(_) | Event::ChooseGender(_) | Event::ChooseActivity(_)
                ));
            }
        }
    }

    #[test]
    fn navigation_buttons_parse() {
        let actions: Vec<Event> = navigation()
            .into_iter()
            .chain(after_result())
            .map(|(_, a)| EventParser::parse_action(&a).unwrap())
            .collect();
        assert_eq!(actions, vec![Event::Back, Event::Home, Event::Start, Event::Home]);
    }

    #[test]
    fn result_text_rounds_and_names_goal() {
        let report = CalorieReport {
            goal: Goal::Loss,
            bmr: 1781.6,
            tdee: 2761.48,
            target: 2261.48,
        };
        assert_eq!(result_text(&report), "Ваша добова норма для схуднення: 2261 ккал.");

        let report = CalorieReport {
            goal: Goal::Gain,
            target: 2056.04,
            ..report
        };
        assert_eq!(result_text(&report), "Ваша добова норма для набору: 2056 ккал.");
    }

    #[test]
    fn hints_differ_by_kind() {
        assert_ne!(invalid_input_hint(Step::Age), invalid_input_hint(Step::Weight));
        assert_eq!(
            invalid_input_hint(Step::Goal),
            invalid_input_hint(Step::Activity)
        );
    }
}
