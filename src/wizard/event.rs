//! Wizard events and the parser that builds them from chat input.
//!
//! Text messages and button payloads are the only two shapes of user input
//! a channel delivers. Both are mapped here onto a single tagged union so the
//! engine can match exhaustively.

use serde::{Deserialize, Serialize};

use super::model::{ActivityLevel, Gender, Goal};

/// Button payload that begins a fresh calculation.
pub const START_ACTION: &str = "start_calc";
pub const HOME_ACTION: &str = "home";
pub const BACK_ACTION: &str = "back";

/// Something the user did in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Event {
    /// `/start` or the "start" button.
    Start,
    /// Free text typed by the user.
    Submit(String),
    ChooseGoal(Goal),
    ChooseGender(Gender),
    ChooseActivity(ActivityLevel),
    Back,
    Home,
}

/// Parses chat input into [`Event`]s.
pub struct EventParser;

impl EventParser {
    /// Parse a text message.
    pub fn parse_text(content: &str) -> Event {
        // `/start@bot_name` in groups, `/start <param>` from deep links.
        let word = content.split_whitespace().next().unwrap_or_default();
        let command = word.split('@').next().unwrap_or(word);
        if command.eq_ignore_ascii_case("/start") {
            Event::Start
        } else {
            Event::Submit(content.to_string())
        }
    }

    /// Parse a button payload. Unknown payloads yield `None`.
    pub fn parse_action(payload: &str) -> Option<Event> {
        match payload {
            START_ACTION => return Some(Event::Start),
            HOME_ACTION => return Some(Event::Home),
            BACK_ACTION => return Some(Event::Back),
            _ => {}
        }

        let (prefix, value) = payload.split_once('_')?;
        match prefix {
            "back" => Some(Event::Back),
            "goal" => Goal::from_code(value).map(Event::ChooseGoal),
            "gender" => Gender::from_code(value).map(Event::ChooseGender),
            "act" => ActivityLevel::from_code(value).map(Event::ChooseActivity),
            _ => None,
        }
    }
}

/// Button payload for a goal choice.
pub fn goal_action(goal: Goal) -> String {
    format!("goal_{}", goal.code())
}

/// Button payload for a gender choice.
pub fn gender_action(gender: Gender) -> String {
    format!("gender_{}", gender.code())
}

/// Button payload for an activity choice.
pub fn activity_action(level: ActivityLevel) -> String {
    format!("act_{}", level.code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_command() {
        assert_eq!(EventParser::parse_text("/start"), Event::Start);
        assert_eq!(EventParser::parse_text("  /START "), Event::Start);
        assert_eq!(EventParser::parse_text("/start@calorie_bot"), Event::Start);
    }

    #[test]
    fn start_with_deep_link_parameter() {
        assert_eq!(EventParser::parse_text("/start promo42"), Event::Start);
        assert_eq!(EventParser::parse_text("/start@calorie_bot ref"), Event::Start);
        assert_eq!(
            EventParser::parse_text("/starter"),
            Event::Submit("/starter".to_string())
        );
        assert_eq!(EventParser::parse_text(""), Event::Submit(String::new()));
    }

    #[test]
    fn other_text_is_submitted_verbatim() {
        assert_eq!(
            EventParser::parse_text(" 42 "),
            Event::Submit(" 42 ".to_string())
        );
        assert_eq!(
            EventParser::parse_text("/help"),
            Event::Submit("/help".to_string())
        );
    }

    #[test]
    fn navigation_actions() {
        assert_eq!(EventParser::parse_action("start_calc"), Some(Event::Start));
        assert_eq!(EventParser::parse_action("home"), Some(Event::Home));
        assert_eq!(EventParser::parse_action("back"), Some(Event::Back));
        assert_eq!(EventParser::parse_action("back_weight"), Some(Event::Back));
    }

    #[test]
    fn choice_actions_roundtrip_through_builders() {
        for goal in Goal::ALL {
            assert_eq!(
                EventParser::parse_action(&goal_action(goal)),
                Some(Event::ChooseGoal(goal))
            );
        }
        for gender in Gender::ALL {
            assert_eq!(
                EventParser::parse_action(&gender_action(gender)),
                Some(Event::ChooseGender(gender))
            );
        }
        for level in ActivityLevel::ALL {
            assert_eq!(
                EventParser::parse_action(&activity_action(level)),
                Some(Event::ChooseActivity(level))
            );
        }
    }

    #[test]
    fn unknown_actions_are_rejected() {
        assert_eq!(EventParser::parse_action(""), None);
        assert_eq!(EventParser::parse_action("goal_bulk"), None);
        assert_eq!(EventParser::parse_action("act_2.0"), None);
        assert_eq!(EventParser::parse_action("settings"), None);
    }

    #[test]
    fn event_serde_is_tagged() {
        let json = serde_json::to_value(Event::ChooseGoal(Goal::Gain)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "choose_goal", "value": "gain"}));
        let json = serde_json::to_value(Event::Back).unwrap();
        assert_eq!(json, serde_json::json!({"type": "back"}));
    }
}
