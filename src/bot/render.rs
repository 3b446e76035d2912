//! Turns engine outcomes into chat responses.

use crate::channels::{Button, Keyboard, OutgoingResponse};
use crate::error::WizardError;
use crate::images::{ImageCatalog, RESULT_IMAGE, WELCOME_IMAGE};
use crate::nutrition::CalorieReport;
use crate::wizard::Outcome;
use crate::wizard::prompts::{self, Choice};
use crate::wizard::step::Step;

pub struct Renderer {
    images: ImageCatalog,
}

impl Renderer {
    pub fn new(images: ImageCatalog) -> Self {
        Self { images }
    }

    /// Greeting plus the "start" button, shown before any wizard runs.
    pub async fn welcome(&self) -> Vec<OutgoingResponse> {
        vec![
            self.greeting().await,
            OutgoingResponse::text(prompts::START_HINT)
                .with_keyboard(keyboard(vec![prompts::start_choice()], 1)),
        ]
    }

    pub async fn outcome(&self, outcome: &Outcome) -> Vec<OutgoingResponse> {
        match outcome {
            Outcome::Prompt { step, restarted } => {
                let mut responses = Vec::with_capacity(2);
                if *restarted {
                    responses.push(self.greeting().await);
                }
                responses.push(self.step_prompt(*step).await);
                responses
            }
            Outcome::Completed(report) => self.result(report).await,
        }
    }

    pub async fn rejection(&self, err: &WizardError) -> Vec<OutgoingResponse> {
        match err {
            WizardError::Validation(v) => vec![
                OutgoingResponse::text(format!(
                    "{}\n\n{}",
                    prompts::invalid_input_hint(v.step),
                    prompts::question(v.step)
                ))
                .with_keyboard(step_keyboard(v.step)),
            ],
            WizardError::NotStarted => self.welcome().await,
            WizardError::IncompleteProfile { .. } | WizardError::Store(_) => vec![
                OutgoingResponse::text(prompts::FAILURE_TEXT)
                    .with_keyboard(keyboard(vec![prompts::start_choice()], 1)),
            ],
        }
    }

    /// Question for `step` with its illustration and buttons.
    pub async fn step_prompt(&self, step: Step) -> OutgoingResponse {
        OutgoingResponse::text(prompts::question(step))
            .with_image(self.images.lookup(step.key()).await)
            .with_keyboard(step_keyboard(step))
    }

    async fn greeting(&self) -> OutgoingResponse {
        match self.images.lookup(WELCOME_IMAGE).await {
            Some(image) => OutgoingResponse::text(prompts::WELCOME_CAPTION).with_image(Some(image)),
            None => OutgoingResponse::text(prompts::WELCOME_TEXT),
        }
    }

    async fn result(&self, report: &CalorieReport) -> Vec<OutgoingResponse> {
        vec![
            OutgoingResponse::text(prompts::result_text(report))
                .with_image(self.images.lookup(RESULT_IMAGE).await),
            OutgoingResponse::text(prompts::NEXT_ACTION)
                .with_keyboard(keyboard(prompts::after_result(), 1)),
        ]
    }
}

fn keyboard(choices: Vec<Choice>, per_row: usize) -> Keyboard {
    Keyboard::new().grid(to_buttons(choices), per_row)
}

fn to_buttons(choices: Vec<Choice>) -> Vec<Button> {
    choices
        .into_iter()
        .map(|(label, action)| Button::new(label, action))
        .collect()
}

/// Answer buttons for the step followed by back/home.
fn step_keyboard(step: Step) -> Keyboard {
    let (choices, per_row) = prompts::choices(step);
    Keyboard::new()
        .grid(to_buttons(choices), per_row)
        .row(to_buttons(prompts::navigation()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::wizard::model::Goal;

    fn actions(response: &OutgoingResponse) -> Vec<String> {
        response
            .keyboard
            .as_ref()
            .map(|kb| kb.buttons().map(|b| b.action.clone()).collect())
            .unwrap_or_default()
    }

    fn renderer_without_images() -> (Renderer, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (Renderer::new(ImageCatalog::new(dir.path())), dir)
    }

    #[tokio::test]
    async fn welcome_without_image_uses_short_text() {
        let (renderer, _dir) = renderer_without_images();
        let responses = renderer.welcome().await;
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].content, prompts::WELCOME_TEXT);
        assert!(responses[0].image.is_none());
        assert_eq!(actions(&responses[1]), vec!["start_calc"]);
    }

    #[tokio::test]
    async fn welcome_with_image_uses_caption() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("welcome.jpg"), b"jpg").unwrap();
        let renderer = Renderer::new(ImageCatalog::new(dir.path()));

        let responses = renderer.welcome().await;
        assert_eq!(responses[0].content, prompts::WELCOME_CAPTION);
        assert_eq!(responses[0].image.as_ref().unwrap().key, "welcome");
    }

    #[tokio::test]
    async fn restarted_prompt_greets_first() {
        let (renderer, _dir) = renderer_without_images();
        let responses = renderer
            .outcome(&Outcome::Prompt {
                step: Step::Goal,
                restarted: true,
            })
            .await;
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[1].content, prompts::question(Step::Goal));
        assert_eq!(
            actions(&responses[1]),
            vec!["goal_loss", "goal_maintain", "goal_gain", "back", "home"]
        );
    }

    #[tokio::test]
    async fn numeric_step_only_has_navigation() {
        let (renderer, _dir) = renderer_without_images();
        let response = renderer.step_prompt(Step::Height).await;
        assert_eq!(actions(&response), vec!["back", "home"]);
    }

    #[tokio::test]
    async fn activity_buttons_are_two_per_row() {
        let (renderer, _dir) = renderer_without_images();
        let response = renderer.step_prompt(Step::Activity).await;
        let sizes: Vec<usize> = response
            .keyboard
            .unwrap()
            .rows
            .iter()
            .map(Vec::len)
            .collect();
        assert_eq!(sizes, vec![2, 2, 1, 2]);
    }

    #[tokio::test]
    async fn completed_shows_result_then_options() {
        let (renderer, _dir) = renderer_without_images();
        let report = CalorieReport {
            goal: Goal::Maintain,
            bmr: 1500.0,
            tdee: 1800.0,
            target: 1800.0,
        };
        let responses = renderer.outcome(&Outcome::Completed(report)).await;
        assert_eq!(responses.len(), 2);
        assert!(responses[0].content.contains("1800 ккал"));
        assert_eq!(actions(&responses[1]), vec!["start_calc", "home"]);
    }

    #[tokio::test]
    async fn validation_error_reprompts_same_step() {
        let (renderer, _dir) = renderer_without_images();
        let err = WizardError::Validation(ValidationError {
            step: Step::Age,
            raw_input: "abc".into(),
        });
        let responses = renderer.rejection(&err).await;
        assert_eq!(responses.len(), 1);
        assert!(responses[0].content.contains(prompts::question(Step::Age)));
        assert!(responses[0].image.is_none());
    }

    #[tokio::test]
    async fn not_started_shows_welcome() {
        let (renderer, _dir) = renderer_without_images();
        let responses = renderer.rejection(&WizardError::NotStarted).await;
        assert_eq!(actions(responses.last().unwrap()), vec!["start_calc"]);
    }
}
