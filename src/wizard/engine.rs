//! WizardEngine: drives one session at a time through the step chain.
//!
//! Every operation is a read-modify-write of a single session performed under
//! that session's lock, so duplicate events for the same conversation (a
//! double-tapped button, say) are applied one after the other. Different
//! sessions never contend.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info};

use super::event::Event;
use super::model::Answer;
use super::session::{Session, SessionStore};
use super::step::Step;
use crate::error::{ValidationError, WizardError};
use crate::nutrition::CalorieReport;

/// What the engine wants shown to the user after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Ask the question for `step`. `restarted` is set when the wizard was
    /// just (re)started, so the caller can show its welcome screen first.
    Prompt { step: Step, restarted: bool },
    /// The last answer was collected; the session is idle again.
    Completed(CalorieReport),
}

impl Outcome {
    /// The step the session is now waiting on, if any.
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::Prompt { step, .. } => Some(*step),
            Self::Completed(_) => None,
        }
    }
}

/// The wizard state machine.
pub struct WizardEngine {
    store: Arc<dyn SessionStore>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl WizardEngine {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Route an event to the matching operation.
    pub async fn dispatch(&self, session_id: &str, event: Event) -> Result<Outcome, WizardError> {
        match event {
            Event::Start => self.start(session_id).await,
            Event::Home => self.home(session_id).await,
            Event::Back => self.back(session_id).await,
            Event::Submit(text) => self.submit(session_id, &text).await,
            Event::ChooseGoal(goal) => self.choose(session_id, Answer::Goal(goal)).await,
            Event::ChooseGender(gender) => self.choose(session_id, Answer::Gender(gender)).await,
            Event::ChooseActivity(level) => {
                self.choose(session_id, Answer::Activity(level)).await
            }
        }
    }

    /// Clear the session and ask the first question. Safe from any state.
    pub async fn start(&self, session_id: &str) -> Result<Outcome, WizardError> {
        let _guard = self.lock(session_id).await;
        let mut session = self.store.get(session_id).await?;
        self.restart(&mut session).await
    }

    /// Same as [`start`](Self::start).
    pub async fn home(&self, session_id: &str) -> Result<Outcome, WizardError> {
        self.start(session_id).await
    }

    /// Validate free text against the current step and advance on success.
    pub async fn submit(&self, session_id: &str, raw_input: &str) -> Result<Outcome, WizardError> {
        let _guard = self.lock(session_id).await;
        let mut session = self.store.get(session_id).await?;
        let step = session.current_step.ok_or(WizardError::NotStarted)?;

        let answer = step.parse(raw_input).inspect_err(|e| {
            debug!(session_id, step = %e.step, "Rejected input");
        })?;
        self.advance(&mut session, answer).await
    }

    /// Apply an already-typed answer from a button press.
    ///
    /// The answer must belong to the current step; a button left over from an
    /// earlier prompt is rejected like invalid text.
    pub async fn choose(&self, session_id: &str, answer: Answer) -> Result<Outcome, WizardError> {
        let _guard = self.lock(session_id).await;
        let mut session = self.store.get(session_id).await?;
        let step = session.current_step.ok_or(WizardError::NotStarted)?;

        if answer.step() != step {
            debug!(session_id, %step, answered = %answer.step(), "Stale choice ignored");
            return Err(ValidationError {
                step,
                raw_input: answer_code(&answer),
            }
            .into());
        }
        self.advance(&mut session, answer).await
    }

    /// Go to the previous step, keeping its answer for re-collection.
    /// From the first step or while idle this starts over.
    pub async fn back(&self, session_id: &str) -> Result<Outcome, WizardError> {
        let _guard = self.lock(session_id).await;
        let mut session = self.store.get(session_id).await?;

        let Some(previous) = session.current_step.and_then(|s| s.predecessor()) else {
            return self.restart(&mut session).await;
        };

        debug!(
            session_id,
            from = ?session.current_step,
            to = %previous,
            "Stepping back"
        );
        session.current_step = Some(previous);
        session.touch();
        self.persist(&session).await?;

        Ok(Outcome::Prompt {
            step: previous,
            restarted: false,
        })
    }

    /// The step a session is waiting on, `None` when idle.
    pub async fn current_step(&self, session_id: &str) -> Result<Option<Step>, WizardError> {
        let _guard = self.lock(session_id).await;
        Ok(self.store.get(session_id).await?.current_step)
    }

    /// Drop a session and its lock entirely.
    pub async fn evict(&self, session_id: &str) -> Result<(), WizardError> {
        let _guard = self.lock(session_id).await;
        self.store.delete(session_id).await?;
        self.locks.lock().await.remove(session_id);
        debug!(session_id, "Session evicted");
        Ok(())
    }

    async fn lock(&self, session_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(session_id.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Save after a transition. Every step before the current one must
    /// already be answered.
    async fn persist(&self, session: &Session) -> Result<(), WizardError> {
        debug_assert!(
            session.is_consistent(),
            "session {} at {:?} is missing earlier answers",
            session.session_id,
            session.current_step
        );
        self.store.save(session).await?;
        Ok(())
    }

    async fn restart(&self, session: &mut Session) -> Result<Outcome, WizardError> {
        session.restart();
        self.persist(session).await?;
        debug!(session_id = %session.session_id, "Wizard started");
        Ok(Outcome::Prompt {
            step: Step::first(),
            restarted: true,
        })
    }

    async fn advance(&self, session: &mut Session, answer: Answer) -> Result<Outcome, WizardError> {
        let from = answer.step();
        session.answers.record(answer);

        if let Some(next) = from.successor() {
            session.current_step = Some(next);
            session.touch();
            self.persist(session).await?;
            debug!(session_id = %session.session_id, %from, to = %next, "Step completed");
            return Ok(Outcome::Prompt {
                step: next,
                restarted: false,
            });
        }

        let profile = session.answers.to_profile();
        session.reset();
        self.persist(session).await?;

        match profile {
            Ok(profile) => {
                let report = CalorieReport::from_profile(&profile);
                info!(
                    session_id = %session.session_id,
                    goal = %report.goal,
                    kcal = report.kcal(),
                    "Wizard completed"
                );
                Ok(Outcome::Completed(report))
            }
            Err(missing) => {
                error!(
                    session_id = %session.session_id,
                    %missing,
                    "Reached the last step without a complete profile"
                );
                Err(WizardError::IncompleteProfile { missing })
            }
        }
    }
}

fn answer_code(answer: &Answer) -> String {
    match answer {
        Answer::Goal(goal) => goal.code().to_string(),
        Answer::Gender(gender) => gender.code().to_string(),
        Answer::Age(age) => age.to_string(),
        Answer::Height(v) | Answer::Weight(v) => v.to_string(),
        Answer::Activity(level) => level.code().to_string(),
    }
}
