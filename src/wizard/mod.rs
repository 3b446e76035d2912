//! Calorie wizard: the step-by-step conversation that collects a profile.
//!
//! The user is walked through a fixed chain of steps (goal, gender, age,
//! height, weight, activity). Each answer is validated before the wizard
//! moves on; "back" rewinds one step and "home" starts over. When the last
//! answer arrives the daily calorie target is computed and the session goes
//! idle again.

pub mod engine;
pub mod event;
pub mod model;
pub mod prompts;
pub mod session;
pub mod step;

pub use engine::{Outcome, WizardEngine};
pub use event::{Event, EventParser};
pub use model::{ActivityLevel, Answer, Answers, Gender, Goal, Profile};
pub use session::{InMemorySessionStore, Session, SessionStore};
pub use step::{InputKind, STEPS, Step};
