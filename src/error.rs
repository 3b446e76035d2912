//! Error types for the calorie wizard.

use crate::wizard::step::Step;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Session store error: {0}")]
    Store(#[from] StoreError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("No channel named {0}")]
    UnknownChannel(String),
}

/// Session storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Session backend unavailable: {0}")]
    Unavailable(String),
}

/// Input that does not satisfy the current step's validator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid input for step {step}: {raw_input:?}")]
pub struct ValidationError {
    pub step: Step,
    pub raw_input: String,
}

/// Errors produced by the wizard engine.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    /// Rejected input; the session stays on the same step.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An answer arrived for a session with no wizard in progress.
    #[error("No wizard in progress")]
    NotStarted,

    /// The final step completed without every answer present.
    #[error("Profile incomplete at completion, missing {missing}")]
    IncompleteProfile { missing: Step },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WizardError {
    /// Whether the user can recover by sending another event.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotStarted)
    }
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display_names_step() {
        let err = ValidationError {
            step: Step::Age,
            raw_input: "abc".into(),
        };
        assert_eq!(err.to_string(), "Invalid input for step age: \"abc\"");
    }

    #[test]
    fn recoverable_errors() {
        let validation = WizardError::from(ValidationError {
            step: Step::Height,
            raw_input: "x".into(),
        });
        assert!(validation.is_recoverable());
        assert!(WizardError::NotStarted.is_recoverable());
        assert!(
            !WizardError::IncompleteProfile {
                missing: Step::Weight
            }
            .is_recoverable()
        );
        assert!(!WizardError::Store(StoreError::Unavailable("down".into())).is_recoverable());
    }

    #[test]
    fn wizard_error_wraps_into_top_level() {
        let err: Error = WizardError::NotStarted.into();
        assert_eq!(err.to_string(), "Wizard error: No wizard in progress");
    }
}
