//! Core Error Types

use thiserror::Error;

use crate::session::SessionMode;

/// A collaborator (visuals, movement, UI) refused or failed an operation
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{collaborator} failed: {message}")]
pub struct StageError {
    pub collaborator: &'static str,
    pub message: String,
}

impl StageError {
    pub fn new(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self {
            collaborator,
            message: message.into(),
        }
    }
}

/// Media playback failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MediaError {
    /// The media resource could not be loaded; shown to the user
    #[error("Unable to load media: {0}")]
    Load(String),

    #[error("Media playback rejected: {0}")]
    PlaybackRejected(String),
}

impl MediaError {
    /// Whether the end user should see a notification for this failure
    pub fn is_user_visible(&self) -> bool {
        matches!(self, MediaError::Load(_))
    }
}

/// Errors raised while running a transition pipeline
#[derive(Error, Debug)]
pub enum TransitionError {
    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("Audio error: {0}")]
    Audio(#[from] hotspot_audio::AudioError),

    #[error("Pipeline step '{step}' failed: {reason}")]
    StepFailed { step: &'static str, reason: String },

    #[error("Event queue closed - orchestrator stopped")]
    QueueClosed,
}

/// Result type alias for pipeline and orchestrator operations
pub type TransitionResult<T> = Result<T, TransitionError>;

/// Result type alias for collaborator calls
pub type StageResult<T> = Result<T, StageError>;

/// An event arrived in a mode that does not accept it
///
/// Expected and frequent (duplicate triggers, frames during a fade); callers
/// drop it quietly.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{event} ignored while {mode}")]
pub struct GuardViolation {
    pub event: &'static str,
    pub mode: SessionMode,
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read or write config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine config directory")]
    NoConfigDir,
}
