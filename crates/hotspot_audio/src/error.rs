//! Audio Error Types

use thiserror::Error;

/// Errors that can occur while driving audio channels
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    /// Host policy refused to start playback without a user gesture.
    /// Non-fatal: fades keep ramping the volume regardless.
    #[error("Playback start blocked by autoplay policy: {0}")]
    AutoplayBlocked(String),

    #[error("Invalid volume: {0} (must be 0.0-1.0)")]
    InvalidVolume(f32),
}

/// Result type alias for audio operations
pub type AudioResult<T> = Result<T, AudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AudioError::AutoplayBlocked("no user gesture".into());
        assert!(err.to_string().contains("autoplay"));
        assert!(err.to_string().contains("no user gesture"));

        let err = AudioError::InvalidVolume(1.5);
        assert!(err.to_string().contains("1.5"));
    }
}
