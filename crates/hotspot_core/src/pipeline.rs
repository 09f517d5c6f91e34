//! Transition Pipelines
//!
//! The enter and exit sequences as data. Each enter step names the exit step
//! that undoes it, so a failed entry rolls back by running the exit pipeline
//! restricted to what was actually attempted:
//!
//! ```text
//!  Enter step              Compensated by
//!  ──────────────────────  ────────────────────────
//!  1 FadeOutAmbient        FadeInAmbient
//!  2 ShowMedia             ShowExplorationSurface
//!  3 StartPlayback         StopPlayback
//!  4 FadeInMedia           FadeOutMedia
//!  5 HideExplorationWorld  ShowExplorationWorld
//!  6 DisableMovement       EnableMovement
//!  7 ShowMediaUi           RestoreExplorationUi
//!  8 RegisterEndListener   StopPlayback
//!                          ResetLatches (always)
//! ```

use std::fmt;

/// One step of the enter pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnterStep {
    FadeOutAmbient,
    ShowMedia,
    StartPlayback,
    FadeInMedia,
    HideExplorationWorld,
    DisableMovement,
    /// Show exit affordance, hide overlay
    ShowMediaUi,
    RegisterEndListener,
}

impl EnterStep {
    pub const ORDER: [EnterStep; 8] = [
        EnterStep::FadeOutAmbient,
        EnterStep::ShowMedia,
        EnterStep::StartPlayback,
        EnterStep::FadeInMedia,
        EnterStep::HideExplorationWorld,
        EnterStep::DisableMovement,
        EnterStep::ShowMediaUi,
        EnterStep::RegisterEndListener,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EnterStep::FadeOutAmbient => "fade-out-ambient",
            EnterStep::ShowMedia => "show-media",
            EnterStep::StartPlayback => "start-playback",
            EnterStep::FadeInMedia => "fade-in-media",
            EnterStep::HideExplorationWorld => "hide-exploration-world",
            EnterStep::DisableMovement => "disable-movement",
            EnterStep::ShowMediaUi => "show-media-ui",
            EnterStep::RegisterEndListener => "register-end-listener",
        }
    }

    /// The exit step that undoes this one
    pub fn compensation(&self) -> ExitStep {
        match self {
            EnterStep::FadeOutAmbient => ExitStep::FadeInAmbient,
            EnterStep::ShowMedia => ExitStep::ShowExplorationSurface,
            EnterStep::StartPlayback => ExitStep::StopPlayback,
            EnterStep::FadeInMedia => ExitStep::FadeOutMedia,
            EnterStep::HideExplorationWorld => ExitStep::ShowExplorationWorld,
            EnterStep::DisableMovement => ExitStep::EnableMovement,
            EnterStep::ShowMediaUi => ExitStep::RestoreExplorationUi,
            EnterStep::RegisterEndListener => ExitStep::StopPlayback,
        }
    }
}

impl fmt::Display for EnterStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One step of the exit pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStep {
    FadeOutMedia,
    /// Pause, rewind and drop the end-of-playback listener
    StopPlayback,
    ShowExplorationSurface,
    ShowExplorationWorld,
    /// Skipped while an immersive session owns movement
    EnableMovement,
    /// Hide exit affordance, show overlay
    RestoreExplorationUi,
    ResetLatches,
    FadeInAmbient,
}

impl ExitStep {
    pub const ORDER: [ExitStep; 8] = [
        ExitStep::FadeOutMedia,
        ExitStep::StopPlayback,
        ExitStep::ShowExplorationSurface,
        ExitStep::ShowExplorationWorld,
        ExitStep::EnableMovement,
        ExitStep::RestoreExplorationUi,
        ExitStep::ResetLatches,
        ExitStep::FadeInAmbient,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ExitStep::FadeOutMedia => "fade-out-media",
            ExitStep::StopPlayback => "stop-playback",
            ExitStep::ShowExplorationSurface => "show-exploration-surface",
            ExitStep::ShowExplorationWorld => "show-exploration-world",
            ExitStep::EnableMovement => "enable-movement",
            ExitStep::RestoreExplorationUi => "restore-exploration-ui",
            ExitStep::ResetLatches => "reset-latches",
            ExitStep::FadeInAmbient => "fade-in-ambient",
        }
    }

    /// Runs on every rollback regardless of how far entry got
    pub fn is_unconditional(&self) -> bool {
        matches!(self, ExitStep::ResetLatches)
    }
}

impl fmt::Display for ExitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Exit steps that undo `attempted`, in exit order
///
/// `attempted` includes the step that failed, since it may have half-applied.
pub fn rollback_plan(attempted: &[EnterStep]) -> Vec<ExitStep> {
    ExitStep::ORDER
        .into_iter()
        .filter(|step| {
            step.is_unconditional() || attempted.iter().any(|enter| enter.compensation() == *step)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_enter_step_is_compensated() {
        for step in EnterStep::ORDER {
            assert!(ExitStep::ORDER.contains(&step.compensation()), "{}", step);
        }
    }

    #[test]
    fn test_full_rollback_is_full_exit() {
        assert_eq!(rollback_plan(&EnterStep::ORDER), ExitStep::ORDER.to_vec());
    }

    #[test]
    fn test_rollback_after_playback_failure() {
        let attempted = &EnterStep::ORDER[..3];
        assert_eq!(
            rollback_plan(attempted),
            vec![
                ExitStep::StopPlayback,
                ExitStep::ShowExplorationSurface,
                ExitStep::ResetLatches,
                ExitStep::FadeInAmbient,
            ]
        );
    }

    #[test]
    fn test_rollback_with_nothing_attempted() {
        assert_eq!(rollback_plan(&[]), vec![ExitStep::ResetLatches]);
    }

    #[test]
    fn test_step_names() {
        assert_eq!(EnterStep::StartPlayback.to_string(), "start-playback");
        assert_eq!(ExitStep::ResetLatches.to_string(), "reset-latches");
    }
}
