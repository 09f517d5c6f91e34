//! Session State
//!
//! The single mutable record of which presentation mode the experience is in.
//! Only the orchestrator writes it; everyone else reads published snapshots
//! through a `SessionHandle`.
//!
//! ```text
//!            trigger                 pipeline ok
//! Exploring ─────────▶ EnteringMedia ───────────▶ MediaActive
//!     ▲                     │ step failed              │ ended / user exit
//!     │                     ▼                          ▼
//!     └──────────────── ExitingMedia ◀─────────────────┘
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::GuardViolation;
use crate::event::TriggerSource;

/// Presentation mode of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    #[default]
    Exploring,
    EnteringMedia,
    MediaActive,
    ExitingMedia,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Exploring => "exploring",
            SessionMode::EnteringMedia => "entering-media",
            SessionMode::MediaActive => "media-active",
            SessionMode::ExitingMedia => "exiting-media",
        }
    }

    /// Whether a pipeline is currently running
    pub fn is_transitioning(&self) -> bool {
        matches!(self, SessionMode::EnteringMedia | SessionMode::ExitingMedia)
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owned session record, mutated only by the orchestrator
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    mode: SessionMode,
    pending_trigger: Option<TriggerSource>,
    immersive: bool,
    media_session: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Source of the trigger that started (or is running) the current media session
    pub fn pending_trigger(&self) -> Option<&TriggerSource> {
        self.pending_trigger.as_ref()
    }

    /// Whether a tracked (XR) presentation is active
    pub fn is_immersive(&self) -> bool {
        self.immersive
    }

    pub fn set_immersive(&mut self, immersive: bool) {
        self.immersive = immersive;
    }

    /// Generation of the latest media session; bumped on every accepted entry
    pub fn media_session(&self) -> u64 {
        self.media_session
    }

    /// Guarded `Exploring → EnteringMedia`
    ///
    /// Runs synchronously, before any pipeline step is awaited, so duplicate
    /// triggers in the same tick see the new mode and are rejected.
    pub fn try_begin_entry(&mut self, source: TriggerSource) -> Result<u64, GuardViolation> {
        if self.mode != SessionMode::Exploring {
            return Err(GuardViolation {
                event: "trigger",
                mode: self.mode,
            });
        }
        self.mode = SessionMode::EnteringMedia;
        self.pending_trigger = Some(source);
        self.media_session += 1;
        Ok(self.media_session)
    }

    /// `EnteringMedia → MediaActive`
    pub fn complete_entry(&mut self) {
        debug_assert_eq!(self.mode, SessionMode::EnteringMedia);
        self.mode = SessionMode::MediaActive;
    }

    /// Guarded `MediaActive → ExitingMedia`
    pub fn try_begin_exit(&mut self, event: &'static str) -> Result<(), GuardViolation> {
        if self.mode != SessionMode::MediaActive {
            return Err(GuardViolation { event, mode: self.mode });
        }
        self.mode = SessionMode::ExitingMedia;
        Ok(())
    }

    /// `EnteringMedia → ExitingMedia` after a failed enter step
    pub fn begin_rollback(&mut self) {
        self.mode = SessionMode::ExitingMedia;
    }

    /// `ExitingMedia → Exploring`
    pub fn complete_exit(&mut self) {
        self.mode = SessionMode::Exploring;
        self.pending_trigger = None;
    }
}

/// Point-in-time view of the session, published after every change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub mode: SessionMode,
    pub trigger: Option<TriggerSource>,
    pub immersive: bool,
    pub media_session: u64,
    pub ambient_playing: bool,
    pub media_playing: bool,
}

/// Read-only view of the session for trigger sources and hosts
#[derive(Debug, Clone)]
pub struct SessionHandle {
    receiver: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    pub(crate) fn new(receiver: watch::Receiver<SessionSnapshot>) -> Self {
        Self { receiver }
    }

    pub fn mode(&self) -> SessionMode {
        self.receiver.borrow().mode
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.receiver.borrow().clone()
    }

    /// Wait until the session reaches `mode`
    ///
    /// Returns `false` if the orchestrator went away first.
    pub async fn wait_for_mode(&mut self, mode: SessionMode) -> bool {
        self.receiver.wait_for(|snapshot| snapshot.mode == mode).await.is_ok()
    }
}
