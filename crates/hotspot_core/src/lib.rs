//! Hotspot Core - Mode Transitions
//!
//! This crate switches an explorable scene into a media presentation and back:
//! - Latch-once proximity hotspots sampled every frame
//! - Pinch and controller hit-testing against the same hotspots
//! - A single-owner session state machine fed by one event queue
//! - Enter/exit pipelines with per-step compensation on failure
//! - JSON configuration for hotspots, audio cues and timings
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Trigger Sources                        │
//! │  FrameScheduler ─▶ ProximityMonitor   gestures   host events │
//! └──────────────────────────────────────────────────────────────┘
//!                              │ EventSender (tokio mpsc)
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   TransitionOrchestrator                     │
//! │   SessionState ──watch──▶ SessionHandle                      │
//! │   enter / exit / rollback pipelines                          │
//! │     │                         │                              │
//! │     ▼                         ▼                              │
//! │  CrossfadeEngine      Stage (media, visuals, movement, UI)   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod event;
mod geometry;
mod gesture;
mod orchestrator;
mod pipeline;
mod proximity;
mod scheduler;
mod session;
mod stage;

pub use config::{CueConfig, ExperienceConfig, HotspotConfig};
pub use error::{
    ConfigError, GuardViolation, MediaError, StageError, StageResult, TransitionError,
    TransitionResult,
};
pub use event::{EventSender, PlaybackEndedNotifier, SessionEvent, TriggerSource};
pub use geometry::Point3;
pub use gesture::{
    GestureEvaluator, InteractiveTarget, DEFAULT_CONTROLLER_REACH, DEFAULT_PINCH_THRESHOLD,
};
pub use orchestrator::TransitionOrchestrator;
pub use pipeline::{rollback_plan, EnterStep, ExitStep};
pub use proximity::{
    ObserverSample, ProximityMonitor, ProximityReading, TriggerZone, ZoneId, ZoneSet,
};
pub use scheduler::{FrameScheduler, ObserverSource};
pub use session::{SessionHandle, SessionMode, SessionSnapshot, SessionState};
pub use stage::{MediaPlayback, MovementControls, Stage, UiController, VisualSwapper};

// Re-export audio types hosts need to wire channels
pub use hotspot_audio::{
    AudioChannel, AudioCue, AudioResource, ChannelGroup, CrossfadeEngine, FadeEngine,
    HasAudioChannel, VirtualResource,
};
