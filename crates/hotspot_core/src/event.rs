//! Session Events
//!
//! Every trigger source (frame scheduler, pointer, hand tracking, controllers,
//! media element, host window) feeds one queue; the orchestrator is its only
//! consumer and decides what each event means in the current mode.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{TransitionError, TransitionResult};
use crate::geometry::Point3;
use crate::proximity::ZoneId;

/// What caused a request to enter media mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TriggerSource {
    /// Observer walked into a hotspot's radius
    Proximity { zone: ZoneId, distance: f32 },
    /// Hotspot selected with a pointer
    Click { zone: ZoneId },
    /// Hand-tracking pinch close to a hotspot
    Pinch { zone: ZoneId },
    /// Controller trigger pressed with the hand near a hotspot
    Controller { zone: ZoneId },
    /// Forced from a host debug hook
    Manual,
}

impl TriggerSource {
    /// Zone the trigger refers to, if any
    pub fn zone(&self) -> Option<&ZoneId> {
        match self {
            TriggerSource::Proximity { zone, .. }
            | TriggerSource::Click { zone }
            | TriggerSource::Pinch { zone }
            | TriggerSource::Controller { zone } => Some(zone),
            TriggerSource::Manual => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TriggerSource::Proximity { .. } => "proximity",
            TriggerSource::Click { .. } => "click",
            TriggerSource::Pinch { .. } => "gesture",
            TriggerSource::Controller { .. } => "controller",
            TriggerSource::Manual => "manual",
        }
    }
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.zone() {
            Some(zone) => write!(f, "{} ({})", self.kind(), zone),
            None => f.write_str(self.kind()),
        }
    }
}

/// Events consumed by the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Request to enter media mode
    Trigger(TriggerSource),
    /// Pinch started at `point`; hit-tested against hotspots
    GestureStart { point: Point3 },
    /// Controller trigger pressed with the hand at `hand_position`
    ControllerTriggerDown { hand_position: Point3 },
    /// Media reached its end (tagged with the session that registered the listener)
    PlaybackEnded { media_session: u64 },
    /// Grace period after `PlaybackEnded` is over
    PlaybackEndGraceElapsed { media_session: u64 },
    /// Exit affordance pressed or escape key
    UserExitRequested,
    /// Host window/tab hidden
    VisibilityHidden,
    /// Media resource reported a load error
    MediaFailed { message: String },
    /// Scene finished loading; ambient audio starts after the startup delay
    SceneLoaded,
    /// Startup delay elapsed
    StartAmbient,
    ImmersiveEntered,
    ImmersiveExited,
    /// Stop the orchestrator loop
    Shutdown,
}

impl SessionEvent {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Trigger(_) => "trigger",
            SessionEvent::GestureStart { .. } => "gesture-start",
            SessionEvent::ControllerTriggerDown { .. } => "controller-trigger",
            SessionEvent::PlaybackEnded { .. } => "playback-ended",
            SessionEvent::PlaybackEndGraceElapsed { .. } => "playback-end-grace",
            SessionEvent::UserExitRequested => "user-exit",
            SessionEvent::VisibilityHidden => "visibility-hidden",
            SessionEvent::MediaFailed { .. } => "media-failed",
            SessionEvent::SceneLoaded => "scene-loaded",
            SessionEvent::StartAmbient => "start-ambient",
            SessionEvent::ImmersiveEntered => "immersive-entered",
            SessionEvent::ImmersiveExited => "immersive-exited",
            SessionEvent::Shutdown => "shutdown",
        }
    }
}

pub(crate) type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Create the session event queue
pub(crate) fn event_channel() -> (EventSender, EventReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (EventSender { inner: sender }, receiver)
}

/// Cloneable handle for raising events into the orchestrator
#[derive(Debug, Clone)]
pub struct EventSender {
    inner: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSender {
    pub fn send(&self, event: SessionEvent) -> TransitionResult<()> {
        self.inner.send(event).map_err(|_| TransitionError::QueueClosed)
    }

    /// Deliver `event` after `delay` from a detached timer task
    pub fn send_after(&self, delay: Duration, event: SessionEvent) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if inner.send(event).is_err() {
                debug!("Delayed event dropped, orchestrator gone");
            }
        });
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

/// Handed to `MediaPlayback::on_ended`; raises `PlaybackEnded` for its session
#[derive(Debug, Clone)]
pub struct PlaybackEndedNotifier {
    sender: EventSender,
    media_session: u64,
}

impl PlaybackEndedNotifier {
    pub(crate) fn new(sender: EventSender, media_session: u64) -> Self {
        Self {
            sender,
            media_session,
        }
    }

    pub fn media_session(&self) -> u64 {
        self.media_session
    }

    /// Report that playback reached its end
    pub fn notify(&self) {
        let event = SessionEvent::PlaybackEnded {
            media_session: self.media_session,
        };
        if self.sender.send(event).is_err() {
            debug!("Playback end reported after orchestrator stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_display() {
        let trigger = TriggerSource::Proximity {
            zone: ZoneId::from("well"),
            distance: 1.5,
        };
        assert_eq!(trigger.to_string(), "proximity (well)");
        assert_eq!(TriggerSource::Manual.to_string(), "manual");
        assert!(TriggerSource::Manual.zone().is_none());
    }

    #[test]
    fn test_trigger_serialization() {
        let trigger = TriggerSource::Pinch {
            zone: ZoneId::from("gate"),
        };
        let json = serde_json::to_string(&trigger).unwrap();
        assert!(json.contains("\"kind\":\"pinch\""));
        let back: TriggerSource = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trigger);
    }

    #[test]
    fn test_send_on_closed_queue() {
        let (sender, receiver) = event_channel();
        drop(receiver);
        assert!(sender.is_closed());
        assert!(matches!(
            sender.send(SessionEvent::SceneLoaded),
            Err(TransitionError::QueueClosed)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_after_delays_delivery() {
        let (sender, mut receiver) = event_channel();
        sender.send_after(Duration::from_millis(1000), SessionEvent::StartAmbient);

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(receiver.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(receiver.try_recv().unwrap(), SessionEvent::StartAmbient);
    }

    #[tokio::test]
    async fn test_notifier_carries_session() {
        let (sender, mut receiver) = event_channel();
        let notifier = PlaybackEndedNotifier::new(sender, 7);
        notifier.notify();
        assert_eq!(
            receiver.recv().await.unwrap(),
            SessionEvent::PlaybackEnded { media_session: 7 }
        );
    }
}
