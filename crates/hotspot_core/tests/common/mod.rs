//! Recording collaborators and a wired-up orchestrator for integration tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hotspot_core::{
    AudioChannel, EventSender, ExperienceConfig, HotspotConfig, MediaError, MediaPlayback,
    MovementControls, PlaybackEndedNotifier, Point3, ProximityMonitor, SessionHandle, SessionMode,
    Stage, StageError, StageResult, TransitionOrchestrator, UiController, VirtualResource,
    VisualSwapper, ZoneSet,
};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Ordered log of collaborator calls, with injectable failures
#[derive(Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
    failing: Arc<Mutex<HashSet<&'static str>>>,
}

impl Journal {
    /// Record `call` ("collaborator.method"), failing if it was marked to fail
    pub fn record(&self, call: &'static str) -> StageResult<()> {
        self.entries.lock().push(call.to_string());
        if self.failing.lock().contains(call) {
            let collaborator = call.split('.').next().unwrap_or(call);
            return Err(StageError::new(collaborator, "injected failure"));
        }
        Ok(())
    }

    pub fn fail(&self, call: &'static str) {
        self.failing.lock().insert(call);
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn contains(&self, call: &str) -> bool {
        self.entries.lock().iter().any(|entry| entry == call)
    }

    pub fn count(&self, call: &str) -> usize {
        self.entries.lock().iter().filter(|entry| *entry == call).count()
    }

    pub fn position(&self, call: &str) -> Option<usize> {
        self.entries.lock().iter().position(|entry| entry == call)
    }
}

/// Test-side controls for the fake media element
#[derive(Clone, Default)]
pub struct MediaControl {
    play_error: Arc<Mutex<Option<MediaError>>>,
    listener: Arc<Mutex<Option<PlaybackEndedNotifier>>>,
}

impl MediaControl {
    pub fn reject_play(&self, error: MediaError) {
        *self.play_error.lock() = Some(error);
    }

    pub fn has_listener(&self) -> bool {
        self.listener.lock().is_some()
    }

    /// Fire the registered end-of-playback listener, if any
    pub fn finish_playback(&self) -> bool {
        match self.listener.lock().as_ref() {
            Some(notifier) => {
                notifier.notify();
                true
            }
            None => false,
        }
    }

    /// Keep a copy of the current listener to fire it late
    pub fn listener(&self) -> Option<PlaybackEndedNotifier> {
        self.listener.lock().clone()
    }
}

struct FakeMedia {
    journal: Journal,
    control: MediaControl,
}

#[async_trait]
impl MediaPlayback for FakeMedia {
    async fn play(&self) -> Result<(), MediaError> {
        self.journal.entries.lock().push("media.play".to_string());
        match self.control.play_error.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn pause(&self) -> StageResult<()> {
        self.journal.record("media.pause")
    }

    fn reset_to_start(&self) -> StageResult<()> {
        self.journal.record("media.reset_to_start")
    }

    fn on_ended(&self, notifier: PlaybackEndedNotifier) -> StageResult<()> {
        self.journal.record("media.on_ended")?;
        *self.control.listener.lock() = Some(notifier);
        Ok(())
    }

    fn remove_ended_listener(&self) -> StageResult<()> {
        self.control.listener.lock().take();
        self.journal.record("media.remove_ended_listener")
    }
}

struct FakeVisuals(Journal);

impl VisualSwapper for FakeVisuals {
    fn show_media(&self) -> StageResult<()> {
        self.0.record("visuals.show_media")
    }

    fn show_exploration_surface(&self) -> StageResult<()> {
        self.0.record("visuals.show_exploration_surface")
    }

    fn show_exploration_world(&self) -> StageResult<()> {
        self.0.record("visuals.show_exploration_world")
    }

    fn hide_exploration_world(&self) -> StageResult<()> {
        self.0.record("visuals.hide_exploration_world")
    }
}

struct FakeMovement(Journal);

impl MovementControls for FakeMovement {
    fn disable(&self) -> StageResult<()> {
        self.0.record("movement.disable")
    }

    fn enable(&self) -> StageResult<()> {
        self.0.record("movement.enable")
    }
}

#[derive(Clone, Default)]
pub struct Notifications(Arc<Mutex<Vec<String>>>);

impl Notifications {
    pub fn all(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

struct FakeUi {
    journal: Journal,
    notifications: Notifications,
}

impl UiController for FakeUi {
    fn show_exit_affordance(&self) -> StageResult<()> {
        self.journal.record("ui.show_exit_affordance")
    }

    fn hide_exit_affordance(&self) -> StageResult<()> {
        self.journal.record("ui.hide_exit_affordance")
    }

    fn show_overlay(&self) -> StageResult<()> {
        self.journal.record("ui.show_overlay")
    }

    fn hide_overlay(&self) -> StageResult<()> {
        self.journal.record("ui.hide_overlay")
    }

    fn notify(&self, message: &str) -> StageResult<()> {
        self.notifications.0.lock().push(message.to_string());
        self.journal.record("ui.notify")
    }
}

/// A running orchestrator with fakes behind every collaborator
pub struct Rig {
    pub journal: Journal,
    pub media: MediaControl,
    pub notifications: Notifications,
    pub ambient: Vec<Arc<VirtualResource>>,
    pub soundtrack: Arc<VirtualResource>,
    pub ambient_channels: Vec<AudioChannel>,
    pub media_channel: AudioChannel,
    pub events: EventSender,
    pub session: SessionHandle,
    pub zones: ZoneSet,
    pub monitor: ProximityMonitor,
    pub task: JoinHandle<()>,
}

impl Rig {
    pub fn mode(&self) -> SessionMode {
        self.session.mode()
    }

    /// Wait for `mode`, failing the test after `limit` of virtual time
    pub async fn reach(&self, mode: SessionMode, limit: Duration) {
        let mut session = self.session.clone();
        let reached = tokio::time::timeout(limit, session.wait_for_mode(mode)).await;
        assert!(
            matches!(reached, Ok(true)),
            "session never reached {} (at {})",
            mode,
            self.session.mode()
        );
    }
}

/// One hotspot "well" at z = -5, radius 2
pub fn config() -> ExperienceConfig {
    ExperienceConfig {
        hotspots: vec![HotspotConfig::new("well", Point3::new(0.0, 0.0, -5.0))],
        ..Default::default()
    }
}

/// Build and spawn an orchestrator with ambient already playing at 0.6
pub fn rig(config: &ExperienceConfig) -> Rig {
    let journal = Journal::default();
    let media = MediaControl::default();
    let notifications = Notifications::default();

    let ambient = vec![
        Arc::new(VirtualResource::playing("ambient-spatial", 0.6)),
        Arc::new(VirtualResource::playing("ambient-fallback", 0.6)),
    ];
    let soundtrack = Arc::new(VirtualResource::new("soundtrack"));

    let ambient_channels: Vec<AudioChannel> = ambient
        .iter()
        .map(|res| AudioChannel::new(res.name().to_string(), res.clone(), 0.6))
        .collect();
    let media_channel = AudioChannel::new("soundtrack", soundtrack.clone(), 0.0);

    let audio = config
        .crossfade_engine(ambient_channels.clone(), vec![media_channel.clone()])
        .expect("valid cues");

    let stage = Stage::new(
        Box::new(FakeMedia {
            journal: journal.clone(),
            control: media.clone(),
        }),
        Box::new(FakeVisuals(journal.clone())),
        Box::new(FakeMovement(journal.clone())),
        Box::new(FakeUi {
            journal: journal.clone(),
            notifications: notifications.clone(),
        }),
    );

    let (orchestrator, events, session) = TransitionOrchestrator::new(config, stage, audio);
    let zones = orchestrator.zones();
    let monitor = orchestrator.proximity_monitor();
    let task = tokio::spawn(orchestrator.run());

    Rig {
        journal,
        media,
        notifications,
        ambient,
        soundtrack,
        ambient_channels,
        media_channel,
        events,
        session,
        zones,
        monitor,
        task,
    }
}
