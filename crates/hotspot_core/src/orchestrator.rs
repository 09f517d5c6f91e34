//! Transition Orchestrator
//!
//! Sole owner of `SessionState` and sole consumer of the event queue. A
//! trigger runs the enter pipeline, playback end or a user request runs the
//! exit pipeline, and a failed enter step rolls back through the compensating
//! exit steps.
//!
//! # Re-entrancy
//!
//! While a pipeline is running the loop keeps draining the queue. Triggers,
//! exit requests and other mode-changing events are dropped, so nothing
//! queued during a transition replays after it. A media failure or an
//! immersive change cannot wait: it is written to `Interrupts`, which the
//! pipeline checks between steps.
//!
//! ```text
//!   recv ──▶ handle_event ──▶ pipeline ──────────────────────┐
//!              ▲                  │ (awaiting fades)          │
//!              │                  ▼                           │
//!              │          select! { pipeline done,            │
//!              │                    recv ─▶ interrupt/drop }  │
//!              └──────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use hotspot_audio::{CrossfadeEngine, FadeOutcome};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::ExperienceConfig;
use crate::error::{MediaError, TransitionError, TransitionResult};
use crate::event::{event_channel, EventReceiver, EventSender, PlaybackEndedNotifier, SessionEvent, TriggerSource};
use crate::gesture::{GestureEvaluator, InteractiveTarget};
use crate::pipeline::{rollback_plan, EnterStep, ExitStep};
use crate::proximity::{ProximityMonitor, ZoneSet};
use crate::session::{SessionHandle, SessionMode, SessionSnapshot, SessionState};
use crate::stage::{Stage, UiController};

/// Drives mode transitions for one experience
pub struct TransitionOrchestrator {
    receiver: EventReceiver,
    session: SessionHandle,
    core: Core,
}

/// Events received mid-pipeline that still have to take effect
#[derive(Debug, Default)]
struct Interrupts {
    /// Media failure reported while entering; fails the entry at the next step
    media_failure: Option<String>,
    /// Latest immersive on/off
    immersive: Option<bool>,
}

/// Everything a pipeline touches; split from the receiver so the run loop can
/// drain the queue while a pipeline holds `&mut Core`
struct Core {
    state: SessionState,
    interrupts: Arc<Mutex<Interrupts>>,
    publisher: watch::Sender<SessionSnapshot>,
    events: EventSender,
    stage: Stage,
    audio: CrossfadeEngine,
    zones: ZoneSet,
    targets: Vec<InteractiveTarget>,
    pinch: GestureEvaluator,
    controller: GestureEvaluator,
    playback_end_grace: Duration,
    startup_audio_delay: Duration,
}

impl TransitionOrchestrator {
    /// Build an orchestrator for `config`
    ///
    /// Returns the orchestrator together with a sender for raising events and
    /// a read-only session handle.
    pub fn new(
        config: &ExperienceConfig,
        stage: Stage,
        audio: CrossfadeEngine,
    ) -> (Self, EventSender, SessionHandle) {
        let (events, receiver) = event_channel();
        let (publisher, snapshots) = watch::channel(SessionSnapshot::default());
        let session = SessionHandle::new(snapshots);

        let core = Core {
            state: SessionState::new(),
            interrupts: Arc::new(Mutex::new(Interrupts::default())),
            publisher,
            events: events.clone(),
            stage,
            audio,
            zones: config.zones(),
            targets: config.targets(),
            pinch: config.pinch_evaluator(),
            controller: config.controller_evaluator(),
            playback_end_grace: config.playback_end_grace(),
            startup_audio_delay: config.startup_audio_delay(),
        };
        core.publish();

        let orchestrator = Self {
            receiver,
            session: session.clone(),
            core,
        };
        (orchestrator, events, session)
    }

    /// Trigger zones shared with the proximity monitor
    pub fn zones(&self) -> ZoneSet {
        self.core.zones.clone()
    }

    pub fn session(&self) -> SessionHandle {
        self.session.clone()
    }

    /// Monitor wired to this orchestrator's zones, session and queue
    pub fn proximity_monitor(&self) -> ProximityMonitor {
        ProximityMonitor::new(
            self.core.zones.clone(),
            self.session.clone(),
            self.core.events.clone(),
        )
    }

    /// Process events until `SessionEvent::Shutdown`
    ///
    /// The orchestrator keeps a sender of its own (delayed events, playback
    /// listeners), so the queue never closes on its own.
    pub async fn run(self) {
        let Self {
            mut receiver,
            session,
            mut core,
        } = self;
        info!(zones = core.zones.len(), "Transition orchestrator running");

        while let Some(event) = receiver.recv().await {
            if matches!(event, SessionEvent::Shutdown) {
                break;
            }

            let mut shutdown = false;
            let interrupts = core.interrupts.clone();
            let ui = core.stage.ui.clone();
            {
                let work = core.handle_event(event);
                tokio::pin!(work);
                loop {
                    tokio::select! {
                        biased;
                        () = &mut work => break,
                        incoming = receiver.recv() => match incoming {
                            Some(SessionEvent::Shutdown) => shutdown = true,
                            Some(SessionEvent::MediaFailed { message }) => {
                                report_media_failure(ui.as_ref(), &message);
                                if session.mode() == SessionMode::EnteringMedia {
                                    interrupts.lock().media_failure = Some(message);
                                }
                            }
                            Some(SessionEvent::ImmersiveEntered) => {
                                interrupts.lock().immersive = Some(true);
                            }
                            Some(SessionEvent::ImmersiveExited) => {
                                interrupts.lock().immersive = Some(false);
                            }
                            Some(discarded) => debug!(
                                event = discarded.name(),
                                mode = %session.mode(),
                                "Event discarded during transition"
                            ),
                            None => {
                                (&mut work).await;
                                break;
                            }
                        },
                    }
                }
            }
            core.settle_interrupts();

            if shutdown {
                break;
            }
        }

        info!(mode = %session.mode(), "Transition orchestrator stopped");
    }
}

impl Core {
    async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Trigger(source) => self.enter(source).await,
            SessionEvent::GestureStart { point } => {
                let hit = self.pinch.evaluate(&point, &self.targets).map(|t| t.id.clone());
                match hit {
                    Some(zone) => self.enter(TriggerSource::Pinch { zone }).await,
                    None => debug!(?point, "Pinch missed every hotspot"),
                }
            }
            SessionEvent::ControllerTriggerDown { hand_position } => {
                let hit = self
                    .controller
                    .evaluate(&hand_position, &self.targets)
                    .map(|t| t.id.clone());
                match hit {
                    Some(zone) => self.enter(TriggerSource::Controller { zone }).await,
                    None => debug!(?hand_position, "Controller trigger out of reach"),
                }
            }
            SessionEvent::PlaybackEnded { media_session } => self.on_playback_ended(media_session),
            SessionEvent::PlaybackEndGraceElapsed { media_session } => {
                if media_session != self.state.media_session() {
                    debug!(
                        media_session,
                        current = self.state.media_session(),
                        "Stale playback end ignored"
                    );
                    return;
                }
                self.exit("playback-ended").await;
            }
            SessionEvent::UserExitRequested => self.exit("user-exit").await,
            SessionEvent::VisibilityHidden => {
                if self.state.mode() == SessionMode::MediaActive {
                    info!("Host hidden, pausing media");
                    if let Err(e) = self.stage.media.pause() {
                        warn!("{}", e);
                    }
                }
            }
            SessionEvent::MediaFailed { message } => {
                report_media_failure(self.stage.ui.as_ref(), &message);
                if self.state.mode() == SessionMode::MediaActive {
                    self.exit("media-failed").await;
                }
            }
            SessionEvent::SceneLoaded => {
                debug!(delay_ms = self.startup_audio_delay.as_millis() as u64, "Scene loaded");
                self.events
                    .send_after(self.startup_audio_delay, SessionEvent::StartAmbient);
            }
            SessionEvent::StartAmbient => self.start_ambient(),
            SessionEvent::ImmersiveEntered => self.set_immersive(true),
            SessionEvent::ImmersiveExited => self.set_immersive(false),
            SessionEvent::Shutdown => {}
        }
    }

    fn set_immersive(&mut self, immersive: bool) {
        if immersive {
            info!("Immersive session started");
        } else {
            info!("Immersive session ended");
        }
        self.state.set_immersive(immersive);
        if !immersive && self.state.mode() == SessionMode::Exploring {
            if let Err(e) = self.stage.movement.enable() {
                warn!("{}", e);
            }
        }
        self.publish();
    }

    /// Apply an immersive change that arrived while a pipeline was running
    fn sync_immersive(&mut self) {
        let pending = self.interrupts.lock().immersive.take();
        if let Some(immersive) = pending {
            if immersive != self.state.is_immersive() {
                self.set_immersive(immersive);
            }
        }
    }

    /// Fail the running entry if the host reported a media failure meanwhile
    fn take_media_failure(&self) -> TransitionResult<()> {
        match self.interrupts.lock().media_failure.take() {
            Some(message) => Err(MediaError::Load(message).into()),
            None => Ok(()),
        }
    }

    /// Called once the pipeline for an event has finished
    fn settle_interrupts(&mut self) {
        self.sync_immersive();
        if let Some(message) = self.interrupts.lock().media_failure.take() {
            debug!(%message, "Media failure arrived after entry had already ended");
        }
    }

    fn on_playback_ended(&self, media_session: u64) {
        if self.state.mode() != SessionMode::MediaActive
            || media_session != self.state.media_session()
        {
            debug!(media_session, mode = %self.state.mode(), "Playback end ignored");
            return;
        }
        info!(
            grace_ms = self.playback_end_grace.as_millis() as u64,
            "Playback ended, exiting after grace period"
        );
        self.events.send_after(
            self.playback_end_grace,
            SessionEvent::PlaybackEndGraceElapsed { media_session },
        );
    }

    /// Initial ambient fade-in; runs detached so triggers are not held up
    fn start_ambient(&self) {
        if self.state.mode() != SessionMode::Exploring {
            debug!(mode = %self.state.mode(), "Ambient start skipped");
            return;
        }
        if self.audio.ambient().is_playing() {
            return;
        }
        match self.audio.ambient().begin_fade_in(self.audio.fades()) {
            Ok(handles) => info!(channels = handles.len(), "Ambient audio starting"),
            Err(e) => warn!("Ambient audio not started: {}", e),
        }
    }

    async fn enter(&mut self, source: TriggerSource) {
        let media_session = match self.state.try_begin_entry(source.clone()) {
            Ok(media_session) => media_session,
            Err(violation) => {
                debug!("{}", violation);
                return;
            }
        };
        info!(trigger = %source, media_session, "Entering media mode");
        self.publish();

        let mut attempted = Vec::with_capacity(EnterStep::ORDER.len());
        for step in EnterStep::ORDER {
            attempted.push(step);
            self.sync_immersive();
            debug!(step = step.name(), "Enter step");
            let result = match self.run_enter_step(step, media_session).await {
                // Reported by the host while this step was in flight; the
                // user has been notified already
                Ok(()) => self.take_media_failure(),
                Err(e) => {
                    if let TransitionError::Media(media) = &e {
                        if media.is_user_visible() {
                            if let Err(notify_err) = self.stage.ui.notify(&media.to_string()) {
                                warn!("{}", notify_err);
                            }
                        }
                    }
                    Err(e)
                }
            };
            if let Err(e) = result {
                let failure = TransitionError::StepFailed {
                    step: step.name(),
                    reason: e.to_string(),
                };
                error!("{}", failure);
                self.rollback(&attempted).await;
                return;
            }
        }

        self.state.complete_entry();
        info!(media_session, "Media mode active");
        self.publish();
    }

    async fn run_enter_step(&mut self, step: EnterStep, media_session: u64) -> TransitionResult<()> {
        match step {
            EnterStep::FadeOutAmbient => {
                log_outcomes("ambient", &self.audio.stop_ambient().await);
            }
            EnterStep::ShowMedia => self.stage.visuals.show_media()?,
            EnterStep::StartPlayback => self.stage.media.play().await?,
            EnterStep::FadeInMedia => {
                log_outcomes("media", &self.audio.start_media_audio().await?);
            }
            EnterStep::HideExplorationWorld => self.stage.visuals.hide_exploration_world()?,
            EnterStep::DisableMovement => self.stage.movement.disable()?,
            EnterStep::ShowMediaUi => {
                self.stage.ui.show_exit_affordance()?;
                self.stage.ui.hide_overlay()?;
            }
            EnterStep::RegisterEndListener => {
                let notifier = PlaybackEndedNotifier::new(self.events.clone(), media_session);
                self.stage.media.on_ended(notifier)?;
            }
        }
        Ok(())
    }

    async fn exit(&mut self, reason: &'static str) {
        if let Err(violation) = self.state.try_begin_exit(reason) {
            debug!("{}", violation);
            return;
        }
        info!(reason, "Exiting media mode");
        self.publish();

        self.run_exit_steps(&ExitStep::ORDER).await;

        self.state.complete_exit();
        info!("Back to exploring");
        self.publish();
    }

    async fn rollback(&mut self, attempted: &[EnterStep]) {
        self.state.begin_rollback();
        self.publish();

        let plan = rollback_plan(attempted);
        warn!(steps = plan.len(), "Rolling back media entry");
        self.run_exit_steps(&plan).await;

        self.state.complete_exit();
        info!("Rollback complete, back to exploring");
        self.publish();
    }

    /// Run `steps` in order; failures are logged and the rest still run
    async fn run_exit_steps(&mut self, steps: &[ExitStep]) {
        for &step in steps {
            self.sync_immersive();
            debug!(step = step.name(), "Exit step");
            if let Err(e) = self.run_exit_step(step).await {
                error!(step = step.name(), "Exit step failed, continuing: {}", e);
            }
        }
    }

    async fn run_exit_step(&mut self, step: ExitStep) -> TransitionResult<()> {
        match step {
            ExitStep::FadeOutMedia => {
                log_outcomes("media", &self.audio.stop_media_audio().await);
            }
            ExitStep::StopPlayback => {
                self.stage.media.pause()?;
                self.stage.media.reset_to_start()?;
                self.stage.media.remove_ended_listener()?;
            }
            ExitStep::ShowExplorationSurface => self.stage.visuals.show_exploration_surface()?,
            ExitStep::ShowExplorationWorld => self.stage.visuals.show_exploration_world()?,
            ExitStep::EnableMovement => {
                if self.state.is_immersive() {
                    debug!("Movement left to the immersive session");
                } else {
                    self.stage.movement.enable()?;
                }
            }
            ExitStep::RestoreExplorationUi => {
                self.stage.ui.hide_exit_affordance()?;
                self.stage.ui.show_overlay()?;
            }
            ExitStep::ResetLatches => self.zones.reset_all(),
            ExitStep::FadeInAmbient => {
                log_outcomes("ambient", &self.audio.start_ambient().await?);
            }
        }
        Ok(())
    }

    fn publish(&self) {
        self.publisher.send_replace(SessionSnapshot {
            mode: self.state.mode(),
            trigger: self.state.pending_trigger().cloned(),
            immersive: self.state.is_immersive(),
            media_session: self.state.media_session(),
            ambient_playing: self.audio.ambient().is_playing(),
            media_playing: self.audio.media().is_playing(),
        });
    }
}

fn report_media_failure(ui: &dyn UiController, message: &str) {
    error!("Media failed to load: {}", message);
    if let Err(e) = ui.notify(&format!("Unable to load media: {}", message)) {
        warn!("{}", e);
    }
}

fn log_outcomes(group: &str, outcomes: &[FadeOutcome]) {
    let superseded = outcomes
        .iter()
        .filter(|outcome| **outcome == FadeOutcome::Superseded)
        .count();
    if superseded > 0 {
        debug!(group, superseded, "Fade superseded mid-pipeline");
    }
}
