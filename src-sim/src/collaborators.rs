//! Logging Collaborators
//!
//! Stand-ins for a rendered scene: every call is logged and succeeds. The
//! media element "plays" for a fixed duration and then fires its end listener.

use std::time::Duration;

use async_trait::async_trait;
use hotspot_core::{
    MediaError, MediaPlayback, MovementControls, PlaybackEndedNotifier, Stage, StageResult,
    UiController, VisualSwapper,
};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

/// Build a stage whose media runs for `media_duration`
pub fn logging_stage(media_duration: Duration) -> Stage {
    Stage::new(
        Box::new(SimMedia::new(media_duration)),
        Box::new(SimVisuals),
        Box::new(SimMovement),
        Box::new(SimUi),
    )
}

struct SimMedia {
    duration: Duration,
    end_timer: Mutex<Option<JoinHandle<()>>>,
}

impl SimMedia {
    fn new(duration: Duration) -> Self {
        Self {
            duration,
            end_timer: Mutex::new(None),
        }
    }

    fn cancel_end_timer(&self) {
        if let Some(timer) = self.end_timer.lock().take() {
            timer.abort();
        }
    }
}

#[async_trait]
impl MediaPlayback for SimMedia {
    async fn play(&self) -> Result<(), MediaError> {
        // Decoder warm-up
        tokio::time::sleep(Duration::from_millis(20)).await;
        info!(target: "hotspot_sim::media", "play");
        Ok(())
    }

    fn pause(&self) -> StageResult<()> {
        info!(target: "hotspot_sim::media", "pause");
        Ok(())
    }

    fn reset_to_start(&self) -> StageResult<()> {
        info!(target: "hotspot_sim::media", "reset to start");
        Ok(())
    }

    fn on_ended(&self, notifier: PlaybackEndedNotifier) -> StageResult<()> {
        info!(
            target: "hotspot_sim::media",
            media_session = notifier.media_session(),
            duration_ms = self.duration.as_millis() as u64,
            "end listener registered"
        );
        self.cancel_end_timer();
        let duration = self.duration;
        *self.end_timer.lock() = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            notifier.notify();
        }));
        Ok(())
    }

    fn remove_ended_listener(&self) -> StageResult<()> {
        self.cancel_end_timer();
        info!(target: "hotspot_sim::media", "end listener removed");
        Ok(())
    }
}

struct SimVisuals;

impl VisualSwapper for SimVisuals {
    fn show_media(&self) -> StageResult<()> {
        info!(target: "hotspot_sim::visuals", "media on surface");
        Ok(())
    }

    fn show_exploration_surface(&self) -> StageResult<()> {
        info!(target: "hotspot_sim::visuals", "exploration texture on surface");
        Ok(())
    }

    fn show_exploration_world(&self) -> StageResult<()> {
        info!(target: "hotspot_sim::visuals", "world shown");
        Ok(())
    }

    fn hide_exploration_world(&self) -> StageResult<()> {
        info!(target: "hotspot_sim::visuals", "world hidden");
        Ok(())
    }
}

struct SimMovement;

impl MovementControls for SimMovement {
    fn disable(&self) -> StageResult<()> {
        info!(target: "hotspot_sim::movement", "disabled");
        Ok(())
    }

    fn enable(&self) -> StageResult<()> {
        info!(target: "hotspot_sim::movement", "enabled");
        Ok(())
    }
}

struct SimUi;

impl UiController for SimUi {
    fn show_exit_affordance(&self) -> StageResult<()> {
        info!(target: "hotspot_sim::ui", "exit button shown");
        Ok(())
    }

    fn hide_exit_affordance(&self) -> StageResult<()> {
        info!(target: "hotspot_sim::ui", "exit button hidden");
        Ok(())
    }

    fn show_overlay(&self) -> StageResult<()> {
        info!(target: "hotspot_sim::ui", "overlay shown");
        Ok(())
    }

    fn hide_overlay(&self) -> StageResult<()> {
        info!(target: "hotspot_sim::ui", "overlay hidden");
        Ok(())
    }

    fn notify(&self, message: &str) -> StageResult<()> {
        info!(target: "hotspot_sim::ui", "notification: {}", message);
        Ok(())
    }
}
