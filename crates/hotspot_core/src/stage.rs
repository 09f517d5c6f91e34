//! Collaborator Traits
//!
//! The orchestrator never touches the scene directly. Hosts implement these
//! traits over whatever renders the experience (an engine scene graph, a
//! browser DOM, the headless simulator) and hand them over as a `Stage`.
//!
//! Every call can fail; the orchestrator turns a failure into a pipeline step
//! failure and rolls back.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{MediaError, StageResult};
use crate::event::PlaybackEndedNotifier;

/// The media element (video, narrated clip) shown in media mode
#[async_trait]
pub trait MediaPlayback: Send + Sync {
    /// Start playback; resolves once the host acknowledges it
    async fn play(&self) -> Result<(), MediaError>;

    fn pause(&self) -> StageResult<()>;

    /// Seek back to the beginning
    fn reset_to_start(&self) -> StageResult<()>;

    /// Register the end-of-playback listener for the current media session
    ///
    /// Replaces any listener registered earlier.
    fn on_ended(&self, notifier: PlaybackEndedNotifier) -> StageResult<()>;

    fn remove_ended_listener(&self) -> StageResult<()>;
}

/// Swaps what the viewer sees between the explorable world and the media
pub trait VisualSwapper: Send + Sync {
    /// Put the media on the surrounding surface
    fn show_media(&self) -> StageResult<()>;

    /// Restore the exploration texture on the surrounding surface
    fn show_exploration_surface(&self) -> StageResult<()>;

    fn show_exploration_world(&self) -> StageResult<()>;

    fn hide_exploration_world(&self) -> StageResult<()>;
}

/// Free movement of the desktop/touch camera
pub trait MovementControls: Send + Sync {
    fn disable(&self) -> StageResult<()>;

    fn enable(&self) -> StageResult<()>;
}

/// On-screen chrome
pub trait UiController: Send + Sync {
    fn show_exit_affordance(&self) -> StageResult<()>;

    fn hide_exit_affordance(&self) -> StageResult<()>;

    /// Exploration overlay (instructions, hotspot hints)
    fn show_overlay(&self) -> StageResult<()>;

    fn hide_overlay(&self) -> StageResult<()>;

    /// Blocking notification for the user
    fn notify(&self, message: &str) -> StageResult<()>;
}

/// Everything the orchestrator drives besides audio
///
/// The UI is shared so the orchestrator can notify the user while a pipeline
/// is still running.
pub struct Stage {
    pub media: Box<dyn MediaPlayback>,
    pub visuals: Box<dyn VisualSwapper>,
    pub movement: Box<dyn MovementControls>,
    pub ui: Arc<dyn UiController>,
}

impl Stage {
    pub fn new(
        media: Box<dyn MediaPlayback>,
        visuals: Box<dyn VisualSwapper>,
        movement: Box<dyn MovementControls>,
        ui: Box<dyn UiController>,
    ) -> Self {
        Self {
            media,
            visuals,
            movement,
            ui: Arc::from(ui),
        }
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage").finish_non_exhaustive()
    }
}
