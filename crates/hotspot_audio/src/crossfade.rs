//! Crossfade Engine
//!
//! Owns the two logical sounds of the experience and exposes the four
//! composite moves the orchestrator sequences:
//!
//! | Operation           | Group   | Direction | After settle        |
//! |---------------------|---------|-----------|---------------------|
//! | `stop_ambient`      | ambient | out       | paused              |
//! | `start_ambient`     | ambient | in        | playing at target   |
//! | `start_media_audio` | media   | in        | playing at target   |
//! | `stop_media_audio`  | media   | out       | paused and rewound  |

use tracing::info;

use crate::error::AudioResult;
use crate::fade::{FadeEngine, FadeOutcome};
use crate::group::ChannelGroup;

/// Composite fades over the ambient and media channel groups
#[derive(Debug, Clone)]
pub struct CrossfadeEngine {
    fades: FadeEngine,
    ambient: ChannelGroup,
    media: ChannelGroup,
}

impl CrossfadeEngine {
    pub fn new(fades: FadeEngine, ambient: ChannelGroup, media: ChannelGroup) -> Self {
        Self {
            fades,
            ambient,
            media,
        }
    }

    pub fn fades(&self) -> &FadeEngine {
        &self.fades
    }

    pub fn ambient(&self) -> &ChannelGroup {
        &self.ambient
    }

    pub fn media(&self) -> &ChannelGroup {
        &self.media
    }

    /// Fade the exploration ambience out on every aliasing channel
    pub async fn stop_ambient(&self) -> Vec<FadeOutcome> {
        info!(channels = self.ambient.channels().len(), "Stopping ambient audio");
        self.ambient.fade_out(&self.fades).await
    }

    /// Fade the exploration ambience back in to its resting volume
    pub async fn start_ambient(&self) -> AudioResult<Vec<FadeOutcome>> {
        info!(channels = self.ambient.channels().len(), "Starting ambient audio");
        self.ambient.fade_in(&self.fades).await
    }

    /// Fade the media soundtrack in on every aliasing channel
    pub async fn start_media_audio(&self) -> AudioResult<Vec<FadeOutcome>> {
        info!(channels = self.media.channels().len(), "Starting media audio");
        self.media.fade_in(&self.fades).await
    }

    /// Fade the media soundtrack out and rewind it for the next session
    pub async fn stop_media_audio(&self) -> Vec<FadeOutcome> {
        info!(channels = self.media.channels().len(), "Stopping media audio");
        let outcomes = self.media.fade_out(&self.fades).await;
        self.media.rewind();
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::AudioChannel;
    use crate::group::AudioCue;
    use crate::resource::{AudioResource, VirtualResource};
    use std::sync::Arc;
    use std::time::Duration;

    struct Rig {
        spatial: Arc<VirtualResource>,
        fallback: Arc<VirtualResource>,
        native: Arc<VirtualResource>,
        engine: CrossfadeEngine,
    }

    fn rig() -> Rig {
        let spatial = Arc::new(VirtualResource::playing("spatial", 0.6));
        let fallback = Arc::new(VirtualResource::playing("fallback", 0.6));
        let native = Arc::new(VirtualResource::new("native"));

        let ambient = ChannelGroup::new(
            "ambient",
            vec![
                AudioChannel::new("spatial", spatial.clone(), 0.6),
                AudioChannel::new("fallback", fallback.clone(), 0.6),
            ],
            AudioCue::new(0.6, Duration::from_millis(1000), Duration::from_millis(800)).unwrap(),
        );
        let media = ChannelGroup::new(
            "media",
            vec![AudioChannel::new("native", native.clone(), 0.0)],
            AudioCue::new(0.8, Duration::from_millis(1000), Duration::from_millis(500)).unwrap(),
        );

        Rig {
            spatial,
            fallback,
            native,
            engine: CrossfadeEngine::new(FadeEngine::default(), ambient, media),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ambient_to_media_and_back() {
        let rig = rig();

        rig.engine.stop_ambient().await;
        assert!(!rig.spatial.is_playing());
        assert!(!rig.fallback.is_playing());

        rig.engine.start_media_audio().await.unwrap();
        assert!(rig.native.is_playing());
        assert_eq!(rig.engine.media().channels()[0].current_volume(), 0.8);

        rig.engine.stop_media_audio().await;
        assert!(!rig.native.is_playing());
        assert!(rig.native.was_rewound());

        rig.engine.start_ambient().await.unwrap();
        for channel in rig.engine.ambient().channels() {
            assert_eq!(channel.current_volume(), 0.6);
            assert!(channel.is_playing());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_media_when_never_started() {
        let rig = rig();
        let outcomes = rig.engine.stop_media_audio().await;
        assert_eq!(outcomes, vec![FadeOutcome::AlreadyStopped]);
    }
}
