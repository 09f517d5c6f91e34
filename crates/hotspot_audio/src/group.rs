//! Channel Groups
//!
//! A logical sound (village ambience, the video soundtrack) may be backed by
//! several channels at once: a spatialized source plus a flat fallback, or a
//! video's native track plus a separate audio file. A group fans each fade out
//! to all of them and joins on the lot.

use std::time::Duration;

use tracing::debug;

use crate::channel::{AudioChannel, HasAudioChannel};
use crate::error::{AudioError, AudioResult};
use crate::fade::{FadeEngine, FadeHandle, FadeOutcome};

/// Loudness and timing for one logical sound
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioCue {
    /// Resting volume once faded in (0.0 - 1.0)
    pub target_volume: f32,
    pub fade_in: Duration,
    pub fade_out: Duration,
}

impl AudioCue {
    pub fn new(target_volume: f32, fade_in: Duration, fade_out: Duration) -> AudioResult<Self> {
        if !(0.0..=1.0).contains(&target_volume) {
            return Err(AudioError::InvalidVolume(target_volume));
        }
        Ok(Self {
            target_volume,
            fade_in,
            fade_out,
        })
    }
}

/// Every channel aliasing one logical sound
#[derive(Debug, Clone)]
pub struct ChannelGroup {
    name: String,
    channels: Vec<AudioChannel>,
    cue: AudioCue,
}

impl ChannelGroup {
    pub fn new(name: impl Into<String>, channels: Vec<AudioChannel>, cue: AudioCue) -> Self {
        Self {
            name: name.into(),
            channels,
            cue,
        }
    }

    /// Build a group from host entities, keeping only those that carry sound
    pub fn from_sources<'a, I>(name: impl Into<String>, sources: I, cue: AudioCue) -> Self
    where
        I: IntoIterator<Item = &'a dyn HasAudioChannel>,
    {
        let name = name.into();
        let channels: Vec<AudioChannel> = sources
            .into_iter()
            .filter_map(|source| source.audio_channel())
            .collect();
        debug!(group = %name, channels = channels.len(), "Channel group configured");
        Self::new(name, channels, cue)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channels(&self) -> &[AudioChannel] {
        &self.channels
    }

    pub fn cue(&self) -> AudioCue {
        self.cue
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Whether any channel in the group is currently playing
    pub fn is_playing(&self) -> bool {
        self.channels.iter().any(AudioChannel::is_playing)
    }

    /// Fade every channel out in parallel; resolves once all have settled
    pub async fn fade_out(&self, engine: &FadeEngine) -> Vec<FadeOutcome> {
        let handles: Vec<FadeHandle> = self
            .channels
            .iter()
            .map(|channel| engine.begin_fade_out(channel, self.cue.fade_out))
            .collect();
        join(handles).await
    }

    /// Fade every channel in to the cue's target in parallel
    pub async fn fade_in(&self, engine: &FadeEngine) -> AudioResult<Vec<FadeOutcome>> {
        let handles = self.begin_fade_in(engine)?;
        Ok(join(handles).await)
    }

    /// Start fading every channel in without waiting
    pub fn begin_fade_in(&self, engine: &FadeEngine) -> AudioResult<Vec<FadeHandle>> {
        self.channels
            .iter()
            .map(|channel| engine.begin_fade_in(channel, self.cue.target_volume, self.cue.fade_in))
            .collect()
    }

    /// Seek every channel's resource back to its start
    pub fn rewind(&self) {
        for channel in &self.channels {
            channel.resource().rewind();
        }
    }
}

async fn join(handles: Vec<FadeHandle>) -> Vec<FadeOutcome> {
    let mut outcomes = Vec::with_capacity(handles.len());
    // Fades already run concurrently as tasks; awaiting in order only joins them
    for handle in handles {
        outcomes.push(handle.settle().await);
    }
    outcomes
}
