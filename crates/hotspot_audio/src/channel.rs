//! Audio Channels
//!
//! An `AudioChannel` binds one playable resource to the volume bookkeeping the
//! crossfade engine needs. Channels are cheap to clone; clones share state, so
//! the orchestrator and a running fade task always see the same volume.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tokio::task::AbortHandle;

use crate::resource::AudioResource;

/// Fade currently owning a channel's volume
#[derive(Debug)]
pub(crate) struct ActiveFade {
    /// Identifies the owner so a superseded task never touches the channel again
    pub(crate) id: u64,
    pub(crate) abort: AbortHandle,
}

/// Mutable per-channel state, written only by the fade engine
#[derive(Debug)]
pub(crate) struct ChannelState {
    pub(crate) current_volume: f32,
    pub(crate) target_volume: f32,
    pub(crate) active_fade: Option<ActiveFade>,
    pub(crate) next_fade_id: u64,
}

impl ChannelState {
    /// Abort the running fade, if any. Returns true when one was cancelled.
    pub(crate) fn cancel_fade(&mut self) -> bool {
        match self.active_fade.take() {
            Some(fade) => {
                fade.abort.abort();
                true
            }
            None => false,
        }
    }

    pub(crate) fn allocate_fade_id(&mut self) -> u64 {
        self.next_fade_id += 1;
        self.next_fade_id
    }

    /// Whether `id` still owns this channel
    pub(crate) fn is_owned_by(&self, id: u64) -> bool {
        self.active_fade.as_ref().is_some_and(|fade| fade.id == id)
    }
}

/// A volume-controlled handle onto one audio resource
#[derive(Clone)]
pub struct AudioChannel {
    name: Arc<str>,
    resource: Arc<dyn AudioResource>,
    state: Arc<Mutex<ChannelState>>,
}

impl AudioChannel {
    /// Wrap a resource, seeding the channel volume with `initial_volume`
    pub fn new(name: impl Into<String>, resource: Arc<dyn AudioResource>, initial_volume: f32) -> Self {
        let volume = initial_volume.clamp(0.0, 1.0);
        Self {
            name: Arc::from(name.into()),
            resource,
            state: Arc::new(Mutex::new(ChannelState {
                current_volume: volume,
                target_volume: volume,
                active_fade: None,
                next_fade_id: 0,
            })),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource(&self) -> &Arc<dyn AudioResource> {
        &self.resource
    }

    /// Volume most recently written by the fade engine
    pub fn current_volume(&self) -> f32 {
        self.state.lock().current_volume
    }

    /// Volume the channel is heading towards (or resting at)
    pub fn target_volume(&self) -> f32 {
        self.state.lock().target_volume
    }

    /// Whether a fade task currently owns this channel
    pub fn is_fading(&self) -> bool {
        self.state.lock().active_fade.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.resource.is_playing()
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, ChannelState> {
        self.state.lock()
    }
}

impl fmt::Debug for AudioChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("AudioChannel")
            .field("name", &self.name)
            .field("current_volume", &state.current_volume)
            .field("target_volume", &state.target_volume)
            .field("fading", &state.active_fade.is_some())
            .finish()
    }
}

/// Capability of a host entity that may carry a sound
///
/// Queried once while building channel groups; entities without sound return
/// `None` and are simply left out.
pub trait HasAudioChannel {
    fn audio_channel(&self) -> Option<AudioChannel>;
}

impl HasAudioChannel for AudioChannel {
    fn audio_channel(&self) -> Option<AudioChannel> {
        Some(self.clone())
    }
}

impl<T: HasAudioChannel> HasAudioChannel for Option<T> {
    fn audio_channel(&self) -> Option<AudioChannel> {
        self.as_ref().and_then(HasAudioChannel::audio_channel)
    }
}
