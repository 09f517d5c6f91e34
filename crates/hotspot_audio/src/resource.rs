//! Playable Audio Resources
//!
//! Defines the interface a host exposes for anything that carries sound: a
//! spatialized scene sound, a plain audio element, or the audio track of a
//! video. The crossfade engine only ever talks to resources through this trait.

use parking_lot::Mutex;

use crate::error::{AudioError, AudioResult};

/// A playable, audio-bearing resource owned by the host
///
/// All methods take `&self`; implementations use interior mutability so a
/// resource can be shared between a channel and the fade task driving it.
pub trait AudioResource: Send + Sync {
    /// Start (or resume) playback.
    ///
    /// Returns `AudioError::AutoplayBlocked` when host policy rejects the start.
    fn play(&self) -> AudioResult<()>;

    /// Pause playback, keeping the current position
    fn pause(&self);

    /// Seek back to the beginning
    fn rewind(&self) {}

    /// Whether the resource is currently playing
    fn is_playing(&self) -> bool;

    /// Apply a volume in range 0.0 - 1.0
    fn set_volume(&self, volume: f32);
}

#[derive(Debug, Default)]
struct VirtualState {
    playing: bool,
    volume: f32,
    position_reset: bool,
    play_attempts: u32,
}

/// In-memory resource with no audio device behind it
///
/// Used by the simulator and by tests. Tracks play state and the last volume
/// written; can be told to reject playback to mimic an autoplay policy.
#[derive(Debug)]
pub struct VirtualResource {
    name: String,
    autoplay_blocked: Mutex<bool>,
    state: Mutex<VirtualState>,
}

impl VirtualResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            autoplay_blocked: Mutex::new(false),
            state: Mutex::new(VirtualState::default()),
        }
    }

    /// Create a resource that is already playing at `volume`
    pub fn playing(name: impl Into<String>, volume: f32) -> Self {
        let resource = Self::new(name);
        {
            let mut state = resource.state.lock();
            state.playing = true;
            state.volume = volume;
        }
        resource
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Make subsequent `play()` calls fail with `AutoplayBlocked`
    pub fn set_autoplay_blocked(&self, blocked: bool) {
        *self.autoplay_blocked.lock() = blocked;
    }

    /// Last volume written to this resource
    pub fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    /// Number of `play()` calls, accepted or not
    pub fn play_attempts(&self) -> u32 {
        self.state.lock().play_attempts
    }

    /// Whether `rewind()` was called since the last `play()`
    pub fn was_rewound(&self) -> bool {
        self.state.lock().position_reset
    }
}

impl AudioResource for VirtualResource {
    fn play(&self) -> AudioResult<()> {
        let mut state = self.state.lock();
        state.play_attempts += 1;
        if *self.autoplay_blocked.lock() {
            return Err(AudioError::AutoplayBlocked(format!(
                "{} requires a user gesture",
                self.name
            )));
        }
        state.playing = true;
        state.position_reset = false;
        Ok(())
    }

    fn pause(&self) {
        self.state.lock().playing = false;
    }

    fn rewind(&self) {
        self.state.lock().position_reset = true;
    }

    fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    fn set_volume(&self, volume: f32) {
        self.state.lock().volume = volume.clamp(0.0, 1.0);
    }
}
