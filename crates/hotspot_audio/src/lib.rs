//! Hotspot Audio - Channel Fades and Crossfades
//!
//! This crate provides the audio side of mode transitions, including:
//! - A playable-resource trait hosts implement for their sound sources
//! - Volume-tracked channels with single-owner fade tasks
//! - Linear fade-in / fade-out primitives with fixed step intervals
//! - Channel groups that drive redundant channels for one logical sound
//! - Composite ambient/media crossfade moves
//!
//! # Architecture
//!
//! ```text
//! CrossfadeEngine ──▶ ChannelGroup (ambient) ──▶ AudioChannel ──▶ AudioResource
//!                 └─▶ ChannelGroup (media)   ──▶ AudioChannel ──▶ AudioResource
//!                                                    ▲
//!                                   one tokio fade task at a time
//! ```

mod channel;
mod crossfade;
mod error;
mod fade;
mod group;
mod ramp;
mod resource;

pub use channel::{AudioChannel, HasAudioChannel};
pub use crossfade::CrossfadeEngine;
pub use error::{AudioError, AudioResult};
pub use fade::{FadeEngine, FadeHandle, FadeOutcome};
pub use group::{AudioCue, ChannelGroup};
pub use ramp::{VolumeRamp, DEFAULT_FADE_STEP};
pub use resource::{AudioResource, VirtualResource};
