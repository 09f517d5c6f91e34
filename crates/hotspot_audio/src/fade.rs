//! Fade Primitives
//!
//! `fade_out` and `fade_in` ramp a single channel linearly in fixed time steps.
//! Each fade runs as its own tokio task so several channels can ramp side by
//! side; starting a fade on a channel aborts whatever fade owned it before.
//!
//! # Ownership
//!
//! ```text
//!   begin_fade_*() ──lock──▶ ChannelState.active_fade = { id, abort }
//!                                  │
//!   ramp task (id) ──each step──▶ writes volume only while it still owns id
//! ```

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::channel::{ActiveFade, AudioChannel};
use crate::error::{AudioError, AudioResult};
use crate::ramp::{VolumeRamp, DEFAULT_FADE_STEP};

/// How a fade ended, as seen by whoever awaited it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeOutcome {
    /// The ramp reached its target
    Completed,
    /// Fade-out on a channel that was not playing; nothing to do
    AlreadyStopped,
    /// A newer fade on the same channel took over before this one finished
    Superseded,
}

/// What happens to playback once a ramp lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RampEnd {
    Pause,
    Hold,
}

/// A fade that has been started; await `settle()` to join it
#[derive(Debug)]
pub struct FadeHandle {
    channel: String,
    task: Option<JoinHandle<()>>,
}

impl FadeHandle {
    fn settled(channel: &AudioChannel) -> Self {
        Self {
            channel: channel.name().to_string(),
            task: None,
        }
    }

    /// Name of the channel this fade drives
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Wait for the fade to finish or be superseded
    pub async fn settle(self) -> FadeOutcome {
        let Some(task) = self.task else {
            return FadeOutcome::AlreadyStopped;
        };

        match task.await {
            Ok(()) => FadeOutcome::Completed,
            Err(e) if e.is_cancelled() => {
                debug!(channel = %self.channel, "Fade superseded");
                FadeOutcome::Superseded
            }
            Err(e) => {
                error!(channel = %self.channel, "Fade task panicked: {}", e);
                FadeOutcome::Superseded
            }
        }
    }
}

/// Starts fades with a fixed step interval
#[derive(Debug, Clone, Copy)]
pub struct FadeEngine {
    step: Duration,
}

impl Default for FadeEngine {
    fn default() -> Self {
        Self::new(DEFAULT_FADE_STEP)
    }
}

impl FadeEngine {
    pub fn new(step: Duration) -> Self {
        Self {
            step: step.max(Duration::from_millis(1)),
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Ramp `channel` to silence over `duration`, then pause it
    pub async fn fade_out(&self, channel: &AudioChannel, duration: Duration) -> FadeOutcome {
        self.begin_fade_out(channel, duration).settle().await
    }

    /// Start playback at volume 0 and ramp to `target` over `duration`
    pub async fn fade_in(
        &self,
        channel: &AudioChannel,
        target: f32,
        duration: Duration,
    ) -> AudioResult<FadeOutcome> {
        Ok(self.begin_fade_in(channel, target, duration)?.settle().await)
    }

    /// Start a fade-out without waiting for it
    ///
    /// Any fade already running on the channel is cancelled first, even when
    /// the channel turns out to be stopped.
    pub fn begin_fade_out(&self, channel: &AudioChannel, duration: Duration) -> FadeHandle {
        let mut state = channel.lock_state();
        let cancelled = state.cancel_fade();
        if cancelled {
            debug!(channel = %channel.name(), "Cancelled running fade before fade-out");
        }

        if !channel.resource().is_playing() {
            // A blocked fade-in left a partial volume behind; the resource is silent
            if cancelled {
                state.current_volume = 0.0;
                state.target_volume = 0.0;
                channel.resource().set_volume(0.0);
            }
            debug!(channel = %channel.name(), "Fade-out skipped, channel already stopped");
            return FadeHandle::settled(channel);
        }

        state.target_volume = 0.0;
        let ramp = VolumeRamp::new(state.current_volume, 0.0, duration, self.step);
        let id = state.allocate_fade_id();
        let task = tokio::spawn(run_ramp(channel.clone(), ramp, self.step, RampEnd::Pause, id));
        state.active_fade = Some(ActiveFade {
            id,
            abort: task.abort_handle(),
        });

        debug!(
            channel = %channel.name(),
            from = ramp.from(),
            steps = ramp.steps(),
            "Fade-out started"
        );
        FadeHandle {
            channel: channel.name().to_string(),
            task: Some(task),
        }
    }

    /// Start a fade-in without waiting for it
    ///
    /// A rejected playback start is logged and the ramp proceeds anyway; the
    /// resource catches up once the host allows playback.
    pub fn begin_fade_in(
        &self,
        channel: &AudioChannel,
        target: f32,
        duration: Duration,
    ) -> AudioResult<FadeHandle> {
        if !(0.0..=1.0).contains(&target) {
            return Err(AudioError::InvalidVolume(target));
        }

        let mut state = channel.lock_state();
        if state.cancel_fade() {
            debug!(channel = %channel.name(), "Cancelled running fade before fade-in");
        }

        state.current_volume = 0.0;
        state.target_volume = target;
        channel.resource().set_volume(0.0);

        if let Err(e) = channel.resource().play() {
            warn!(channel = %channel.name(), "{}; continuing fade-in", e);
        }

        let ramp = VolumeRamp::new(0.0, target, duration, self.step);
        let id = state.allocate_fade_id();
        let task = tokio::spawn(run_ramp(channel.clone(), ramp, self.step, RampEnd::Hold, id));
        state.active_fade = Some(ActiveFade {
            id,
            abort: task.abort_handle(),
        });

        debug!(
            channel = %channel.name(),
            target,
            steps = ramp.steps(),
            "Fade-in started"
        );
        Ok(FadeHandle {
            channel: channel.name().to_string(),
            task: Some(task),
        })
    }
}

async fn run_ramp(channel: AudioChannel, ramp: VolumeRamp, step: Duration, end: RampEnd, id: u64) {
    for n in 1..=ramp.steps() {
        tokio::time::sleep(step).await;

        let mut state = channel.lock_state();
        if !state.is_owned_by(id) {
            return;
        }
        let volume = ramp.value_at(n);
        state.current_volume = volume;
        channel.resource().set_volume(volume);
    }

    let mut state = channel.lock_state();
    if !state.is_owned_by(id) {
        return;
    }
    if end == RampEnd::Pause {
        channel.resource().pause();
    }
    state.active_fade = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{AudioResource, VirtualResource};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn channel(resource: &Arc<VirtualResource>, volume: f32) -> AudioChannel {
        AudioChannel::new(resource.name().to_string(), resource.clone(), volume)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_out_converges_and_pauses() {
        let res = Arc::new(VirtualResource::playing("village", 0.6));
        let ch = channel(&res, 0.6);
        let engine = FadeEngine::default();

        let started = Instant::now();
        let outcome = engine.fade_out(&ch, Duration::from_millis(800)).await;
        let elapsed = started.elapsed();

        assert_eq!(outcome, FadeOutcome::Completed);
        assert_eq!(ch.current_volume(), 0.0);
        assert_eq!(res.volume(), 0.0);
        assert!(!res.is_playing());
        assert!(!ch.is_fading());
        assert!(elapsed >= Duration::from_millis(800));
        assert!(elapsed <= Duration::from_millis(850));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_out_on_stopped_channel_resolves_immediately() {
        let res = Arc::new(VirtualResource::new("village"));
        let ch = channel(&res, 0.3);
        let engine = FadeEngine::default();

        let started = Instant::now();
        let outcome = engine.fade_out(&ch, Duration::from_millis(800)).await;

        assert_eq!(outcome, FadeOutcome::AlreadyStopped);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(ch.current_volume(), 0.3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_in_converges_and_plays() {
        let res = Arc::new(VirtualResource::new("video"));
        let ch = channel(&res, 0.0);
        let engine = FadeEngine::default();

        let started = Instant::now();
        let outcome = engine.fade_in(&ch, 0.8, Duration::from_millis(1000)).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(outcome, FadeOutcome::Completed);
        assert_eq!(ch.current_volume(), 0.8);
        assert_eq!(res.volume(), 0.8);
        assert!(res.is_playing());
        assert!(elapsed >= Duration::from_millis(1000));
        assert!(elapsed <= Duration::from_millis(1050));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_in_starts_from_zero() {
        let res = Arc::new(VirtualResource::playing("village", 0.5));
        let ch = channel(&res, 0.5);
        let engine = FadeEngine::default();

        let handle = engine.begin_fade_in(&ch, 0.6, Duration::from_millis(500)).unwrap();
        assert_eq!(ch.current_volume(), 0.0);
        assert_eq!(res.volume(), 0.0);
        assert_eq!(ch.target_volume(), 0.6);

        assert_eq!(handle.settle().await, FadeOutcome::Completed);
        assert_eq!(ch.current_volume(), 0.6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_in_with_autoplay_blocked_still_ramps() {
        let res = Arc::new(VirtualResource::new("village"));
        res.set_autoplay_blocked(true);
        let ch = channel(&res, 0.0);
        let engine = FadeEngine::default();

        let outcome = engine.fade_in(&ch, 0.6, Duration::from_millis(300)).await.unwrap();

        assert_eq!(outcome, FadeOutcome::Completed);
        assert_eq!(ch.current_volume(), 0.6);
        assert_eq!(res.play_attempts(), 1);
        assert!(!res.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_in_rejects_invalid_target() {
        let res = Arc::new(VirtualResource::new("video"));
        let ch = channel(&res, 0.0);
        let engine = FadeEngine::default();

        let err = engine.begin_fade_in(&ch, 1.2, Duration::from_millis(100)).unwrap_err();
        assert_eq!(err, AudioError::InvalidVolume(1.2));
        assert_eq!(res.play_attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_in_supersedes_fade_out() {
        let res = Arc::new(VirtualResource::playing("village", 0.6));
        let ch = channel(&res, 0.6);
        let engine = FadeEngine::default();

        let out = engine.begin_fade_out(&ch, Duration::from_millis(800));
        tokio::time::sleep(Duration::from_millis(210)).await;
        let mid = ch.current_volume();
        assert!(mid < 0.6 && mid > 0.0);

        let fade_in = engine.begin_fade_in(&ch, 0.6, Duration::from_millis(400)).unwrap();
        assert_eq!(out.settle().await, FadeOutcome::Superseded);

        // The in-ramp starts from zero and only ever climbs
        let mut last = ch.current_volume();
        for _ in 0..8 {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let now = ch.current_volume();
            assert!(now >= last);
            last = now;
        }

        assert_eq!(fade_in.settle().await, FadeOutcome::Completed);
        assert_eq!(ch.current_volume(), 0.6);
        assert!(res.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_out_supersedes_fade_in() {
        let res = Arc::new(VirtualResource::new("video"));
        let ch = channel(&res, 0.0);
        let engine = FadeEngine::default();

        let fade_in = engine.begin_fade_in(&ch, 0.8, Duration::from_millis(1000)).unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;

        let out = engine.begin_fade_out(&ch, Duration::from_millis(200));
        assert_eq!(fade_in.settle().await, FadeOutcome::Superseded);
        assert_eq!(out.settle().await, FadeOutcome::Completed);
        assert_eq!(ch.current_volume(), 0.0);
        assert!(!res.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_out_cancels_fade_on_blocked_channel() {
        let res = Arc::new(VirtualResource::new("village"));
        res.set_autoplay_blocked(true);
        let ch = channel(&res, 0.0);
        let engine = FadeEngine::default();

        let fade_in = engine.begin_fade_in(&ch, 0.6, Duration::from_millis(1000)).unwrap();
        tokio::time::sleep(Duration::from_millis(210)).await;
        assert!(ch.current_volume() > 0.0);

        let out = engine.begin_fade_out(&ch, Duration::from_millis(500));

        assert_eq!(out.settle().await, FadeOutcome::AlreadyStopped);
        assert_eq!(fade_in.settle().await, FadeOutcome::Superseded);
        assert!(!ch.is_fading());
        assert_eq!(ch.current_volume(), 0.0);
        assert_eq!(ch.target_volume(), 0.0);
        assert_eq!(res.volume(), 0.0);
    }

    #[test]
    fn test_engine_step_never_zero() {
        let engine = FadeEngine::new(Duration::ZERO);
        assert_eq!(engine.step(), Duration::from_millis(1));
        assert_eq!(FadeEngine::default().step(), DEFAULT_FADE_STEP);
    }
}
