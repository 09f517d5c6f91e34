//! Frame Scheduler
//!
//! Replaces a render-loop tick hook: a tokio interval at the configured frame
//! rate pulls one observer sample per frame and hands it to the proximity
//! monitor. Late frames are skipped rather than bunched up.

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::proximity::{ObserverSample, ProximityMonitor};

/// Produces the observer position once per frame
///
/// Returning `None` ends the scheduler.
pub trait ObserverSource: Send {
    fn sample(&mut self) -> Option<ObserverSample>;
}

impl<F> ObserverSource for F
where
    F: FnMut() -> Option<ObserverSample> + Send,
{
    fn sample(&mut self) -> Option<ObserverSample> {
        self()
    }
}

/// Per-frame driver for a `ProximityMonitor`
pub struct FrameScheduler {
    monitor: ProximityMonitor,
    frame_interval: Duration,
}

impl FrameScheduler {
    pub fn new(monitor: ProximityMonitor, frame_interval: Duration) -> Self {
        Self {
            monitor,
            frame_interval: frame_interval.max(Duration::from_millis(1)),
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Run until the source is exhausted or the orchestrator goes away
    ///
    /// Returns the number of frames evaluated.
    pub async fn run<S: ObserverSource>(self, mut source: S) -> u64 {
        let mut ticker = interval(self.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(
            interval_ms = self.frame_interval.as_millis() as u64,
            "Frame scheduler started"
        );

        let mut frames = 0u64;
        loop {
            ticker.tick().await;
            if self.monitor.is_detached() {
                debug!("Orchestrator gone, stopping frame scheduler");
                break;
            }
            let Some(sample) = source.sample() else {
                break;
            };
            self.monitor.on_frame(&sample);
            frames += 1;
        }

        info!(frames, "Frame scheduler stopped");
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{event_channel, SessionEvent};
    use crate::geometry::Point3;
    use crate::proximity::{TriggerZone, ZoneSet};
    use crate::session::{SessionHandle, SessionSnapshot};
    use tokio::sync::watch;

    #[tokio::test(start_paused = true)]
    async fn test_walk_into_zone_triggers_once() {
        let (sender, mut receiver) = event_channel();
        let (_tx, rx) = watch::channel(SessionSnapshot::default());
        let zones = ZoneSet::new(vec![TriggerZone::new("well", Point3::ORIGIN, 2.0)]);
        let monitor = ProximityMonitor::new(zones, SessionHandle::new(rx), sender);
        let scheduler = FrameScheduler::new(monitor, Duration::from_millis(20));

        // Walk from z = 5 to z = 0 at 0.1 units per frame
        let mut z = 5.0f32;
        let source = move || {
            if z < 0.0 {
                return None;
            }
            let sample = ObserverSample::camera(Point3::new(0.0, 0.0, z));
            z -= 0.1;
            Some(sample)
        };

        let frames = scheduler.run(source).await;
        assert!(frames >= 50);

        let mut triggers = 0;
        while let Ok(event) = receiver.try_recv() {
            assert!(matches!(event, SessionEvent::Trigger(_)));
            triggers += 1;
        }
        assert_eq!(triggers, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_orchestrator_gone() {
        let (sender, receiver) = event_channel();
        let (_tx, rx) = watch::channel(SessionSnapshot::default());
        let monitor = ProximityMonitor::new(ZoneSet::default(), SessionHandle::new(rx), sender);
        drop(receiver);

        let frames = FrameScheduler::new(monitor, Duration::from_millis(10))
            .run(|| Some(ObserverSample::camera(Point3::ORIGIN)))
            .await;
        assert_eq!(frames, 0);
    }
}
