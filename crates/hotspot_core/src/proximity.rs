//! Proximity Triggers
//!
//! Hotspots are spheres in world space. Once per frame the monitor measures
//! the active observer's distance to every zone; a zone that finds the
//! observer inside its radius latches and raises exactly one trigger. It stays
//! silent until the orchestrator resets it on the way back to exploration.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::event::{EventSender, SessionEvent, TriggerSource};
use crate::geometry::Point3;
use crate::session::{SessionHandle, SessionMode};

/// Stable identifier of a hotspot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl ZoneId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ZoneId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ZoneId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of one distance check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityReading {
    pub in_range: bool,
    pub distance: f32,
}

/// A latch-once spherical hotspot
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerZone {
    id: ZoneId,
    position: Point3,
    radius: f32,
    latched: bool,
}

impl TriggerZone {
    pub fn new(id: impl Into<ZoneId>, position: Point3, radius: f32) -> Self {
        Self {
            id: id.into(),
            position,
            radius,
            latched: false,
        }
    }

    pub fn id(&self) -> &ZoneId {
        &self.id
    }

    pub fn position(&self) -> Point3 {
        self.position
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Distance check against `observer`; inclusive at the radius
    #[inline]
    pub fn evaluate(&self, observer: &Point3) -> ProximityReading {
        let distance = self.position.distance_to(observer);
        ProximityReading {
            in_range: distance <= self.radius,
            distance,
        }
    }

    /// Evaluate and latch. Returns the reading only on the tick that latches.
    pub fn sample(&mut self, observer: &Point3) -> Option<ProximityReading> {
        if self.latched {
            return None;
        }
        let reading = self.evaluate(observer);
        if reading.in_range {
            self.latched = true;
            Some(reading)
        } else {
            None
        }
    }

    /// Re-arm the zone
    pub fn reset(&mut self) {
        self.latched = false;
    }
}

/// The registered hotspots, shared by the monitor and the orchestrator
#[derive(Debug, Clone, Default)]
pub struct ZoneSet {
    zones: Arc<Mutex<Vec<TriggerZone>>>,
}

impl ZoneSet {
    pub fn new(zones: Vec<TriggerZone>) -> Self {
        Self {
            zones: Arc::new(Mutex::new(zones)),
        }
    }

    pub fn len(&self) -> usize {
        self.zones.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.lock().is_empty()
    }

    /// Copy of every zone as it stands now
    pub fn snapshot(&self) -> Vec<TriggerZone> {
        self.zones.lock().clone()
    }

    pub fn is_latched(&self, id: &ZoneId) -> Option<bool> {
        self.zones
            .lock()
            .iter()
            .find(|zone| zone.id() == id)
            .map(TriggerZone::is_latched)
    }

    /// Clear every latch
    pub fn reset_all(&self) {
        let mut zones = self.zones.lock();
        for zone in zones.iter_mut() {
            zone.reset();
        }
        debug!(zones = zones.len(), "Proximity latches reset");
    }

    /// Sample every zone against `observer`, latching those now in range
    pub fn sample_all(&self, observer: &Point3) -> Vec<(ZoneId, ProximityReading)> {
        self.zones
            .lock()
            .iter_mut()
            .filter_map(|zone| zone.sample(observer).map(|reading| (zone.id().clone(), reading)))
            .collect()
    }
}

/// Where the viewer is this frame
///
/// An immersive session reports a tracked origin; desktop sessions only have
/// the camera.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ObserverSample {
    pub tracked_origin: Option<Point3>,
    pub camera: Option<Point3>,
}

impl ObserverSample {
    pub fn camera(position: Point3) -> Self {
        Self {
            tracked_origin: None,
            camera: Some(position),
        }
    }

    pub fn tracked(position: Point3) -> Self {
        Self {
            tracked_origin: Some(position),
            camera: None,
        }
    }

    /// Tracked origin if there is one, else the camera
    pub fn active_position(&self) -> Option<Point3> {
        self.tracked_origin.or(self.camera)
    }
}

/// Per-frame proximity evaluation
#[derive(Debug, Clone)]
pub struct ProximityMonitor {
    zones: ZoneSet,
    session: SessionHandle,
    events: EventSender,
}

impl ProximityMonitor {
    pub fn new(zones: ZoneSet, session: SessionHandle, events: EventSender) -> Self {
        Self {
            zones,
            session,
            events,
        }
    }

    pub fn zones(&self) -> &ZoneSet {
        &self.zones
    }

    /// Whether the orchestrator has stopped listening
    pub fn is_detached(&self) -> bool {
        self.events.is_closed()
    }

    /// Run one frame's worth of checks
    ///
    /// Skipped entirely unless the session is exploring, so nothing latches
    /// while media is showing or a transition is running. Returns the number
    /// of triggers raised.
    pub fn on_frame(&self, sample: &ObserverSample) -> usize {
        if self.session.mode() != SessionMode::Exploring {
            return 0;
        }
        let Some(observer) = sample.active_position() else {
            return 0;
        };

        let hits = self.zones.sample_all(&observer);
        for (zone, reading) in &hits {
            info!(zone = %zone, distance = reading.distance, "Proximity triggered");
            let trigger = TriggerSource::Proximity {
                zone: zone.clone(),
                distance: reading.distance,
            };
            if self.events.send(SessionEvent::Trigger(trigger)).is_err() {
                debug!("Proximity trigger dropped, orchestrator gone");
            }
        }
        hits.len()
    }
}
