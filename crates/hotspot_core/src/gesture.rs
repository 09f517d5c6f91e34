//! Gesture Hit-Testing
//!
//! One-shot check of a point (pinch position, controller hand) against the
//! interactive hotspots. Unlike proximity zones there is no latch; the
//! orchestrator's mode guard is what stops repeated gestures from re-entering.

use serde::{Deserialize, Serialize};

use crate::geometry::Point3;
use crate::proximity::ZoneId;

/// Default pinch hit distance
pub const DEFAULT_PINCH_THRESHOLD: f32 = 0.3;

/// Default reach for a controller trigger press
pub const DEFAULT_CONTROLLER_REACH: f32 = 2.0;

/// Something a gesture can select
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractiveTarget {
    pub id: ZoneId,
    pub position: Point3,
}

impl InteractiveTarget {
    pub fn new(id: impl Into<ZoneId>, position: Point3) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }
}

/// Distance-threshold hit test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureEvaluator {
    threshold: f32,
    inclusive: bool,
}

impl GestureEvaluator {
    /// Hand-tracking pinch: hit strictly inside `threshold`
    pub fn pinch(threshold: f32) -> Self {
        Self {
            threshold,
            inclusive: false,
        }
    }

    /// Controller trigger: hit within `reach`, boundary included
    pub fn controller(reach: f32) -> Self {
        Self {
            threshold: reach,
            inclusive: true,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    fn hits(&self, distance: f32) -> bool {
        if self.inclusive {
            distance <= self.threshold
        } else {
            distance < self.threshold
        }
    }

    /// The nearest target within range of `point`, if any
    pub fn evaluate<'a>(
        &self,
        point: &Point3,
        targets: &'a [InteractiveTarget],
    ) -> Option<&'a InteractiveTarget> {
        targets
            .iter()
            .map(|target| (target, target.position.distance_to(point)))
            .filter(|(_, distance)| self.hits(*distance))
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(target, _)| target)
    }
}

impl Default for GestureEvaluator {
    fn default() -> Self {
        Self::pinch(DEFAULT_PINCH_THRESHOLD)
    }
}
