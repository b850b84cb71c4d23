//! Typed detections extracted from matching records.

use crate::types::{AlertCategory, AlertScope, EventTime};

/// A new motion clip was indexed for a camera.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MotionClip {
    pub thing_name: String,
    pub motion_video: String,
    pub duration_secs: u64,
    pub time: EventTime,
}

/// A device's health status changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HealthChange {
    pub thing_name: String,
    pub old_status: String,
    pub new_status: String,
    pub time: EventTime,
}

/// A new software version tag was published.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionRelease {
    pub tag: String,
    pub commit_url: Option<String>,
    pub time: EventTime,
}

/// One matched classification, one variant per category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Detection {
    Motion(MotionClip),
    Health(HealthChange),
    Version(VersionRelease),
}

impl Detection {
    pub fn category(&self) -> AlertCategory {
        match self {
            Detection::Motion(_) => AlertCategory::Motion,
            Detection::Health(_) => AlertCategory::Health,
            Detection::Version(_) => AlertCategory::SoftwareVersion,
        }
    }

    pub fn scope(&self) -> AlertScope {
        match self {
            Detection::Motion(_) | Detection::Health(_) => AlertScope::Camera,
            Detection::Version(_) => AlertScope::Global,
        }
    }

    /// Device the alert concerns, for camera-scoped detections.
    pub fn device_id(&self) -> Option<&str> {
        match self {
            Detection::Motion(clip) => Some(&clip.thing_name),
            Detection::Health(change) => Some(&change.thing_name),
            Detection::Version(_) => None,
        }
    }

    /// Canonical event time taken from the record.
    pub fn time(&self) -> EventTime {
        match self {
            Detection::Motion(clip) => clip.time,
            Detection::Health(change) => change.time,
            Detection::Version(release) => release.time,
        }
    }
}
