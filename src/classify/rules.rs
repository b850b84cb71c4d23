//! The classification rule table.

use super::detection::{Detection, HealthChange, MotionClip, VersionRelease};
use crate::types::{AlertCategory, AlertScope, EventKind, EventTime, Image, StreamRecord};

/// Health status assumed when a snapshot carries none.
pub const DEFAULT_HEALTH_STATUS: &str = "HEALTHY";

/// Trigger value of clips that alert. Other triggers are indexed but silent.
const MOTION_TRIGGER: &str = "motion";

/// One entry in the classification table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlertRule {
    Motion,
    Health,
    Version,
}

impl AlertRule {
    /// The default table, in evaluation order.
    pub const ALL: [AlertRule; 3] = [AlertRule::Motion, AlertRule::Health, AlertRule::Version];

    pub fn category(&self) -> AlertCategory {
        match self {
            AlertRule::Motion => AlertCategory::Motion,
            AlertRule::Health => AlertCategory::Health,
            AlertRule::Version => AlertCategory::SoftwareVersion,
        }
    }

    pub fn scope(&self) -> AlertScope {
        match self {
            AlertRule::Motion | AlertRule::Health => AlertScope::Camera,
            AlertRule::Version => AlertScope::Global,
        }
    }

    /// Whether the record belongs to this rule's category.
    pub fn matches(&self, record: &StreamRecord, account_id: &str) -> bool {
        match self {
            AlertRule::Motion => is_new_motion(record, account_id),
            AlertRule::Health => is_unhealthy_transition(record, account_id),
            AlertRule::Version => is_new_version(record, account_id),
        }
    }

    /// Match the record and extract its detection.
    ///
    /// Returns `None` for non-matches and for matches that lack the fields
    /// needed to render an alert.
    pub fn classify(&self, record: &StreamRecord, account_id: &str) -> Option<Detection> {
        if !self.matches(record, account_id) {
            return None;
        }
        let new = record.new_image.as_ref()?;
        let detection = match self {
            AlertRule::Motion => extract_motion(new, account_id).map(Detection::Motion),
            AlertRule::Health => {
                extract_health(record.old_image.as_ref(), new).map(Detection::Health)
            }
            AlertRule::Version => extract_version(new).map(Detection::Version),
        };
        if detection.is_none() {
            tracing::debug!(
                record = record.label(),
                category = %self.category(),
                "record matched but is missing fields needed to render"
            );
        }
        detection
    }
}

/// Run every rule against a record, keeping all matches.
pub fn classify_all(rules: &[AlertRule], record: &StreamRecord, account_id: &str) -> Vec<Detection> {
    rules
        .iter()
        .filter_map(|rule| rule.classify(record, account_id))
        .collect()
}

/// A newly indexed clip whose trigger was motion.
pub fn is_new_motion(record: &StreamRecord, account_id: &str) -> bool {
    if record.event_kind != EventKind::Insert {
        return false;
    }
    let Some(new) = record.new_image.as_ref() else {
        return false;
    };
    let prefix = format!("MotionVideos:{account_id}:");
    new.string("PK").is_some_and(|pk| pk.starts_with(&prefix))
        && new.string("trigger") == Some(MOTION_TRIGGER)
}

/// A change of the latest health status for a device.
pub fn is_unhealthy_transition(record: &StreamRecord, account_id: &str) -> bool {
    let Some(new) = modified_latest(record, "DeviceHealth", account_id) else {
        return false;
    };
    health_status(record.old_image.as_ref()) != health_status(Some(new))
}

/// A change of the latest published software tag.
pub fn is_new_version(record: &StreamRecord, account_id: &str) -> bool {
    let Some(new) = modified_latest(record, "Versions", account_id) else {
        return false;
    };
    let old_tag = record.old_image.as_ref().and_then(|img| img.string("tag"));
    new.string("tag") != old_tag
}

/// New image of a MODIFY on the `<kind>:<account>:latest` item.
fn modified_latest<'a>(record: &'a StreamRecord, kind: &str, account_id: &str) -> Option<&'a Image> {
    if record.event_kind != EventKind::Modify {
        return None;
    }
    let new = record.new_image.as_ref()?;
    let expected = format!("{kind}:{account_id}:latest");
    (new.string("PK") == Some(expected.as_str())).then_some(new)
}

fn health_status(image: Option<&Image>) -> &str {
    image
        .and_then(|img| img.string("status"))
        .unwrap_or(DEFAULT_HEALTH_STATUS)
}

/// `updateTime`, falling back to `createTime` on rows that predate it.
fn event_time(image: &Image) -> Option<EventTime> {
    image
        .timestamp("updateTime")
        .or_else(|| image.timestamp("createTime"))
}

fn extract_motion(new: &Image, account_id: &str) -> Option<MotionClip> {
    let thing_name = match new.string("thingName") {
        Some(name) => name.to_string(),
        None => {
            let prefix = format!("MotionVideos:{account_id}:");
            let device = new.string("PK")?.strip_prefix(&prefix)?;
            if device.is_empty() {
                return None;
            }
            device.to_string()
        }
    };
    Some(MotionClip {
        thing_name,
        motion_video: new.string("motionVideo")?.to_string(),
        duration_secs: new.integer("duration").unwrap_or(0).max(0) as u64,
        time: event_time(new)?,
    })
}

fn extract_health(old: Option<&Image>, new: &Image) -> Option<HealthChange> {
    let thing_name = new
        .string("thingName")
        .or_else(|| new.string("thing_name"))?;
    Some(HealthChange {
        thing_name: thing_name.to_string(),
        old_status: health_status(old).to_string(),
        new_status: health_status(Some(new)).to_string(),
        time: event_time(new)?,
    })
}

fn extract_version(new: &Image) -> Option<VersionRelease> {
    let commit_url = match new.get("commit") {
        Some(value) => value
            .as_str()
            .or_else(|| value.as_map()?.get("url")?.as_str())
            .map(str::to_string),
        None => None,
    };
    Some(VersionRelease {
        tag: new.string("tag")?.to_string(),
        commit_url,
        time: event_time(new)?,
    })
}
