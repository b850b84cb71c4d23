//! Classification of stream records into alert categories.
//!
//! Each [`AlertRule`] tests one record against one category. Rules are
//! independent: every rule in the table is evaluated and a single record may
//! yield several detections.
//!
//! A rule that matches also extracts a typed [`Detection`] carrying what its
//! renderer needs. Records missing those fields are malformed and count as
//! non-matches.

mod detection;
mod rules;

pub use detection::{Detection, HealthChange, MotionClip, VersionRelease};
pub use rules::{
    classify_all, is_new_motion, is_new_version, is_unhealthy_transition, AlertRule,
    DEFAULT_HEALTH_STATUS,
};
