//! Alert text rendering.
//!
//! Renderers are pure: everything they need has been extracted by the
//! classifier or resolved by the dispatcher beforehand.

use crate::classify::{Detection, HealthChange, MotionClip, VersionRelease};
use crate::types::{AlertCategory, Device, RenderedAlert};

/// Subject line of software version alerts.
pub const VERSION_SUBJECT: &str = "New software version available";

/// Render a detection. Camera-scoped detections take their resolved device.
///
/// A camera-scoped detection rendered without a device falls back to the
/// device id for its display name.
pub fn render(detection: &Detection, device: Option<&Device>, base_url: &str) -> RenderedAlert {
    match detection {
        Detection::Motion(clip) => render_motion(clip, &display_name(device, &clip.thing_name), base_url),
        Detection::Health(change) => render_health(change, &display_name(device, &change.thing_name)),
        Detection::Version(release) => render_version(release),
    }
}

fn display_name(device: Option<&Device>, fallback: &str) -> String {
    device
        .map(|d| d.display_name.clone())
        .unwrap_or_else(|| fallback.to_string())
}

/// Playback link for a motion clip.
pub fn video_link(base_url: &str, motion_video: &str, thing_name: &str) -> String {
    format!(
        "{}/account/videos/{}/cameras/{}",
        base_url.trim_end_matches('/'),
        motion_video,
        thing_name
    )
}

pub fn render_motion(clip: &MotionClip, display_name: &str, base_url: &str) -> RenderedAlert {
    let link = video_link(base_url, &clip.motion_video, &clip.thing_name);
    RenderedAlert {
        subject: format!("Motion detected by {display_name}"),
        body: format!(
            "A {}sec motion video was recorded by {} on {}. Head over to {} to view the entire video.",
            clip.duration_secs,
            display_name,
            clip.time.to_iso8601(),
            link
        ),
        category: AlertCategory::Motion,
    }
}

pub fn render_health(change: &HealthChange, display_name: &str) -> RenderedAlert {
    RenderedAlert {
        subject: format!("{} is now {}", display_name, change.new_status),
        body: format!(
            "{} changed from {} to {} on {}.",
            display_name,
            change.old_status,
            change.new_status,
            change.time.to_iso8601()
        ),
        category: AlertCategory::Health,
    }
}

pub fn render_version(release: &VersionRelease) -> RenderedAlert {
    let mut body = format!(
        "Software version {} was released on {}.",
        release.tag,
        release.time.to_iso8601()
    );
    if let Some(url) = &release.commit_url {
        body.push_str(&format!(" See {url} for the changes."));
    }
    RenderedAlert {
        subject: VERSION_SUBJECT.to_string(),
        body,
        category: AlertCategory::SoftwareVersion,
    }
}
