//! Shared fixtures for integration tests.

#![allow(dead_code)]

use alert_dispatch::{
    AlertError, Device, EntityResolver, Image, PublishAttributes, Publisher, Result, StreamRecord,
};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

pub const ACCOUNT: &str = "acct1";
pub const BASE_URL: &str = "https://cams.example.com";
pub const EVENT_TIME: i64 = 1_700_000_000;

pub fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Collects formatted log lines emitted while [`LogCapture::run`] is active
/// on the current thread.
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

pub struct LogWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}

impl LogCapture {
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.buffer.lock())
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Lines at `level` whose text contains `message`.
    pub fn count(&self, level: &str, message: &str) -> usize {
        self.lines()
            .iter()
            .filter(|line| line.contains(level) && line.contains(message))
            .count()
    }
}

pub fn motion_record(device: &str, trigger: &str) -> StreamRecord {
    StreamRecord::insert(
        Image::new()
            .with_string("PK", format!("MotionVideos:{ACCOUNT}:{device}"))
            .with_string("SK", "clip.mp4")
            .with_string("thingName", device)
            .with_string("trigger", trigger)
            .with_number("duration", 12)
            .with_string("motionVideo", "clip.mp4")
            .with_number("updateTime", EVENT_TIME),
    )
}

pub fn health_record(device: &str, old_status: &str, new_status: &str) -> StreamRecord {
    let image = |status: &str| {
        Image::new()
            .with_string("PK", format!("DeviceHealth:{ACCOUNT}:latest"))
            .with_string("SK", device)
            .with_string("thingName", device)
            .with_string("status", status)
            .with_number("updateTime", EVENT_TIME)
    };
    StreamRecord::modify(image(old_status), image(new_status))
}

pub fn version_record(old_tag: &str, new_tag: &str) -> StreamRecord {
    let image = |tag: &str| {
        Image::new()
            .with_string("PK", format!("Versions:{ACCOUNT}:latest"))
            .with_string("SK", "current")
            .with_string("tag", tag)
            .with_string("commit", format!("https://example.com/commit/{tag}"))
            .with_number("updateTime", EVENT_TIME)
    };
    StreamRecord::modify(image(old_tag), image(new_tag))
}

/// A published alert as captured by [`RecordingPublisher`].
#[derive(Clone, Debug)]
pub struct Captured {
    pub subject: String,
    pub body: String,
    pub attributes: PublishAttributes,
}

/// Records every publish; fails those whose subject contains `fail_on` and
/// panics on those containing `panic_on`.
#[derive(Default)]
pub struct RecordingPublisher {
    pub published: Mutex<Vec<Captured>>,
    pub fail_on: Option<String>,
    pub panic_on: Option<String>,
    pub delay: Option<Duration>,
}

impl RecordingPublisher {
    pub fn failing_on(subject_fragment: &str) -> Self {
        Self {
            fail_on: Some(subject_fragment.to_string()),
            ..Default::default()
        }
    }

    pub fn panicking_on(subject_fragment: &str) -> Self {
        Self {
            panic_on: Some(subject_fragment.to_string()),
            ..Default::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn captured(&self) -> Vec<Captured> {
        self.published.lock().clone()
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&self, subject: &str, body: &str, attributes: &PublishAttributes) -> Result<()> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if let Some(fragment) = &self.panic_on {
            if subject.contains(fragment.as_str()) {
                panic!("publisher crashed on {subject:?}");
            }
        }
        if let Some(fragment) = &self.fail_on {
            if subject.contains(fragment.as_str()) {
                return Err(AlertError::Publish("topic unavailable".into()));
            }
        }
        self.published.lock().push(Captured {
            subject: subject.to_string(),
            body: body.to_string(),
            attributes: attributes.clone(),
        });
        Ok(())
    }
}

/// A resolver whose backing store is unreachable.
pub struct UnreachableResolver;

impl EntityResolver for UnreachableResolver {
    fn resolve_device(&self, _account_id: &str, _thing_name: &str) -> Result<Option<Device>> {
        Err(AlertError::Resolution("connection refused".into()))
    }

    fn resolve_groups(&self, _account_id: &str, _thing_name: &str) -> Result<BTreeSet<String>> {
        Err(AlertError::Resolution("connection refused".into()))
    }
}
