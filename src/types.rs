//! Core types for alert dispatch.

use chrono::{DateTime, Datelike, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A typed field value as carried by the change stream.
///
/// Each value is a single-key object naming its type, e.g. `{"S": "motion"}`
/// or `{"N": "1700000000"}`. Numbers travel as strings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    #[serde(rename = "S")]
    String(String),
    #[serde(rename = "N")]
    Number(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    #[serde(rename = "L")]
    List(Vec<AttributeValue>),
    #[serde(rename = "M")]
    Map(BTreeMap<String, AttributeValue>),
    #[serde(rename = "SS")]
    StringSet(Vec<String>),
    #[serde(rename = "NS")]
    NumberSet(Vec<String>),
    #[serde(rename = "B")]
    Binary(String),
    #[serde(rename = "BS")]
    BinarySet(Vec<String>),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whole-number value of a numeric field. Fractions are floored.
    pub fn as_integer(&self) -> Option<i64> {
        let AttributeValue::Number(raw) = self else {
            return None;
        };
        let raw = raw.trim();
        raw.parse::<i64>()
            .ok()
            .or_else(|| raw.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.floor() as i64))
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, AttributeValue>> {
        match self {
            AttributeValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// Snapshot of an item's fields before or after a change.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Image(BTreeMap<String, AttributeValue>);

impl Image {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    /// String field, `None` if absent or not a string.
    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttributeValue::as_str)
    }

    /// Numeric field parsed into `T`.
    pub fn number<T: FromStr>(&self, name: &str) -> Option<T> {
        match self.get(name)? {
            AttributeValue::Number(raw) => raw.trim().parse().ok(),
            _ => None,
        }
    }

    /// Numeric field as a whole number, flooring fractions.
    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(AttributeValue::as_integer)
    }

    /// Numeric field interpreted as Unix seconds.
    pub fn timestamp(&self, name: &str) -> Option<EventTime> {
        self.integer(name).and_then(EventTime::from_unix)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.0.insert(name.into(), value);
    }

    pub fn with_string(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, AttributeValue::String(value.into()));
        self
    }

    pub fn with_number(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.insert(name, AttributeValue::Number(value.to_string()));
        self
    }

    pub fn with_value(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Kind of change a stream record describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    Insert,
    Modify,
    Remove,
}

/// One change notification from the stream.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamRecord {
    /// Source-assigned identifier, used only for logging.
    pub event_id: Option<String>,

    pub event_kind: EventKind,

    /// Item after the change. Absent for removals.
    pub new_image: Option<Image>,

    /// Item before the change. Present for modifications and removals.
    pub old_image: Option<Image>,
}

impl StreamRecord {
    pub fn insert(new_image: Image) -> Self {
        Self {
            event_id: None,
            event_kind: EventKind::Insert,
            new_image: Some(new_image),
            old_image: None,
        }
    }

    pub fn modify(old_image: Image, new_image: Image) -> Self {
        Self {
            event_id: None,
            event_kind: EventKind::Modify,
            new_image: Some(new_image),
            old_image: Some(old_image),
        }
    }

    pub fn remove(old_image: Image) -> Self {
        Self {
            event_id: None,
            event_kind: EventKind::Remove,
            new_image: None,
            old_image: Some(old_image),
        }
    }

    pub fn with_event_id(mut self, id: impl Into<String>) -> Self {
        self.event_id = Some(id.into());
        self
    }

    /// Partition key of the new image.
    pub fn partition_key(&self) -> Option<&str> {
        self.new_image.as_ref().and_then(|img| img.string("PK"))
    }

    /// Label for log lines.
    pub fn label(&self) -> &str {
        self.event_id.as_deref().unwrap_or("-")
    }
}

/// Event time in UTC, second precision.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventTime(DateTime<Utc>);

impl EventTime {
    /// From Unix seconds. `None` if out of range.
    pub fn from_unix(secs: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp(secs, 0).map(EventTime)
    }

    pub fn unix(&self) -> i64 {
        self.0.timestamp()
    }

    /// ISO weekday, Monday = 1 through Sunday = 7.
    pub fn iso_weekday(&self) -> u32 {
        self.0.weekday().number_from_monday()
    }

    /// Hour of day (0-23) in UTC.
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// ISO-8601 rendering, e.g. `2023-11-14T22:13:20Z`.
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl fmt::Debug for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventTime({})", self.to_iso8601())
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// A registered device, as resolved from the keyed store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub thing_name: String,
    pub display_name: String,
}

impl Device {
    pub fn new(thing_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            thing_name: thing_name.into(),
            display_name: display_name.into(),
        }
    }
}

/// Category of a notifiable occurrence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertCategory {
    Motion,
    Health,
    SoftwareVersion,
}

impl AlertCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertCategory::Motion => "MOTION",
            AlertCategory::Health => "HEALTH",
            AlertCategory::SoftwareVersion => "SOFTWARE_VERSION",
        }
    }
}

impl fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an alert is tied to one device or has no device context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertScope {
    Camera,
    Global,
}

impl AlertScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertScope::Camera => "CAMERA",
            AlertScope::Global => "GLOBAL",
        }
    }
}

impl fmt::Display for AlertScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable alert text produced by a renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedAlert {
    pub subject: String,
    pub body: String,
    pub category: AlertCategory,
}
