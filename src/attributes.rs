//! Publish attribute schema.
//!
//! Every published alert carries the same set of filter attributes so that
//! subscribers can select alerts without parsing the body:
//!
//! | name        | type           | present              |
//! |-------------|----------------|----------------------|
//! | `AlertType` | `String`       | always               |
//! | `Scope`     | `String`       | always               |
//! | `Camera`    | `String`       | camera-scoped alerts |
//! | `Group`     | `String.Array` | camera-scoped alerts |
//! | `DayOfWeek` | `Number`       | always (ISO, 1-7)    |
//! | `Hour`      | `Number`       | always (UTC, 0-23)   |

use crate::types::{AlertCategory, AlertScope, EventTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const ALERT_TYPE: &str = "AlertType";
pub const SCOPE: &str = "Scope";
pub const CAMERA: &str = "Camera";
pub const GROUP: &str = "Group";
pub const DAY_OF_WEEK: &str = "DayOfWeek";
pub const HOUR: &str = "Hour";

/// Encoding of a device that belongs to no group.
pub const EMPTY_GROUPS: &str = "[]";

/// Declared type of an attribute value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeDataType {
    String,
    #[serde(rename = "String.Array")]
    StringArray,
    Number,
}

/// A single typed attribute. Values are always carried as strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageAttribute {
    pub data_type: AttributeDataType,
    pub string_value: String,
}

impl MessageAttribute {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            data_type: AttributeDataType::String,
            string_value: value.into(),
        }
    }

    pub fn number(value: impl ToString) -> Self {
        Self {
            data_type: AttributeDataType::Number,
            string_value: value.to_string(),
        }
    }

    pub fn string_array<'a>(values: impl IntoIterator<Item = &'a String>) -> Self {
        let sorted: BTreeSet<&String> = values.into_iter().collect();
        let encoded =
            serde_json::to_string(&sorted).unwrap_or_else(|_| EMPTY_GROUPS.to_string());
        Self {
            data_type: AttributeDataType::StringArray,
            string_value: encoded,
        }
    }
}

/// Filter attributes attached to one published alert.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublishAttributes(BTreeMap<String, MessageAttribute>);

impl PublishAttributes {
    pub fn get(&self, name: &str) -> Option<&MessageAttribute> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MessageAttribute)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn value(&self, name: &str) -> Option<&str> {
        self.get(name).map(|a| a.string_value.as_str())
    }

    pub fn alert_type(&self) -> Option<&str> {
        self.value(ALERT_TYPE)
    }

    pub fn scope(&self) -> Option<&str> {
        self.value(SCOPE)
    }

    pub fn camera(&self) -> Option<&str> {
        self.value(CAMERA)
    }

    /// Decoded group memberships.
    pub fn groups(&self) -> Option<BTreeSet<String>> {
        serde_json::from_str(self.value(GROUP)?).ok()
    }

    pub fn day_of_week(&self) -> Option<u32> {
        self.value(DAY_OF_WEEK)?.parse().ok()
    }

    pub fn hour(&self) -> Option<u32> {
        self.value(HOUR)?.parse().ok()
    }

    fn insert(&mut self, name: &str, attribute: MessageAttribute) {
        self.0.insert(name.to_string(), attribute);
    }
}

/// Routing context of an alert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AlertTarget {
    Camera {
        device_id: String,
        groups: BTreeSet<String>,
    },
    Global,
}

impl AlertTarget {
    pub fn scope(&self) -> AlertScope {
        match self {
            AlertTarget::Camera { .. } => AlertScope::Camera,
            AlertTarget::Global => AlertScope::Global,
        }
    }

    pub fn device_id(&self) -> Option<&str> {
        match self {
            AlertTarget::Camera { device_id, .. } => Some(device_id),
            AlertTarget::Global => None,
        }
    }
}

/// Build the filter attributes for an alert.
///
/// Day and hour come from the event time, never the wall clock, so equal
/// inputs always give equal output.
pub fn build_attributes(
    category: AlertCategory,
    target: &AlertTarget,
    time: EventTime,
) -> PublishAttributes {
    let mut attributes = PublishAttributes::default();
    attributes.insert(ALERT_TYPE, MessageAttribute::string(category.as_str()));
    attributes.insert(SCOPE, MessageAttribute::string(target.scope().as_str()));
    if let AlertTarget::Camera { device_id, groups } = target {
        attributes.insert(CAMERA, MessageAttribute::string(device_id.as_str()));
        attributes.insert(GROUP, MessageAttribute::string_array(groups));
    }
    attributes.insert(DAY_OF_WEEK, MessageAttribute::number(time.iso_weekday()));
    attributes.insert(HOUR, MessageAttribute::number(time.hour()));
    attributes
}
