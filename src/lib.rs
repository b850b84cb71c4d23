//! # Alert Dispatch
//!
//! Turns change-stream records about monitored devices into filterable
//! alerts.
//!
//! ## Core Concepts
//!
//! - **Stream records**: Insert/modify/remove notifications carrying typed
//!   before and after snapshots of an item
//! - **Rules**: Independent classifiers, one per alert category; a record can
//!   match several
//! - **Resolver**: Read-only lookup of a camera's display name and groups
//! - **Attributes**: A fixed filter schema (type, scope, camera, groups, day,
//!   hour) attached to every published alert
//! - **Dispatcher**: Runs the pipeline per record, best effort, never letting
//!   one alert's failure affect another
//!
//! ## Example
//!
//! ```ignore
//! use alert_dispatch::{ChannelPublisher, Dispatcher, DispatcherConfig, MemoryDirectory};
//! use std::sync::Arc;
//!
//! let directory = MemoryDirectory::new();
//! directory.put_device("acct1", Device::new("dev1", "Front Door"));
//! let (publisher, feed) = ChannelPublisher::new();
//!
//! let dispatcher = Dispatcher::new(
//!     DispatcherConfig::from_env()?,
//!     Arc::new(directory),
//!     Arc::new(publisher),
//! )?;
//!
//! let report = dispatcher.dispatch_json(&payload)?;
//! for alert in feed.drain() {
//!     println!("{}", alert.subject);
//! }
//! ```

pub mod attributes;
pub mod classify;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod publish;
pub mod render;
pub mod resolver;
pub mod stream;
pub mod types;

// Re-exports
pub use attributes::{
    build_attributes, AlertTarget, AttributeDataType, MessageAttribute, PublishAttributes,
};
pub use classify::{
    classify_all, is_new_motion, is_new_version, is_unhealthy_transition, AlertRule, Detection,
    HealthChange, MotionClip, VersionRelease,
};
pub use config::DispatcherConfig;
pub use dispatcher::{CancellationToken, DispatchReport, Dispatcher, Outcome, SkipReason};
pub use error::{AlertError, Result};
pub use publish::{AlertFeed, AlertMessage, ChannelPublisher, Publisher};
pub use render::render;
pub use resolver::{CachedResolver, EntityResolver, MemoryDirectory};
pub use stream::StreamBatch;
pub use types::*;
