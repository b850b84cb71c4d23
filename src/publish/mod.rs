//! Publish boundary.
//!
//! The dispatcher hands each alert to a [`Publisher`] as a subject, a body
//! and its filter attributes. Fan-out to subscribers happens on the far side
//! of this boundary.

mod channel;

pub use channel::{AlertFeed, ChannelPublisher};

use crate::attributes::PublishAttributes;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Sends rendered alerts to the notification channel.
///
/// Implementations must be safe to call from several dispatch workers at
/// once.
pub trait Publisher: Send + Sync {
    fn publish(&self, subject: &str, body: &str, attributes: &PublishAttributes) -> Result<()>;
}

impl<P: Publisher + ?Sized> Publisher for Arc<P> {
    fn publish(&self, subject: &str, body: &str, attributes: &PublishAttributes) -> Result<()> {
        (**self).publish(subject, body, attributes)
    }
}

/// A published alert as seen by a consumer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AlertMessage {
    pub subject: String,
    pub message: String,
    pub message_attributes: PublishAttributes,
}
