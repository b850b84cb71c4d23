//! In-process publisher over a bounded channel.

use super::{AlertMessage, Publisher};
use crate::attributes::PublishAttributes;
use crate::error::{AlertError, Result};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::time::Duration;

/// Default number of alerts buffered before publishing fails.
const DEFAULT_BUFFER_SIZE: usize = 1000;

/// Publishes alerts onto a bounded channel read through an [`AlertFeed`].
///
/// Publishing never blocks: a full buffer fails with
/// [`AlertError::ChannelFull`] and a dropped feed with
/// [`AlertError::ChannelClosed`].
#[derive(Clone)]
pub struct ChannelPublisher {
    sender: Sender<AlertMessage>,
}

impl ChannelPublisher {
    pub fn new() -> (Self, AlertFeed) {
        Self::with_buffer_size(DEFAULT_BUFFER_SIZE)
    }

    pub fn with_buffer_size(buffer_size: usize) -> (Self, AlertFeed) {
        let (sender, receiver) = bounded(buffer_size.max(1));
        (Self { sender }, AlertFeed { receiver })
    }
}

impl Publisher for ChannelPublisher {
    fn publish(&self, subject: &str, body: &str, attributes: &PublishAttributes) -> Result<()> {
        let message = AlertMessage {
            subject: subject.to_string(),
            message: body.to_string(),
            message_attributes: attributes.clone(),
        };
        match self.sender.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(AlertError::ChannelFull),
            Err(TrySendError::Disconnected(_)) => Err(AlertError::ChannelClosed),
        }
    }
}

/// Receiving end of a [`ChannelPublisher`].
pub struct AlertFeed {
    receiver: Receiver<AlertMessage>,
}

impl AlertFeed {
    /// Receive the next alert (blocking).
    pub fn recv(&self) -> std::result::Result<AlertMessage, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an alert (non-blocking).
    pub fn try_recv(&self) -> std::result::Result<AlertMessage, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> std::result::Result<AlertMessage, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Take every alert currently buffered.
    pub fn drain(&self) -> Vec<AlertMessage> {
        self.receiver.try_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{build_attributes, AlertTarget};
    use crate::types::{AlertCategory, EventTime};

    fn attributes() -> PublishAttributes {
        build_attributes(
            AlertCategory::SoftwareVersion,
            &AlertTarget::Global,
            EventTime::from_unix(1_700_000_000).unwrap(),
        )
    }

    #[test]
    fn test_publish_and_receive() {
        let (publisher, feed) = ChannelPublisher::new();
        publisher.publish("subject", "body", &attributes()).unwrap();

        let message = feed.recv_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!(message.subject, "subject");
        assert_eq!(message.message, "body");
        assert_eq!(message.message_attributes.alert_type(), Some("SOFTWARE_VERSION"));
    }

    #[test]
    fn test_full_buffer_fails() {
        let (publisher, feed) = ChannelPublisher::with_buffer_size(1);
        publisher.publish("one", "body", &attributes()).unwrap();

        let result = publisher.publish("two", "body", &attributes());
        assert!(matches!(result, Err(AlertError::ChannelFull)));
        assert_eq!(feed.drain().len(), 1);
    }

    #[test]
    fn test_dropped_feed_fails() {
        let (publisher, feed) = ChannelPublisher::new();
        drop(feed);

        let result = publisher.publish("subject", "body", &attributes());
        assert!(matches!(result, Err(AlertError::ChannelClosed)));
    }

    #[test]
    fn test_message_wire_shape() {
        let (publisher, feed) = ChannelPublisher::new();
        publisher.publish("subject", "body", &attributes()).unwrap();

        let json = serde_json::to_value(feed.try_recv().unwrap()).unwrap();
        assert_eq!(json["Subject"], "subject");
        assert_eq!(json["MessageAttributes"]["Scope"]["StringValue"], "GLOBAL");
    }
}
