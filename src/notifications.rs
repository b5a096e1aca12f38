//! Outbound notifications published to the push gateway.

use std::sync::Mutex;

use thiserror::Error;

use crate::domain::notification::Notification;
use crate::models::zmq::ZmqNotificationMessage;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to publish notification: {0}")]
    Transport(#[from] zmq::Error),

    #[error("notification socket is poisoned")]
    Poisoned,
}

/// Delivers notifications to hub members.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<(), NotificationError>;
}

/// Publishes JSON encoded notifications on a ZeroMQ PUB socket.
pub struct ZmqNotifier {
    socket: Mutex<zmq::Socket>,
}

impl ZmqNotifier {
    /// Connects a PUB socket to the gateway endpoint.
    pub fn connect(endpoint: &str) -> Result<Self, zmq::Error> {
        let context = zmq::Context::new();
        let socket = context.socket(zmq::PUB)?;
        socket.connect(endpoint)?;
        Ok(Self {
            socket: Mutex::new(socket),
        })
    }
}

impl Notifier for ZmqNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotificationError> {
        let payload = serde_json::to_vec(&ZmqNotificationMessage::from(notification))?;
        let socket = self.socket.lock().map_err(|_| NotificationError::Poisoned)?;
        socket.send(payload, 0)?;
        Ok(())
    }
}

/// Sends the notification and logs failures instead of propagating them.
pub fn notify_or_log<N>(notifier: &N, notification: &Notification)
where
    N: Notifier + ?Sized,
{
    if let Err(err) = notifier.notify(notification) {
        log::error!(
            "Failed to send notification '{}' to {:?}: {err}",
            notification.title,
            notification.recipient
        );
    }
}

/// Collects notifications in memory.
#[cfg(any(test, feature = "test-mocks"))]
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

#[cfg(any(test, feature = "test-mocks"))]
impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every delivery fails.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[cfg(any(test, feature = "test-mocks"))]
impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotificationError> {
        if self.fail {
            return Err(NotificationError::Transport(zmq::Error::EHOSTUNREACH));
        }
        self.sent
            .lock()
            .map_err(|_| NotificationError::Poisoned)?
            .push(notification.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notification::Recipient;
    use crate::domain::types::HubId;

    #[test]
    fn wire_message_carries_the_recipient() {
        let notification = Notification::to_role(
            HubId::new(3).unwrap(),
            "erp_warehouse",
            "Spare part approved",
            "Pump seal x2",
        );
        let json = serde_json::to_value(ZmqNotificationMessage::from(&notification)).unwrap();
        assert_eq!(json["hub_id"], 3);
        assert_eq!(json["recipient"]["kind"], "Role");
        assert_eq!(json["recipient"]["value"], "erp_warehouse");
        assert_eq!(json["title"], "Spare part approved");
    }

    #[test]
    fn failures_are_swallowed() {
        let notifier = RecordingNotifier::failing();
        let notification = Notification::to_email(
            HubId::new(1).unwrap(),
            "eng@example.com",
            "Reminder",
            "Visit tomorrow",
        );
        notify_or_log(&notifier, &notification);
        assert!(notifier.sent().is_empty());
        assert_eq!(
            notification.recipient,
            Recipient::Email("eng@example.com".to_string())
        );
    }
}
